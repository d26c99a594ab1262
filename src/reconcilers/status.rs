// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Status subresource updates for the agent CRs.
//!
//! The status carries the operator state, a `ReconcileSuccess` condition,
//! references to the key generated objects and the observed generation.
//! Updates are skipped when nothing changed; unconditional status writes
//! would re-trigger the watch and loop the controller.

use anyhow::Result;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{Condition, Time};
use k8s_openapi::jiff::Timestamp;
use kube::api::{Patch, PatchParams};
use kube::core::DynamicObject;
use kube::{Api, Client, ResourceExt};
use serde_json::json;
use tracing::debug;

use crate::crd::{
    AgentOperatorState, InstanaAgent, InstanaAgentStatus, RemoteAgent, RemoteAgentStatus,
    ResourceInfo,
};

/// Condition type reporting the outcome of the last reconciliation.
const CONDITION_RECONCILE_SUCCESS: &str = "ReconcileSuccess";

/// Find the server-returned object of the given kind and name among the
/// apply results and project it to a status reference.
#[must_use]
pub fn resource_info_for(applied: &[DynamicObject], kind: &str, name: &str) -> Option<ResourceInfo> {
    applied
        .iter()
        .find(|object| {
            object.types.as_ref().is_some_and(|t| t.kind == kind)
                && object.metadata.name.as_deref() == Some(name)
        })
        .map(|object| ResourceInfo {
            name: name.to_string(),
            uid: object.metadata.uid.clone().unwrap_or_default(),
        })
}

fn reconcile_condition(
    observed_generation: Option<i64>,
    state: AgentOperatorState,
    reason: Option<&str>,
) -> Condition {
    let succeeded = state != AgentOperatorState::Failed;
    Condition {
        type_: CONDITION_RECONCILE_SUCCESS.into(),
        status: if succeeded { "True" } else { "False" }.into(),
        reason: if succeeded {
            "ReconcileSucceeded".into()
        } else {
            "ReconcileFailed".into()
        },
        message: reason.unwrap_or_default().into(),
        observed_generation,
        last_transition_time: Time(Timestamp::now()),
    }
}

/// Whether two statuses differ in anything but the timestamp.
fn agent_status_changed(current: Option<&InstanaAgentStatus>, new: &InstanaAgentStatus) -> bool {
    match current {
        None => true,
        Some(current) => {
            let mut normalized = current.clone();
            normalized.last_update = new.last_update.clone();
            // Condition transition times move on every build; compare the
            // rest of the condition
            if let (Some(current_conditions), Some(new_conditions)) =
                (&mut normalized.conditions, &new.conditions)
            {
                for (lhs, rhs) in current_conditions.iter_mut().zip(new_conditions.iter()) {
                    if lhs.type_ == rhs.type_ && lhs.status == rhs.status && lhs.reason == rhs.reason
                    {
                        lhs.last_transition_time = rhs.last_transition_time.clone();
                        lhs.message = rhs.message.clone();
                        lhs.observed_generation = rhs.observed_generation;
                    }
                }
            }
            normalized != *new
        }
    }
}

/// Patch the `InstanaAgent` status subresource, skipping no-op updates.
pub async fn update_agent_status(
    client: &Client,
    agent: &InstanaAgent,
    state: AgentOperatorState,
    reason: Option<String>,
    config_secret: Option<ResourceInfo>,
    daemonset: Option<ResourceInfo>,
    k8s_sensor_deployment: Option<ResourceInfo>,
) -> Result<()> {
    let observed_generation = agent.metadata.generation;

    let new_status = InstanaAgentStatus {
        status: Some(state),
        reason: reason.clone(),
        last_update: Some(Time(Timestamp::now())),
        config_secret,
        daemonset,
        k8s_sensor_deployment,
        conditions: Some(vec![reconcile_condition(
            observed_generation,
            state,
            reason.as_deref(),
        )]),
        observed_generation,
    };

    if !agent_status_changed(agent.status.as_ref(), &new_status) {
        debug!(agent = %agent.name_any(), "Status unchanged, skipping update");
        return Ok(());
    }

    let api: Api<InstanaAgent> =
        Api::namespaced(client.clone(), &agent.namespace().unwrap_or_default());
    api.patch_status(
        &agent.name_any(),
        &PatchParams::default(),
        &Patch::Merge(&json!({ "status": new_status })),
    )
    .await?;

    Ok(())
}

/// Patch the `RemoteAgent` status subresource, skipping no-op updates.
pub async fn update_remote_agent_status(
    client: &Client,
    agent: &RemoteAgent,
    state: AgentOperatorState,
    reason: Option<String>,
    config_secret: Option<ResourceInfo>,
    deployment: Option<ResourceInfo>,
) -> Result<()> {
    let observed_generation = agent.metadata.generation;

    let new_status = RemoteAgentStatus {
        status: Some(state),
        reason: reason.clone(),
        last_update: Some(Time(Timestamp::now())),
        config_secret,
        deployment,
        conditions: Some(vec![reconcile_condition(
            observed_generation,
            state,
            reason.as_deref(),
        )]),
        observed_generation,
    };

    let changed = match agent.status.as_ref() {
        None => true,
        Some(current) => {
            let mut normalized = current.clone();
            normalized.last_update = new_status.last_update.clone();
            normalized.conditions = new_status.conditions.clone();
            normalized != new_status
        }
    };
    if !changed {
        debug!(agent = %agent.name_any(), "Status unchanged, skipping update");
        return Ok(());
    }

    let api: Api<RemoteAgent> =
        Api::namespaced(client.clone(), &agent.namespace().unwrap_or_default());
    api.patch_status(
        &agent.name_any(),
        &PatchParams::default(),
        &Patch::Merge(&json!({ "status": new_status })),
    )
    .await?;

    Ok(())
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod status_tests;
