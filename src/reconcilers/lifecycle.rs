// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Dependent-object lifecycle tracking.
//!
//! Owner references garbage-collect dependents when the CR goes away, but
//! they do not cover objects that simply stop being generated (a disabled
//! service, a removed zone, cluster-scoped RBAC). Every applied generation
//! is therefore recorded in a `{name}-dependents` `ConfigMap`; after a
//! successful apply, objects recorded under earlier generations that the
//! current generation no longer produces are deleted, and on CR deletion
//! everything recorded goes.

use anyhow::Result;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::{DeleteParams, Patch, PatchParams};
use kube::{Api, Client, ResourceExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::builders::transformations::{operator_version, Transformations};
use crate::builders::{erase, BuiltObject};
use crate::constants::{COMPONENT_INSTANA_AGENT, COMPONENT_INSTANA_AGENT_REMOTE, FIELD_OWNER_NAME};
use crate::crd::{InstanaAgent, RemoteAgent};
use crate::reconcilers::resources::delete_by_reference;

/// Coordinates of one generated object, as recorded in the lifecycle
/// `ConfigMap`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependentRef {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl DependentRef {
    fn from_built(built: &BuiltObject) -> Self {
        Self {
            api_version: built.resource.api_version.clone(),
            kind: built.resource.kind.clone(),
            name: built.name(),
            namespace: built.namespaced.then(|| built.namespace()).flatten(),
        }
    }
}

/// Tracks and cleans up the dependents of one CR.
pub struct DependentLifecycleManager {
    client: Client,
    transformations: Transformations,
    component: &'static str,
    config_map_name: String,
    namespace: String,
    generation_key: String,
}

impl DependentLifecycleManager {
    #[must_use]
    pub fn new(client: Client, agent: &InstanaAgent) -> Self {
        Self {
            client,
            transformations: Transformations::new(agent),
            component: COMPONENT_INSTANA_AGENT,
            config_map_name: format!("{}-dependents", agent.name_any()),
            namespace: agent.namespace().unwrap_or_default(),
            generation_key: generation_key(agent.metadata.generation),
        }
    }

    #[must_use]
    pub fn new_remote(client: Client, agent: &RemoteAgent) -> Self {
        Self {
            client,
            transformations: Transformations::new_remote(agent),
            component: COMPONENT_INSTANA_AGENT_REMOTE,
            config_map_name: format!("{}-dependents", agent.remote_resources_name()),
            namespace: agent.namespace().unwrap_or_default(),
            generation_key: generation_key(agent.metadata.generation),
        }
    }

    fn api(&self) -> Api<ConfigMap> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    async fn current_data(&self) -> BTreeMap<String, String> {
        match self.api().get_opt(&self.config_map_name).await {
            Ok(Some(cm)) => cm.data.unwrap_or_default(),
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                warn!(
                    configmap = %self.config_map_name,
                    error = %e,
                    "Failed to read lifecycle ConfigMap, assuming empty"
                );
                BTreeMap::new()
            }
        }
    }

    /// Record the current generation's dependents, preserving the entries
    /// of earlier generations for the cleanup pass.
    pub async fn update_dependents(&self, current: &[BuiltObject]) -> Result<()> {
        let refs: Vec<DependentRef> = current.iter().map(DependentRef::from_built).collect();
        let mut data = self.current_data().await;
        data.insert(self.generation_key.clone(), serde_json::to_string(&refs)?);

        self.apply_config_map(data).await
    }

    /// Delete every object recorded under an earlier generation that the
    /// current generation no longer produces, then drop the stale entries.
    pub async fn cleanup_orphans(&self, current: &[BuiltObject]) -> Result<()> {
        let current_refs: Vec<DependentRef> =
            current.iter().map(DependentRef::from_built).collect();
        let data = self.current_data().await;

        for (key, recorded) in &data {
            if key == &self.generation_key {
                continue;
            }
            for dependent in parse_refs(key, recorded) {
                if !current_refs.contains(&dependent) {
                    info!(
                        kind = %dependent.kind,
                        name = %dependent.name,
                        generation = %key,
                        "Deleting orphaned dependent"
                    );
                    delete_by_reference(
                        &self.client,
                        &dependent.api_version,
                        &dependent.kind,
                        &dependent.name,
                        dependent.namespace.as_deref(),
                    )
                    .await?;
                }
            }
        }

        // Only the current generation remains interesting
        let mut pruned = BTreeMap::new();
        if let Some(refs) = data.get(&self.generation_key) {
            pruned.insert(self.generation_key.clone(), refs.clone());
        }
        self.apply_config_map(pruned).await
    }

    /// Delete every recorded dependent plus the lifecycle `ConfigMap`
    /// itself. Used by the finalizer on CR deletion.
    pub async fn delete_all(&self) -> Result<()> {
        let data = self.current_data().await;

        for (key, recorded) in &data {
            for dependent in parse_refs(key, recorded) {
                delete_by_reference(
                    &self.client,
                    &dependent.api_version,
                    &dependent.kind,
                    &dependent.name,
                    dependent.namespace.as_deref(),
                )
                .await?;
            }
        }

        match self.api().delete(&self.config_map_name, &DeleteParams::default()).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(e)) if e.code == 404 => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn apply_config_map(&self, data: BTreeMap<String, String>) -> Result<()> {
        let cm = ConfigMap {
            metadata: k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta {
                name: Some(self.config_map_name.clone()),
                namespace: Some(self.namespace.clone()),
                ..Default::default()
            },
            data: Some(data),
            ..Default::default()
        };

        let Some(mut built) = erase(&cm) else {
            return Ok(());
        };
        self.transformations
            .add_common_labels(&mut built.object, self.component);
        self.transformations.add_owner_reference(&mut built.object);

        debug!(configmap = %self.config_map_name, "Updating lifecycle ConfigMap");

        let api: Api<ConfigMap> = self.api();
        api.patch(
            &self.config_map_name,
            &PatchParams::apply(FIELD_OWNER_NAME).force(),
            &Patch::Apply(&built.object),
        )
        .await?;

        Ok(())
    }
}

fn generation_key(generation: Option<i64>) -> String {
    format!(
        "v{}-generation-{}",
        operator_version(),
        generation.unwrap_or_default()
    )
}

fn parse_refs(key: &str, recorded: &str) -> Vec<DependentRef> {
    match serde_json::from_str(recorded) {
        Ok(refs) => refs,
        Err(e) => {
            warn!(generation = %key, error = %e, "Failed to parse recorded dependents, skipping");
            Vec::new()
        }
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod lifecycle_tests;
