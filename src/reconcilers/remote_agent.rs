// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Reconciliation of `RemoteAgent` resources.
//!
//! The same pipeline as the host agent — render, dry-run, record, apply,
//! clean up — over the remote agent's smaller object set (a Deployment
//! instead of a DaemonSet, no sensor).

use anyhow::Result;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::{Api, Client, ResourceExt};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::builders::remote::config_secret::ConfigSecretBuilder;
use crate::builders::remote::deployment::DeploymentBuilder;
use crate::builders::remote::keys_secret::KeysSecretBuilder;
use crate::builders::remote::rbac::{
    ClusterRoleBindingBuilder, ClusterRoleBuilder, ServiceAccountBuilder,
};
use crate::builders::remote::service::{HeadlessServiceBuilder, ServiceBuilder};
use crate::builders::transformations::Transformations;
use crate::builders::{BuilderTransformer, ObjectBuilder};
use crate::crd::{AgentOperatorState, RemoteAgent};
use crate::labels::FINALIZER_REMOTE_AGENT;
use crate::reconcilers::finalizers::{ensure_finalizer, remove_finalizer};
use crate::reconcilers::lifecycle::DependentLifecycleManager;
use crate::reconcilers::resources::apply_all;
use crate::reconcilers::status::{resource_info_for, update_remote_agent_status};

/// Reconcile one `RemoteAgent` into its generated objects.
pub async fn reconcile_remote_agent(client: Client, agent: RemoteAgent) -> Result<()> {
    let name = agent.name_any();

    if agent.metadata.deletion_timestamp.is_some() {
        return delete_remote_agent(client, agent).await;
    }

    ensure_finalizer(&client, &agent, FINALIZER_REMOTE_AGENT).await?;

    let keys_secret_data = fetch_keys_secret(&client, &agent).await;

    debug!(agent = %name, "Rendering desired object set for RemoteAgent");

    let builders: Vec<Box<dyn ObjectBuilder + '_>> = vec![
        Box::new(ConfigSecretBuilder::new(&agent, keys_secret_data.as_ref())),
        Box::new(KeysSecretBuilder::new(&agent)),
        Box::new(DeploymentBuilder::new(&agent)),
        Box::new(HeadlessServiceBuilder::new(&agent)),
        Box::new(ServiceBuilder::new(&agent)),
        Box::new(ServiceAccountBuilder::new(&agent)),
        Box::new(ClusterRoleBuilder::new(&agent)),
        Box::new(ClusterRoleBindingBuilder::new(&agent)),
    ];

    let transformer = BuilderTransformer::new(Transformations::new_remote(&agent));
    let builder_refs: Vec<&dyn ObjectBuilder> =
        builders.iter().map(|builder| builder.as_ref()).collect();
    let objects = transformer.build_all(&builder_refs);

    info!(agent = %name, objects = objects.len(), "Applying desired object set");

    let lifecycle = DependentLifecycleManager::new_remote(client.clone(), &agent);

    let outcome = async {
        apply_all(&client, &objects, true).await?;
        lifecycle.update_dependents(&objects).await?;
        let applied = apply_all(&client, &objects, false).await?;
        lifecycle.cleanup_orphans(&objects).await?;
        Ok::<_, anyhow::Error>(applied)
    }
    .await;

    match outcome {
        Ok(applied) => {
            update_remote_agent_status(
                &client,
                &agent,
                AgentOperatorState::Running,
                None,
                resource_info_for(&applied, "Secret", &agent.config_secret_name()),
                resource_info_for(&applied, "Deployment", &agent.remote_resources_name()),
            )
            .await?;
            Ok(())
        }
        Err(e) => {
            warn!(agent = %name, error = %e, "Reconciliation failed");
            update_remote_agent_status(
                &client,
                &agent,
                AgentOperatorState::Failed,
                Some(e.to_string()),
                None,
                None,
            )
            .await?;
            Err(e)
        }
    }
}

/// Finalize a deleted `RemoteAgent`.
pub async fn delete_remote_agent(client: Client, agent: RemoteAgent) -> Result<()> {
    info!(agent = %agent.name_any(), "Cleaning up dependents of deleted RemoteAgent");

    let lifecycle = DependentLifecycleManager::new_remote(client.clone(), &agent);
    lifecycle.delete_all().await?;

    remove_finalizer(&client, &agent, FINALIZER_REMOTE_AGENT).await?;
    Ok(())
}

/// Content of the user-provided keys secret, when one is referenced.
async fn fetch_keys_secret(
    client: &Client,
    agent: &RemoteAgent,
) -> Option<BTreeMap<String, ByteString>> {
    let secret_name = agent.spec.agent.keys_secret.as_deref().filter(|s| !s.is_empty())?;
    let api: Api<Secret> =
        Api::namespaced(client.clone(), &agent.namespace().unwrap_or_default());

    match api.get_opt(secret_name).await {
        Ok(Some(secret)) => secret.data,
        Ok(None) => {
            warn!(secret = %secret_name, "Referenced keys secret not found");
            None
        }
        Err(e) => {
            warn!(secret = %secret_name, error = %e, "Failed to fetch keys secret");
            None
        }
    }
}
