// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Reconciliation of `InstanaAgent` resources.
//!
//! Each pass renders the full desired object set through the builders,
//! validates it with a dry-run apply, records the generation's dependents,
//! applies for real and finally deletes orphans from earlier generations.
//! CR deletion is gated by a finalizer that removes everything recorded.

use anyhow::Result;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use k8s_openapi::ByteString;
use kube::{Api, Client, ResourceExt};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::builders::agent::config_secret::ConfigSecretBuilder;
use crate::builders::agent::daemonset::DaemonSetBuilder;
use crate::builders::agent::keys_secret::KeysSecretBuilder;
use crate::builders::agent::pull_secret::ContainersSecretBuilder;
use crate::builders::agent::rbac::{
    ClusterRoleBindingBuilder, ClusterRoleBuilder, ServiceAccountBuilder,
};
use crate::builders::agent::service::{HeadlessServiceBuilder, ServiceBuilder};
use crate::builders::agent::tls_secret::TlsSecretBuilder;
use crate::builders::backends::K8SensorBackend;
use crate::builders::k8s_sensor;
use crate::builders::transformations::Transformations;
use crate::builders::{BuilderTransformer, ObjectBuilder};
use crate::config_merger::ConfigMerger;
use crate::crd::{AgentOperatorState, InstanaAgent};
use crate::labels::FINALIZER_INSTANA_AGENT;
use crate::reconcilers::finalizers::{ensure_finalizer, remove_finalizer};
use crate::reconcilers::lifecycle::DependentLifecycleManager;
use crate::reconcilers::resources::apply_all;
use crate::reconcilers::status::{resource_info_for, update_agent_status};

/// Reconcile one `InstanaAgent` into its generated objects.
pub async fn reconcile_instana_agent(client: Client, agent: InstanaAgent) -> Result<()> {
    let name = agent.name_any();

    if agent.metadata.deletion_timestamp.is_some() {
        return delete_instana_agent(client, agent).await;
    }

    ensure_finalizer(&client, &agent, FINALIZER_INSTANA_AGENT).await?;

    let is_openshift = cluster_is_openshift(&client, &agent).await;
    let keys_secret_data = fetch_keys_secret(&client, &agent).await;
    let merged_configuration = ConfigMerger::new(client.clone())
        .merge_configuration_yaml(
            agent.spec.agent.configuration_yaml.as_deref().unwrap_or_default(),
        )
        .await;
    let backends = K8SensorBackend::from_agent(&agent);

    debug!(
        agent = %name,
        openshift = is_openshift,
        backends = backends.len(),
        "Rendering desired object set"
    );

    let mut builders: Vec<Box<dyn ObjectBuilder + '_>> = Vec::new();

    builders.push(Box::new(ConfigSecretBuilder::new(
        &agent,
        &merged_configuration,
        keys_secret_data.as_ref(),
    )));
    for backend in &backends {
        builders.push(Box::new(KeysSecretBuilder::new(
            &agent,
            backend.endpoint_key.clone(),
            backend.download_key.clone(),
            &backend.resource_suffix,
        )));
    }
    builders.push(Box::new(TlsSecretBuilder::new(&agent)));
    builders.push(Box::new(ContainersSecretBuilder::new(&agent)));

    match agent.spec.zones.as_deref() {
        Some(zones) if !zones.is_empty() => {
            for zone in zones {
                builders.push(Box::new(DaemonSetBuilder::with_zone(
                    &agent,
                    is_openshift,
                    zone,
                )));
            }
        }
        _ => builders.push(Box::new(DaemonSetBuilder::new(&agent, is_openshift))),
    }

    builders.push(Box::new(HeadlessServiceBuilder::new(&agent)));
    builders.push(Box::new(ServiceBuilder::new(&agent)));
    builders.push(Box::new(ServiceAccountBuilder::new(&agent)));
    builders.push(Box::new(ClusterRoleBuilder::new(&agent)));
    builders.push(Box::new(ClusterRoleBindingBuilder::new(&agent)));

    builders.push(Box::new(k8s_sensor::configmap::ConfigMapBuilder::new(
        &agent, &backends,
    )));
    builders.push(Box::new(k8s_sensor::rbac::ServiceAccountBuilder::new(&agent)));
    builders.push(Box::new(k8s_sensor::rbac::RoleBuilder::new(&agent)));
    builders.push(Box::new(k8s_sensor::rbac::RoleBindingBuilder::new(&agent)));
    builders.push(Box::new(k8s_sensor::rbac::ClusterRoleBuilder::new(&agent)));
    builders.push(Box::new(k8s_sensor::rbac::ClusterRoleBindingBuilder::new(
        &agent,
    )));
    builders.push(Box::new(
        k8s_sensor::poddisruptionbudget::PodDisruptionBudgetBuilder::new(&agent),
    ));
    for backend in &backends {
        builders.push(Box::new(k8s_sensor::deployment::DeploymentBuilder::new(
            &agent,
            backend,
            is_openshift,
        )));
    }

    let transformer = BuilderTransformer::new(Transformations::new(&agent));
    let builder_refs: Vec<&dyn ObjectBuilder> =
        builders.iter().map(|builder| builder.as_ref()).collect();
    let objects = transformer.build_all(&builder_refs);

    info!(agent = %name, objects = objects.len(), "Applying desired object set");

    let lifecycle = DependentLifecycleManager::new(client.clone(), &agent);

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
            let daemonset = match agent.spec.zones.as_deref() {
                Some(zones) if !zones.is_empty() => None,
                _ => resource_info_for(&applied, "DaemonSet", &name),
            };
            update_agent_status(
                &client,
                &agent,
                AgentOperatorState::Running,
                None,
                resource_info_for(&applied, "Secret", &agent.config_secret_name()),
                daemonset,
                resource_info_for(&applied, "Deployment", &agent.k8s_sensor_resources_name()),
            )
            .await?;
            Ok(())
        }
        Err(e) => {
            warn!(agent = %name, error = %e, "Reconciliation failed");
            update_agent_status(
                &client,
                &agent,
                AgentOperatorState::Failed,
                Some(e.to_string()),
                None,
                None,
                None,
            )
            .await?;
            Err(e)
        }
    }
}

/// Finalize a deleted `InstanaAgent`: remove every recorded dependent, then
/// release the finalizer.
pub async fn delete_instana_agent(client: Client, agent: InstanaAgent) -> Result<()> {
    info!(agent = %agent.name_any(), "Cleaning up dependents of deleted InstanaAgent");

    let lifecycle = DependentLifecycleManager::new(client.clone(), &agent);
    lifecycle.delete_all().await?;

    remove_finalizer(&client, &agent, FINALIZER_INSTANA_AGENT).await?;
    Ok(())
}

/// Whether the cluster is OpenShift: the CR hint when set, otherwise probed
/// via the OpenShift-specific `clusteroperators` CRD.
async fn cluster_is_openshift(client: &Client, agent: &InstanaAgent) -> bool {
    if let Some(openshift) = agent.spec.openshift {
        return openshift;
    }

    let api: Api<CustomResourceDefinition> = Api::all(client.clone());
    match api.get_opt("clusteroperators.config.openshift.io").await {
        Ok(found) => found.is_some(),
        Err(e) => {
            warn!(error = %e, "Failed to probe for OpenShift, assuming vanilla Kubernetes");
            false
        }
    }
}

/// Content of the user-provided keys secret, when one is referenced.
async fn fetch_keys_secret(
    client: &Client,
    agent: &InstanaAgent,
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
