// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Finalizer management for the agent CRs.
//!
//! The finalizer gates CR deletion on the cleanup of every recorded
//! dependent (see the lifecycle module); owner references alone would leave
//! cluster-scoped RBAC behind.

use anyhow::Result;
use kube::api::{Patch, PatchParams};
use kube::core::NamespaceResourceScope;
use kube::{Api, Client, Resource, ResourceExt};
use serde_json::json;
use tracing::debug;

/// Add the finalizer if it is not present yet. Returns whether a patch was
/// made.
pub async fn ensure_finalizer<K>(client: &Client, resource: &K, finalizer: &str) -> Result<bool>
where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + ResourceExt
        + Clone
        + std::fmt::Debug
        + serde::Serialize
        + for<'de> serde::Deserialize<'de>,
{
    if resource.finalizers().iter().any(|f| f == finalizer) {
        return Ok(false);
    }

    let mut finalizers = resource.finalizers().to_vec();
    finalizers.push(finalizer.to_string());

    patch_finalizers(client, resource, finalizers).await?;

    debug!(
        kind = %K::kind(&()),
        name = %resource.name_any(),
        finalizer = %finalizer,
        "Added finalizer"
    );
    Ok(true)
}

/// Remove the finalizer if present. Returns whether a patch was made.
pub async fn remove_finalizer<K>(client: &Client, resource: &K, finalizer: &str) -> Result<bool>
where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + ResourceExt
        + Clone
        + std::fmt::Debug
        + serde::Serialize
        + for<'de> serde::Deserialize<'de>,
{
    if !resource.finalizers().iter().any(|f| f == finalizer) {
        return Ok(false);
    }

    let finalizers: Vec<String> = resource
        .finalizers()
        .iter()
        .filter(|f| f.as_str() != finalizer)
        .cloned()
        .collect();

    patch_finalizers(client, resource, finalizers).await?;

    debug!(
        kind = %K::kind(&()),
        name = %resource.name_any(),
        finalizer = %finalizer,
        "Removed finalizer"
    );
    Ok(true)
}

async fn patch_finalizers<K>(client: &Client, resource: &K, finalizers: Vec<String>) -> Result<()>
where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + ResourceExt
        + Clone
        + std::fmt::Debug
        + serde::Serialize
        + for<'de> serde::Deserialize<'de>,
{
    let namespace = resource.namespace().unwrap_or_default();
    let api: Api<K> = Api::namespaced(client.clone(), &namespace);

    let patch = json!({
        "metadata": {
            "finalizers": finalizers,
        }
    });

    api.patch(&resource.name_any(), &PatchParams::default(), &Patch::Merge(&patch))
        .await?;

    Ok(())
}
