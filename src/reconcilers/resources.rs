// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Server-side apply and deletion over type-erased objects.
//!
//! All generated objects flow through server-side apply with a single field
//! manager, force-owning the fields the operator renders. A dry-run pass
//! over the full object list runs before anything is persisted so a single
//! invalid object rejects the whole generation instead of applying half of
//! it.

use kube::api::{DeleteParams, Patch, PatchParams};
use kube::core::{ApiResource, DynamicObject, GroupVersionKind};
use kube::{Api, Client};
use tracing::{debug, info, warn};

use crate::builders::BuiltObject;
use crate::constants::FIELD_OWNER_NAME;
use crate::operator_errors::ApplyError;

/// The dynamic API for one built object, namespaced into the object's
/// namespace when it has one.
#[must_use]
pub fn dynamic_api(client: &Client, built: &BuiltObject) -> Api<DynamicObject> {
    match (built.namespaced, built.namespace()) {
        (true, Some(namespace)) => {
            Api::namespaced_with(client.clone(), &namespace, &built.resource)
        }
        _ => Api::all_with(client.clone(), &built.resource),
    }
}

/// Server-side apply every object in order. With `dry_run` the API server
/// validates and admits without persisting. Applies every object even after
/// a failure and reports all failures at once.
pub async fn apply_all(
    client: &Client,
    objects: &[BuiltObject],
    dry_run: bool,
) -> Result<Vec<DynamicObject>, ApplyError> {
    let mut applied = Vec::with_capacity(objects.len());
    let mut failures: Vec<String> = Vec::new();

    let mut params = PatchParams::apply(FIELD_OWNER_NAME).force();
    params.dry_run = dry_run;

    for built in objects {
        let api = dynamic_api(client, built);
        let name = built.name();

        debug!(
            kind = %built.kind(),
            name = %name,
            dry_run,
            "Applying object"
        );

        match api.patch(&name, &params, &Patch::Apply(&built.object)).await {
            Ok(object) => {
                if !dry_run {
                    info!(kind = %built.kind(), name = %name, "Applied object");
                }
                applied.push(object);
            }
            Err(e) => {
                warn!(kind = %built.kind(), name = %name, error = %e, "Failed to apply object");
                failures.push(format!("{}/{name}: {e}", built.kind()));
            }
        }
    }

    if failures.is_empty() {
        Ok(applied)
    } else {
        Err(ApplyError::Aggregate {
            failed: failures.len(),
            total: objects.len(),
            details: failures.join("; "),
        })
    }
}

/// Delete an object addressed by the coordinates recorded in the lifecycle
/// `ConfigMap`. Missing objects are not an error.
pub async fn delete_by_reference(
    client: &Client,
    api_version: &str,
    kind: &str,
    name: &str,
    namespace: Option<&str>,
) -> Result<(), ApplyError> {
    let gvk = match api_version.split_once('/') {
        Some((group, version)) => GroupVersionKind::gvk(group, version, kind),
        None => GroupVersionKind::gvk("", api_version, kind),
    };
    let resource = ApiResource::from_gvk(&gvk);

    let api: Api<DynamicObject> = match namespace {
        Some(namespace) => Api::namespaced_with(client.clone(), namespace, &resource),
        None => Api::all_with(client.clone(), &resource),
    };

    debug!(kind = %kind, name = %name, namespace = ?namespace, "Deleting object");

    match api.delete(name, &DeleteParams::default()).await {
        Ok(_) => {
            info!(kind = %kind, name = %name, "Deleted object");
            Ok(())
        }
        Err(kube::Error::Api(e)) if e.code == 404 => Ok(()),
        Err(e) => Err(ApplyError::Delete {
            kind: kind.to_string(),
            name: name.to_string(),
            source: e,
        }),
    }
}
