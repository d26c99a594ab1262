// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Common transformations applied to every generated object.
//!
//! All objects the operator emits carry the standard
//! `app.kubernetes.io/*` labels plus a generation label, and namespaced
//! objects carry a controller owner reference back to the CR. The
//! generation label lets the cleanup pass select leftovers from earlier
//! CR generations with a single label query.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::core::DynamicObject;
use kube::ResourceExt;
use std::collections::BTreeMap;

use crate::constants::{API_GROUP_VERSION, KIND_INSTANA_AGENT, KIND_REMOTE_AGENT};
use crate::crd::{InstanaAgent, RemoteAgent};
use crate::labels::{
    APP_NAME, APP_NAME_REMOTE, GENERATION_LABEL, K8S_COMPONENT, K8S_INSTANCE, K8S_MANAGED_BY,
    K8S_NAME, K8S_PART_OF, K8S_VERSION, MANAGED_BY_OPERATOR, PART_OF_INSTANA, ZONE_LABEL,
};

/// Operator version stamped into the version label.
#[must_use]
pub fn operator_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Label and owner-reference stamping for one CR.
#[derive(Clone, Debug)]
pub struct Transformations {
    owner: OwnerReference,
    app_name: &'static str,
    generation: String,
}

impl Transformations {
    /// Transformations for objects owned by an `InstanaAgent`.
    #[must_use]
    pub fn new(agent: &InstanaAgent) -> Self {
        Self {
            owner: OwnerReference {
                api_version: API_GROUP_VERSION.to_string(),
                kind: KIND_INSTANA_AGENT.to_string(),
                name: agent.name_any(),
                uid: agent.metadata.uid.clone().unwrap_or_default(),
                controller: Some(true),
                block_owner_deletion: Some(true),
            },
            app_name: APP_NAME,
            generation: agent.metadata.generation.unwrap_or_default().to_string(),
        }
    }

    /// Transformations for objects owned by a `RemoteAgent`.
    #[must_use]
    pub fn new_remote(agent: &RemoteAgent) -> Self {
        Self {
            owner: OwnerReference {
                api_version: API_GROUP_VERSION.to_string(),
                kind: KIND_REMOTE_AGENT.to_string(),
                name: agent.name_any(),
                uid: agent.metadata.uid.clone().unwrap_or_default(),
                controller: Some(true),
                block_owner_deletion: Some(true),
            },
            app_name: APP_NAME_REMOTE,
            generation: agent.metadata.generation.unwrap_or_default().to_string(),
        }
    }

    /// Stamp the standard labels onto an object, preserving any labels the
    /// builder already set.
    pub fn add_common_labels(&self, obj: &mut DynamicObject, component: &str) {
        let labels = obj.metadata.labels.get_or_insert_with(BTreeMap::new);

        labels.insert(K8S_NAME.into(), self.app_name.into());
        labels.insert(K8S_INSTANCE.into(), self.owner.name.clone());
        labels.insert(K8S_VERSION.into(), operator_version().into());
        labels.insert(K8S_COMPONENT.into(), component.into());
        labels.insert(K8S_PART_OF.into(), PART_OF_INSTANA.into());
        labels.insert(K8S_MANAGED_BY.into(), MANAGED_BY_OPERATOR.into());
        labels.insert(GENERATION_LABEL.into(), self.generation.clone());
    }

    /// Ensure the object's owner references contain exactly one reference
    /// for the owning CR. Stale references with the same name but a
    /// different UID (a deleted-and-recreated CR) are dropped; references to
    /// other owners are preserved.
    pub fn add_owner_reference(&self, obj: &mut DynamicObject) {
        let existing = obj.metadata.owner_references.take().unwrap_or_default();

        let mut refs: Vec<OwnerReference> = Vec::with_capacity(existing.len() + 1);
        let mut found = false;

        for reference in existing {
            if reference.name == self.owner.name {
                if reference.uid == self.owner.uid {
                    refs.push(reference);
                    found = true;
                }
                continue;
            }
            refs.push(reference);
        }

        if !found {
            refs.push(self.owner.clone());
        }

        obj.metadata.owner_references = Some(refs);
    }

    /// Label selector matching objects from any earlier CR generation.
    /// Used after a successful apply to find and delete leftovers.
    #[must_use]
    pub fn previous_generations_selector(&self) -> String {
        format!(
            "{K8S_NAME} in ({}),{K8S_INSTANCE} in ({}),{GENERATION_LABEL} notin ({})",
            self.app_name, self.owner.name, self.generation
        )
    }
}

/// Pod selector labels shared between a workload's `selector.matchLabels`
/// and its pod template.
#[derive(Clone, Debug)]
pub struct PodSelectorLabelGenerator {
    app_name: &'static str,
    instance: String,
    component: &'static str,
    zone: Option<String>,
}

impl PodSelectorLabelGenerator {
    /// Selector labels for an `InstanaAgent`-owned workload.
    #[must_use]
    pub fn new(agent: &InstanaAgent, component: &'static str) -> Self {
        Self {
            app_name: APP_NAME,
            instance: agent.name_any(),
            component,
            zone: None,
        }
    }

    /// Selector labels for a zone-scoped agent DaemonSet; the zone name
    /// participates in the selector so zone DaemonSets never overlap.
    #[must_use]
    pub fn with_zone(agent: &InstanaAgent, component: &'static str, zone: &str) -> Self {
        Self {
            zone: Some(zone.to_string()),
            ..Self::new(agent, component)
        }
    }

    /// Selector labels for a `RemoteAgent`-owned workload.
    #[must_use]
    pub fn new_remote(agent: &RemoteAgent, component: &'static str) -> Self {
        Self {
            app_name: APP_NAME_REMOTE,
            instance: agent.name_any(),
            component,
            zone: None,
        }
    }

    /// The immutable selector label set.
    #[must_use]
    pub fn pod_selector_labels(&self) -> BTreeMap<String, String> {
        let mut labels = BTreeMap::new();
        labels.insert(K8S_NAME.into(), self.app_name.into());
        labels.insert(K8S_INSTANCE.into(), self.instance.clone());
        labels.insert(K8S_COMPONENT.into(), self.component.into());
        if let Some(zone) = &self.zone {
            labels.insert(ZONE_LABEL.into(), zone.clone());
        }
        labels
    }

    /// Pod template labels: the user-supplied labels plus the selector set
    /// plus the remaining common labels. Selector labels win on conflict so
    /// the selector always matches the template.
    #[must_use]
    pub fn pod_labels(&self, user_labels: BTreeMap<String, String>) -> BTreeMap<String, String> {
        let mut labels = user_labels;
        labels.insert(K8S_PART_OF.into(), PART_OF_INSTANA.into());
        labels.insert(K8S_MANAGED_BY.into(), MANAGED_BY_OPERATOR.into());
        labels.insert(K8S_VERSION.into(), operator_version().into());
        labels.extend(self.pod_selector_labels());
        labels
    }
}

#[cfg(test)]
#[path = "transformations_tests.rs"]
mod transformations_tests;
