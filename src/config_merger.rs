// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Merging of the CR's agent configuration with supplemental `ConfigMaps`.
//!
//! Teams can drop `ConfigMaps` labelled `instana.io/agent-config=true` into
//! the cluster to contribute sensor configuration without editing the CR.
//! Each such `ConfigMap` carries a `configuration_yaml` key whose document is
//! deep-merged into the CR's `configuration_yaml` before the config secret
//! is built.
//!
//! Merge semantics: sequences append, mappings recurse, missing keys are
//! inserted. When both documents hold a scalar (or mismatched kinds) under
//! the same key, the CR value wins.

use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::ListParams;
use kube::{Api, Client};
use serde_yaml::{Mapping, Value};
use tracing::{debug, info, warn};

use crate::constants::AGENT_CONFIG_LABEL;

/// Key inside a supplemental `ConfigMap` holding the YAML document to merge.
const CONFIGURATION_YAML_KEY: &str = "configuration_yaml";

/// Merges the CR's configuration YAML with all labelled `ConfigMaps` in the
/// cluster.
pub struct ConfigMerger {
    client: Client,
}

impl ConfigMerger {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Merge the CR configuration with every supplemental `ConfigMap` and
    /// render the result back to YAML.
    ///
    /// An unparseable CR document yields the empty string; an unparseable
    /// `ConfigMap` document is skipped with a warning.
    pub async fn merge_configuration_yaml(&self, agent_configuration: &str) -> String {
        let mut agent_data = match parse_document(agent_configuration) {
            Some(data) => data,
            None => {
                warn!("Failed to load agent configuration, skipping merge");
                return String::new();
            }
        };

        for config_map in self.fetch_config_maps().await {
            let name = config_map.metadata.name.as_deref().unwrap_or("<unnamed>").to_string();
            let Some(document) = config_map
                .data
                .as_ref()
                .and_then(|data| data.get(CONFIGURATION_YAML_KEY))
            else {
                debug!(configmap = %name, "ConfigMap has no configuration_yaml key, skipping");
                continue;
            };

            match parse_document(document) {
                Some(overlay) => {
                    debug!(configmap = %name, "Merging agent configuration from ConfigMap");
                    merge_config(&mut agent_data, &overlay);
                }
                None => {
                    warn!(configmap = %name, "Failed to parse agent configuration YAML, skipping");
                }
            }
        }

        serde_yaml::to_string(&Value::Mapping(agent_data)).unwrap_or_default()
    }

    /// List all `ConfigMaps` in the cluster labelled as agent configuration.
    async fn fetch_config_maps(&self) -> Vec<ConfigMap> {
        let selector = format!("{AGENT_CONFIG_LABEL}=true");
        info!(selector = %selector, "Fetching agent configmaps");

        let api: Api<ConfigMap> = Api::all(self.client.clone());
        match api.list(&ListParams::default().labels(&selector)).await {
            Ok(list) => {
                info!(count = list.items.len(), "Found agent configmaps");
                list.items
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch agent configmaps");
                Vec::new()
            }
        }
    }
}

/// Parse a YAML document into a mapping. Empty documents parse to the empty
/// mapping; scalar or sequence top-level documents are rejected.
fn parse_document(document: &str) -> Option<Mapping> {
    if document.trim().is_empty() {
        return Some(Mapping::new());
    }

    match serde_yaml::from_str::<Value>(document) {
        Ok(Value::Mapping(mapping)) => Some(mapping),
        Ok(Value::Null) => Some(Mapping::new()),
        _ => None,
    }
}

/// Deep-merge `overlay` into `agent_data`.
///
/// Sequences append, mappings recurse, missing keys insert. On scalar or
/// mismatched kinds the existing (CR) value is kept.
pub fn merge_config(agent_data: &mut Mapping, overlay: &Mapping) {
    for (key, overlay_value) in overlay {
        match agent_data.get_mut(key) {
            None => {
                agent_data.insert(key.clone(), overlay_value.clone());
            }
            Some(Value::Sequence(existing)) => {
                if let Value::Sequence(extra) = overlay_value {
                    existing.extend(extra.iter().cloned());
                }
            }
            Some(Value::Mapping(existing)) => {
                if let Value::Mapping(extra) = overlay_value {
                    merge_config(existing, extra);
                }
            }
            Some(_) => {
                // CR value wins over supplemental scalars
            }
        }
    }
}

#[cfg(test)]
#[path = "config_merger_tests.rs"]
mod config_merger_tests;
