// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Backend fan-out for the Kubernetes sensor.
//!
//! The primary backend comes from the CR's endpoint settings; additional
//! backends append with resource-name suffixes `-2`, `-3`, … Each backend
//! gets its own sensor Deployment, keys secret and `ConfigMap` entry.

use crate::crd::InstanaAgent;

/// One Instana backend the sensor reports to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct K8SensorBackend {
    /// Suffix appended to the names of the per-backend resources; empty for
    /// the primary backend.
    pub resource_suffix: String,
    pub endpoint_host: String,
    pub endpoint_port: String,
    /// Agent key for this backend; the primary backend may instead rely on
    /// a user-provided keys secret.
    pub endpoint_key: Option<String>,
    /// Download key, only meaningful for the primary backend.
    pub download_key: Option<String>,
}

impl K8SensorBackend {
    /// All backends for an agent CR: the primary endpoint first, then every
    /// additional backend in spec order.
    #[must_use]
    pub fn from_agent(agent: &InstanaAgent) -> Vec<K8SensorBackend> {
        let base = &agent.spec.agent;

        let mut backends = vec![K8SensorBackend {
            resource_suffix: String::new(),
            endpoint_host: base.endpoint_host.clone().unwrap_or_default(),
            endpoint_port: base.endpoint_port.clone().unwrap_or_default(),
            endpoint_key: base.key.clone().filter(|key| !key.is_empty()),
            download_key: base.download_key.clone().filter(|key| !key.is_empty()),
        }];

        for (index, backend) in base.additional_backends.iter().flatten().enumerate() {
            backends.push(K8SensorBackend {
                resource_suffix: format!("-{}", index + 2),
                endpoint_host: backend.endpoint_host.clone(),
                endpoint_port: backend.endpoint_port.clone(),
                endpoint_key: Some(backend.key.clone()).filter(|key| !key.is_empty()),
                download_key: None,
            });
        }

        backends
    }
}

#[cfg(test)]
#[path = "backends_tests.rs"]
mod backends_tests;
