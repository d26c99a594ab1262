// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Derived resource names and toggles for the agent CRs.
//!
//! All generated objects derive their names from the CR name through the
//! helpers in this module so that every builder and reconciler agrees on
//! them.

use k8s_openapi::api::core::v1::LocalObjectReference;
use kube::ResourceExt;

use crate::constants::CONTAINERS_INSTANA_IO_REGISTRY;
use crate::crd::{InstanaAgent, RemoteAgent};

impl InstanaAgent {
    /// Name of the ServiceAccount agent pods run under: the spec override,
    /// else the CR name when creation is enabled, else `default`.
    #[must_use]
    pub fn service_account_name(&self) -> String {
        match &self.spec.service_account.name.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => {
                if self.spec.service_account.create.create.unwrap_or(true) {
                    self.name_any()
                } else {
                    "default".to_string()
                }
            }
        }
    }

    /// Name of the secret holding the agent and download keys: the
    /// user-provided `keysSecret` if set, the CR name otherwise.
    #[must_use]
    pub fn keys_secret_name(&self) -> String {
        match self.spec.agent.keys_secret.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.name_any(),
        }
    }

    /// Whether TLS is configured, either via an existing secret or via
    /// inline certificate material.
    #[must_use]
    pub fn tls_is_enabled(&self) -> bool {
        match &self.spec.agent.tls {
            Some(tls) => {
                tls.secret_name.as_deref().is_some_and(|name| !name.is_empty())
                    || (tls.certificate.as_ref().is_some_and(|c| !c.0.is_empty())
                        && tls.key.as_ref().is_some_and(|k| !k.0.is_empty()))
            }
            None => false,
        }
    }

    /// Name of the TLS secret: the referenced secret if set, `{name}-tls`
    /// for generated material.
    #[must_use]
    pub fn tls_secret_name(&self) -> String {
        self.spec
            .agent
            .tls
            .as_ref()
            .and_then(|tls| tls.secret_name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("{}-tls", self.name_any()))
    }

    /// Name of the generated agent config secret.
    #[must_use]
    pub fn config_secret_name(&self) -> String {
        format!("{}-config", self.name_any())
    }

    /// Name of the headless service fronting the agent pods.
    #[must_use]
    pub fn headless_service_name(&self) -> String {
        format!("{}-headless", self.name_any())
    }

    /// Base name shared by all Kubernetes sensor resources.
    #[must_use]
    pub fn k8s_sensor_resources_name(&self) -> String {
        format!("{}-k8sensor", self.name_any())
    }

    /// Name of the auto-generated image pull secret.
    #[must_use]
    pub fn containers_secret_name(&self) -> String {
        format!("{}-containers-instana-io", self.name_any())
    }

    /// Whether the auto-generated pull secret should be used. Only when the
    /// image is hosted on `containers.instana.io` AND the user did not set
    /// `pullSecrets` (an explicitly empty list also opts out).
    #[must_use]
    pub fn use_containers_secret(&self) -> bool {
        let image = self.spec.agent.image.as_ref();
        image.is_some_and(|img| {
            img.pull_secrets.is_none()
                && img
                    .image
                    .name
                    .as_deref()
                    .is_some_and(|name| name.starts_with(CONTAINERS_INSTANA_IO_REGISTRY))
        })
    }

    /// Pull secrets for agent pods: the generated one when applicable, the
    /// user-provided list otherwise.
    #[must_use]
    pub fn image_pull_secrets(&self) -> Option<Vec<LocalObjectReference>> {
        if self.use_containers_secret() {
            Some(vec![LocalObjectReference {
                name: self.containers_secret_name(),
            }])
        } else {
            self.spec
                .agent
                .image
                .as_ref()
                .and_then(|img| img.pull_secrets.clone())
        }
    }

    /// Whether the agent DaemonSet and sensor Deployment can be emitted at
    /// all: an agent key (or keys secret) plus a cluster or zone name.
    #[must_use]
    pub fn has_required_settings(&self) -> bool {
        let has_key = self.spec.agent.key.as_deref().is_some_and(|k| !k.is_empty())
            || self.spec.agent.keys_secret.as_deref().is_some_and(|k| !k.is_empty());
        let has_placement = self.cluster_name().is_some() || self.zone_name().is_some();
        has_key && has_placement
    }

    /// The non-empty cluster name, if any.
    #[must_use]
    pub fn cluster_name(&self) -> Option<&str> {
        self.spec.cluster.name.as_deref().filter(|name| !name.is_empty())
    }

    /// The non-empty zone name, if any.
    #[must_use]
    pub fn zone_name(&self) -> Option<&str> {
        self.spec.zone.name.as_deref().filter(|name| !name.is_empty())
    }
}

impl RemoteAgent {
    /// Name of the ServiceAccount remote agent pods run under.
    #[must_use]
    pub fn service_account_name(&self) -> String {
        match &self.spec.service_account.name.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => {
                if self.spec.service_account.create.create.unwrap_or(true) {
                    self.remote_resources_name()
                } else {
                    "default".to_string()
                }
            }
        }
    }

    /// Base name for all objects generated from this remote agent. The CR
    /// name is prefixed so that a remote agent can coexist with a host agent
    /// of the same name in one namespace.
    #[must_use]
    pub fn remote_resources_name(&self) -> String {
        format!("instana-agent-r-{}", self.name_any())
    }

    /// Name of the secret holding the agent and download keys.
    #[must_use]
    pub fn keys_secret_name(&self) -> String {
        match self.spec.agent.keys_secret.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.remote_resources_name(),
        }
    }

    /// Name of the generated remote agent config secret.
    #[must_use]
    pub fn config_secret_name(&self) -> String {
        format!("{}-config", self.remote_resources_name())
    }

    /// Name of the headless service fronting the remote agent pods.
    #[must_use]
    pub fn headless_service_name(&self) -> String {
        format!("{}-headless", self.remote_resources_name())
    }

    /// Whether TLS is configured for the remote agent.
    #[must_use]
    pub fn tls_is_enabled(&self) -> bool {
        match &self.spec.agent.tls {
            Some(tls) => {
                tls.secret_name.as_deref().is_some_and(|name| !name.is_empty())
                    || (tls.certificate.as_ref().is_some_and(|c| !c.0.is_empty())
                        && tls.key.as_ref().is_some_and(|k| !k.0.is_empty()))
            }
            None => false,
        }
    }

    /// Name of the TLS secret for the remote agent.
    #[must_use]
    pub fn tls_secret_name(&self) -> String {
        self.spec
            .agent
            .tls
            .as_ref()
            .and_then(|tls| tls.secret_name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("{}-tls", self.remote_resources_name()))
    }

    /// Whether the remote agent Deployment can be emitted: an agent key (or
    /// keys secret) plus a backend endpoint.
    #[must_use]
    pub fn has_required_settings(&self) -> bool {
        let has_key = self.spec.agent.key.as_deref().is_some_and(|k| !k.is_empty())
            || self.spec.agent.keys_secret.as_deref().is_some_and(|k| !k.is_empty());
        let has_endpoint = self
            .spec
            .agent
            .endpoint_host
            .as_deref()
            .is_some_and(|h| !h.is_empty());
        has_key && has_endpoint
    }
}

#[cfg(test)]
#[path = "helpers_tests.rs"]
mod helpers_tests;
