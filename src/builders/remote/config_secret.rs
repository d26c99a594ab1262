// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Remote agent config secret builder.
//!
//! Like the host agent's config secret, minus the in-cluster concerns:
//! no cluster name, no sensor toggles, no supplemental `ConfigMap` merging.

use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use kube::ResourceExt;
use std::collections::BTreeMap;
use tracing::warn;

use crate::builders::agent::config_secret::backend_lines;
use crate::builders::{erase, BuiltObject, ObjectBuilder};
use crate::constants::{AGENT_KEY, COMPONENT_INSTANA_AGENT_REMOTE};
use crate::crd::RemoteAgent;

pub struct ConfigSecretBuilder<'a> {
    agent: &'a RemoteAgent,
    keys_secret_data: Option<&'a BTreeMap<String, ByteString>>,
}

impl<'a> ConfigSecretBuilder<'a> {
    #[must_use]
    pub fn new(
        agent: &'a RemoteAgent,
        keys_secret_data: Option<&'a BTreeMap<String, ByteString>>,
    ) -> Self {
        Self {
            agent,
            keys_secret_data,
        }
    }

    fn data(&self) -> BTreeMap<String, ByteString> {
        let base = &self.agent.spec.agent;
        let mut data = BTreeMap::new();

        if let Some(configuration) = base.configuration_yaml.as_deref().filter(|c| !c.is_empty()) {
            data.insert(
                "configuration.yaml".to_string(),
                ByteString(configuration.as_bytes().to_vec()),
            );
        }

        for (index, backend) in base.additional_backends.iter().flatten().enumerate() {
            if backend.key.is_empty() || backend.endpoint_host.is_empty() {
                warn!(
                    backend = index + 2,
                    "Skipping additional backend with missing key or endpointHost"
                );
                continue;
            }
            let lines = backend_lines(
                base,
                &backend.endpoint_host,
                &backend.endpoint_port,
                &backend.key,
            );
            data.insert(
                format!("com.instana.agent.main.sender.Backend-{}.cfg", index + 2),
                ByteString(lines.into_bytes()),
            );
        }

        let endpoint_host = base.endpoint_host.as_deref().filter(|h| !h.is_empty());
        let agent_key = self
            .keys_secret_data
            .and_then(|keys| keys.get(AGENT_KEY))
            .map(|key| String::from_utf8_lossy(&key.0).to_string())
            .or_else(|| base.key.clone().filter(|key| !key.is_empty()));

        match (endpoint_host, agent_key) {
            (Some(host), Some(key)) => {
                let lines = backend_lines(
                    base,
                    host,
                    base.endpoint_port.as_deref().unwrap_or_default(),
                    &key,
                );
                data.insert(
                    "com.instana.agent.main.sender.Backend-1.cfg".to_string(),
                    ByteString(lines.into_bytes()),
                );
            }
            _ => warn!("Remote agent endpoint or key missing, skipping primary backend config"),
        }

        data
    }
}

impl ObjectBuilder for ConfigSecretBuilder<'_> {
    fn build(&self) -> Option<BuiltObject> {
        erase(&Secret {
            metadata: ObjectMeta {
                name: Some(self.agent.config_secret_name()),
                namespace: self.agent.namespace(),
                ..Default::default()
            },
            data: Some(self.data()),
            type_: Some("Opaque".into()),
            ..Default::default()
        })
    }

    fn component_name(&self) -> &'static str {
        COMPONENT_INSTANA_AGENT_REMOTE
    }

    fn is_namespaced(&self) -> bool {
        true
    }
}
