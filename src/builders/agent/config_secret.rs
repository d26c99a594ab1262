// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Agent config secret builder.
//!
//! The `{name}-config` secret carries everything the agent reads at startup:
//! the cluster name, the merged `configuration.yaml`, feature toggles
//! rendered as sensor plugin documents, and one
//! `com.instana.agent.main.sender.Backend-N.cfg` properties file per
//! backend. The agent entrypoint skips its own backend templating because
//! the operator renders these files (see the
//! `ENTRYPOINT_SKIP_BACKEND_TEMPLATE_GENERATION` env var).

use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use kube::ResourceExt;
use std::collections::BTreeMap;
use tracing::warn;

use crate::builders::{erase, BuiltObject, ObjectBuilder};
use crate::constants::{AGENT_KEY, COMPONENT_INSTANA_AGENT};
use crate::crd::{BaseAgentSpec, InstanaAgent};

/// Builds the agent config secret from the CR plus reconcile-time inputs:
/// the merged configuration YAML and the content of a user-provided keys
/// secret (when one is referenced).
pub struct ConfigSecretBuilder<'a> {
    agent: &'a InstanaAgent,
    merged_configuration_yaml: &'a str,
    keys_secret_data: Option<&'a BTreeMap<String, ByteString>>,
}

impl<'a> ConfigSecretBuilder<'a> {
    #[must_use]
    pub fn new(
        agent: &'a InstanaAgent,
        merged_configuration_yaml: &'a str,
        keys_secret_data: Option<&'a BTreeMap<String, ByteString>>,
    ) -> Self {
        Self {
            agent,
            merged_configuration_yaml,
            keys_secret_data,
        }
    }

    fn data(&self) -> BTreeMap<String, ByteString> {
        let agent = self.agent;
        let mut data = BTreeMap::new();

        if let Some(cluster_name) = agent.cluster_name() {
            data.insert(
                "cluster_name".to_string(),
                ByteString(cluster_name.as_bytes().to_vec()),
            );
        }

        if !self.merged_configuration_yaml.is_empty() {
            data.insert(
                "configuration.yaml".to_string(),
                ByteString(self.merged_configuration_yaml.as_bytes().to_vec()),
            );
        }

        if agent.spec.opentelemetry.is_enabled() {
            let mut document = BTreeMap::new();
            document.insert("com.instana.plugin.opentelemetry", &agent.spec.opentelemetry);
            if let Ok(yaml) = serde_yaml::to_string(&document) {
                data.insert(
                    "configuration-opentelemetry.yaml".to_string(),
                    ByteString(yaml.into_bytes()),
                );
            }
        }

        if agent.spec.prometheus.remote_write_enabled() {
            let yaml = "com.instana.plugin.prometheus:\n  remote_write:\n    enabled: true\n";
            data.insert(
                "configuration-prometheus-remote-write.yaml".to_string(),
                ByteString(yaml.as_bytes().to_vec()),
            );
        }

        // The in-agent Kubernetes sensor is superseded by the sensor
        // Deployment and stays off unconditionally.
        let yaml = "com.instana.plugin.kubernetes:\n  enabled: false\n";
        data.insert(
            "configuration-disable-kubernetes-sensor.yaml".to_string(),
            ByteString(yaml.as_bytes().to_vec()),
        );

        self.render_backends(&mut data);

        data
    }

    /// Render one `Backend-N.cfg` per backend: the primary endpoint as
    /// `Backend-1`, additional backends from `Backend-2` on.
    fn render_backends(&self, data: &mut BTreeMap<String, ByteString>) {
        let base = &self.agent.spec.agent;

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

        let Some(endpoint_host) = base.endpoint_host.as_deref().filter(|h| !h.is_empty()) else {
            warn!("Agent endpoint host has not been set, skipping primary backend config");
            return;
        };

        let agent_key = self
            .keys_secret_data
            .and_then(|keys| keys.get(AGENT_KEY))
            .map(|key| String::from_utf8_lossy(&key.0).to_string())
            .or_else(|| base.key.clone().filter(|key| !key.is_empty()));

        let Some(agent_key) = agent_key else {
            warn!("Agent key has not been set, skipping primary backend config");
            return;
        };

        let lines = backend_lines(
            base,
            endpoint_host,
            base.endpoint_port.as_deref().unwrap_or_default(),
            &agent_key,
        );
        data.insert(
            "com.instana.agent.main.sender.Backend-1.cfg".to_string(),
            ByteString(lines.into_bytes()),
        );
    }
}

/// Render the properties lines of a backend config, proxy settings included
/// when configured.
pub(crate) fn backend_lines(base: &BaseAgentSpec, host: &str, port: &str, key: &str) -> String {
    let mut lines = vec![
        to_inline_variable("host", host, None),
        to_inline_variable("port", port, Some("443")),
        to_inline_variable("protocol", "HTTP/2", None),
        to_inline_variable("key", key, None),
    ];

    if base.proxy_host.as_deref().is_some_and(|h| !h.is_empty()) {
        lines.push(to_inline_variable(
            "proxy.type",
            base.proxy_protocol.as_deref().unwrap_or_default(),
            Some("HTTP"),
        ));
        lines.push(to_inline_variable(
            "proxy.host",
            base.proxy_host.as_deref().unwrap_or_default(),
            None,
        ));
        lines.push(to_inline_variable(
            "proxy.port",
            base.proxy_port.as_deref().unwrap_or_default(),
            Some("80"),
        ));
    }
    if base.proxy_use_dns {
        lines.push(to_inline_variable("proxy.dns", "true", None));
    }
    if let Some(user) = base.proxy_user.as_deref().filter(|u| !u.is_empty()) {
        lines.push(to_inline_variable("proxy.user", user, None));
    }
    if let Some(password) = base.proxy_password.as_deref().filter(|p| !p.is_empty()) {
        lines.push(to_inline_variable("proxy.password", password, None));
    }

    lines.join("\n") + "\n"
}

/// Stringify as `key=value`, substituting the fallback when the value is
/// empty.
fn to_inline_variable(key: &str, value: &str, fallback: Option<&str>) -> String {
    match fallback {
        Some(fallback) if value.is_empty() => format!("{key}={fallback}"),
        _ => format!("{key}={value}"),
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
        COMPONENT_INSTANA_AGENT
    }

    fn is_namespaced(&self) -> bool {
        true
    }
}
