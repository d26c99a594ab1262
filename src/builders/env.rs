// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Enum-keyed environment variable registry for agent containers.
//!
//! Workload builders pick the variables they need from [`AgentEnvVar`]; each
//! key resolves to zero or one `EnvVar` depending on the CR spec — an unset
//! CR field simply produces nothing. The registry serves both the host agent
//! (DaemonSet, sensor Deployment) and the remote agent Deployment through an
//! [`EnvBuilder`] constructed from the respective CR.

use k8s_openapi::api::core::v1::{
    ConfigMapKeySelector, EnvVar, EnvVarSource, ObjectFieldSelector, SecretKeySelector,
};
use kube::ResourceExt;
use std::collections::BTreeMap;

use crate::constants::{AGENT_KEY, DOWNLOAD_KEY, INSTANA_CONFIG_DIRECTORY};
use crate::crd::{AgentMode, BaseAgentSpec, InstanaAgent, RemoteAgent, Zone};

/// Every environment variable a workload builder can request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentEnvVar {
    // Directly from CR fields
    AgentMode,
    ZoneName,
    ClusterName,
    AgentEndpoint,
    AgentEndpointPort,
    MavenRepoUrl,
    MavenRepoFeaturesPath,
    MavenRepoSharedPath,
    MirrorReleaseRepoUrl,
    MirrorReleaseRepoUsername,
    MirrorReleaseRepoPassword,
    MirrorSharedRepoUrl,
    MirrorSharedRepoUsername,
    MirrorSharedRepoPassword,
    ProxyHost,
    ProxyPort,
    ProxyProtocol,
    ProxyUser,
    ProxyPassword,
    ProxyUseDns,
    ListenAddress,
    RedactK8sSecrets,
    EnableAgentSocket,
    // Static
    ConfigPath,
    EntrypointSkipBackendTemplateGeneration,
    BackendUrl,
    NoProxy,
    // From the keys secret
    AgentKey,
    DownloadKey,
    // From pod field references
    PodName,
    PodIp,
    PodUid,
    PodNamespace,
    // Derived from other generated objects
    K8sServiceDomain,
    AgentZone,
    HttpsProxy,
}

/// Resolved inputs the registry needs, independent of which CR type they
/// come from.
struct EnvView<'a> {
    base: &'a BaseAgentSpec,
    cluster_name: Option<&'a str>,
    zone_name: Option<String>,
    mode: Option<AgentMode>,
    keys_secret_name: String,
    headless_service_name: String,
    namespace: String,
}

/// Builds environment variable lists for one CR.
pub struct EnvBuilder<'a> {
    view: EnvView<'a>,
}

impl<'a> EnvBuilder<'a> {
    /// Registry for a host agent workload; a zone overrides the zone name
    /// and mode for its DaemonSet.
    #[must_use]
    pub fn new(agent: &'a InstanaAgent, zone: Option<&'a Zone>) -> Self {
        let zone_name = zone
            .and_then(|z| z.name.name.clone())
            .or_else(|| agent.spec.zone.name.clone());

        Self {
            view: EnvView {
                base: &agent.spec.agent,
                cluster_name: agent.spec.cluster.name.as_deref(),
                zone_name,
                mode: zone.and_then(|z| z.mode).or(agent.spec.agent.mode),
                keys_secret_name: agent.keys_secret_name(),
                headless_service_name: agent.headless_service_name(),
                namespace: agent.namespace().unwrap_or_default(),
            },
        }
    }

    /// Registry for a remote agent workload.
    #[must_use]
    pub fn new_remote(agent: &'a RemoteAgent) -> Self {
        Self {
            view: EnvView {
                base: &agent.spec.agent,
                cluster_name: agent.spec.cluster.name.as_deref(),
                zone_name: agent.spec.zone.name.clone(),
                mode: agent.spec.agent.mode,
                keys_secret_name: agent.keys_secret_name(),
                headless_service_name: agent.headless_service_name(),
                namespace: agent.namespace().unwrap_or_default(),
            },
        }
    }

    /// Resolve the requested variables in order, dropping the ones the spec
    /// leaves unset, then append the user-provided `env` map entries.
    #[must_use]
    pub fn build(&self, vars: &[AgentEnvVar]) -> Vec<EnvVar> {
        let mut result: Vec<EnvVar> = vars.iter().filter_map(|var| self.build_var(*var)).collect();
        result.extend(self.user_provided());
        result
    }

    fn build_var(&self, var: AgentEnvVar) -> Option<EnvVar> {
        let base = self.view.base;
        match var {
            AgentEnvVar::AgentMode => {
                self.view.mode.map(|mode| literal("INSTANA_AGENT_MODE", mode.as_str()))
            }
            AgentEnvVar::ZoneName => from_cr_field("INSTANA_ZONE", self.view.zone_name.as_deref()),
            AgentEnvVar::ClusterName => {
                from_cr_field("INSTANA_KUBERNETES_CLUSTER_NAME", self.view.cluster_name)
            }
            AgentEnvVar::AgentEndpoint => {
                from_cr_field("INSTANA_AGENT_ENDPOINT", base.endpoint_host.as_deref())
            }
            AgentEnvVar::AgentEndpointPort => {
                from_cr_field("INSTANA_AGENT_ENDPOINT_PORT", base.endpoint_port.as_deref())
            }
            AgentEnvVar::MavenRepoUrl => {
                from_cr_field("INSTANA_MVN_REPOSITORY_URL", base.mvn_repo_url.as_deref())
            }
            AgentEnvVar::MavenRepoFeaturesPath => from_cr_field(
                "INSTANA_MVN_REPOSITORY_FEATURES_PATH",
                base.mvn_repo_features_path.as_deref(),
            ),
            AgentEnvVar::MavenRepoSharedPath => from_cr_field(
                "INSTANA_MVN_REPOSITORY_SHARED_PATH",
                base.mvn_repo_shared_path.as_deref(),
            ),
            AgentEnvVar::MirrorReleaseRepoUrl => from_cr_field(
                "AGENT_RELEASE_REPOSITORY_MIRROR_URL",
                base.mirror_release_repo_url.as_deref(),
            ),
            AgentEnvVar::MirrorReleaseRepoUsername => from_cr_field(
                "AGENT_RELEASE_REPOSITORY_MIRROR_USERNAME",
                base.mirror_release_repo_username.as_deref(),
            ),
            AgentEnvVar::MirrorReleaseRepoPassword => from_cr_field(
                "AGENT_RELEASE_REPOSITORY_MIRROR_PASSWORD",
                base.mirror_release_repo_password.as_deref(),
            ),
            AgentEnvVar::MirrorSharedRepoUrl => from_cr_field(
                "INSTANA_SHARED_REPOSITORY_MIRROR_URL",
                base.mirror_shared_repo_url.as_deref(),
            ),
            AgentEnvVar::MirrorSharedRepoUsername => from_cr_field(
                "INSTANA_SHARED_REPOSITORY_MIRROR_USERNAME",
                base.mirror_shared_repo_username.as_deref(),
            ),
            AgentEnvVar::MirrorSharedRepoPassword => from_cr_field(
                "INSTANA_SHARED_REPOSITORY_MIRROR_PASSWORD",
                base.mirror_shared_repo_password.as_deref(),
            ),
            AgentEnvVar::ProxyHost => {
                from_cr_field("INSTANA_AGENT_PROXY_HOST", base.proxy_host.as_deref())
            }
            AgentEnvVar::ProxyPort => {
                from_cr_field("INSTANA_AGENT_PROXY_PORT", base.proxy_port.as_deref())
            }
            AgentEnvVar::ProxyProtocol => {
                from_cr_field("INSTANA_AGENT_PROXY_PROTOCOL", base.proxy_protocol.as_deref())
            }
            AgentEnvVar::ProxyUser => {
                from_cr_field("INSTANA_AGENT_PROXY_USER", base.proxy_user.as_deref())
            }
            AgentEnvVar::ProxyPassword => {
                from_cr_field("INSTANA_AGENT_PROXY_PASSWORD", base.proxy_password.as_deref())
            }
            AgentEnvVar::ProxyUseDns => base
                .proxy_use_dns
                .then(|| literal("INSTANA_AGENT_PROXY_USE_DNS", "true")),
            AgentEnvVar::ListenAddress => {
                from_cr_field("INSTANA_AGENT_HTTP_LISTEN", base.listen_address.as_deref())
            }
            AgentEnvVar::RedactK8sSecrets => from_cr_field(
                "INSTANA_KUBERNETES_REDACT_SECRETS",
                base.redact_kubernetes_secrets.as_deref(),
            ),
            AgentEnvVar::EnableAgentSocket => base
                .service_mesh
                .as_ref()
                .map(|mesh| literal("ENABLE_AGENT_SOCKET", &mesh.enabled.to_string())),
            AgentEnvVar::ConfigPath => Some(literal("CONFIG_PATH", INSTANA_CONFIG_DIRECTORY)),
            AgentEnvVar::EntrypointSkipBackendTemplateGeneration => Some(literal(
                "ENTRYPOINT_SKIP_BACKEND_TEMPLATE_GENERATION",
                "true",
            )),
            AgentEnvVar::BackendUrl => Some(literal("BACKEND_URL", "https://$(BACKEND)")),
            AgentEnvVar::NoProxy => Some(literal("NO_PROXY", "kubernetes.default.svc")),
            AgentEnvVar::AgentKey => Some(from_secret_key(
                "INSTANA_AGENT_KEY",
                &self.view.keys_secret_name,
                AGENT_KEY,
                None,
            )),
            AgentEnvVar::DownloadKey => Some(from_secret_key(
                "INSTANA_DOWNLOAD_KEY",
                &self.view.keys_secret_name,
                DOWNLOAD_KEY,
                Some(true),
            )),
            AgentEnvVar::PodName => Some(from_field_ref("INSTANA_AGENT_POD_NAME", "metadata.name")),
            AgentEnvVar::PodIp => Some(from_field_ref("POD_IP", "status.podIP")),
            AgentEnvVar::PodUid => Some(from_field_ref("POD_UID", "metadata.uid")),
            AgentEnvVar::PodNamespace => {
                Some(from_field_ref("POD_NAMESPACE", "metadata.namespace"))
            }
            AgentEnvVar::K8sServiceDomain => Some(literal(
                "K8S_SERVICE_DOMAIN",
                &format!(
                    "{}.{}.svc",
                    self.view.headless_service_name, self.view.namespace
                ),
            )),
            AgentEnvVar::AgentZone => {
                let zone = self
                    .view
                    .cluster_name
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .or_else(|| self.view.zone_name.clone())
                    .unwrap_or_default();
                Some(literal("AGENT_ZONE", &zone))
            }
            AgentEnvVar::HttpsProxy => self.https_proxy(),
        }
    }

    /// `HTTPS_PROXY` from the proxy settings, `user:password@` included only
    /// when both are set and the port defaulting to 80.
    fn https_proxy(&self) -> Option<EnvVar> {
        let base = self.view.base;
        let host = base.proxy_host.as_deref().filter(|h| !h.is_empty())?;

        let user_pass = match (base.proxy_user.as_deref(), base.proxy_password.as_deref()) {
            (Some(user), Some(password)) if !user.is_empty() && !password.is_empty() => {
                format!("{user}:{password}@")
            }
            _ => String::new(),
        };
        let port = base.proxy_port.as_deref().filter(|p| !p.is_empty()).unwrap_or("80");

        Some(literal(
            "HTTPS_PROXY",
            &format!("http://{user_pass}{host}:{port}"),
        ))
    }

    /// User-provided `env` map entries, in map (name) order.
    fn user_provided(&self) -> Vec<EnvVar> {
        self.view
            .base
            .env
            .as_ref()
            .map(|env| {
                env.iter()
                    .map(|(name, value)| literal(name, value))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Overlay pod-level env overrides onto a base list and sort by name for
/// deterministic pod templates. Later same-named entries win.
#[must_use]
pub fn merge_env_vars(base: Vec<EnvVar>, overrides: &[EnvVar]) -> Vec<EnvVar> {
    let mut by_name: BTreeMap<String, EnvVar> = base
        .into_iter()
        .map(|var| (var.name.clone(), var))
        .collect();

    for var in overrides {
        by_name.insert(var.name.clone(), var.clone());
    }

    by_name.into_values().collect()
}

fn literal(name: &str, value: &str) -> EnvVar {
    EnvVar {
        name: name.into(),
        value: Some(value.into()),
        ..Default::default()
    }
}

fn from_cr_field(name: &str, value: Option<&str>) -> Option<EnvVar> {
    value.filter(|v| !v.is_empty()).map(|v| literal(name, v))
}

fn from_secret_key(name: &str, secret_name: &str, key: &str, optional: Option<bool>) -> EnvVar {
    EnvVar {
        name: name.into(),
        value_from: Some(EnvVarSource {
            secret_key_ref: Some(SecretKeySelector {
                name: secret_name.into(),
                key: key.into(),
                optional,
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// `BACKEND` for a sensor Deployment, resolved from the backend `ConfigMap`
/// entry with the given suffix.
#[must_use]
pub fn backend_from_config_map(config_map_name: &str, key: &str) -> EnvVar {
    EnvVar {
        name: "BACKEND".into(),
        value_from: Some(EnvVarSource {
            config_map_key_ref: Some(ConfigMapKeySelector {
                name: config_map_name.into(),
                key: key.into(),
                optional: None,
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn from_field_ref(name: &str, field_path: &str) -> EnvVar {
    EnvVar {
        name: name.into(),
        value_from: Some(EnvVarSource {
            field_ref: Some(ObjectFieldSelector {
                field_path: field_path.into(),
                api_version: None,
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod env_tests;
