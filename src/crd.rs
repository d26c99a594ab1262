// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Custom Resource Definitions (CRDs) for Instana agent deployments.
//!
//! This module defines the Kubernetes Custom Resource Definitions used by the
//! operator to manage Instana agents declaratively.
//!
//! # Resource Types
//!
//! - [`InstanaAgent`] - Deploys the host agent as a DaemonSet (plus the
//!   Kubernetes sensor Deployment and its supporting objects)
//! - [`RemoteAgent`] - Deploys an agent as a Deployment for monitoring hosts
//!   outside the cluster
//!
//! # Example: Minimal agent
//!
//! ```rust
//! use instana_agent_operator::crd::{BaseAgentSpec, InstanaAgentSpec, Name};
//!
//! let spec = InstanaAgentSpec {
//!     agent: BaseAgentSpec {
//!         key: Some("s3cr3t".into()),
//!         endpoint_host: Some("ingress-red-saas.instana.io".into()),
//!         endpoint_port: Some("443".into()),
//!         ..Default::default()
//!     },
//!     cluster: Name {
//!         name: Some("my-cluster".into()),
//!     },
//!     ..Default::default()
//! };
//! ```

use k8s_openapi::api::apps::v1::DaemonSetUpdateStrategy;
use k8s_openapi::api::core::v1::{
    Affinity, EnvVar, LocalObjectReference, Toleration, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{Condition, Time};
use k8s_openapi::ByteString;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Run mode of the agent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum AgentMode {
    /// Full application performance monitoring (the default)
    #[default]
    #[serde(rename = "APM")]
    Apm,
    /// Infrastructure monitoring only
    #[serde(rename = "INFRASTRUCTURE")]
    Infrastructure,
    /// AWS service monitoring
    #[serde(rename = "AWS")]
    Aws,
    /// Kubernetes sensor mode; set on sensor pods, not user-selectable
    #[serde(rename = "KUBERNETES")]
    Kubernetes,
}

impl AgentMode {
    /// The wire representation of this mode.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AgentMode::Apm => "APM",
            AgentMode::Infrastructure => "INFRASTRUCTURE",
            AgentMode::Aws => "AWS",
            AgentMode::Kubernetes => "KUBERNETES",
        }
    }
}

/// A named reference, e.g. `cluster.name` or `zone.name`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Name {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A `create` toggle, e.g. `rbac.create` or `service.create`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Create {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<bool>,
}

/// An `enabled` toggle.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Enabled {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// Resource requests and limits, inlined into pod override specs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResourceRequirementsSpec {
    /// Minimum resources required by the container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests: Option<BTreeMap<String, Quantity>>,

    /// Maximum resources the container may consume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<BTreeMap<String, Quantity>>,
}

impl ResourceRequirementsSpec {
    /// Project onto `ResourceRequirements`, filling in the defaults for
    /// requests and limits the user did not set.
    #[must_use]
    pub fn get_or_default(
        &self,
        default_requests: &[(&str, &str)],
        default_limits: &[(&str, &str)],
    ) -> k8s_openapi::api::core::v1::ResourceRequirements {
        let mut requests = self.requests.clone().unwrap_or_default();
        for (resource, quantity) in default_requests {
            requests
                .entry((*resource).to_string())
                .or_insert_with(|| Quantity((*quantity).to_string()));
        }

        let mut limits = self.limits.clone().unwrap_or_default();
        for (resource, quantity) in default_limits {
            limits
                .entry((*resource).to_string())
                .or_insert_with(|| Quantity((*quantity).to_string()));
        }

        k8s_openapi::api::core::v1::ResourceRequirements {
            requests: Some(requests),
            limits: Some(limits),
            claims: None,
        }
    }
}

/// Additional Instana backend the agent reports to besides the primary one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BackendSpec {
    pub endpoint_host: String,
    pub endpoint_port: String,
    /// Agent key for this backend.
    #[serde(default)]
    pub key: String,
}

/// TLS material for end-to-end encryption between the agent and its clients.
/// Either reference an existing secret or supply certificate and key inline
/// (base64 encoded); inline material causes a TLS secret to be generated.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TlsSpec {
    /// Name of an existing secret holding `tls.crt` and `tls.key`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_name: Option<String>,

    /// Certificate, base64 encoded. Alternative to `secretName`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub certificate: Option<ByteString>,

    /// Private key, base64 encoded. Alternative to `secretName`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub key: Option<ByteString>,
}

/// Container image coordinates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageSpec {
    /// Image name, e.g. `icr.io/instana/agent`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Image digest; takes priority over `tag` when both are set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,

    /// Image tag; ignored when `digest` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    /// Image pull policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_policy: Option<String>,
}

impl ImageSpec {
    /// Full image reference: `name@digest` when a digest is set, `name:tag`
    /// when a tag is set, the bare name otherwise.
    #[must_use]
    pub fn image(&self) -> String {
        let name = self.name.as_deref().unwrap_or_default();
        match (&self.digest, &self.tag) {
            (Some(digest), _) if !digest.is_empty() => format!("{name}@{digest}"),
            (_, Some(tag)) if !tag.is_empty() => format!("{name}:{tag}"),
            _ => name.to_string(),
        }
    }
}

/// Image coordinates plus pull secrets. Setting `pullSecrets` suppresses the
/// auto-generated `containers.instana.io` secret.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedImageSpec {
    #[serde(flatten)]
    pub image: ImageSpec,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_secrets: Option<Vec<LocalObjectReference>>,
}

/// Pod-level overrides for the agent DaemonSet.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentPodSpec {
    /// Additional annotations for agent pods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,

    /// Additional labels for agent pods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerations: Option<Vec<Toleration>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affinity: Option<Affinity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_class_name: Option<String>,

    #[serde(flatten)]
    pub resources: ResourceRequirementsSpec,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<BTreeMap<String, String>>,

    /// Additional volumes for the agent pod.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volumes: Option<Vec<Volume>>,

    /// Additional volume mounts for the agent container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_mounts: Option<Vec<VolumeMount>>,

    /// Additional environment variables for the agent container. Entries here
    /// override same-named variables derived from the rest of the spec.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<Vec<EnvVar>>,
}

/// Host-path Maven repository override (mainly for debugging or air-gapped
/// setups).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HostSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
}

/// Service mesh integration; enables the agent unix socket bridge.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ServiceMeshSpec {
    #[serde(default)]
    pub enabled: bool,
}

/// Desired state shared by the host agent DaemonSet and the remote agent
/// Deployment.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BaseAgentSpec {
    /// Agent mode; `KUBERNETES` is reserved for the sensor pods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<AgentMode>,

    /// Secret token the agent uses to authenticate to the Instana backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// The download key ("sales key") for fetching agent artifacts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_key: Option<String>,

    /// Bring-your-own secret holding `key` and optionally `downloadKey`;
    /// suppresses generation of the keys secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys_secret: Option<String>,

    /// IP addresses the agent HTTP server listens on (`*` for all).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listen_address: Option<String>,

    /// Hostname of the Instana backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_host: Option<String>,

    /// Port of the Instana backend, as a string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_port: Option<String>,

    /// Minimum seconds a new pod must be ready to be considered available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_ready_seconds: Option<i32>,

    /// Backends reported to in addition to the primary endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_backends: Option<Vec<BackendSpec>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<TlsSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ExtendedImageSpec>,

    /// Update strategy for the agent DaemonSet, passed through verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_strategy: Option<DaemonSetUpdateStrategy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod: Option<AgentPodSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_port: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_protocol: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_password: Option<String>,

    #[serde(default, rename = "proxyUseDNS")]
    pub proxy_use_dns: bool,

    /// Free-form environment variables, e.g. `INSTANA_AGENT_TAGS: dev`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<BTreeMap<String, String>>,

    /// Supplemental agent configuration YAML (sensor settings etc.). Merged
    /// with `instana.io/agent-config=true` ConfigMaps at reconcile time.
    #[serde(default, rename = "configuration_yaml", skip_serializing_if = "Option::is_none")]
    pub configuration_yaml: Option<String>,

    /// Sets the `INSTANA_KUBERNETES_REDACT_SECRETS` environment variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redact_kubernetes_secrets: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<HostSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_mesh: Option<ServiceMeshSpec>,

    /// Maven repository override for locally mirrored agent artifacts.
    #[serde(default, rename = "instanaMvnRepoUrl", skip_serializing_if = "Option::is_none")]
    pub mvn_repo_url: Option<String>,

    #[serde(default, rename = "instanaMvnRepoFeaturesPath", skip_serializing_if = "Option::is_none")]
    pub mvn_repo_features_path: Option<String>,

    #[serde(default, rename = "instanaMvnRepoSharedPath", skip_serializing_if = "Option::is_none")]
    pub mvn_repo_shared_path: Option<String>,

    #[serde(default, rename = "agentReleaseRepoMirrorUrl", skip_serializing_if = "Option::is_none")]
    pub mirror_release_repo_url: Option<String>,

    #[serde(default, rename = "agentReleaseRepoMirrorUsername", skip_serializing_if = "Option::is_none")]
    pub mirror_release_repo_username: Option<String>,

    #[serde(default, rename = "agentReleaseRepoMirrorPassword", skip_serializing_if = "Option::is_none")]
    pub mirror_release_repo_password: Option<String>,

    #[serde(default, rename = "instanaSharedRepoMirrorUrl", skip_serializing_if = "Option::is_none")]
    pub mirror_shared_repo_url: Option<String>,

    #[serde(default, rename = "instanaSharedRepoMirrorUsername", skip_serializing_if = "Option::is_none")]
    pub mirror_shared_repo_username: Option<String>,

    #[serde(default, rename = "instanaSharedRepoMirrorPassword", skip_serializing_if = "Option::is_none")]
    pub mirror_shared_repo_password: Option<String>,
}

/// ServiceAccount settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ServiceAccountSpec {
    #[serde(flatten)]
    pub create: Create,

    #[serde(flatten)]
    pub name: Name,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
}

/// OpenTelemetry ingestion settings; all toggles default to enabled.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OpenTelemetry {
    #[serde(flatten)]
    pub enabled: Enabled,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grpc: Option<OpenTelemetryPortConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<OpenTelemetryPortConfig>,
}

/// Per-protocol OpenTelemetry toggle and port override.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OpenTelemetryPortConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
}

impl OpenTelemetry {
    /// Whether OpenTelemetry ingestion is enabled at all (default true).
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.enabled.unwrap_or(true)
    }

    /// Whether the gRPC endpoint is enabled (default true when OTLP is on).
    #[must_use]
    pub fn grpc_is_enabled(&self) -> bool {
        self.is_enabled() && self.grpc.as_ref().and_then(|g| g.enabled).unwrap_or(true)
    }

    /// Whether the HTTP endpoint is enabled (default true when OTLP is on).
    #[must_use]
    pub fn http_is_enabled(&self) -> bool {
        self.is_enabled() && self.http.as_ref().and_then(|h| h.enabled).unwrap_or(true)
    }
}

/// Prometheus integration settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Prometheus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_write: Option<Enabled>,
}

impl Prometheus {
    /// Whether Prometheus remote write is enabled (default false).
    #[must_use]
    pub fn remote_write_enabled(&self) -> bool {
        self.remote_write
            .as_ref()
            .and_then(|rw| rw.enabled)
            .unwrap_or(false)
    }
}

/// Kubernetes sensor settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct K8sSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment: Option<KubernetesDeploymentSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageSpec>,

    /// Toggles the PodDisruptionBudget for the sensor Deployment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_disruption_budget: Option<Enabled>,
}

/// Kubernetes sensor Deployment settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesDeploymentSpec {
    #[serde(flatten)]
    pub enabled: Enabled,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_ready_seconds: Option<i32>,

    /// Number of sensor replicas (default 3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod: Option<KubernetesPodSpec>,
}

/// Pod-level overrides for the Kubernetes sensor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesPodSpec {
    #[serde(flatten)]
    pub resources: ResourceRequirementsSpec,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_class_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerations: Option<Vec<Toleration>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affinity: Option<Affinity>,
}

/// Availability zone the agent DaemonSet fans out into. Each zone gets its
/// own DaemonSet named `{agent}-{zone}` with zone-specific scheduling.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Zone {
    #[serde(flatten)]
    pub name: Name,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerations: Option<Vec<Toleration>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affinity: Option<Affinity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<AgentMode>,
}

/// Desired state of the Instana host agent.
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "instana.io",
    version = "v1",
    kind = "InstanaAgent",
    plural = "agents",
    singular = "agent",
    shortname = "ia",
    namespaced,
    status = "InstanaAgentStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct InstanaAgentSpec {
    /// Agent deployment specific fields.
    pub agent: BaseAgentSpec,

    /// Name assigned to this cluster in Instana. Either `cluster.name` or
    /// `zone.name` must be set.
    #[serde(default)]
    pub cluster: Name,

    /// Name of the zone the host(s) are displayed under on the map.
    #[serde(default)]
    pub zone: Name,

    /// Per-zone DaemonSet fan-out; requires `cluster.name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zones: Option<Vec<Zone>>,

    /// Hint that the operator runs on OpenShift. When unset the operator
    /// probes the cluster for OpenShift-specific CRDs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openshift: Option<bool>,

    /// Whether RBAC resources should be created (default true).
    #[serde(default)]
    pub rbac: Create,

    /// Whether to expose the agent through a `Service` (default false; forced
    /// on by Prometheus remote write or OpenTelemetry).
    #[serde(default)]
    pub service: Create,

    #[serde(default)]
    pub opentelemetry: OpenTelemetry,

    #[serde(default)]
    pub prometheus: Prometheus,

    #[serde(default)]
    pub service_account: ServiceAccountSpec,

    #[serde(default, rename = "k8s_sensor")]
    pub k8s_sensor: K8sSpec,
}

/// Running state of the operator as reflected in the CR status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum AgentOperatorState {
    /// All changes applied successfully.
    #[default]
    Running,
    /// Currently applying CR changes.
    Updating,
    /// Applying the CR failed.
    Failed,
}

/// Name and UID of a generated object, recorded in the status.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ResourceInfo {
    pub name: String,
    pub uid: String,
}

/// Observed state of an `InstanaAgent`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InstanaAgentStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AgentOperatorState>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<Time>,

    /// Reference to the generated agent config secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_secret: Option<ResourceInfo>,

    /// Reference to the agent DaemonSet (unzoned deployments only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daemonset: Option<ResourceInfo>,

    /// Reference to the Kubernetes sensor Deployment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k8s_sensor_deployment: Option<ResourceInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

/// Desired state of a remote (out-of-cluster host) agent.
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "instana.io",
    version = "v1",
    kind = "RemoteAgent",
    plural = "remoteagents",
    singular = "remoteagent",
    shortname = "ra",
    namespaced,
    status = "RemoteAgentStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAgentSpec {
    /// Agent deployment specific fields.
    pub agent: BaseAgentSpec,

    /// Hostname the remote agent reports as.
    #[serde(default)]
    pub hostname: Name,

    #[serde(default)]
    pub cluster: Name,

    #[serde(default)]
    pub zone: Name,

    #[serde(default)]
    pub service_account: ServiceAccountSpec,

    /// Whether to expose the remote agent through a `Service`.
    #[serde(default)]
    pub service: Create,
}

/// Observed state of a `RemoteAgent`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAgentStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AgentOperatorState>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<Time>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_secret: Option<ResourceInfo>,

    /// Reference to the remote agent Deployment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment: Option<ResourceInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;
