// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Global constants for the Instana Agent operator.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group for all Instana CRDs
pub const API_GROUP: &str = "instana.io";

/// API version for all Instana CRDs
pub const API_VERSION: &str = "v1";

/// Fully qualified API version (group/version)
pub const API_GROUP_VERSION: &str = "instana.io/v1";

/// Kind name for the `InstanaAgent` resource
pub const KIND_INSTANA_AGENT: &str = "InstanaAgent";

/// Kind name for the `RemoteAgent` resource
pub const KIND_REMOTE_AGENT: &str = "RemoteAgent";

// ============================================================================
// Component Names
// ============================================================================

/// Component name for host agent resources
pub const COMPONENT_INSTANA_AGENT: &str = "instana-agent";

/// Component name for remote agent resources
pub const COMPONENT_INSTANA_AGENT_REMOTE: &str = "instana-agent-remote";

/// Component name for the Kubernetes sensor
pub const COMPONENT_K8SENSOR: &str = "k8sensor";

// ============================================================================
// Agent Port Constants
// ============================================================================

/// Agent HTTP APIs port (status, discovery, traces ingestion)
pub const AGENT_APIS_PORT: i32 = 42699;

/// Agent unix-socket bridge port used by service mesh setups
pub const AGENT_SOCKET_PORT: i32 = 42666;

/// Legacy OpenTelemetry port kept for pre-GA collector setups
pub const OTLP_LEGACY_PORT: i32 = 55680;

/// OpenTelemetry gRPC port
pub const OTLP_GRPC_PORT: i32 = 4317;

/// OpenTelemetry HTTP port
pub const OTLP_HTTP_PORT: i32 = 4318;

// ============================================================================
// Data Keys
// ============================================================================

/// Key under which the agent key is stored in the keys secret
pub const AGENT_KEY: &str = "key";

/// Key under which the download key is stored in the keys secret
pub const DOWNLOAD_KEY: &str = "downloadKey";

/// Key under which the backend `host:port` is stored in the sensor `ConfigMap`
pub const BACKEND_KEY: &str = "backend";

/// Label that marks a `ConfigMap` as supplemental agent configuration
pub const AGENT_CONFIG_LABEL: &str = "instana.io/agent-config";

// ============================================================================
// Agent Filesystem Layout
// ============================================================================

/// Directory where the generated config secret is mounted inside agent pods
pub const INSTANA_CONFIG_DIRECTORY: &str = "/opt/instana/agent/etc/instana-config-yml";

/// Directory where TLS material is mounted inside agent pods
pub const INSTANA_CERTS_DIRECTORY: &str = "/opt/instana/agent/etc/certs";

/// Directory for a host-provided Maven repository mirror
pub const INSTANA_REPO_DIRECTORY: &str = "/opt/instana/agent/data/repo";

// ============================================================================
// Container Registry
// ============================================================================

/// Registry that requires the auto-generated image pull secret
pub const CONTAINERS_INSTANA_IO_REGISTRY: &str = "containers.instana.io";

// ============================================================================
// Liveness Probe Constants
// ============================================================================

/// Liveness probe initial delay (agent bootstrap can take several minutes)
pub const LIVENESS_INITIAL_DELAY_SECS: i32 = 600;

/// Liveness probe period (how often to check)
pub const LIVENESS_PERIOD_SECS: i32 = 10;

/// Liveness probe timeout
pub const LIVENESS_TIMEOUT_SECS: i32 = 5;

/// Liveness probe failure threshold
pub const LIVENESS_FAILURE_THRESHOLD: i32 = 3;

// ============================================================================
// Resource Defaults
// ============================================================================

/// Default agent container memory request
pub const DEFAULT_MEMORY_REQUEST: &str = "768Mi";

/// Default agent container CPU request
pub const DEFAULT_CPU_REQUEST: &str = "0.5";

/// Default agent container memory limit
pub const DEFAULT_MEMORY_LIMIT: &str = "768Mi";

/// Default agent container CPU limit
pub const DEFAULT_CPU_LIMIT: &str = "1.5";

// ============================================================================
// Controller Error Handling Constants
// ============================================================================

/// Requeue duration for controller errors (30 seconds)
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

/// Requeue duration after a successful reconciliation (5 minutes)
pub const RECONCILE_REQUEUE_DURATION_SECS: u64 = 300;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for the Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

/// Field manager name used for server-side apply
pub const FIELD_OWNER_NAME: &str = "instana-agent-operator";

// ============================================================================
// Metrics Server Constants
// ============================================================================

/// Port for the Prometheus metrics HTTP server
pub const METRICS_SERVER_PORT: u16 = 8080;

/// Path for the Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Bind address for the metrics HTTP server
pub const METRICS_SERVER_BIND_ADDRESS: &str = "0.0.0.0";

/// Verbs granted to read-only RBAC rules
#[must_use]
pub fn reader_verbs() -> Vec<String> {
    vec!["get".into(), "list".into(), "watch".into()]
}
