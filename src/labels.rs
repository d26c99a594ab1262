// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Common label and annotation constants used across all builders.
//!
//! This module defines standard Kubernetes labels and Instana-specific labels
//! to ensure consistency across all resources created by the operator.

// ============================================================================
// Kubernetes Standard Labels
// https://kubernetes.io/docs/concepts/overview/working-with-objects/common-labels/
// ============================================================================

/// Standard label for the name of the application
pub const K8S_NAME: &str = "app.kubernetes.io/name";

/// Standard label for a unique name identifying the instance of an application
pub const K8S_INSTANCE: &str = "app.kubernetes.io/instance";

/// Standard label for the current version of the application
pub const K8S_VERSION: &str = "app.kubernetes.io/version";

/// Standard label for the component name within the architecture
pub const K8S_COMPONENT: &str = "app.kubernetes.io/component";

/// Standard label for the name of a higher-level application this one is part of
pub const K8S_PART_OF: &str = "app.kubernetes.io/part-of";

/// Standard label for the tool being used to manage the operation of an application
pub const K8S_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

// ============================================================================
// Kubernetes Standard Label Values
// ============================================================================

/// Application name stamped on every generated object
pub const APP_NAME: &str = "instana-agent";

/// Application name stamped on objects generated for a `RemoteAgent`
pub const APP_NAME_REMOTE: &str = "instana-agent-remote";

/// Value for `app.kubernetes.io/part-of`
pub const PART_OF_INSTANA: &str = "instana";

/// Value for `app.kubernetes.io/managed-by`
pub const MANAGED_BY_OPERATOR: &str = "instana-agent-operator";

// ============================================================================
// Instana-Specific Labels
// ============================================================================

/// Label carrying the CR generation that produced an object, used to select
/// leftovers from previous generations during cleanup
pub const GENERATION_LABEL: &str = "agent.instana.io/generation";

/// Pod label carrying the agent mode (`APM`, `INFRASTRUCTURE`, `AWS`, `KUBERNETES`)
pub const AGENT_MODE_LABEL: &str = "instana/agent-mode";

/// DaemonSet label carrying the zone name for zone-scoped daemon sets
pub const ZONE_LABEL: &str = "io.instana/zone";

// ============================================================================
// Finalizers
// ============================================================================

/// Finalizer for `InstanaAgent` resources
pub const FINALIZER_INSTANA_AGENT: &str = "agent.instana.io/finalizer";

/// Finalizer for `RemoteAgent` resources
pub const FINALIZER_REMOTE_AGENT: &str = "remote.instana.io/finalizer";
