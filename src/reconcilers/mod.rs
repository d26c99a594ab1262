// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes reconciliation controllers for the agent CRs.
//!
//! The operator follows the standard controller pattern:
//!
//! 1. **Watch** - monitor CR changes via the Kubernetes API
//! 2. **Render** - run every object builder against the CR spec
//! 3. **Apply** - dry-run, record dependents, server-side apply, clean up
//!    orphans from earlier generations
//! 4. **Status** - report the outcome back on the status subresource
//!
//! # Available Reconcilers
//!
//! - [`reconcile_instana_agent`] - renders and applies the host agent
//!   object set (DaemonSet, sensor Deployment, secrets, services, RBAC)
//! - [`delete_instana_agent`] - finalizer path removing every recorded
//!   dependent
//! - [`reconcile_remote_agent`] / [`delete_remote_agent`] - the same for
//!   the Deployment-based remote agent

pub mod finalizers;
pub mod instana_agent;
pub mod lifecycle;
pub mod remote_agent;
pub mod resources;
pub mod status;

pub use instana_agent::{delete_instana_agent, reconcile_instana_agent};
pub use remote_agent::{delete_remote_agent, reconcile_remote_agent};

/// Check whether a resource's spec has changed by comparing its generation
/// with the last observed generation from the status.
///
/// `metadata.generation` is only incremented on spec changes, so matching
/// generations mean the last reconciliation already covered this spec.
#[must_use]
pub fn should_reconcile(current_generation: Option<i64>, observed_generation: Option<i64>) -> bool {
    match (current_generation, observed_generation) {
        (Some(current), Some(observed)) => current != observed,
        (Some(_), None) => true, // First reconciliation
        _ => false,              // No generation tracking available
    }
}

#[cfg(test)]
mod mod_tests;
