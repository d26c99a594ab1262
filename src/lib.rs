// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! # Instana Agent Operator
//!
//! A Kubernetes operator that manages Instana agent deployments through
//! Custom Resource Definitions (CRDs).
//!
//! ## Overview
//!
//! The operator reconciles two custom resources into native Kubernetes
//! objects:
//!
//! - `InstanaAgent` - the host agent DaemonSet plus the Kubernetes sensor
//!   Deployment, secrets, services and RBAC supporting them
//! - `RemoteAgent` - a Deployment-based agent for monitoring hosts outside
//!   the cluster
//!
//! ## Modules
//!
//! - [`crd`] - Custom Resource Definition types
//! - [`builders`] - declarative object builders plus the transformation
//!   pipeline that labels and owns every generated object
//! - [`reconcilers`] - reconciliation logic, apply pipeline and lifecycle
//!   cleanup
//! - [`config_merger`] - deep-merge of agent configuration YAML with
//!   supplemental `ConfigMaps`
//! - [`helpers`] - derived resource names shared by builders and
//!   reconcilers
//!
//! ## Example
//!
//! ```rust,no_run
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

pub mod builders;
pub mod config_merger;
pub mod constants;
pub mod crd;
pub mod helpers;
pub mod labels;
pub mod metrics;
pub mod operator_errors;
pub mod reconcilers;
