// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Builders for the objects generated from an `InstanaAgent`: the agent
//! DaemonSet, its secrets, services and RBAC.

pub mod config_secret;
pub mod daemonset;
pub mod keys_secret;
pub mod pull_secret;
pub mod rbac;
pub mod service;
pub mod tls_secret;

#[cfg(test)]
#[path = "daemonset_tests.rs"]
mod daemonset_tests;
