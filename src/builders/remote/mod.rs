// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Builders for the objects generated from a `RemoteAgent`: a Deployment
//! instead of a DaemonSet, plus its secrets, services and RBAC.

pub mod config_secret;
pub mod deployment;
pub mod keys_secret;
pub mod rbac;
pub mod service;

#[cfg(test)]
#[path = "deployment_tests.rs"]
mod deployment_tests;
