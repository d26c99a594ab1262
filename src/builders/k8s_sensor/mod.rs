// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Builders for the Kubernetes sensor: a Deployment per backend plus the
//! `ConfigMap`, RBAC and PodDisruptionBudget supporting it.

pub mod configmap;
pub mod deployment;
pub mod poddisruptionbudget;
pub mod rbac;

#[cfg(test)]
#[path = "poddisruptionbudget_tests.rs"]
mod poddisruptionbudget_tests;
