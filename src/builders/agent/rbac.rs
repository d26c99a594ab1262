// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! ServiceAccount and RBAC builders for the host agent.
//!
//! The agent reads node and pod state through the kubelet and API server;
//! its ClusterRole also authorizes the OpenShift `privileged` SCC and pod
//! security policies so the privileged DaemonSet can schedule on hardened
//! clusters.

use k8s_openapi::api::core::v1::ServiceAccount;
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding, PolicyRule, RoleRef, Subject};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::ResourceExt;

use crate::builders::{erase, BuiltObject, ObjectBuilder};
use crate::constants::{reader_verbs, COMPONENT_INSTANA_AGENT};
use crate::crd::InstanaAgent;

/// Builds the agent ServiceAccount, gated on `serviceAccount.create`.
pub struct ServiceAccountBuilder<'a> {
    agent: &'a InstanaAgent,
}

impl<'a> ServiceAccountBuilder<'a> {
    #[must_use]
    pub fn new(agent: &'a InstanaAgent) -> Self {
        Self { agent }
    }
}

impl ObjectBuilder for ServiceAccountBuilder<'_> {
    fn build(&self) -> Option<BuiltObject> {
        if !self.agent.spec.service_account.create.create.unwrap_or(true) {
            return None;
        }

        erase(&ServiceAccount {
            metadata: ObjectMeta {
                name: Some(self.agent.service_account_name()),
                namespace: self.agent.namespace(),
                annotations: self.agent.spec.service_account.annotations.clone(),
                ..Default::default()
            },
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

/// Builds the agent ClusterRole.
pub struct ClusterRoleBuilder<'a> {
    agent: &'a InstanaAgent,
}

impl<'a> ClusterRoleBuilder<'a> {
    #[must_use]
    pub fn new(agent: &'a InstanaAgent) -> Self {
        Self { agent }
    }
}

impl ObjectBuilder for ClusterRoleBuilder<'_> {
    fn build(&self) -> Option<BuiltObject> {
        erase(&ClusterRole {
            metadata: ObjectMeta {
                name: Some(self.agent.service_account_name()),
                ..Default::default()
            },
            rules: Some(vec![
                PolicyRule {
                    non_resource_urls: Some(vec![
                        "/version".into(),
                        "/healthz".into(),
                        "/metrics".into(),
                        "/stats/summary".into(),
                        "/metrics/cadvisor".into(),
                    ]),
                    verbs: vec!["get".into()],
                    ..Default::default()
                },
                PolicyRule {
                    api_groups: Some(vec![String::new()]),
                    resources: Some(vec![
                        "nodes".into(),
                        "nodes/stats".into(),
                        "nodes/metrics".into(),
                        "pods".into(),
                    ]),
                    verbs: reader_verbs(),
                    ..Default::default()
                },
                PolicyRule {
                    api_groups: Some(vec!["security.openshift.io".into()]),
                    resource_names: Some(vec!["privileged".into()]),
                    resources: Some(vec!["securitycontextconstraints".into()]),
                    verbs: vec!["use".into()],
                    ..Default::default()
                },
                PolicyRule {
                    api_groups: Some(vec!["policy".into()]),
                    resources: Some(vec!["podsecuritypolicies".into()]),
                    verbs: vec!["use".into()],
                    ..Default::default()
                },
            ]),
            ..Default::default()
        })
    }

    fn component_name(&self) -> &'static str {
        COMPONENT_INSTANA_AGENT
    }

    fn is_namespaced(&self) -> bool {
        false
    }
}

/// Builds the agent ClusterRoleBinding, gated on `rbac.create`.
pub struct ClusterRoleBindingBuilder<'a> {
    agent: &'a InstanaAgent,
}

impl<'a> ClusterRoleBindingBuilder<'a> {
    #[must_use]
    pub fn new(agent: &'a InstanaAgent) -> Self {
        Self { agent }
    }
}

impl ObjectBuilder for ClusterRoleBindingBuilder<'_> {
    fn build(&self) -> Option<BuiltObject> {
        if !self.agent.spec.rbac.create.unwrap_or(true) {
            return None;
        }

        erase(&ClusterRoleBinding {
            metadata: ObjectMeta {
                name: Some(self.agent.service_account_name()),
                ..Default::default()
            },
            role_ref: RoleRef {
                api_group: "rbac.authorization.k8s.io".into(),
                kind: "ClusterRole".into(),
                name: self.agent.service_account_name(),
            },
            subjects: Some(vec![Subject {
                kind: "ServiceAccount".into(),
                name: self.agent.service_account_name(),
                namespace: self.agent.namespace(),
                ..Default::default()
            }]),
        })
    }

    fn component_name(&self) -> &'static str {
        COMPONENT_INSTANA_AGENT
    }

    fn is_namespaced(&self) -> bool {
        false
    }
}
