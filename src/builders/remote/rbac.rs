// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! ServiceAccount and RBAC builders for the remote agent. Remote agents do
//! not observe the cluster, so the ClusterRole only covers the security
//! profile grants needed to schedule on hardened clusters.

use k8s_openapi::api::core::v1::ServiceAccount;
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding, PolicyRule, RoleRef, Subject};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::ResourceExt;

use crate::builders::{erase, BuiltObject, ObjectBuilder};
use crate::constants::COMPONENT_INSTANA_AGENT_REMOTE;
use crate::crd::RemoteAgent;

pub struct ServiceAccountBuilder<'a> {
    agent: &'a RemoteAgent,
}

impl<'a> ServiceAccountBuilder<'a> {
    #[must_use]
    pub fn new(agent: &'a RemoteAgent) -> Self {
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
        COMPONENT_INSTANA_AGENT_REMOTE
    }

    fn is_namespaced(&self) -> bool {
        true
    }
}

pub struct ClusterRoleBuilder<'a> {
    agent: &'a RemoteAgent,
}

impl<'a> ClusterRoleBuilder<'a> {
    #[must_use]
    pub fn new(agent: &'a RemoteAgent) -> Self {
        Self { agent }
    }
}

impl ObjectBuilder for ClusterRoleBuilder<'_> {
    fn build(&self) -> Option<BuiltObject> {
        erase(&ClusterRole {
            metadata: ObjectMeta {
                name: Some(self.agent.remote_resources_name()),
                ..Default::default()
            },
            rules: Some(vec![
                PolicyRule {
                    non_resource_urls: Some(vec!["/version".into(), "/healthz".into()]),
                    verbs: vec!["get".into()],
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
        COMPONENT_INSTANA_AGENT_REMOTE
    }

    fn is_namespaced(&self) -> bool {
        false
    }
}

pub struct ClusterRoleBindingBuilder<'a> {
    agent: &'a RemoteAgent,
}

impl<'a> ClusterRoleBindingBuilder<'a> {
    #[must_use]
    pub fn new(agent: &'a RemoteAgent) -> Self {
        Self { agent }
    }
}

impl ObjectBuilder for ClusterRoleBindingBuilder<'_> {
    fn build(&self) -> Option<BuiltObject> {
        erase(&ClusterRoleBinding {
            metadata: ObjectMeta {
                name: Some(self.agent.remote_resources_name()),
                ..Default::default()
            },
            role_ref: RoleRef {
                api_group: "rbac.authorization.k8s.io".into(),
                kind: "ClusterRole".into(),
                name: self.agent.remote_resources_name(),
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
        COMPONENT_INSTANA_AGENT_REMOTE
    }

    fn is_namespaced(&self) -> bool {
        false
    }
}
