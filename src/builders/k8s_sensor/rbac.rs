// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! ServiceAccount and RBAC builders for the Kubernetes sensor.
//!
//! The sensor reads cluster state broadly (workloads, nodes, namespaces,
//! autoscaling) but only ever reads; its namespace Role additionally covers
//! the services/endpoints lookups used for leader coordination.

use k8s_openapi::api::core::v1::ServiceAccount;
use k8s_openapi::api::rbac::v1::{
    ClusterRole, ClusterRoleBinding, PolicyRule, Role, RoleBinding, RoleRef, Subject,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::ResourceExt;

use crate::builders::{erase, BuiltObject, ObjectBuilder};
use crate::constants::{reader_verbs, COMPONENT_K8SENSOR};
use crate::crd::InstanaAgent;

/// Builds the sensor ServiceAccount.
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
        erase(&ServiceAccount {
            metadata: ObjectMeta {
                name: Some(self.agent.k8s_sensor_resources_name()),
                namespace: self.agent.namespace(),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    fn component_name(&self) -> &'static str {
        COMPONENT_K8SENSOR
    }

    fn is_namespaced(&self) -> bool {
        true
    }
}

/// Builds the sensor namespace Role (services/endpoints reads).
pub struct RoleBuilder<'a> {
    agent: &'a InstanaAgent,
}

impl<'a> RoleBuilder<'a> {
    #[must_use]
    pub fn new(agent: &'a InstanaAgent) -> Self {
        Self { agent }
    }
}

impl ObjectBuilder for RoleBuilder<'_> {
    fn build(&self) -> Option<BuiltObject> {
        erase(&Role {
            metadata: ObjectMeta {
                name: Some(self.agent.k8s_sensor_resources_name()),
                namespace: self.agent.namespace(),
                ..Default::default()
            },
            rules: Some(vec![PolicyRule {
                api_groups: Some(vec![String::new()]),
                resources: Some(vec!["services".into(), "endpoints".into()]),
                verbs: reader_verbs(),
                ..Default::default()
            }]),
        })
    }

    fn component_name(&self) -> &'static str {
        COMPONENT_K8SENSOR
    }

    fn is_namespaced(&self) -> bool {
        true
    }
}

/// Builds the binding of the sensor Role to its ServiceAccount.
pub struct RoleBindingBuilder<'a> {
    agent: &'a InstanaAgent,
}

impl<'a> RoleBindingBuilder<'a> {
    #[must_use]
    pub fn new(agent: &'a InstanaAgent) -> Self {
        Self { agent }
    }
}

impl ObjectBuilder for RoleBindingBuilder<'_> {
    fn build(&self) -> Option<BuiltObject> {
        erase(&RoleBinding {
            metadata: ObjectMeta {
                name: Some(self.agent.k8s_sensor_resources_name()),
                namespace: self.agent.namespace(),
                ..Default::default()
            },
            role_ref: RoleRef {
                api_group: "rbac.authorization.k8s.io".into(),
                kind: "Role".into(),
                name: self.agent.k8s_sensor_resources_name(),
            },
            subjects: Some(vec![Subject {
                kind: "ServiceAccount".into(),
                name: self.agent.k8s_sensor_resources_name(),
                namespace: self.agent.namespace(),
                ..Default::default()
            }]),
        })
    }

    fn component_name(&self) -> &'static str {
        COMPONENT_K8SENSOR
    }

    fn is_namespaced(&self) -> bool {
        true
    }
}

/// Builds the sensor ClusterRole.
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
                name: Some(self.agent.k8s_sensor_resources_name()),
                ..Default::default()
            },
            rules: Some(vec![
                PolicyRule {
                    non_resource_urls: Some(vec![
                        "/version".into(),
                        "/healthz".into(),
                        "/metrics".into(),
                        "/metrics/*".into(),
                    ]),
                    verbs: vec!["get".into()],
                    ..Default::default()
                },
                PolicyRule {
                    api_groups: Some(vec!["apiextensions.k8s.io".into()]),
                    resources: Some(vec!["customresourcedefinitions".into()]),
                    verbs: reader_verbs(),
                    ..Default::default()
                },
                PolicyRule {
                    api_groups: Some(vec!["extensions".into()]),
                    resources: Some(vec![
                        "deployments".into(),
                        "replicasets".into(),
                        "ingresses".into(),
                    ]),
                    verbs: reader_verbs(),
                    ..Default::default()
                },
                PolicyRule {
                    api_groups: Some(vec![String::new()]),
                    resources: Some(vec![
                        "configmaps".into(),
                        "events".into(),
                        "services".into(),
                        "endpoints".into(),
                        "namespaces".into(),
                        "nodes".into(),
                        "nodes/metrics".into(),
                        "nodes/stats".into(),
                        "nodes/proxy".into(),
                        "pods".into(),
                        "pods/log".into(),
                        "replicationcontrollers".into(),
                        "resourcequotas".into(),
                        "persistentvolumes".into(),
                        "persistentvolumeclaims".into(),
                    ]),
                    verbs: reader_verbs(),
                    ..Default::default()
                },
                PolicyRule {
                    api_groups: Some(vec!["apps".into()]),
                    resources: Some(vec![
                        "daemonsets".into(),
                        "deployments".into(),
                        "replicasets".into(),
                        "statefulsets".into(),
                    ]),
                    verbs: reader_verbs(),
                    ..Default::default()
                },
                PolicyRule {
                    api_groups: Some(vec!["batch".into()]),
                    resources: Some(vec!["cronjobs".into(), "jobs".into()]),
                    verbs: reader_verbs(),
                    ..Default::default()
                },
                PolicyRule {
                    api_groups: Some(vec!["networking.k8s.io".into()]),
                    resources: Some(vec!["ingresses".into()]),
                    verbs: reader_verbs(),
                    ..Default::default()
                },
                PolicyRule {
                    api_groups: Some(vec!["autoscaling".into()]),
                    resources: Some(vec!["horizontalpodautoscalers".into()]),
                    verbs: reader_verbs(),
                    ..Default::default()
                },
                PolicyRule {
                    api_groups: Some(vec!["apps.openshift.io".into()]),
                    resources: Some(vec!["deploymentconfigs".into()]),
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
                    resource_names: Some(vec![self.agent.k8s_sensor_resources_name()]),
                    resources: Some(vec!["podsecuritypolicies".into()]),
                    verbs: vec!["use".into()],
                    ..Default::default()
                },
            ]),
            ..Default::default()
        })
    }

    fn component_name(&self) -> &'static str {
        COMPONENT_K8SENSOR
    }

    fn is_namespaced(&self) -> bool {
        false
    }
}

/// Builds the sensor ClusterRoleBinding, gated on `rbac.create`.
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
                name: Some(self.agent.k8s_sensor_resources_name()),
                ..Default::default()
            },
            role_ref: RoleRef {
                api_group: "rbac.authorization.k8s.io".into(),
                kind: "ClusterRole".into(),
                name: self.agent.k8s_sensor_resources_name(),
            },
            subjects: Some(vec![Subject {
                kind: "ServiceAccount".into(),
                name: self.agent.k8s_sensor_resources_name(),
                namespace: self.agent.namespace(),
                ..Default::default()
            }]),
        })
    }

    fn component_name(&self) -> &'static str {
        COMPONENT_K8SENSOR
    }

    fn is_namespaced(&self) -> bool {
        false
    }
}
