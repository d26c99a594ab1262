// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! PodDisruptionBudget builder for the Kubernetes sensor.
//!
//! Opt-in via `k8s_sensor.podDisruptionBudget.enabled`. Keeps all but one
//! sensor replica available through voluntary disruptions so cluster
//! metadata collection never fully stops during node drains.

use k8s_openapi::api::policy::v1::{PodDisruptionBudget, PodDisruptionBudgetSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::ResourceExt;

use crate::builders::transformations::PodSelectorLabelGenerator;
use crate::builders::{erase, BuiltObject, ObjectBuilder};
use crate::constants::COMPONENT_K8SENSOR;
use crate::crd::InstanaAgent;

/// Default number of sensor replicas, mirrored from the Deployment builder.
const DEFAULT_REPLICAS: i32 = 3;

pub struct PodDisruptionBudgetBuilder<'a> {
    agent: &'a InstanaAgent,
}

impl<'a> PodDisruptionBudgetBuilder<'a> {
    #[must_use]
    pub fn new(agent: &'a InstanaAgent) -> Self {
        Self { agent }
    }

    fn is_enabled(&self) -> bool {
        self.agent
            .spec
            .k8s_sensor
            .pod_disruption_budget
            .as_ref()
            .and_then(|pdb| pdb.enabled)
            .unwrap_or(false)
    }

    fn replicas(&self) -> i32 {
        self.agent
            .spec
            .k8s_sensor
            .deployment
            .as_ref()
            .and_then(|deployment| deployment.replicas)
            .unwrap_or(DEFAULT_REPLICAS)
    }
}

impl ObjectBuilder for PodDisruptionBudgetBuilder<'_> {
    fn build(&self) -> Option<BuiltObject> {
        if !self.is_enabled() {
            return None;
        }

        let selector = PodSelectorLabelGenerator::new(self.agent, COMPONENT_K8SENSOR);
        let min_available = (self.replicas() - 1).max(0);

        erase(&PodDisruptionBudget {
            metadata: ObjectMeta {
                name: Some(self.agent.k8s_sensor_resources_name()),
                namespace: self.agent.namespace(),
                ..Default::default()
            },
            spec: Some(PodDisruptionBudgetSpec {
                min_available: Some(IntOrString::Int(min_available)),
                selector: Some(LabelSelector {
                    match_labels: Some(selector.pod_selector_labels()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
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
