// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes sensor `ConfigMap` builder.
//!
//! One `ConfigMap` for all backends: each backend contributes a
//! `backend[-suffix]` entry holding its `host:port`, which the sensor
//! Deployments resolve into their `BACKEND` env var.

use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::ResourceExt;
use std::collections::BTreeMap;

use crate::builders::backends::K8SensorBackend;
use crate::builders::{erase, BuiltObject, ObjectBuilder};
use crate::constants::{BACKEND_KEY, COMPONENT_K8SENSOR};
use crate::crd::InstanaAgent;

pub struct ConfigMapBuilder<'a> {
    agent: &'a InstanaAgent,
    backends: &'a [K8SensorBackend],
}

impl<'a> ConfigMapBuilder<'a> {
    #[must_use]
    pub fn new(agent: &'a InstanaAgent, backends: &'a [K8SensorBackend]) -> Self {
        Self { agent, backends }
    }

    fn data(&self) -> BTreeMap<String, String> {
        self.backends
            .iter()
            .map(|backend| {
                (
                    format!("{BACKEND_KEY}{}", backend.resource_suffix),
                    format!("{}:{}", backend.endpoint_host, backend.endpoint_port),
                )
            })
            .collect()
    }
}

impl ObjectBuilder for ConfigMapBuilder<'_> {
    fn build(&self) -> Option<BuiltObject> {
        erase(&ConfigMap {
            metadata: ObjectMeta {
                name: Some(self.agent.k8s_sensor_resources_name()),
                namespace: self.agent.namespace(),
                ..Default::default()
            },
            data: Some(self.data()),
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
