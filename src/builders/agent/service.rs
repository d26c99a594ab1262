// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Service builders for the host agent.
//!
//! The headless service always exists and gives every agent pod a stable
//! DNS identity (the `K8S_SERVICE_DOMAIN` env var points at it). The
//! regular service is opt-in: it materializes when `service.create` is set
//! or implied by Prometheus remote write or OpenTelemetry ingestion, and
//! routes node-locally so telemetry lands on the agent of the emitting node.

use k8s_openapi::api::core::v1::{Service, ServiceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::ResourceExt;

use crate::builders::ports::{AgentPort, PortsBuilder};
use crate::builders::transformations::PodSelectorLabelGenerator;
use crate::builders::{erase, BuiltObject, ObjectBuilder};
use crate::constants::COMPONENT_INSTANA_AGENT;
use crate::crd::InstanaAgent;

/// Ports exposed by both agent services.
const SERVICE_PORTS: &[AgentPort] = &[
    AgentPort::AgentApis,
    AgentPort::OtlpLegacy,
    AgentPort::OtlpGrpc,
    AgentPort::OtlpHttp,
];

/// Builds the headless service fronting the agent pods.
pub struct HeadlessServiceBuilder<'a> {
    agent: &'a InstanaAgent,
}

impl<'a> HeadlessServiceBuilder<'a> {
    #[must_use]
    pub fn new(agent: &'a InstanaAgent) -> Self {
        Self { agent }
    }
}

impl ObjectBuilder for HeadlessServiceBuilder<'_> {
    fn build(&self) -> Option<BuiltObject> {
        let selector = PodSelectorLabelGenerator::new(self.agent, COMPONENT_INSTANA_AGENT);
        let ports = PortsBuilder::new(self.agent.spec.opentelemetry.clone());

        erase(&Service {
            metadata: ObjectMeta {
                name: Some(self.agent.headless_service_name()),
                namespace: self.agent.namespace(),
                ..Default::default()
            },
            spec: Some(ServiceSpec {
                cluster_ip: Some("None".into()),
                selector: Some(selector.pod_selector_labels()),
                ports: Some(ports.service_ports(SERVICE_PORTS)),
                ..Default::default()
            }),
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

/// Builds the opt-in agent service.
pub struct ServiceBuilder<'a> {
    agent: &'a InstanaAgent,
}

impl<'a> ServiceBuilder<'a> {
    #[must_use]
    pub fn new(agent: &'a InstanaAgent) -> Self {
        Self { agent }
    }

    fn is_enabled(&self) -> bool {
        let spec = &self.agent.spec;
        spec.service.create.unwrap_or(false)
            || spec.prometheus.remote_write_enabled()
            || spec.opentelemetry.is_enabled()
    }
}

impl ObjectBuilder for ServiceBuilder<'_> {
    fn build(&self) -> Option<BuiltObject> {
        if !self.is_enabled() {
            return None;
        }

        let selector = PodSelectorLabelGenerator::new(self.agent, COMPONENT_INSTANA_AGENT);
        let ports = PortsBuilder::new(self.agent.spec.opentelemetry.clone());

        erase(&Service {
            metadata: ObjectMeta {
                name: Some(self.agent.name_any()),
                namespace: self.agent.namespace(),
                ..Default::default()
            },
            spec: Some(ServiceSpec {
                selector: Some(selector.pod_selector_labels()),
                ports: Some(ports.service_ports(SERVICE_PORTS)),
                // Telemetry must land on the agent of the emitting node
                internal_traffic_policy: Some("Local".into()),
                ..Default::default()
            }),
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
