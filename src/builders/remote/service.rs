// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Service builders for the remote agent: an always-on headless service and
//! an opt-in regular service gated on `service.create`.

use k8s_openapi::api::core::v1::{Service, ServiceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::ResourceExt;

use crate::builders::ports::{AgentPort, PortsBuilder};
use crate::builders::transformations::PodSelectorLabelGenerator;
use crate::builders::{erase, BuiltObject, ObjectBuilder};
use crate::constants::COMPONENT_INSTANA_AGENT_REMOTE;
use crate::crd::{OpenTelemetry, RemoteAgent};

/// Remote agents expose the agent APIs port only.
const SERVICE_PORTS: &[AgentPort] = &[AgentPort::AgentApis];

pub struct HeadlessServiceBuilder<'a> {
    agent: &'a RemoteAgent,
}

impl<'a> HeadlessServiceBuilder<'a> {
    #[must_use]
    pub fn new(agent: &'a RemoteAgent) -> Self {
        Self { agent }
    }
}

impl ObjectBuilder for HeadlessServiceBuilder<'_> {
    fn build(&self) -> Option<BuiltObject> {
        let selector =
            PodSelectorLabelGenerator::new_remote(self.agent, COMPONENT_INSTANA_AGENT_REMOTE);
        let ports = PortsBuilder::new(OpenTelemetry::default());

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
        COMPONENT_INSTANA_AGENT_REMOTE
    }

    fn is_namespaced(&self) -> bool {
        true
    }
}

pub struct ServiceBuilder<'a> {
    agent: &'a RemoteAgent,
}

impl<'a> ServiceBuilder<'a> {
    #[must_use]
    pub fn new(agent: &'a RemoteAgent) -> Self {
        Self { agent }
    }
}

impl ObjectBuilder for ServiceBuilder<'_> {
    fn build(&self) -> Option<BuiltObject> {
        if !self.agent.spec.service.create.unwrap_or(false) {
            return None;
        }

        let selector =
            PodSelectorLabelGenerator::new_remote(self.agent, COMPONENT_INSTANA_AGENT_REMOTE);
        let ports = PortsBuilder::new(OpenTelemetry::default());

        erase(&Service {
            metadata: ObjectMeta {
                name: Some(self.agent.remote_resources_name()),
                namespace: self.agent.namespace(),
                ..Default::default()
            },
            spec: Some(ServiceSpec {
                selector: Some(selector.pod_selector_labels()),
                ports: Some(ports.service_ports(SERVICE_PORTS)),
                ..Default::default()
            }),
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
