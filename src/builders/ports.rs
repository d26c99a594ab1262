// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Agent port catalogue and service/container port projection.
//!
//! The agent exposes a fixed set of named ports; the OpenTelemetry ones are
//! conditional on the CR's OTLP settings and honor per-protocol port
//! overrides. Service builders drop disabled ports; container port lists are
//! emitted unconditionally so probes keep working regardless of settings.

use k8s_openapi::api::core::v1::{ContainerPort, ServicePort};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

use crate::constants::{
    AGENT_APIS_PORT, AGENT_SOCKET_PORT, OTLP_GRPC_PORT, OTLP_HTTP_PORT, OTLP_LEGACY_PORT,
};
use crate::crd::OpenTelemetry;

/// Every port an agent workload can expose.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentPort {
    /// Agent HTTP APIs (status, discovery, traces)
    AgentApis,
    /// Unix-socket bridge for service mesh setups
    AgentSocket,
    /// Legacy OTLP port
    OtlpLegacy,
    /// OTLP over gRPC
    OtlpGrpc,
    /// OTLP over HTTP
    OtlpHttp,
}

impl AgentPort {
    /// The port name, used for both container and service ports.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            AgentPort::AgentApis => "agent-apis",
            AgentPort::AgentSocket => "agent-socket",
            AgentPort::OtlpLegacy => "otlp-legacy",
            AgentPort::OtlpGrpc => "otlp-grpc",
            AgentPort::OtlpHttp => "otlp-http",
        }
    }

    /// The port number, honoring OTLP port overrides from the CR.
    #[must_use]
    pub fn port_number(self, otlp: &OpenTelemetry) -> i32 {
        match self {
            AgentPort::AgentApis => AGENT_APIS_PORT,
            AgentPort::AgentSocket => AGENT_SOCKET_PORT,
            AgentPort::OtlpLegacy => OTLP_LEGACY_PORT,
            AgentPort::OtlpGrpc => otlp
                .grpc
                .as_ref()
                .and_then(|grpc| grpc.port)
                .unwrap_or(OTLP_GRPC_PORT),
            AgentPort::OtlpHttp => otlp
                .http
                .as_ref()
                .and_then(|http| http.port)
                .unwrap_or(OTLP_HTTP_PORT),
        }
    }

    /// Whether the port is enabled under the given OTLP settings. The
    /// non-OTLP ports are always enabled.
    #[must_use]
    pub fn is_enabled(self, otlp: &OpenTelemetry) -> bool {
        match self {
            AgentPort::OtlpLegacy | AgentPort::OtlpGrpc => otlp.grpc_is_enabled(),
            AgentPort::OtlpHttp => otlp.http_is_enabled(),
            AgentPort::AgentApis | AgentPort::AgentSocket => true,
        }
    }
}

/// Projects [`AgentPort`] keys onto service and container port lists.
pub struct PortsBuilder {
    otlp: OpenTelemetry,
}

impl PortsBuilder {
    #[must_use]
    pub fn new(otlp: OpenTelemetry) -> Self {
        Self { otlp }
    }

    /// Service ports for the enabled subset of the requested ports,
    /// order-preserving.
    #[must_use]
    pub fn service_ports(&self, ports: &[AgentPort]) -> Vec<ServicePort> {
        ports
            .iter()
            .filter(|port| port.is_enabled(&self.otlp))
            .map(|port| self.to_service_port(*port))
            .collect()
    }

    /// Container ports for all requested ports.
    #[must_use]
    pub fn container_ports(&self, ports: &[AgentPort]) -> Vec<ContainerPort> {
        ports.iter().map(|port| self.to_container_port(*port)).collect()
    }

    fn to_service_port(&self, port: AgentPort) -> ServicePort {
        ServicePort {
            name: Some(port.name().into()),
            protocol: Some("TCP".into()),
            port: port.port_number(&self.otlp),
            target_port: Some(IntOrString::String(port.name().into())),
            ..Default::default()
        }
    }

    fn to_container_port(&self, port: AgentPort) -> ContainerPort {
        ContainerPort {
            name: Some(port.name().into()),
            container_port: port.port_number(&self.otlp),
            protocol: Some("TCP".into()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
#[path = "ports_tests.rs"]
mod ports_tests;
