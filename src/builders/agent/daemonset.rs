// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Agent DaemonSet builder.
//!
//! One DaemonSet per agent CR, or one per entry in `spec.zones` when zones
//! are configured. The DaemonSet only exists once the CR carries an agent
//! key (or keys secret) and a cluster or zone name — without those the agent
//! cannot register anywhere.

use k8s_openapi::api::apps::v1::{DaemonSet, DaemonSetSpec};
use k8s_openapi::api::core::v1::{
    Container, HTTPGetAction, PodSpec, PodTemplateSpec, Probe, SecurityContext,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::ResourceExt;
use std::collections::BTreeMap;
use tracing::debug;

use crate::builders::env::{merge_env_vars, AgentEnvVar, EnvBuilder};
use crate::builders::ports::{AgentPort, PortsBuilder};
use crate::builders::transformations::PodSelectorLabelGenerator;
use crate::builders::volume::{AgentVolume, VolumeBuilder};
use crate::builders::{erase, BuiltObject, ObjectBuilder};
use crate::constants::{
    AGENT_APIS_PORT, COMPONENT_INSTANA_AGENT, DEFAULT_CPU_LIMIT, DEFAULT_CPU_REQUEST,
    DEFAULT_MEMORY_LIMIT, DEFAULT_MEMORY_REQUEST, LIVENESS_FAILURE_THRESHOLD,
    LIVENESS_INITIAL_DELAY_SECS, LIVENESS_PERIOD_SECS, LIVENESS_TIMEOUT_SECS,
};
use crate::crd::{AgentMode, InstanaAgent, Zone};
use crate::labels::AGENT_MODE_LABEL;

/// Environment variables rendered into the agent container, in order.
const AGENT_ENV_VARS: &[AgentEnvVar] = &[
    AgentEnvVar::AgentMode,
    AgentEnvVar::ZoneName,
    AgentEnvVar::ClusterName,
    AgentEnvVar::AgentEndpoint,
    AgentEnvVar::AgentEndpointPort,
    AgentEnvVar::MavenRepoUrl,
    AgentEnvVar::MavenRepoFeaturesPath,
    AgentEnvVar::MavenRepoSharedPath,
    AgentEnvVar::MirrorReleaseRepoUrl,
    AgentEnvVar::MirrorReleaseRepoUsername,
    AgentEnvVar::MirrorReleaseRepoPassword,
    AgentEnvVar::MirrorSharedRepoUrl,
    AgentEnvVar::MirrorSharedRepoUsername,
    AgentEnvVar::MirrorSharedRepoPassword,
    AgentEnvVar::ProxyHost,
    AgentEnvVar::ProxyPort,
    AgentEnvVar::ProxyProtocol,
    AgentEnvVar::ProxyUser,
    AgentEnvVar::ProxyPassword,
    AgentEnvVar::ProxyUseDns,
    AgentEnvVar::ListenAddress,
    AgentEnvVar::RedactK8sSecrets,
    AgentEnvVar::ConfigPath,
    AgentEnvVar::EntrypointSkipBackendTemplateGeneration,
    AgentEnvVar::AgentKey,
    AgentEnvVar::DownloadKey,
    AgentEnvVar::PodName,
    AgentEnvVar::PodIp,
    AgentEnvVar::K8sServiceDomain,
    AgentEnvVar::EnableAgentSocket,
];

/// Volumes mounted into the agent container, in order.
const AGENT_VOLUMES: &[AgentVolume] = &[
    AgentVolume::Dev,
    AgentVolume::Run,
    AgentVolume::VarRun,
    AgentVolume::VarRunKubo,
    AgentVolume::VarRunContainerd,
    AgentVolume::VarContainerdConfig,
    AgentVolume::Sys,
    AgentVolume::VarLog,
    AgentVolume::VarLib,
    AgentVolume::VarData,
    AgentVolume::MachineId,
    AgentVolume::Config,
    AgentVolume::Tls,
    AgentVolume::Repo,
];

/// Builds the agent DaemonSet for the whole CR or for one zone of it.
pub struct DaemonSetBuilder<'a> {
    agent: &'a InstanaAgent,
    zone: Option<&'a Zone>,
    is_openshift: bool,
}

impl<'a> DaemonSetBuilder<'a> {
    #[must_use]
    pub fn new(agent: &'a InstanaAgent, is_openshift: bool) -> Self {
        Self {
            agent,
            zone: None,
            is_openshift,
        }
    }

    /// Builder for the DaemonSet of a single zone.
    #[must_use]
    pub fn with_zone(agent: &'a InstanaAgent, is_openshift: bool, zone: &'a Zone) -> Self {
        Self {
            agent,
            zone: Some(zone),
            is_openshift,
        }
    }

    fn zone_name(&self) -> Option<&str> {
        self.zone.and_then(|zone| zone.name.name.as_deref())
    }

    fn name(&self) -> String {
        match self.zone_name() {
            Some(zone) => format!("{}-{}", self.agent.name_any(), zone),
            None => self.agent.name_any(),
        }
    }

    fn selector(&self) -> PodSelectorLabelGenerator {
        match self.zone_name() {
            Some(zone) => {
                PodSelectorLabelGenerator::with_zone(self.agent, COMPONENT_INSTANA_AGENT, zone)
            }
            None => PodSelectorLabelGenerator::new(self.agent, COMPONENT_INSTANA_AGENT),
        }
    }

    fn pod_template_labels(&self, selector: &PodSelectorLabelGenerator) -> BTreeMap<String, String> {
        let pod = self.agent.spec.agent.pod.as_ref();
        let mut labels = pod.and_then(|p| p.labels.clone()).unwrap_or_default();

        let mode = self
            .zone
            .and_then(|zone| zone.mode)
            .or(self.agent.spec.agent.mode)
            .unwrap_or(AgentMode::Apm);
        labels.insert(AGENT_MODE_LABEL.into(), mode.as_str().into());

        selector.pod_labels(labels)
    }

    fn build_daemonset(&self) -> DaemonSet {
        let agent = self.agent;
        let base = &agent.spec.agent;
        let pod = base.pod.as_ref();
        let selector = self.selector();

        debug!(
            name = %self.name(),
            zone = ?self.zone_name(),
            openshift = self.is_openshift,
            "Building DaemonSet for InstanaAgent"
        );

        let env_builder = EnvBuilder::new(agent, self.zone);
        let env = merge_env_vars(
            env_builder.build(AGENT_ENV_VARS),
            pod.and_then(|p| p.env.as_deref()).unwrap_or_default(),
        );

        let volume_builder = VolumeBuilder::new(agent, self.is_openshift);
        let (mut volumes, mut volume_mounts) = volume_builder.build(AGENT_VOLUMES);
        volumes.extend(pod.and_then(|p| p.volumes.clone()).unwrap_or_default());
        volume_mounts.extend(pod.and_then(|p| p.volume_mounts.clone()).unwrap_or_default());

        let ports_builder = PortsBuilder::new(agent.spec.opentelemetry.clone());
        let mut container_ports = vec![AgentPort::AgentApis];
        if base.service_mesh.as_ref().is_some_and(|mesh| mesh.enabled) {
            container_ports.push(AgentPort::AgentSocket);
        }
        container_ports.extend([
            AgentPort::OtlpLegacy,
            AgentPort::OtlpGrpc,
            AgentPort::OtlpHttp,
        ]);

        let tolerations = self
            .zone
            .and_then(|zone| zone.tolerations.clone())
            .or_else(|| pod.and_then(|p| p.tolerations.clone()));
        let affinity = self
            .zone
            .and_then(|zone| zone.affinity.clone())
            .or_else(|| pod.and_then(|p| p.affinity.clone()));

        let resources = pod
            .map(|p| p.resources.clone())
            .unwrap_or_default()
            .get_or_default(
                &[
                    ("memory", DEFAULT_MEMORY_REQUEST),
                    ("cpu", DEFAULT_CPU_REQUEST),
                ],
                &[("memory", DEFAULT_MEMORY_LIMIT), ("cpu", DEFAULT_CPU_LIMIT)],
            );

        DaemonSet {
            metadata: ObjectMeta {
                name: Some(self.name()),
                namespace: agent.namespace(),
                ..Default::default()
            },
            spec: Some(DaemonSetSpec {
                min_ready_seconds: base.min_ready_seconds,
                selector: LabelSelector {
                    match_labels: Some(selector.pod_selector_labels()),
                    ..Default::default()
                },
                update_strategy: base.update_strategy.clone(),
                template: PodTemplateSpec {
                    metadata: Some(ObjectMeta {
                        labels: Some(self.pod_template_labels(&selector)),
                        annotations: pod.and_then(|p| p.annotations.clone()),
                        ..Default::default()
                    }),
                    spec: Some(PodSpec {
                        service_account_name: Some(agent.service_account_name()),
                        node_selector: pod.and_then(|p| p.node_selector.clone()),
                        host_network: Some(true),
                        host_pid: Some(true),
                        priority_class_name: pod.and_then(|p| p.priority_class_name.clone()),
                        dns_policy: Some("ClusterFirstWithHostNet".into()),
                        image_pull_secrets: agent.image_pull_secrets(),
                        containers: vec![Container {
                            name: "instana-agent".into(),
                            image: base.image.as_ref().map(|img| img.image.image()),
                            image_pull_policy: base
                                .image
                                .as_ref()
                                .and_then(|img| img.image.pull_policy.clone()),
                            volume_mounts: Some(volume_mounts),
                            env: Some(env),
                            security_context: Some(SecurityContext {
                                privileged: Some(true),
                                ..Default::default()
                            }),
                            liveness_probe: Some(Probe {
                                http_get: Some(HTTPGetAction {
                                    host: Some("127.0.0.1".into()),
                                    path: Some("/status".into()),
                                    port: IntOrString::Int(AGENT_APIS_PORT),
                                    ..Default::default()
                                }),
                                initial_delay_seconds: Some(LIVENESS_INITIAL_DELAY_SECS),
                                timeout_seconds: Some(LIVENESS_TIMEOUT_SECS),
                                period_seconds: Some(LIVENESS_PERIOD_SECS),
                                failure_threshold: Some(LIVENESS_FAILURE_THRESHOLD),
                                ..Default::default()
                            }),
                            resources: Some(resources),
                            ports: Some(ports_builder.container_ports(&container_ports)),
                            ..Default::default()
                        }],
                        volumes: Some(volumes),
                        tolerations,
                        affinity,
                        ..Default::default()
                    }),
                },
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

impl ObjectBuilder for DaemonSetBuilder<'_> {
    fn build(&self) -> Option<BuiltObject> {
        let agent = self.agent;

        if !agent.has_required_settings() {
            debug!("Agent key or placement missing, skipping DaemonSet");
            return None;
        }
        // Zone daemon sets additionally require the cluster name
        if self.zone.is_some() && agent.cluster_name().is_none() {
            debug!("Zone configured without cluster name, skipping DaemonSet");
            return None;
        }

        erase(&self.build_daemonset())
    }

    fn component_name(&self) -> &'static str {
        COMPONENT_INSTANA_AGENT
    }

    fn is_namespaced(&self) -> bool {
        true
    }
}
