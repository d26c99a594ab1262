// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Remote agent Deployment builder.
//!
//! A remote agent monitors hosts outside the cluster, so it runs as a
//! single-replica Deployment without host access: no host network, no host
//! paths, just the config, TLS and repo volumes.

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    Container, HTTPGetAction, PodSpec, PodTemplateSpec, Probe,
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
    AGENT_APIS_PORT, COMPONENT_INSTANA_AGENT_REMOTE, DEFAULT_CPU_LIMIT, DEFAULT_CPU_REQUEST,
    DEFAULT_MEMORY_LIMIT, DEFAULT_MEMORY_REQUEST, LIVENESS_FAILURE_THRESHOLD,
    LIVENESS_INITIAL_DELAY_SECS, LIVENESS_PERIOD_SECS, LIVENESS_TIMEOUT_SECS,
};
use crate::crd::{AgentMode, RemoteAgent};
use crate::labels::AGENT_MODE_LABEL;

/// Environment variables rendered into the remote agent container, in order.
const REMOTE_ENV_VARS: &[AgentEnvVar] = &[
    AgentEnvVar::AgentMode,
    AgentEnvVar::ZoneName,
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
];

/// Volumes mounted into the remote agent container, in order.
const REMOTE_VOLUMES: &[AgentVolume] =
    &[AgentVolume::Config, AgentVolume::Tls, AgentVolume::Repo];

pub struct DeploymentBuilder<'a> {
    agent: &'a RemoteAgent,
}

impl<'a> DeploymentBuilder<'a> {
    #[must_use]
    pub fn new(agent: &'a RemoteAgent) -> Self {
        Self { agent }
    }

    fn pod_template_labels(&self, selector: &PodSelectorLabelGenerator) -> BTreeMap<String, String> {
        let mut labels = self
            .agent
            .spec
            .agent
            .pod
            .as_ref()
            .and_then(|pod| pod.labels.clone())
            .unwrap_or_default();

        let mode = self.agent.spec.agent.mode.unwrap_or(AgentMode::Infrastructure);
        labels.insert(AGENT_MODE_LABEL.into(), mode.as_str().into());

        selector.pod_labels(labels)
    }

    fn build_deployment(&self) -> Deployment {
        let agent = self.agent;
        let base = &agent.spec.agent;
        let pod = base.pod.as_ref();
        let selector = PodSelectorLabelGenerator::new_remote(agent, COMPONENT_INSTANA_AGENT_REMOTE);

        debug!(
            name = %agent.remote_resources_name(),
            "Building Deployment for RemoteAgent"
        );

        let env_builder = EnvBuilder::new_remote(agent);
        let mut env = env_builder.build(REMOTE_ENV_VARS);
        if let Some(hostname) = agent.spec.hostname.name.as_deref().filter(|h| !h.is_empty()) {
            env.push(k8s_openapi::api::core::v1::EnvVar {
                name: "INSTANA_AGENT_HOSTNAME".into(),
                value: Some(hostname.into()),
                ..Default::default()
            });
        }
        let env = merge_env_vars(env, pod.and_then(|p| p.env.as_deref()).unwrap_or_default());

        let volume_builder = VolumeBuilder::new_remote(agent);
        let (mut volumes, mut volume_mounts) = volume_builder.build(REMOTE_VOLUMES);
        volumes.extend(pod.and_then(|p| p.volumes.clone()).unwrap_or_default());
        volume_mounts.extend(pod.and_then(|p| p.volume_mounts.clone()).unwrap_or_default());

        let ports_builder = PortsBuilder::new(crate::crd::OpenTelemetry::default());

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

        Deployment {
            metadata: ObjectMeta {
                name: Some(agent.remote_resources_name()),
                namespace: agent.namespace(),
                ..Default::default()
            },
            spec: Some(DeploymentSpec {
                replicas: Some(1),
                min_ready_seconds: base.min_ready_seconds,
                selector: LabelSelector {
                    match_labels: Some(selector.pod_selector_labels()),
                    ..Default::default()
                },
                template: PodTemplateSpec {
                    metadata: Some(ObjectMeta {
                        labels: Some(self.pod_template_labels(&selector)),
                        annotations: pod.and_then(|p| p.annotations.clone()),
                        ..Default::default()
                    }),
                    spec: Some(PodSpec {
                        service_account_name: Some(agent.service_account_name()),
                        node_selector: pod.and_then(|p| p.node_selector.clone()),
                        priority_class_name: pod.and_then(|p| p.priority_class_name.clone()),
                        image_pull_secrets: base
                            .image
                            .as_ref()
                            .and_then(|img| img.pull_secrets.clone()),
                        containers: vec![Container {
                            name: "instana-agent".into(),
                            image: base.image.as_ref().map(|img| img.image.image()),
                            image_pull_policy: base
                                .image
                                .as_ref()
                                .and_then(|img| img.image.pull_policy.clone()),
                            volume_mounts: Some(volume_mounts),
                            env: Some(env),
                            liveness_probe: Some(Probe {
                                http_get: Some(HTTPGetAction {
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
                            ports: Some(ports_builder.container_ports(&[AgentPort::AgentApis])),
                            ..Default::default()
                        }],
                        volumes: Some(volumes),
                        tolerations: pod.and_then(|p| p.tolerations.clone()),
                        affinity: pod.and_then(|p| p.affinity.clone()),
                        ..Default::default()
                    }),
                },
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

impl ObjectBuilder for DeploymentBuilder<'_> {
    fn build(&self) -> Option<BuiltObject> {
        if !self.agent.has_required_settings() {
            debug!("Remote agent key or endpoint missing, skipping Deployment");
            return None;
        }

        erase(&self.build_deployment())
    }

    fn component_name(&self) -> &'static str {
        COMPONENT_INSTANA_AGENT_REMOTE
    }

    fn is_namespaced(&self) -> bool {
        true
    }
}
