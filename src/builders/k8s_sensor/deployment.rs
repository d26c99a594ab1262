// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes sensor Deployment builder.
//!
//! The sensor runs as a small Deployment per backend instead of inside every
//! agent pod, so its (mostly memory) requirements can be tuned independently
//! of the DaemonSet. Sensor replicas shard work among themselves via the
//! `app: k8sensor` label — removing that label breaks the sensor.

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    Affinity, Container, EnvVar, EnvVarSource, PodAffinityTerm, PodAntiAffinity, PodSpec,
    PodTemplateSpec, SecretKeySelector, WeightedPodAffinityTerm,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{
    LabelSelector, LabelSelectorRequirement, ObjectMeta,
};
use kube::ResourceExt;
use std::collections::BTreeMap;
use tracing::debug;

use crate::builders::backends::K8SensorBackend;
use crate::builders::env::{backend_from_config_map, AgentEnvVar, EnvBuilder};
use crate::builders::ports::{AgentPort, PortsBuilder};
use crate::builders::transformations::PodSelectorLabelGenerator;
use crate::builders::volume::{AgentVolume, VolumeBuilder};
use crate::builders::{erase, BuiltObject, ObjectBuilder};
use crate::constants::{
    AGENT_KEY, BACKEND_KEY, COMPONENT_K8SENSOR, DEFAULT_CPU_LIMIT, DEFAULT_CPU_REQUEST,
    DEFAULT_MEMORY_LIMIT, DEFAULT_MEMORY_REQUEST,
};
use crate::crd::{AgentMode, InstanaAgent, KubernetesDeploymentSpec, KubernetesPodSpec};
use crate::labels::AGENT_MODE_LABEL;

/// Default number of sensor replicas.
const DEFAULT_REPLICAS: i32 = 3;

/// Environment variables rendered into the sensor container, in order
/// (after the per-backend `BACKEND`/`AGENT_KEY` pair).
const SENSOR_ENV_VARS: &[AgentEnvVar] = &[
    AgentEnvVar::BackendUrl,
    AgentEnvVar::AgentZone,
    AgentEnvVar::PodUid,
    AgentEnvVar::PodNamespace,
    AgentEnvVar::PodName,
    AgentEnvVar::PodIp,
    AgentEnvVar::HttpsProxy,
    AgentEnvVar::NoProxy,
    AgentEnvVar::RedactK8sSecrets,
    AgentEnvVar::ConfigPath,
];

/// Builds the sensor Deployment for one backend.
pub struct DeploymentBuilder<'a> {
    agent: &'a InstanaAgent,
    backend: &'a K8SensorBackend,
    is_openshift: bool,
}

impl<'a> DeploymentBuilder<'a> {
    #[must_use]
    pub fn new(
        agent: &'a InstanaAgent,
        backend: &'a K8SensorBackend,
        is_openshift: bool,
    ) -> Self {
        Self {
            agent,
            backend,
            is_openshift,
        }
    }

    fn deployment_spec(&self) -> KubernetesDeploymentSpec {
        self.agent
            .spec
            .k8s_sensor
            .deployment
            .clone()
            .unwrap_or_default()
    }

    fn pod_spec(&self) -> KubernetesPodSpec {
        self.deployment_spec().pod.unwrap_or_default()
    }

    /// Per-backend `BACKEND` and `AGENT_KEY` variables. Additional backends
    /// read their key from the suffixed keys secret.
    fn backend_env_vars(&self) -> Vec<EnvVar> {
        let config_map_name = self.agent.k8s_sensor_resources_name();
        let keys_secret_name = format!(
            "{}{}",
            self.agent.keys_secret_name(),
            self.backend.resource_suffix
        );

        vec![
            backend_from_config_map(
                &config_map_name,
                &format!("{BACKEND_KEY}{}", self.backend.resource_suffix),
            ),
            EnvVar {
                name: "AGENT_KEY".into(),
                value_from: Some(EnvVarSource {
                    secret_key_ref: Some(SecretKeySelector {
                        name: keys_secret_name,
                        key: AGENT_KEY.into(),
                        optional: None,
                    }),
                    ..Default::default()
                }),
                ..Default::default()
            },
        ]
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
        labels.insert(AGENT_MODE_LABEL.into(), AgentMode::Kubernetes.as_str().into());
        add_app_label(selector.pod_labels(labels))
    }

    fn default_affinity(&self) -> Affinity {
        // Spread sensor replicas across nodes
        Affinity {
            pod_anti_affinity: Some(PodAntiAffinity {
                preferred_during_scheduling_ignored_during_execution: Some(vec![
                    WeightedPodAffinityTerm {
                        weight: 100,
                        pod_affinity_term: PodAffinityTerm {
                            label_selector: Some(LabelSelector {
                                match_expressions: Some(vec![LabelSelectorRequirement {
                                    key: AGENT_MODE_LABEL.into(),
                                    operator: "In".into(),
                                    values: Some(vec![AgentMode::Kubernetes.as_str().into()]),
                                }]),
                                ..Default::default()
                            }),
                            topology_key: "kubernetes.io/hostname".into(),
                            ..Default::default()
                        },
                    },
                ]),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn build_deployment(&self) -> Deployment {
        let agent = self.agent;
        let deployment_spec = self.deployment_spec();
        let pod_spec = self.pod_spec();
        let selector = PodSelectorLabelGenerator::new(agent, COMPONENT_K8SENSOR);

        debug!(
            name = %agent.k8s_sensor_resources_name(),
            suffix = %self.backend.resource_suffix,
            "Building k8sensor Deployment"
        );

        let env_builder = EnvBuilder::new(agent, None);
        let mut env = self.backend_env_vars();
        env.extend(env_builder.build(SENSOR_ENV_VARS));

        let volume_builder = VolumeBuilder::new(agent, self.is_openshift);
        let (volumes, volume_mounts) = volume_builder.build(&[AgentVolume::Config]);

        let ports_builder = PortsBuilder::new(agent.spec.opentelemetry.clone());

        let resources = pod_spec.resources.get_or_default(
            &[
                ("memory", DEFAULT_MEMORY_REQUEST),
                ("cpu", DEFAULT_CPU_REQUEST),
            ],
            &[("memory", DEFAULT_MEMORY_LIMIT), ("cpu", DEFAULT_CPU_LIMIT)],
        );

        Deployment {
            metadata: ObjectMeta {
                name: Some(format!(
                    "{}{}",
                    agent.k8s_sensor_resources_name(),
                    self.backend.resource_suffix
                )),
                namespace: agent.namespace(),
                labels: Some(add_app_label(BTreeMap::new())),
                ..Default::default()
            },
            spec: Some(DeploymentSpec {
                replicas: Some(deployment_spec.replicas.unwrap_or(DEFAULT_REPLICAS)),
                min_ready_seconds: deployment_spec.min_ready_seconds,
                selector: LabelSelector {
                    match_labels: Some(add_app_label(selector.pod_selector_labels())),
                    ..Default::default()
                },
                template: PodTemplateSpec {
                    metadata: Some(ObjectMeta {
                        labels: Some(self.pod_template_labels(&selector)),
                        annotations: agent
                            .spec
                            .agent
                            .pod
                            .as_ref()
                            .and_then(|pod| pod.annotations.clone()),
                        ..Default::default()
                    }),
                    spec: Some(PodSpec {
                        service_account_name: Some(agent.k8s_sensor_resources_name()),
                        node_selector: pod_spec.node_selector.clone(),
                        priority_class_name: pod_spec.priority_class_name.clone(),
                        image_pull_secrets: agent.image_pull_secrets(),
                        containers: vec![Container {
                            name: "instana-agent".into(),
                            image: agent
                                .spec
                                .k8s_sensor
                                .image
                                .as_ref()
                                .map(crate::crd::ImageSpec::image),
                            image_pull_policy: agent
                                .spec
                                .k8s_sensor
                                .image
                                .as_ref()
                                .and_then(|img| img.pull_policy.clone()),
                            env: Some(env),
                            volume_mounts: Some(volume_mounts),
                            resources: Some(resources),
                            ports: Some(ports_builder.container_ports(&[AgentPort::AgentApis])),
                            ..Default::default()
                        }],
                        volumes: Some(volumes),
                        tolerations: pod_spec.tolerations.clone(),
                        affinity: Some(
                            pod_spec
                                .affinity
                                .clone()
                                .unwrap_or_else(|| self.default_affinity()),
                        ),
                        ..Default::default()
                    }),
                },
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

/// The sensor relies on this label for its internal sharding; resources stay
/// selectable by it regardless of user labels.
fn add_app_label(mut labels: BTreeMap<String, String>) -> BTreeMap<String, String> {
    labels
        .entry("app".to_string())
        .or_insert_with(|| "k8sensor".to_string());
    labels
}

impl ObjectBuilder for DeploymentBuilder<'_> {
    fn build(&self) -> Option<BuiltObject> {
        if !self.agent.has_required_settings() {
            debug!("Agent key or placement missing, skipping k8sensor Deployment");
            return None;
        }

        erase(&self.build_deployment())
    }

    fn component_name(&self) -> &'static str {
        COMPONENT_K8SENSOR
    }

    fn is_namespaced(&self) -> bool {
        true
    }
}
