// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Integration test over the full builder surface: renders the complete
//! object set for a fully specified `InstanaAgent` the way the reconciler
//! does, without touching a cluster.

use instana_agent_operator::builders::agent::config_secret::ConfigSecretBuilder;
use instana_agent_operator::builders::agent::daemonset::DaemonSetBuilder;
use instana_agent_operator::builders::agent::keys_secret::KeysSecretBuilder;
use instana_agent_operator::builders::agent::pull_secret::ContainersSecretBuilder;
use instana_agent_operator::builders::agent::rbac as agent_rbac;
use instana_agent_operator::builders::agent::service::{HeadlessServiceBuilder, ServiceBuilder};
use instana_agent_operator::builders::agent::tls_secret::TlsSecretBuilder;
use instana_agent_operator::builders::backends::K8SensorBackend;
use instana_agent_operator::builders::k8s_sensor;
use instana_agent_operator::builders::transformations::Transformations;
use instana_agent_operator::builders::{BuilderTransformer, BuiltObject, ObjectBuilder};
use instana_agent_operator::crd::{
    BackendSpec, BaseAgentSpec, Enabled, InstanaAgent, InstanaAgentSpec, K8sSpec,
    KubernetesDeploymentSpec, Name, Zone,
};
use instana_agent_operator::labels::{GENERATION_LABEL, K8S_INSTANCE, K8S_NAME};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

fn full_agent() -> InstanaAgent {
    InstanaAgent {
        metadata: ObjectMeta {
            name: Some("instana-agent".into()),
            namespace: Some("instana-agent".into()),
            uid: Some("agent-uid".into()),
            generation: Some(1),
            ..Default::default()
        },
        spec: InstanaAgentSpec {
            agent: BaseAgentSpec {
                key: Some("primary-key".into()),
                download_key: Some("download-key".into()),
                endpoint_host: Some("ingress-red-saas.instana.io".into()),
                endpoint_port: Some("443".into()),
                additional_backends: Some(vec![BackendSpec {
                    endpoint_host: "ingress-blue-saas.instana.io".into(),
                    endpoint_port: "443".into(),
                    key: "second-key".into(),
                }]),
                ..Default::default()
            },
            cluster: Name {
                name: Some("my-cluster".into()),
            },
            k8s_sensor: K8sSpec {
                deployment: Some(KubernetesDeploymentSpec {
                    enabled: Enabled {
                        enabled: Some(true),
                    },
                    replicas: Some(3),
                    ..Default::default()
                }),
                pod_disruption_budget: Some(Enabled {
                    enabled: Some(true),
                }),
                ..Default::default()
            },
            ..Default::default()
        },
        status: None,
    }
}

/// Mirror of the reconciler's builder list.
fn render_all(agent: &InstanaAgent, backends: &[K8SensorBackend]) -> Vec<BuiltObject> {
    let mut builders: Vec<Box<dyn ObjectBuilder + '_>> = Vec::new();

    builders.push(Box::new(ConfigSecretBuilder::new(agent, "", None)));
    for backend in backends {
        builders.push(Box::new(KeysSecretBuilder::new(
            agent,
            backend.endpoint_key.clone(),
            backend.download_key.clone(),
            &backend.resource_suffix,
        )));
    }
    builders.push(Box::new(TlsSecretBuilder::new(agent)));
    builders.push(Box::new(ContainersSecretBuilder::new(agent)));

    match agent.spec.zones.as_deref() {
        Some(zones) if !zones.is_empty() => {
            for zone in zones {
                builders.push(Box::new(DaemonSetBuilder::with_zone(agent, false, zone)));
            }
        }
        _ => builders.push(Box::new(DaemonSetBuilder::new(agent, false))),
    }

    builders.push(Box::new(HeadlessServiceBuilder::new(agent)));
    builders.push(Box::new(ServiceBuilder::new(agent)));
    builders.push(Box::new(agent_rbac::ServiceAccountBuilder::new(agent)));
    builders.push(Box::new(agent_rbac::ClusterRoleBuilder::new(agent)));
    builders.push(Box::new(agent_rbac::ClusterRoleBindingBuilder::new(agent)));

    builders.push(Box::new(k8s_sensor::configmap::ConfigMapBuilder::new(
        agent, backends,
    )));
    builders.push(Box::new(k8s_sensor::rbac::ServiceAccountBuilder::new(agent)));
    builders.push(Box::new(k8s_sensor::rbac::RoleBuilder::new(agent)));
    builders.push(Box::new(k8s_sensor::rbac::RoleBindingBuilder::new(agent)));
    builders.push(Box::new(k8s_sensor::rbac::ClusterRoleBuilder::new(agent)));
    builders.push(Box::new(k8s_sensor::rbac::ClusterRoleBindingBuilder::new(agent)));
    builders.push(Box::new(
        k8s_sensor::poddisruptionbudget::PodDisruptionBudgetBuilder::new(agent),
    ));
    for backend in backends {
        builders.push(Box::new(k8s_sensor::deployment::DeploymentBuilder::new(
            agent, backend, false,
        )));
    }

    let transformer = BuilderTransformer::new(Transformations::new(agent));
    let builder_refs: Vec<&dyn ObjectBuilder> =
        builders.iter().map(|builder| builder.as_ref()).collect();
    transformer.build_all(&builder_refs)
}

#[test]
fn full_object_set_for_two_backends() {
    let agent = full_agent();
    let backends = K8SensorBackend::from_agent(&agent);
    assert_eq!(backends.len(), 2);

    let objects = render_all(&agent, &backends);

    let kinds: Vec<&str> = objects.iter().map(instana_agent_operator::builders::BuiltObject::kind).collect();

    // Config secret + two keys secrets (no TLS, no pull secret for a
    // non-Instana registry)
    assert_eq!(kinds.iter().filter(|k| **k == "Secret").count(), 3);
    assert_eq!(kinds.iter().filter(|k| **k == "DaemonSet").count(), 1);
    // Service is implied by the OTLP default plus the headless service
    assert_eq!(kinds.iter().filter(|k| **k == "Service").count(), 2);
    assert_eq!(kinds.iter().filter(|k| **k == "ServiceAccount").count(), 2);
    assert_eq!(kinds.iter().filter(|k| **k == "ClusterRole").count(), 2);
    assert_eq!(kinds.iter().filter(|k| **k == "ClusterRoleBinding").count(), 2);
    assert_eq!(kinds.iter().filter(|k| **k == "Role").count(), 1);
    assert_eq!(kinds.iter().filter(|k| **k == "RoleBinding").count(), 1);
    assert_eq!(kinds.iter().filter(|k| **k == "ConfigMap").count(), 1);
    assert_eq!(kinds.iter().filter(|k| **k == "PodDisruptionBudget").count(), 1);
    // One sensor Deployment per backend
    assert_eq!(kinds.iter().filter(|k| **k == "Deployment").count(), 2);
}

#[test]
fn every_object_carries_common_labels() {
    let agent = full_agent();
    let backends = K8SensorBackend::from_agent(&agent);
    let objects = render_all(&agent, &backends);

    for object in &objects {
        let labels = object
            .object
            .metadata
            .labels
            .as_ref()
            .unwrap_or_else(|| panic!("{} has no labels", object.name()));
        assert_eq!(labels.get(K8S_NAME).map(String::as_str), Some("instana-agent"));
        assert_eq!(labels.get(K8S_INSTANCE).map(String::as_str), Some("instana-agent"));
        assert_eq!(labels.get(GENERATION_LABEL).map(String::as_str), Some("1"));
    }
}

#[test]
fn namespaced_objects_carry_owner_reference() {
    let agent = full_agent();
    let backends = K8SensorBackend::from_agent(&agent);
    let objects = render_all(&agent, &backends);

    for object in &objects {
        let owners = object.object.metadata.owner_references.as_deref();
        if object.namespaced {
            let owners = owners.unwrap_or_else(|| panic!("{} has no owner", object.name()));
            assert_eq!(owners[0].uid, "agent-uid");
        } else {
            assert!(owners.is_none(), "{} should not be owned", object.name());
        }
    }
}

#[test]
fn zones_fan_out_into_one_daemonset_each() {
    let mut agent = full_agent();
    agent.spec.zones = Some(vec![
        Zone {
            name: Name {
                name: Some("zone-a".into()),
            },
            ..Default::default()
        },
        Zone {
            name: Name {
                name: Some("zone-b".into()),
            },
            ..Default::default()
        },
    ]);

    let backends = K8SensorBackend::from_agent(&agent);
    let objects = render_all(&agent, &backends);

    let daemonsets: Vec<String> = objects
        .iter()
        .filter(|object| object.kind() == "DaemonSet")
        .map(instana_agent_operator::builders::BuiltObject::name)
        .collect();
    assert_eq!(daemonsets, vec!["instana-agent-zone-a", "instana-agent-zone-b"]);
}

#[test]
fn gating_removes_workloads_but_keeps_config() {
    let mut agent = full_agent();
    agent.spec.agent.key = None;
    agent.spec.agent.keys_secret = None;

    let backends = K8SensorBackend::from_agent(&agent);
    let objects = render_all(&agent, &backends);

    let kinds: Vec<&str> = objects.iter().map(instana_agent_operator::builders::BuiltObject::kind).collect();
    assert!(!kinds.contains(&"DaemonSet"));
    assert!(!kinds.contains(&"Deployment"));
    // Config secret and RBAC are still rendered
    assert!(kinds.contains(&"Secret"));
    assert!(kinds.contains(&"ClusterRole"));
}
