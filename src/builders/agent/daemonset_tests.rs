// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Unit tests for the agent DaemonSet builder

#[cfg(test)]
mod tests {
    use crate::builders::agent::daemonset::DaemonSetBuilder;
    use crate::builders::ObjectBuilder;
    use crate::crd::{
        AgentPodSpec, BaseAgentSpec, ExtendedImageSpec, ImageSpec, InstanaAgent, InstanaAgentSpec,
        Name, Zone,
    };
    use crate::labels::{AGENT_MODE_LABEL, ZONE_LABEL};
    use k8s_openapi::api::apps::v1::DaemonSet;
    use k8s_openapi::api::core::v1::EnvVar;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn test_agent() -> InstanaAgent {
        InstanaAgent {
            metadata: ObjectMeta {
                name: Some("instana-agent".into()),
                namespace: Some("instana-agent".into()),
                ..Default::default()
            },
            spec: InstanaAgentSpec {
                agent: BaseAgentSpec {
                    key: Some("key".into()),
                    endpoint_host: Some("ingress-red-saas.instana.io".into()),
                    endpoint_port: Some("443".into()),
                    image: Some(ExtendedImageSpec {
                        image: ImageSpec {
                            name: Some("icr.io/instana/agent".into()),
                            tag: Some("latest".into()),
                            pull_policy: Some("Always".into()),
                            ..Default::default()
                        },
                        pull_secrets: None,
                    }),
                    ..Default::default()
                },
                cluster: Name {
                    name: Some("my-cluster".into()),
                },
                ..Default::default()
            },
            status: None,
        }
    }

    fn daemonset_of(builder: &DaemonSetBuilder) -> DaemonSet {
        let built = builder.build().expect("DaemonSet should be emitted");
        serde_json::from_value(serde_json::to_value(&built.object).unwrap()).unwrap()
    }

    #[test]
    fn test_skipped_without_key() {
        let mut agent = test_agent();
        agent.spec.agent.key = None;

        assert!(DaemonSetBuilder::new(&agent, false).build().is_none());
    }

    #[test]
    fn test_skipped_without_placement() {
        let mut agent = test_agent();
        agent.spec.cluster = Name::default();

        assert!(DaemonSetBuilder::new(&agent, false).build().is_none());
    }

    #[test]
    fn test_zone_requires_cluster_name() {
        let mut agent = test_agent();
        agent.spec.cluster = Name::default();
        agent.spec.zone = Name {
            name: Some("zone-a".into()),
        };
        let zone = Zone {
            name: Name {
                name: Some("zone-a".into()),
            },
            ..Default::default()
        };

        assert!(DaemonSetBuilder::with_zone(&agent, false, &zone).build().is_none());
    }

    #[test]
    fn test_basic_daemonset_shape() {
        let agent = test_agent();
        let builder = DaemonSetBuilder::new(&agent, false);
        let ds = daemonset_of(&builder);

        assert_eq!(ds.metadata.name.as_deref(), Some("instana-agent"));

        let spec = ds.spec.unwrap();
        let template = spec.template;
        let pod_spec = template.spec.unwrap();

        assert_eq!(pod_spec.host_network, Some(true));
        assert_eq!(pod_spec.host_pid, Some(true));
        assert_eq!(pod_spec.dns_policy.as_deref(), Some("ClusterFirstWithHostNet"));
        assert_eq!(pod_spec.service_account_name.as_deref(), Some("instana-agent"));

        let container = &pod_spec.containers[0];
        assert_eq!(container.name, "instana-agent");
        assert_eq!(container.image.as_deref(), Some("icr.io/instana/agent:latest"));
        assert_eq!(
            container.security_context.as_ref().unwrap().privileged,
            Some(true)
        );

        // Selector labels must match the pod template labels
        let selector = spec.selector.match_labels.unwrap();
        let pod_labels = template.metadata.unwrap().labels.unwrap();
        for (key, value) in &selector {
            assert_eq!(pod_labels.get(key), Some(value));
        }
        assert_eq!(pod_labels.get(AGENT_MODE_LABEL).map(String::as_str), Some("APM"));
    }

    #[test]
    fn test_env_vars_sorted_and_pod_env_wins() {
        let mut agent = test_agent();
        agent.spec.agent.pod = Some(AgentPodSpec {
            env: Some(vec![EnvVar {
                name: "INSTANA_AGENT_ENDPOINT".into(),
                value: Some("override.example.com".into()),
                ..Default::default()
            }]),
            ..Default::default()
        });

        let builder = DaemonSetBuilder::new(&agent, false);
        let ds = daemonset_of(&builder);
        let env = ds.spec.unwrap().template.spec.unwrap().containers[0]
            .env
            .clone()
            .unwrap();

        let names: Vec<&str> = env.iter().map(|var| var.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);

        let endpoint = env
            .iter()
            .find(|var| var.name == "INSTANA_AGENT_ENDPOINT")
            .unwrap();
        assert_eq!(endpoint.value.as_deref(), Some("override.example.com"));
    }

    #[test]
    fn test_zone_daemonset_name_and_scheduling() {
        let mut agent = test_agent();
        agent.spec.zones = Some(vec![]);
        let zone = Zone {
            name: Name {
                name: Some("zone-a".into()),
            },
            tolerations: Some(vec![k8s_openapi::api::core::v1::Toleration {
                key: Some("zone".into()),
                operator: Some("Exists".into()),
                ..Default::default()
            }]),
            ..Default::default()
        };

        let builder = DaemonSetBuilder::with_zone(&agent, false, &zone);
        let ds = daemonset_of(&builder);

        assert_eq!(ds.metadata.name.as_deref(), Some("instana-agent-zone-a"));

        let spec = ds.spec.unwrap();
        let selector = spec.selector.match_labels.unwrap();
        assert_eq!(selector.get(ZONE_LABEL).map(String::as_str), Some("zone-a"));

        let pod_spec = spec.template.spec.unwrap();
        assert_eq!(pod_spec.tolerations.unwrap()[0].key.as_deref(), Some("zone"));
    }

    #[test]
    fn test_openshift_drops_kubo_volumes() {
        let agent = test_agent();

        let vanilla = daemonset_of(&DaemonSetBuilder::new(&agent, false));
        let openshift = daemonset_of(&DaemonSetBuilder::new(&agent, true));

        let count = |ds: &DaemonSet| {
            ds.spec
                .as_ref()
                .unwrap()
                .template
                .spec
                .as_ref()
                .unwrap()
                .volumes
                .as_ref()
                .unwrap()
                .len()
        };

        assert_eq!(count(&vanilla), count(&openshift) + 3);
    }
}
