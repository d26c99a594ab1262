// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Unit tests for the resource name helpers

#[cfg(test)]
mod tests {
    use crate::crd::{
        BaseAgentSpec, Create, ExtendedImageSpec, ImageSpec, InstanaAgent, InstanaAgentSpec, Name,
        RemoteAgent, RemoteAgentSpec, ServiceAccountSpec, TlsSpec,
    };
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use k8s_openapi::ByteString;

    fn test_agent(name: &str) -> InstanaAgent {
        InstanaAgent {
            metadata: ObjectMeta {
                name: Some(name.into()),
                namespace: Some("instana-agent".into()),
                ..Default::default()
            },
            spec: InstanaAgentSpec {
                agent: BaseAgentSpec {
                    key: Some("key".into()),
                    endpoint_host: Some("ingress-red-saas.instana.io".into()),
                    endpoint_port: Some("443".into()),
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

    #[test]
    fn test_service_account_name_defaults_to_cr_name() {
        let agent = test_agent("instana-agent");
        assert_eq!(agent.service_account_name(), "instana-agent");
    }

    #[test]
    fn test_service_account_name_default_when_create_disabled() {
        let mut agent = test_agent("instana-agent");
        agent.spec.service_account = ServiceAccountSpec {
            create: Create {
                create: Some(false),
            },
            ..Default::default()
        };
        assert_eq!(agent.service_account_name(), "default");
    }

    #[test]
    fn test_service_account_name_override_wins() {
        let mut agent = test_agent("instana-agent");
        agent.spec.service_account.name = Name {
            name: Some("custom-sa".into()),
        };
        assert_eq!(agent.service_account_name(), "custom-sa");
    }

    #[test]
    fn test_keys_secret_name() {
        let mut agent = test_agent("instana-agent");
        assert_eq!(agent.keys_secret_name(), "instana-agent");

        agent.spec.agent.keys_secret = Some("my-keys".into());
        assert_eq!(agent.keys_secret_name(), "my-keys");
    }

    #[test]
    fn test_derived_names() {
        let agent = test_agent("instana-agent");
        assert_eq!(agent.config_secret_name(), "instana-agent-config");
        assert_eq!(agent.headless_service_name(), "instana-agent-headless");
        assert_eq!(agent.k8s_sensor_resources_name(), "instana-agent-k8sensor");
        assert_eq!(
            agent.containers_secret_name(),
            "instana-agent-containers-instana-io"
        );
    }

    #[test]
    fn test_tls_disabled_by_default() {
        let agent = test_agent("instana-agent");
        assert!(!agent.tls_is_enabled());
    }

    #[test]
    fn test_tls_enabled_via_secret_name() {
        let mut agent = test_agent("instana-agent");
        agent.spec.agent.tls = Some(TlsSpec {
            secret_name: Some("my-tls".into()),
            ..Default::default()
        });
        assert!(agent.tls_is_enabled());
        assert_eq!(agent.tls_secret_name(), "my-tls");
    }

    #[test]
    fn test_tls_enabled_via_literal_material() {
        let mut agent = test_agent("instana-agent");
        agent.spec.agent.tls = Some(TlsSpec {
            certificate: Some(ByteString(b"cert".to_vec())),
            key: Some(ByteString(b"key".to_vec())),
            ..Default::default()
        });
        assert!(agent.tls_is_enabled());
        assert_eq!(agent.tls_secret_name(), "instana-agent-tls");
    }

    #[test]
    fn test_use_containers_secret_requires_registry_match() {
        let mut agent = test_agent("instana-agent");
        assert!(!agent.use_containers_secret());

        agent.spec.agent.image = Some(ExtendedImageSpec {
            image: ImageSpec {
                name: Some("containers.instana.io/instana/agent".into()),
                ..Default::default()
            },
            pull_secrets: None,
        });
        assert!(agent.use_containers_secret());

        // An explicitly empty pull secret list opts out of the generated one
        agent.spec.agent.image.as_mut().unwrap().pull_secrets = Some(vec![]);
        assert!(!agent.use_containers_secret());
    }

    #[test]
    fn test_image_pull_secrets_generated() {
        let mut agent = test_agent("instana-agent");
        agent.spec.agent.image = Some(ExtendedImageSpec {
            image: ImageSpec {
                name: Some("containers.instana.io/instana/agent".into()),
                ..Default::default()
            },
            pull_secrets: None,
        });

        let secrets = agent.image_pull_secrets().unwrap();
        assert_eq!(secrets.len(), 1);
        assert_eq!(secrets[0].name, "instana-agent-containers-instana-io");
    }

    #[test]
    fn test_has_required_settings() {
        let agent = test_agent("instana-agent");
        assert!(agent.has_required_settings());

        let mut no_key = test_agent("instana-agent");
        no_key.spec.agent.key = None;
        assert!(!no_key.has_required_settings());

        let mut no_placement = test_agent("instana-agent");
        no_placement.spec.cluster = Name::default();
        assert!(!no_placement.has_required_settings());

        // A keys secret substitutes for the literal key
        let mut secret_key = test_agent("instana-agent");
        secret_key.spec.agent.key = None;
        secret_key.spec.agent.keys_secret = Some("my-keys".into());
        assert!(secret_key.has_required_settings());
    }

    #[test]
    fn test_remote_agent_names() {
        let agent = RemoteAgent {
            metadata: ObjectMeta {
                name: Some("web-server".into()),
                namespace: Some("instana-agent".into()),
                ..Default::default()
            },
            spec: RemoteAgentSpec {
                agent: BaseAgentSpec {
                    key: Some("key".into()),
                    endpoint_host: Some("ingress-red-saas.instana.io".into()),
                    ..Default::default()
                },
                ..Default::default()
            },
            status: None,
        };

        assert_eq!(agent.remote_resources_name(), "instana-agent-r-web-server");
        assert_eq!(
            agent.config_secret_name(),
            "instana-agent-r-web-server-config"
        );
        assert_eq!(
            agent.headless_service_name(),
            "instana-agent-r-web-server-headless"
        );
        assert!(agent.has_required_settings());
    }
}
