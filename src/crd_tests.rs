// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Unit tests for the CRD types

#[cfg(test)]
mod tests {
    use crate::crd::{
        AgentMode, Enabled, ImageSpec, InstanaAgent, InstanaAgentSpec, OpenTelemetry,
        OpenTelemetryPortConfig, Prometheus, ResourceRequirementsSpec,
    };
    use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
    use std::collections::BTreeMap;

    #[test]
    fn test_agent_mode_wire_format() {
        assert_eq!(AgentMode::Apm.as_str(), "APM");
        assert_eq!(AgentMode::Infrastructure.as_str(), "INFRASTRUCTURE");
        assert_eq!(AgentMode::Aws.as_str(), "AWS");
        assert_eq!(AgentMode::Kubernetes.as_str(), "KUBERNETES");

        let mode: AgentMode = serde_json::from_str("\"INFRASTRUCTURE\"").unwrap();
        assert_eq!(mode, AgentMode::Infrastructure);
    }

    #[test]
    fn test_image_spec_digest_wins_over_tag() {
        let image = ImageSpec {
            name: Some("icr.io/instana/agent".into()),
            digest: Some("sha256:abc".into()),
            tag: Some("latest".into()),
            pull_policy: None,
        };
        assert_eq!(image.image(), "icr.io/instana/agent@sha256:abc");
    }

    #[test]
    fn test_image_spec_tag() {
        let image = ImageSpec {
            name: Some("icr.io/instana/agent".into()),
            digest: None,
            tag: Some("1.2.3".into()),
            pull_policy: None,
        };
        assert_eq!(image.image(), "icr.io/instana/agent:1.2.3");
    }

    #[test]
    fn test_image_spec_bare_name() {
        let image = ImageSpec {
            name: Some("icr.io/instana/agent".into()),
            ..Default::default()
        };
        assert_eq!(image.image(), "icr.io/instana/agent");
    }

    #[test]
    fn test_opentelemetry_defaults_to_enabled() {
        let otlp = OpenTelemetry::default();
        assert!(otlp.is_enabled());
        assert!(otlp.grpc_is_enabled());
        assert!(otlp.http_is_enabled());
    }

    #[test]
    fn test_opentelemetry_disabled_cascades() {
        let otlp = OpenTelemetry {
            enabled: Enabled {
                enabled: Some(false),
            },
            ..Default::default()
        };
        assert!(!otlp.is_enabled());
        assert!(!otlp.grpc_is_enabled());
        assert!(!otlp.http_is_enabled());
    }

    #[test]
    fn test_opentelemetry_per_protocol_toggle() {
        let otlp = OpenTelemetry {
            grpc: Some(OpenTelemetryPortConfig {
                enabled: Some(false),
                port: None,
            }),
            ..Default::default()
        };
        assert!(otlp.is_enabled());
        assert!(!otlp.grpc_is_enabled());
        assert!(otlp.http_is_enabled());
    }

    #[test]
    fn test_prometheus_remote_write_defaults_off() {
        assert!(!Prometheus::default().remote_write_enabled());

        let prometheus = Prometheus {
            remote_write: Some(Enabled {
                enabled: Some(true),
            }),
        };
        assert!(prometheus.remote_write_enabled());
    }

    #[test]
    fn test_resource_requirements_defaults_fill_gaps() {
        let mut requests = BTreeMap::new();
        requests.insert("memory".to_string(), Quantity("1Gi".to_string()));

        let spec = ResourceRequirementsSpec {
            requests: Some(requests),
            limits: None,
        };

        let resolved = spec.get_or_default(
            &[("memory", "768Mi"), ("cpu", "0.5")],
            &[("memory", "768Mi"), ("cpu", "1.5")],
        );

        let requests = resolved.requests.unwrap();
        // User value preserved, missing cpu defaulted
        assert_eq!(requests.get("memory").unwrap().0, "1Gi");
        assert_eq!(requests.get("cpu").unwrap().0, "0.5");

        let limits = resolved.limits.unwrap();
        assert_eq!(limits.get("memory").unwrap().0, "768Mi");
        assert_eq!(limits.get("cpu").unwrap().0, "1.5");
    }

    #[test]
    fn test_spec_deserializes_wire_field_names() {
        let yaml = r#"
agent:
  key: s3cr3t
  endpointHost: ingress-red-saas.instana.io
  endpointPort: "443"
  proxyUseDNS: true
  configuration_yaml: |
    com.instana.plugin.host:
      tags: [dev]
cluster:
  name: my-cluster
k8s_sensor:
  deployment:
    enabled: true
    replicas: 2
"#;
        let spec: InstanaAgentSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(spec.agent.key.as_deref(), Some("s3cr3t"));
        assert_eq!(
            spec.agent.endpoint_host.as_deref(),
            Some("ingress-red-saas.instana.io")
        );
        assert!(spec.agent.proxy_use_dns);
        assert!(spec.agent.configuration_yaml.is_some());
        assert_eq!(spec.cluster.name.as_deref(), Some("my-cluster"));
        assert_eq!(
            spec.k8s_sensor.deployment.as_ref().unwrap().replicas,
            Some(2)
        );
    }

    #[test]
    fn test_crd_generation() {
        use kube::CustomResourceExt;

        let crd = InstanaAgent::crd();
        assert_eq!(crd.spec.group, "instana.io");
        assert_eq!(crd.spec.names.kind, "InstanaAgent");
        assert_eq!(crd.spec.names.plural, "agents");

        let crd = crate::crd::RemoteAgent::crd();
        assert_eq!(crd.spec.names.kind, "RemoteAgent");
        assert_eq!(crd.spec.names.plural, "remoteagents");
    }
}
