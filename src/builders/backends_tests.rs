// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Unit tests for the backend fan-out

#[cfg(test)]
mod tests {
    use crate::builders::backends::K8SensorBackend;
    use crate::crd::{BackendSpec, BaseAgentSpec, InstanaAgent, InstanaAgentSpec};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn test_agent() -> InstanaAgent {
        InstanaAgent {
            metadata: ObjectMeta {
                name: Some("instana-agent".into()),
                ..Default::default()
            },
            spec: InstanaAgentSpec {
                agent: BaseAgentSpec {
                    key: Some("primary-key".into()),
                    download_key: Some("download-key".into()),
                    endpoint_host: Some("ingress-red-saas.instana.io".into()),
                    endpoint_port: Some("443".into()),
                    ..Default::default()
                },
                ..Default::default()
            },
            status: None,
        }
    }

    #[test]
    fn test_primary_backend_only() {
        let backends = K8SensorBackend::from_agent(&test_agent());

        assert_eq!(backends.len(), 1);
        assert_eq!(backends[0].resource_suffix, "");
        assert_eq!(backends[0].endpoint_host, "ingress-red-saas.instana.io");
        assert_eq!(backends[0].endpoint_key.as_deref(), Some("primary-key"));
        assert_eq!(backends[0].download_key.as_deref(), Some("download-key"));
    }

    #[test]
    fn test_additional_backends_get_numbered_suffixes() {
        let mut agent = test_agent();
        agent.spec.agent.additional_backends = Some(vec![
            BackendSpec {
                endpoint_host: "ingress-blue-saas.instana.io".into(),
                endpoint_port: "443".into(),
                key: "second-key".into(),
            },
            BackendSpec {
                endpoint_host: "self-hosted.example.com".into(),
                endpoint_port: "1444".into(),
                key: "third-key".into(),
            },
        ]);

        let backends = K8SensorBackend::from_agent(&agent);

        assert_eq!(backends.len(), 3);
        assert_eq!(backends[1].resource_suffix, "-2");
        assert_eq!(backends[1].endpoint_key.as_deref(), Some("second-key"));
        assert_eq!(backends[1].download_key, None);
        assert_eq!(backends[2].resource_suffix, "-3");
        assert_eq!(backends[2].endpoint_host, "self-hosted.example.com");
    }

    #[test]
    fn test_empty_keys_collapse_to_none() {
        let mut agent = test_agent();
        agent.spec.agent.key = Some(String::new());
        agent.spec.agent.download_key = None;

        let backends = K8SensorBackend::from_agent(&agent);
        assert_eq!(backends[0].endpoint_key, None);
        assert_eq!(backends[0].download_key, None);
    }
}
