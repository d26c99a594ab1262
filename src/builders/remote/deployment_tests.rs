// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Unit tests for the remote agent Deployment builder

#[cfg(test)]
mod tests {
    use crate::builders::remote::deployment::DeploymentBuilder;
    use crate::builders::ObjectBuilder;
    use crate::crd::{BaseAgentSpec, Name, RemoteAgent, RemoteAgentSpec};
    use k8s_openapi::api::apps::v1::Deployment;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn test_agent() -> RemoteAgent {
        RemoteAgent {
            metadata: ObjectMeta {
                name: Some("web-server".into()),
                namespace: Some("instana-agent".into()),
                ..Default::default()
            },
            spec: RemoteAgentSpec {
                agent: BaseAgentSpec {
                    key: Some("key".into()),
                    endpoint_host: Some("ingress-red-saas.instana.io".into()),
                    endpoint_port: Some("443".into()),
                    ..Default::default()
                },
                hostname: Name {
                    name: Some("db01.example.com".into()),
                },
                ..Default::default()
            },
            status: None,
        }
    }

    fn deployment_of(builder: &DeploymentBuilder) -> Deployment {
        let built = builder.build().expect("Deployment should be emitted");
        serde_json::from_value(serde_json::to_value(&built.object).unwrap()).unwrap()
    }

    #[test]
    fn test_skipped_without_key_or_endpoint() {
        let mut no_key = test_agent();
        no_key.spec.agent.key = None;
        assert!(DeploymentBuilder::new(&no_key).build().is_none());

        let mut no_endpoint = test_agent();
        no_endpoint.spec.agent.endpoint_host = None;
        assert!(DeploymentBuilder::new(&no_endpoint).build().is_none());
    }

    #[test]
    fn test_single_replica_without_host_access() {
        let agent = test_agent();
        let deployment = deployment_of(&DeploymentBuilder::new(&agent));

        assert_eq!(
            deployment.metadata.name.as_deref(),
            Some("instana-agent-r-web-server")
        );

        let spec = deployment.spec.unwrap();
        assert_eq!(spec.replicas, Some(1));

        let pod_spec = spec.template.spec.unwrap();
        assert_eq!(pod_spec.host_network, None);
        assert_eq!(pod_spec.host_pid, None);

        // Only the config volume: no TLS, no repo, no host paths
        let volumes = pod_spec.volumes.unwrap();
        assert_eq!(volumes.len(), 1);
        assert_eq!(volumes[0].name, "config");
        assert_eq!(
            volumes[0].secret.as_ref().unwrap().secret_name.as_deref(),
            Some("instana-agent-r-web-server-config")
        );

        // No privileged security context on remote agents
        assert!(pod_spec.containers[0].security_context.is_none());
    }

    #[test]
    fn test_hostname_env_var() {
        let agent = test_agent();
        let deployment = deployment_of(&DeploymentBuilder::new(&agent));

        let env = deployment.spec.unwrap().template.spec.unwrap().containers[0]
            .env
            .clone()
            .unwrap();
        let hostname = env
            .iter()
            .find(|var| var.name == "INSTANA_AGENT_HOSTNAME")
            .unwrap();
        assert_eq!(hostname.value.as_deref(), Some("db01.example.com"));
    }
}
