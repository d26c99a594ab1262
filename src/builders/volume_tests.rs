// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Unit tests for the volume registry

#[cfg(test)]
mod tests {
    use crate::builders::volume::{AgentVolume, VolumeBuilder};
    use crate::crd::{
        BaseAgentSpec, HostSpec, InstanaAgent, InstanaAgentSpec, TlsSpec,
    };
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use k8s_openapi::ByteString;

    fn test_agent() -> InstanaAgent {
        InstanaAgent {
            metadata: ObjectMeta {
                name: Some("instana-agent".into()),
                namespace: Some("instana-agent".into()),
                ..Default::default()
            },
            spec: InstanaAgentSpec {
                agent: BaseAgentSpec::default(),
                ..Default::default()
            },
            status: None,
        }
    }

    #[test]
    fn test_host_volumes_carry_mount_propagation() {
        let agent = test_agent();
        let builder = VolumeBuilder::new(&agent, false);

        let (volumes, mounts) = builder.build(&[AgentVolume::Dev, AgentVolume::Sys]);

        assert_eq!(volumes.len(), 2);
        assert_eq!(volumes[0].name, "dev");
        assert_eq!(volumes[0].host_path.as_ref().unwrap().path, "/dev");
        assert_eq!(mounts[0].mount_propagation.as_deref(), Some("HostToContainer"));
        assert_eq!(mounts[1].mount_path, "/sys");
    }

    #[test]
    fn test_kubo_volumes_dropped_on_openshift() {
        let agent = test_agent();

        let on_vanilla = VolumeBuilder::new(&agent, false);
        let (volumes, _) = on_vanilla.build(&[
            AgentVolume::VarRunKubo,
            AgentVolume::VarRunContainerd,
            AgentVolume::VarContainerdConfig,
        ]);
        assert_eq!(volumes.len(), 3);

        let on_openshift = VolumeBuilder::new(&agent, true);
        let (volumes, mounts) = on_openshift.build(&[
            AgentVolume::VarRunKubo,
            AgentVolume::VarRunContainerd,
            AgentVolume::VarContainerdConfig,
        ]);
        assert!(volumes.is_empty());
        assert!(mounts.is_empty());
    }

    #[test]
    fn test_config_volume_points_at_config_secret() {
        let agent = test_agent();
        let builder = VolumeBuilder::new(&agent, false);

        let (volumes, mounts) = builder.build(&[AgentVolume::Config]);

        let secret = volumes[0].secret.as_ref().unwrap();
        assert_eq!(secret.secret_name.as_deref(), Some("instana-agent-config"));
        assert_eq!(secret.default_mode, Some(0o440));
        assert_eq!(
            mounts[0].mount_path,
            "/opt/instana/agent/etc/instana-config-yml"
        );
    }

    #[test]
    fn test_tls_volume_requires_tls_configuration() {
        let agent = test_agent();
        let builder = VolumeBuilder::new(&agent, false);
        let (volumes, _) = builder.build(&[AgentVolume::Tls]);
        assert!(volumes.is_empty());

        let mut with_tls = test_agent();
        with_tls.spec.agent.tls = Some(TlsSpec {
            certificate: Some(ByteString(b"cert".to_vec())),
            key: Some(ByteString(b"key".to_vec())),
            ..Default::default()
        });
        let builder = VolumeBuilder::new(&with_tls, false);
        let (volumes, mounts) = builder.build(&[AgentVolume::Tls]);

        assert_eq!(volumes.len(), 1);
        assert_eq!(
            volumes[0].secret.as_ref().unwrap().secret_name.as_deref(),
            Some("instana-agent-tls")
        );
        assert_eq!(mounts[0].read_only, Some(true));
    }

    #[test]
    fn test_repo_volume_requires_host_repository() {
        let agent = test_agent();
        let builder = VolumeBuilder::new(&agent, false);
        let (volumes, _) = builder.build(&[AgentVolume::Repo]);
        assert!(volumes.is_empty());

        let mut with_repo = test_agent();
        with_repo.spec.agent.host = Some(HostSpec {
            repository: Some("/mnt/agent-repo".into()),
        });
        let builder = VolumeBuilder::new(&with_repo, false);
        let (volumes, mounts) = builder.build(&[AgentVolume::Repo]);

        assert_eq!(volumes[0].host_path.as_ref().unwrap().path, "/mnt/agent-repo");
        assert_eq!(mounts[0].mount_path, "/opt/instana/agent/data/repo");
    }

    #[test]
    fn test_order_preserved_around_dropped_entries() {
        let agent = test_agent();
        let builder = VolumeBuilder::new(&agent, true);

        let (volumes, _) = builder.build(&[
            AgentVolume::Dev,
            AgentVolume::VarRunKubo, // dropped on OpenShift
            AgentVolume::MachineId,
        ]);

        assert_eq!(volumes.len(), 2);
        assert_eq!(volumes[0].name, "dev");
        assert_eq!(volumes[1].name, "machine-id");
    }
}
