// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Enum-keyed volume registry for agent pods.
//!
//! The host agent needs a fixed catalogue of host-path mounts to observe the
//! node (container runtimes, logs, machine id) plus secret-backed mounts for
//! its configuration and TLS material. Workload builders request volumes by
//! [`AgentVolume`] key; keys whose preconditions are not met resolve to
//! nothing, preserving order for the rest.

use k8s_openapi::api::core::v1::{HostPathVolumeSource, SecretVolumeSource, Volume, VolumeMount};

use crate::constants::{INSTANA_CERTS_DIRECTORY, INSTANA_CONFIG_DIRECTORY, INSTANA_REPO_DIRECTORY};
use crate::crd::{InstanaAgent, RemoteAgent};

/// Secret volumes are mounted read-only for owner and group.
const SECRET_FILE_MODE: i32 = 0o440;

/// A volume together with the mount that exposes it in the agent container.
#[derive(Clone, Debug, PartialEq)]
pub struct VolumeWithMount {
    pub volume: Volume,
    pub volume_mount: VolumeMount,
}

/// Every volume a workload builder can request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentVolume {
    /// `/dev` host devices
    Dev,
    /// `/run` runtime sockets
    Run,
    /// `/var/run` legacy runtime sockets
    VarRun,
    /// Kubo (BOSH) docker socket, not present on OpenShift
    VarRunKubo,
    /// Kubo containerd socket, not present on OpenShift
    VarRunContainerd,
    /// Kubo containerd config, not present on OpenShift
    VarContainerdConfig,
    /// `/sys` kernel state
    Sys,
    /// `/var/log` host logs
    VarLog,
    /// `/var/lib` container state
    VarLib,
    /// `/var/data` host data
    VarData,
    /// `/etc/machine-id` host identity
    MachineId,
    /// Generated config secret
    Config,
    /// TLS secret, only when TLS is configured
    Tls,
    /// Host-path Maven repository, only when `host.repository` is set
    Repo,
}

/// Resolves [`AgentVolume`] keys for one CR.
pub struct VolumeBuilder {
    config_secret_name: String,
    tls_secret_name: Option<String>,
    repo_path: Option<String>,
    is_openshift: bool,
}

impl VolumeBuilder {
    /// Registry for the host agent DaemonSet and the sensor Deployment.
    #[must_use]
    pub fn new(agent: &InstanaAgent, is_openshift: bool) -> Self {
        Self {
            config_secret_name: agent.config_secret_name(),
            tls_secret_name: agent.tls_is_enabled().then(|| agent.tls_secret_name()),
            repo_path: agent
                .spec
                .agent
                .host
                .as_ref()
                .and_then(|host| host.repository.clone())
                .filter(|path| !path.is_empty()),
            is_openshift,
        }
    }

    /// Registry for the remote agent Deployment. Remote agents never mount
    /// host paths, so the OpenShift distinction does not apply.
    #[must_use]
    pub fn new_remote(agent: &RemoteAgent) -> Self {
        Self {
            config_secret_name: agent.config_secret_name(),
            tls_secret_name: agent.tls_is_enabled().then(|| agent.tls_secret_name()),
            repo_path: agent
                .spec
                .agent
                .host
                .as_ref()
                .and_then(|host| host.repository.clone())
                .filter(|path| !path.is_empty()),
            is_openshift: false,
        }
    }

    /// Resolve the requested volumes in order, dropping the ones whose
    /// preconditions are not met, and split them into the pod's volume list
    /// and the container's mount list.
    #[must_use]
    pub fn build(&self, volumes: &[AgentVolume]) -> (Vec<Volume>, Vec<VolumeMount>) {
        volumes
            .iter()
            .filter_map(|volume| self.build_volume(*volume))
            .map(|vwm| (vwm.volume, vwm.volume_mount))
            .unzip()
    }

    fn build_volume(&self, volume: AgentVolume) -> Option<VolumeWithMount> {
        match volume {
            AgentVolume::Dev => Some(host_volume_with_mount("dev", "/dev", None)),
            AgentVolume::Run => Some(host_volume_with_mount("run", "/run", None)),
            AgentVolume::VarRun => Some(host_volume_with_mount("var-run", "/var/run", None)),
            AgentVolume::VarRunKubo => self.when_not_openshift(host_volume_with_mount(
                "var-run-kubo",
                "/var/vcap/sys/run/docker",
                Some("DirectoryOrCreate"),
            )),
            AgentVolume::VarRunContainerd => self.when_not_openshift(host_volume_with_mount(
                "var-run-containerd",
                "/var/vcap/sys/run/containerd",
                Some("DirectoryOrCreate"),
            )),
            AgentVolume::VarContainerdConfig => self.when_not_openshift(host_volume_with_mount(
                "var-containerd-config",
                "/var/vcap/jobs/containerd/config",
                Some("DirectoryOrCreate"),
            )),
            AgentVolume::Sys => Some(host_volume_with_mount("sys", "/sys", None)),
            AgentVolume::VarLog => Some(host_volume_with_mount("var-log", "/var/log", None)),
            AgentVolume::VarLib => Some(host_volume_with_mount("var-lib", "/var/lib", None)),
            AgentVolume::VarData => Some(host_volume_with_mount(
                "var-data",
                "/var/data",
                Some("DirectoryOrCreate"),
            )),
            AgentVolume::MachineId => {
                // No mount propagation on a single file
                Some(VolumeWithMount {
                    volume: Volume {
                        name: "machine-id".into(),
                        host_path: Some(HostPathVolumeSource {
                            path: "/etc/machine-id".into(),
                            type_: None,
                        }),
                        ..Default::default()
                    },
                    volume_mount: VolumeMount {
                        name: "machine-id".into(),
                        mount_path: "/etc/machine-id".into(),
                        ..Default::default()
                    },
                })
            }
            AgentVolume::Config => Some(secret_volume_with_mount(
                "config",
                &self.config_secret_name,
                INSTANA_CONFIG_DIRECTORY,
                false,
            )),
            AgentVolume::Tls => self.tls_secret_name.as_ref().map(|secret_name| {
                secret_volume_with_mount(
                    "instana-agent-tls",
                    secret_name,
                    INSTANA_CERTS_DIRECTORY,
                    true,
                )
            }),
            AgentVolume::Repo => self.repo_path.as_ref().map(|path| VolumeWithMount {
                volume: Volume {
                    name: "repo".into(),
                    host_path: Some(HostPathVolumeSource {
                        path: path.clone(),
                        type_: None,
                    }),
                    ..Default::default()
                },
                volume_mount: VolumeMount {
                    name: "repo".into(),
                    mount_path: INSTANA_REPO_DIRECTORY.into(),
                    ..Default::default()
                },
            }),
        }
    }

    fn when_not_openshift(&self, vwm: VolumeWithMount) -> Option<VolumeWithMount> {
        if self.is_openshift {
            None
        } else {
            Some(vwm)
        }
    }
}

fn host_volume_with_mount(
    name: &str,
    path: &str,
    host_path_type: Option<&str>,
) -> VolumeWithMount {
    VolumeWithMount {
        volume: Volume {
            name: name.into(),
            host_path: Some(HostPathVolumeSource {
                path: path.into(),
                type_: host_path_type.map(Into::into),
            }),
            ..Default::default()
        },
        volume_mount: VolumeMount {
            name: name.into(),
            mount_path: path.into(),
            mount_propagation: Some("HostToContainer".into()),
            ..Default::default()
        },
    }
}

fn secret_volume_with_mount(
    name: &str,
    secret_name: &str,
    mount_path: &str,
    read_only: bool,
) -> VolumeWithMount {
    VolumeWithMount {
        volume: Volume {
            name: name.into(),
            secret: Some(SecretVolumeSource {
                secret_name: Some(secret_name.into()),
                default_mode: Some(SECRET_FILE_MODE),
                ..Default::default()
            }),
            ..Default::default()
        },
        volume_mount: VolumeMount {
            name: name.into(),
            mount_path: mount_path.into(),
            read_only: read_only.then_some(true),
            ..Default::default()
        },
    }
}

#[cfg(test)]
#[path = "volume_tests.rs"]
mod volume_tests;
