// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Image pull secret builder for `containers.instana.io`.
//!
//! When the agent image is pulled from the Instana registry and the user did
//! not provide pull secrets of their own, a docker config secret is
//! generated that authenticates as `_` with the download key (falling back
//! to the agent key).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use kube::ResourceExt;
use serde_json::json;
use std::collections::BTreeMap;

use crate::builders::{erase, BuiltObject, ObjectBuilder};
use crate::constants::{COMPONENT_INSTANA_AGENT, CONTAINERS_INSTANA_IO_REGISTRY};
use crate::crd::InstanaAgent;

pub struct ContainersSecretBuilder<'a> {
    agent: &'a InstanaAgent,
}

impl<'a> ContainersSecretBuilder<'a> {
    #[must_use]
    pub fn new(agent: &'a InstanaAgent) -> Self {
        Self { agent }
    }

    fn docker_config_json(&self) -> Option<Vec<u8>> {
        let base = &self.agent.spec.agent;
        let password = base
            .download_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .or_else(|| base.key.as_deref().filter(|key| !key.is_empty()))?;

        let auth = BASE64.encode(format!("_:{password}"));
        let config = json!({
            "auths": {
                CONTAINERS_INSTANA_IO_REGISTRY: {
                    "auth": auth,
                }
            }
        });

        serde_json::to_vec(&config).ok()
    }
}

impl ObjectBuilder for ContainersSecretBuilder<'_> {
    fn build(&self) -> Option<BuiltObject> {
        if !self.agent.use_containers_secret() {
            return None;
        }

        let mut data = BTreeMap::new();
        data.insert(
            ".dockerconfigjson".to_string(),
            ByteString(self.docker_config_json()?),
        );

        erase(&Secret {
            metadata: ObjectMeta {
                name: Some(self.agent.containers_secret_name()),
                namespace: self.agent.namespace(),
                ..Default::default()
            },
            data: Some(data),
            type_: Some("kubernetes.io/dockerconfigjson".into()),
            ..Default::default()
        })
    }

    fn component_name(&self) -> &'static str {
        COMPONENT_INSTANA_AGENT
    }

    fn is_namespaced(&self) -> bool {
        true
    }
}
