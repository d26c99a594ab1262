// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Remote agent keys secret builder. Suppressed when the user brings their
//! own secret via `keysSecret`.

use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use kube::ResourceExt;
use std::collections::BTreeMap;

use crate::builders::{erase, BuiltObject, ObjectBuilder};
use crate::constants::{AGENT_KEY, COMPONENT_INSTANA_AGENT_REMOTE, DOWNLOAD_KEY};
use crate::crd::RemoteAgent;

pub struct KeysSecretBuilder<'a> {
    agent: &'a RemoteAgent,
}

impl<'a> KeysSecretBuilder<'a> {
    #[must_use]
    pub fn new(agent: &'a RemoteAgent) -> Self {
        Self { agent }
    }

    fn data(&self) -> BTreeMap<String, ByteString> {
        let base = &self.agent.spec.agent;
        let mut data = BTreeMap::new();

        if let Some(key) = base.key.as_deref().filter(|k| !k.is_empty()) {
            data.insert(AGENT_KEY.to_string(), ByteString(key.as_bytes().to_vec()));
        }
        if let Some(key) = base.download_key.as_deref().filter(|k| !k.is_empty()) {
            data.insert(DOWNLOAD_KEY.to_string(), ByteString(key.as_bytes().to_vec()));
        }

        data
    }
}

impl ObjectBuilder for KeysSecretBuilder<'_> {
    fn build(&self) -> Option<BuiltObject> {
        if self
            .agent
            .spec
            .agent
            .keys_secret
            .as_deref()
            .is_some_and(|name| !name.is_empty())
        {
            return None;
        }

        erase(&Secret {
            metadata: ObjectMeta {
                name: Some(self.agent.keys_secret_name()),
                namespace: self.agent.namespace(),
                ..Default::default()
            },
            data: Some(self.data()),
            type_: Some("Opaque".into()),
            ..Default::default()
        })
    }

    fn component_name(&self) -> &'static str {
        COMPONENT_INSTANA_AGENT_REMOTE
    }

    fn is_namespaced(&self) -> bool {
        true
    }
}
