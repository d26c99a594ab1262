// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Keys secret builder.
//!
//! Holds the agent key and optional download key. Suppressed entirely when
//! the user brings their own secret via `keysSecret`. The sensor Deployment
//! of each additional backend gets its own suffixed copy carrying that
//! backend's key.

use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use kube::ResourceExt;
use std::collections::BTreeMap;

use crate::builders::{erase, BuiltObject, ObjectBuilder};
use crate::constants::{AGENT_KEY, COMPONENT_INSTANA_AGENT, DOWNLOAD_KEY};
use crate::crd::InstanaAgent;

/// Builds the keys secret for one backend.
pub struct KeysSecretBuilder<'a> {
    agent: &'a InstanaAgent,
    endpoint_key: Option<String>,
    download_key: Option<String>,
    resource_suffix: String,
}

impl<'a> KeysSecretBuilder<'a> {
    #[must_use]
    pub fn new(
        agent: &'a InstanaAgent,
        endpoint_key: Option<String>,
        download_key: Option<String>,
        resource_suffix: &str,
    ) -> Self {
        Self {
            agent,
            endpoint_key,
            download_key,
            resource_suffix: resource_suffix.to_string(),
        }
    }

    fn resource_name(&self) -> String {
        format!("{}{}", self.agent.name_any(), self.resource_suffix)
    }

    fn data(&self) -> BTreeMap<String, ByteString> {
        let mut data = BTreeMap::new();

        if let Some(key) = self.endpoint_key.as_deref().filter(|k| !k.is_empty()) {
            data.insert(AGENT_KEY.to_string(), ByteString(key.as_bytes().to_vec()));
        }
        if let Some(key) = self.download_key.as_deref().filter(|k| !k.is_empty()) {
            data.insert(DOWNLOAD_KEY.to_string(), ByteString(key.as_bytes().to_vec()));
        }

        data
    }
}

impl ObjectBuilder for KeysSecretBuilder<'_> {
    fn build(&self) -> Option<BuiltObject> {
        // User-provided secret wins; nothing to generate then
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
                name: Some(self.resource_name()),
                namespace: self.agent.namespace(),
                ..Default::default()
            },
            data: Some(self.data()),
            type_: Some("Opaque".into()),
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
