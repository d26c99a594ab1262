// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! TLS secret builder.
//!
//! Only materializes when the CR carries literal certificate material; a
//! `tls.secretName` reference means the secret already exists and nothing is
//! generated.

use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::ResourceExt;
use std::collections::BTreeMap;

use crate::builders::{erase, BuiltObject, ObjectBuilder};
use crate::constants::COMPONENT_INSTANA_AGENT;
use crate::crd::InstanaAgent;

pub struct TlsSecretBuilder<'a> {
    agent: &'a InstanaAgent,
}

impl<'a> TlsSecretBuilder<'a> {
    #[must_use]
    pub fn new(agent: &'a InstanaAgent) -> Self {
        Self { agent }
    }
}

impl ObjectBuilder for TlsSecretBuilder<'_> {
    fn build(&self) -> Option<BuiltObject> {
        let tls = self.agent.spec.agent.tls.as_ref()?;

        if tls.secret_name.as_deref().is_some_and(|name| !name.is_empty()) {
            return None;
        }
        let certificate = tls.certificate.as_ref().filter(|c| !c.0.is_empty())?;
        let key = tls.key.as_ref().filter(|k| !k.0.is_empty())?;

        let mut data = BTreeMap::new();
        data.insert("tls.crt".to_string(), certificate.clone());
        data.insert("tls.key".to_string(), key.clone());

        erase(&Secret {
            metadata: ObjectMeta {
                name: Some(self.agent.tls_secret_name()),
                namespace: self.agent.namespace(),
                ..Default::default()
            },
            data: Some(data),
            type_: Some("kubernetes.io/tls".into()),
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
