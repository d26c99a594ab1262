// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Declarative builders for every Kubernetes object the operator manages.
//!
//! Each builder implements [`ObjectBuilder`]: it either produces exactly one
//! object or nothing (`Option`), depending on the CR spec. A
//! [`BuilderTransformer`] runs a list of builders in order, stamps common
//! labels and owner references onto every emitted object, and collects the
//! non-empty results — that composition decides, per object type, whether
//! the object exists in the cluster at all.
//!
//! Builders construct typed `k8s-openapi` objects and erase them into
//! [`kube::core::DynamicObject`] via [`erase`], so heterogeneous object
//! lists flow through one apply pipeline.

use kube::core::{ApiResource, DynamicObject};
use kube::Resource;
use serde_json::Value;
use tracing::error;

use crate::builders::transformations::Transformations;

pub mod backends;
pub mod env;
pub mod ports;
pub mod transformations;
pub mod volume;

pub mod agent;
pub mod k8s_sensor;
pub mod remote;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod mod_tests;

/// A type-erased Kubernetes object together with the API coordinates needed
/// to apply it.
#[derive(Clone, Debug)]
pub struct BuiltObject {
    /// Group/version/kind/plural used to address the object's API.
    pub resource: ApiResource,
    /// The object itself, apiVersion and kind populated.
    pub object: DynamicObject,
    /// Whether the object lives in the CR's namespace.
    pub namespaced: bool,
}

impl BuiltObject {
    /// Name of the erased object (objects without a name never leave a
    /// builder).
    #[must_use]
    pub fn name(&self) -> String {
        self.object.metadata.name.clone().unwrap_or_default()
    }

    /// Namespace of the erased object, if set.
    #[must_use]
    pub fn namespace(&self) -> Option<String> {
        self.object.metadata.namespace.clone()
    }

    /// Kind of the erased object.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.resource.kind
    }
}

/// Erase a typed Kubernetes object into a [`BuiltObject`].
///
/// `k8s-openapi` structs serialize without `apiVersion`/`kind`, so both are
/// injected from the type's resource metadata. Returns `None` (and logs) on
/// the serialization failures that well-formed API objects cannot produce.
#[must_use]
pub fn erase<K>(obj: &K) -> Option<BuiltObject>
where
    K: Resource<DynamicType = ()> + serde::Serialize,
{
    let mut data = match serde_json::to_value(obj) {
        Ok(value) => value,
        Err(e) => {
            error!(kind = %K::kind(&()), error = %e, "Failed to serialize object");
            return None;
        }
    };

    if let Value::Object(map) = &mut data {
        map.insert(
            "apiVersion".to_string(),
            Value::String(K::api_version(&()).into_owned()),
        );
        map.insert("kind".to_string(), Value::String(K::kind(&()).into_owned()));
    }

    let object: DynamicObject = match serde_json::from_value(data) {
        Ok(object) => object,
        Err(e) => {
            error!(kind = %K::kind(&()), error = %e, "Failed to erase object");
            return None;
        }
    };

    Some(BuiltObject {
        resource: ApiResource::erase::<K>(&()),
        object,
        namespaced: true,
    })
}

/// Contract implemented by every object builder: produce the object, or
/// nothing when the spec says it should not exist.
pub trait ObjectBuilder: Send + Sync {
    /// The object, or `None` when the spec disables it.
    fn build(&self) -> Option<BuiltObject>;

    /// Component value stamped into `app.kubernetes.io/component`.
    fn component_name(&self) -> &'static str;

    /// Whether the object is namespaced (namespaced objects get an owner
    /// reference to the CR; cluster-scoped ones cannot).
    fn is_namespaced(&self) -> bool;
}

/// Runs builders and applies the common transformations to each emitted
/// object.
pub struct BuilderTransformer {
    transformations: Transformations,
}

impl BuilderTransformer {
    #[must_use]
    pub fn new(transformations: Transformations) -> Self {
        Self { transformations }
    }

    /// Run a single builder; label the result and, for namespaced objects,
    /// attach the owner reference. Emptiness is preserved.
    #[must_use]
    pub fn apply(&self, builder: &dyn ObjectBuilder) -> Option<BuiltObject> {
        let mut built = builder.build()?;
        self.transformations
            .add_common_labels(&mut built.object, builder.component_name());
        if builder.is_namespaced() {
            self.transformations.add_owner_reference(&mut built.object);
        }
        built.namespaced = builder.is_namespaced();
        Some(built)
    }

    /// Run all builders in order and collect the non-empty results,
    /// preserving relative order.
    #[must_use]
    pub fn build_all(&self, builders: &[&dyn ObjectBuilder]) -> Vec<BuiltObject> {
        builders
            .iter()
            .filter_map(|builder| self.apply(*builder))
            .collect()
    }
}
