// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Unit tests for the builder composition pipeline

#[cfg(test)]
mod tests {
    use crate::builders::transformations::Transformations;
    use crate::builders::{erase, BuilderTransformer, BuiltObject, ObjectBuilder};
    use crate::crd::{InstanaAgent, InstanaAgentSpec};
    use crate::labels::{K8S_COMPONENT, K8S_MANAGED_BY, K8S_NAME};
    use k8s_openapi::api::core::v1::ConfigMap;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn test_agent() -> InstanaAgent {
        InstanaAgent {
            metadata: ObjectMeta {
                name: Some("instana-agent".into()),
                namespace: Some("instana-agent".into()),
                uid: Some("agent-uid".into()),
                generation: Some(3),
                ..Default::default()
            },
            spec: InstanaAgentSpec::default(),
            status: None,
        }
    }

    struct StaticBuilder {
        emit: bool,
        namespaced: bool,
    }

    impl ObjectBuilder for StaticBuilder {
        fn build(&self) -> Option<BuiltObject> {
            if !self.emit {
                return None;
            }
            erase(&ConfigMap {
                metadata: ObjectMeta {
                    name: Some("test-cm".into()),
                    namespace: Some("instana-agent".into()),
                    ..Default::default()
                },
                ..Default::default()
            })
        }

        fn component_name(&self) -> &'static str {
            "instana-agent"
        }

        fn is_namespaced(&self) -> bool {
            self.namespaced
        }
    }

    #[test]
    fn test_erase_populates_type_meta() {
        let built = erase(&ConfigMap {
            metadata: ObjectMeta {
                name: Some("test-cm".into()),
                ..Default::default()
            },
            ..Default::default()
        })
        .unwrap();

        assert_eq!(built.kind(), "ConfigMap");
        assert_eq!(built.name(), "test-cm");
        let types = built.object.types.as_ref().unwrap();
        assert_eq!(types.api_version, "v1");
        assert_eq!(types.kind, "ConfigMap");
    }

    #[test]
    fn test_transformer_preserves_emptiness() {
        let agent = test_agent();
        let transformer = BuilderTransformer::new(Transformations::new(&agent));

        let empty = StaticBuilder {
            emit: false,
            namespaced: true,
        };
        assert!(transformer.apply(&empty).is_none());
    }

    #[test]
    fn test_transformer_stamps_labels_and_owner() {
        let agent = test_agent();
        let transformer = BuilderTransformer::new(Transformations::new(&agent));

        let builder = StaticBuilder {
            emit: true,
            namespaced: true,
        };
        let built = transformer.apply(&builder).unwrap();

        let labels = built.object.metadata.labels.as_ref().unwrap();
        assert_eq!(labels.get(K8S_NAME).unwrap(), "instana-agent");
        assert_eq!(labels.get(K8S_COMPONENT).unwrap(), "instana-agent");
        assert_eq!(labels.get(K8S_MANAGED_BY).unwrap(), "instana-agent-operator");

        let owners = built.object.metadata.owner_references.as_ref().unwrap();
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].name, "instana-agent");
        assert_eq!(owners[0].uid, "agent-uid");
        assert_eq!(owners[0].controller, Some(true));
    }

    #[test]
    fn test_transformer_skips_owner_for_cluster_scoped() {
        let agent = test_agent();
        let transformer = BuilderTransformer::new(Transformations::new(&agent));

        let builder = StaticBuilder {
            emit: true,
            namespaced: false,
        };
        let built = transformer.apply(&builder).unwrap();

        assert!(built.object.metadata.owner_references.is_none());
        assert!(!built.namespaced);
    }

    #[test]
    fn test_build_all_collects_non_empty_in_order() {
        let agent = test_agent();
        let transformer = BuilderTransformer::new(Transformations::new(&agent));

        let first = StaticBuilder {
            emit: true,
            namespaced: true,
        };
        let skipped = StaticBuilder {
            emit: false,
            namespaced: true,
        };
        let last = StaticBuilder {
            emit: true,
            namespaced: false,
        };

        let objects = transformer.build_all(&[&first, &skipped, &last]);

        assert_eq!(objects.len(), 2);
        assert!(objects[0].namespaced);
        assert!(!objects[1].namespaced);
    }
}
