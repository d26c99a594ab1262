// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Unit tests for common label and owner-reference transformations

#[cfg(test)]
mod tests {
    use crate::builders::transformations::{
        operator_version, PodSelectorLabelGenerator, Transformations,
    };
    use crate::builders::erase;
    use crate::constants::COMPONENT_INSTANA_AGENT;
    use crate::crd::{InstanaAgent, InstanaAgentSpec};
    use crate::labels::{
        GENERATION_LABEL, K8S_COMPONENT, K8S_INSTANCE, K8S_NAME, K8S_VERSION, ZONE_LABEL,
    };
    use k8s_openapi::api::core::v1::ConfigMap;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
    use std::collections::BTreeMap;

    fn test_agent() -> InstanaAgent {
        InstanaAgent {
            metadata: ObjectMeta {
                name: Some("my-agent".into()),
                namespace: Some("instana-agent".into()),
                uid: Some("uid-1".into()),
                generation: Some(7),
                ..Default::default()
            },
            spec: InstanaAgentSpec::default(),
            status: None,
        }
    }

    fn erased_config_map() -> crate::builders::BuiltObject {
        erase(&ConfigMap {
            metadata: ObjectMeta {
                name: Some("cm".into()),
                ..Default::default()
            },
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_common_labels() {
        let agent = test_agent();
        let transformations = Transformations::new(&agent);
        let mut built = erased_config_map();

        transformations.add_common_labels(&mut built.object, COMPONENT_INSTANA_AGENT);

        let labels = built.object.metadata.labels.as_ref().unwrap();
        assert_eq!(labels.get(K8S_NAME).unwrap(), "instana-agent");
        assert_eq!(labels.get(K8S_INSTANCE).unwrap(), "my-agent");
        assert_eq!(labels.get(K8S_VERSION).unwrap(), operator_version());
        assert_eq!(labels.get(K8S_COMPONENT).unwrap(), COMPONENT_INSTANA_AGENT);
        assert_eq!(labels.get(GENERATION_LABEL).unwrap(), "7");
    }

    #[test]
    fn test_common_labels_preserve_builder_labels() {
        let agent = test_agent();
        let transformations = Transformations::new(&agent);
        let mut built = erased_config_map();
        built
            .object
            .metadata
            .labels
            .get_or_insert_with(BTreeMap::new)
            .insert("app".into(), "k8sensor".into());

        transformations.add_common_labels(&mut built.object, COMPONENT_INSTANA_AGENT);

        let labels = built.object.metadata.labels.as_ref().unwrap();
        assert_eq!(labels.get("app").unwrap(), "k8sensor");
    }

    #[test]
    fn test_owner_reference_appended() {
        let agent = test_agent();
        let transformations = Transformations::new(&agent);
        let mut built = erased_config_map();

        transformations.add_owner_reference(&mut built.object);

        let owners = built.object.metadata.owner_references.as_ref().unwrap();
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].uid, "uid-1");
        assert_eq!(owners[0].block_owner_deletion, Some(true));
    }

    #[test]
    fn test_owner_reference_replaces_stale_uid() {
        let agent = test_agent();
        let transformations = Transformations::new(&agent);
        let mut built = erased_config_map();

        built.object.metadata.owner_references = Some(vec![
            OwnerReference {
                api_version: "instana.io/v1".into(),
                kind: "InstanaAgent".into(),
                name: "my-agent".into(),
                uid: "stale-uid".into(),
                ..Default::default()
            },
            OwnerReference {
                api_version: "v1".into(),
                kind: "Other".into(),
                name: "unrelated".into(),
                uid: "other-uid".into(),
                ..Default::default()
            },
        ]);

        transformations.add_owner_reference(&mut built.object);

        let owners = built.object.metadata.owner_references.as_ref().unwrap();
        assert_eq!(owners.len(), 2);
        // The unrelated reference survives, the stale one is replaced
        assert!(owners.iter().any(|r| r.name == "unrelated"));
        assert!(owners.iter().any(|r| r.uid == "uid-1"));
        assert!(!owners.iter().any(|r| r.uid == "stale-uid"));
    }

    #[test]
    fn test_owner_reference_idempotent() {
        let agent = test_agent();
        let transformations = Transformations::new(&agent);
        let mut built = erased_config_map();

        transformations.add_owner_reference(&mut built.object);
        transformations.add_owner_reference(&mut built.object);

        assert_eq!(built.object.metadata.owner_references.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_previous_generations_selector() {
        let agent = test_agent();
        let transformations = Transformations::new(&agent);

        let selector = transformations.previous_generations_selector();
        assert!(selector.contains("app.kubernetes.io/name in (instana-agent)"));
        assert!(selector.contains("app.kubernetes.io/instance in (my-agent)"));
        assert!(selector.contains("agent.instana.io/generation notin (7)"));
    }

    #[test]
    fn test_pod_selector_labels() {
        let agent = test_agent();
        let selector = PodSelectorLabelGenerator::new(&agent, COMPONENT_INSTANA_AGENT);

        let labels = selector.pod_selector_labels();
        assert_eq!(labels.len(), 3);
        assert_eq!(labels.get(K8S_INSTANCE).unwrap(), "my-agent");
        assert!(!labels.contains_key(ZONE_LABEL));
    }

    #[test]
    fn test_pod_selector_labels_with_zone() {
        let agent = test_agent();
        let selector =
            PodSelectorLabelGenerator::with_zone(&agent, COMPONENT_INSTANA_AGENT, "zone-a");

        let labels = selector.pod_selector_labels();
        assert_eq!(labels.get(ZONE_LABEL).unwrap(), "zone-a");
    }

    #[test]
    fn test_pod_labels_selector_wins_over_user_labels() {
        let agent = test_agent();
        let selector = PodSelectorLabelGenerator::new(&agent, COMPONENT_INSTANA_AGENT);

        let mut user = BTreeMap::new();
        user.insert(K8S_NAME.to_string(), "user-override".to_string());
        user.insert("custom".to_string(), "value".to_string());

        let labels = selector.pod_labels(user);
        assert_eq!(labels.get(K8S_NAME).unwrap(), "instana-agent");
        assert_eq!(labels.get("custom").unwrap(), "value");
    }
}
