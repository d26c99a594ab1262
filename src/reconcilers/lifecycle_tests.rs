// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Unit tests for dependent lifecycle bookkeeping

#[cfg(test)]
mod tests {
    use crate::reconcilers::lifecycle::{generation_key, parse_refs, DependentRef};

    #[test]
    fn test_generation_key_includes_version_and_generation() {
        let key = generation_key(Some(4));
        assert!(key.starts_with('v'));
        assert!(key.ends_with("-generation-4"));

        assert!(generation_key(None).ends_with("-generation-0"));
    }

    #[test]
    fn test_dependent_refs_roundtrip() {
        let refs = vec![
            DependentRef {
                api_version: "apps/v1".into(),
                kind: "DaemonSet".into(),
                name: "instana-agent".into(),
                namespace: Some("instana-agent".into()),
            },
            DependentRef {
                api_version: "rbac.authorization.k8s.io/v1".into(),
                kind: "ClusterRole".into(),
                name: "instana-agent".into(),
                namespace: None,
            },
        ];

        let recorded = serde_json::to_string(&refs).unwrap();
        let parsed = parse_refs("v0.1.0-generation-1", &recorded);
        assert_eq!(parsed, refs);
    }

    #[test]
    fn test_unparseable_record_yields_nothing() {
        assert!(parse_refs("key", "not json").is_empty());
    }
}
