// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Unit tests for the apply pipeline error types

#[cfg(test)]
mod tests {
    use crate::operator_errors::ApplyError;

    #[test]
    fn test_aggregate_message_carries_counts_and_details() {
        let error = ApplyError::Aggregate {
            failed: 2,
            total: 17,
            details: "DaemonSet/instana-agent: denied; Secret/instana-agent-config: denied".into(),
        };

        let message = error.to_string();
        assert!(message.contains("2 of 17"));
        assert!(message.contains("DaemonSet/instana-agent"));
    }

    #[test]
    fn test_delete_message_names_the_object() {
        let error = ApplyError::Delete {
            kind: "ClusterRole".into(),
            name: "instana-agent-k8sensor".into(),
            source: kube::Error::Api(Box::new(kube::core::ErrorResponse {
                status: Some(kube::core::response::StatusSummary::Failure),
                message: "forbidden".into(),
                reason: "Forbidden".into(),
                code: 403,
                details: None,
                metadata: None,
            })),
        };

        let message = error.to_string();
        assert!(message.contains("ClusterRole"));
        assert!(message.contains("instana-agent-k8sensor"));
    }
}
