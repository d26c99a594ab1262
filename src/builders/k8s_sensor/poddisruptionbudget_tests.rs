// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Unit tests for the sensor PodDisruptionBudget builder

#[cfg(test)]
mod tests {
    use crate::builders::k8s_sensor::poddisruptionbudget::PodDisruptionBudgetBuilder;
    use crate::builders::ObjectBuilder;
    use crate::crd::{
        BaseAgentSpec, Enabled, InstanaAgent, InstanaAgentSpec, K8sSpec, KubernetesDeploymentSpec,
    };
    use k8s_openapi::api::policy::v1::PodDisruptionBudget;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

    fn test_agent(pdb_enabled: Option<bool>, replicas: Option<i32>) -> InstanaAgent {
        InstanaAgent {
            metadata: ObjectMeta {
                name: Some("instana-agent".into()),
                namespace: Some("instana-agent".into()),
                ..Default::default()
            },
            spec: InstanaAgentSpec {
                agent: BaseAgentSpec::default(),
                k8s_sensor: K8sSpec {
                    deployment: replicas.map(|replicas| KubernetesDeploymentSpec {
                        replicas: Some(replicas),
                        ..Default::default()
                    }),
                    pod_disruption_budget: pdb_enabled.map(|enabled| Enabled {
                        enabled: Some(enabled),
                    }),
                    ..Default::default()
                },
                ..Default::default()
            },
            status: None,
        }
    }

    #[test]
    fn test_disabled_by_default() {
        let agent = test_agent(None, None);
        assert!(PodDisruptionBudgetBuilder::new(&agent).build().is_none());

        let agent = test_agent(Some(false), None);
        assert!(PodDisruptionBudgetBuilder::new(&agent).build().is_none());
    }

    #[test]
    fn test_min_available_is_replicas_minus_one() {
        let agent = test_agent(Some(true), Some(5));
        let built = PodDisruptionBudgetBuilder::new(&agent).build().unwrap();
        let pdb: PodDisruptionBudget =
            serde_json::from_value(serde_json::to_value(&built.object).unwrap()).unwrap();

        assert_eq!(
            pdb.metadata.name.as_deref(),
            Some("instana-agent-k8sensor")
        );
        assert_eq!(
            pdb.spec.unwrap().min_available,
            Some(IntOrString::Int(4))
        );
    }

    #[test]
    fn test_min_available_uses_default_replicas() {
        let agent = test_agent(Some(true), None);
        let built = PodDisruptionBudgetBuilder::new(&agent).build().unwrap();
        let pdb: PodDisruptionBudget =
            serde_json::from_value(serde_json::to_value(&built.object).unwrap()).unwrap();

        assert_eq!(pdb.spec.unwrap().min_available, Some(IntOrString::Int(2)));
    }
}
