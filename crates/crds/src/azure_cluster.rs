//! AzureCluster CRD
//!
//! Declares the cluster-wide infrastructure: resource group, network layout
//! and the ordered list of load balancers to converge.

use crate::types::{LoadBalancerSpec, NetworkSpec, Tags};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "infrastructure.cluster.x-k8s.io",
    version = "v1alpha3",
    kind = "AzureCluster",
    namespaced,
    status = "AzureClusterStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct AzureClusterSpec {
    /// Resource group every cluster resource is created in
    pub resource_group: String,

    /// Region (e.g. "eastus")
    pub location: String,

    /// Subscription override; falls back to `AZURE_SUBSCRIPTION_ID`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,

    pub network_spec: NetworkSpec,

    /// Load balancers, reconciled in list order
    #[serde(default)]
    pub load_balancers: Vec<LoadBalancerSpec>,

    /// Extra tags applied to every resource
    #[serde(default)]
    pub additional_tags: Tags,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct AzureClusterStatus {
    /// Infrastructure is provisioned
    #[serde(default)]
    pub ready: bool,

    /// Last error that stopped reconciliation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_message: Option<String>,

    /// Last reconciliation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reconciled: Option<chrono::DateTime<chrono::Utc>>,
}

impl AzureCluster {
    /// Cluster name (the object's `metadata.name`)
    pub fn cluster_name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DEFAULT_API_SERVER_PORT, LoadBalancerRole, SubnetRole};

    const MANIFEST: &str = r#"
apiVersion: infrastructure.cluster.x-k8s.io/v1alpha3
kind: AzureCluster
metadata:
  name: my-cluster
  namespace: default
spec:
  resourceGroup: my-rg
  location: eastus
  networkSpec:
    vnet:
      name: my-vnet
    subnets:
      - role: control-plane
        name: my-cp-subnet
        cidrBlock: 10.0.0.0/16
  loadBalancers:
    - name: my-publiclb
      role: APIServer
      publicIpName: my-publicip
    - name: my-internallb
      role: Internal
      subnetName: my-cp-subnet
      subnetCidr: 10.0.0.0/16
      apiServerPort: 443
"#;

    #[test]
    fn test_parse_manifest() {
        let cluster: AzureCluster = serde_yaml::from_str(MANIFEST).unwrap();
        assert_eq!(cluster.cluster_name(), "my-cluster");

        let spec = &cluster.spec;
        assert_eq!(spec.network_spec.vnet.resource_group, "");
        assert_eq!(spec.network_spec.subnets[0].role, SubnetRole::ControlPlane);
        assert!(spec.additional_tags.is_empty());

        let lbs = &spec.load_balancers;
        assert_eq!(lbs.len(), 2);
        assert_eq!(lbs[0].role, LoadBalancerRole::ApiServer);
        assert_eq!(lbs[0].api_server_port, DEFAULT_API_SERVER_PORT);
        assert_eq!(lbs[1].role, LoadBalancerRole::Internal);
        assert_eq!(lbs[1].api_server_port, 443);
        assert_eq!(lbs[1].preferred_private_ip, None);
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(
            serde_json::to_value(LoadBalancerRole::ApiServer).unwrap(),
            "APIServer"
        );
        assert_eq!(
            serde_json::from_value::<LoadBalancerRole>(serde_json::json!("NodeOutbound")).unwrap(),
            LoadBalancerRole::NodeOutbound
        );
    }
}
