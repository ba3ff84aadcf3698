//! Test utilities for unit testing services
//!
//! Builds scopes and clients with the fixture names used across the tests:
//! subscription "123", resource group "my-rg", virtual network "my-vnet",
//! cluster "my-cluster".

#[cfg(test)]
use crate::config::{CloudConfig, SUBSCRIPTION_ID_ENV};
#[cfg(test)]
use crate::scope::{ClientSet, ClusterScope, MachineRole, MachineScope};
#[cfg(test)]
use arm_client::MockArmClient;
#[cfg(test)]
use crds::*;
#[cfg(test)]
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
#[cfg(test)]
use std::sync::Arc;

/// Public-cloud configuration with subscription "123"
#[cfg(test)]
pub fn test_config() -> CloudConfig {
    CloudConfig::from_lookup(|key| (key == SUBSCRIPTION_ID_ENV).then(|| "123".to_string()))
        .expect("public cloud config")
}

/// Helper to create a test AzureCluster
#[cfg(test)]
pub fn create_test_cluster(load_balancers: Vec<LoadBalancerSpec>) -> AzureCluster {
    AzureCluster {
        metadata: ObjectMeta {
            name: Some("my-cluster".to_string()),
            namespace: Some("default".to_string()),
            ..Default::default()
        },
        spec: AzureClusterSpec {
            resource_group: "my-rg".to_string(),
            location: "testlocation".to_string(),
            subscription_id: None,
            network_spec: NetworkSpec {
                vnet: VnetSpec {
                    resource_group: "my-rg".to_string(),
                    name: "my-vnet".to_string(),
                    cidr_block: Some("10.0.0.0/8".to_string()),
                },
                subnets: vec![
                    SubnetSpec {
                        role: SubnetRole::ControlPlane,
                        name: "my-cp-subnet".to_string(),
                        cidr_block: "10.0.0.0/16".to_string(),
                        security_group: None,
                        route_table: None,
                    },
                    SubnetSpec {
                        role: SubnetRole::Node,
                        name: "my-node-subnet".to_string(),
                        cidr_block: "10.1.0.0/16".to_string(),
                        security_group: None,
                        route_table: None,
                    },
                ],
            },
            load_balancers,
            additional_tags: Tags::new(),
        },
        status: None,
    }
}

/// Helper to create a test ClusterScope
#[cfg(test)]
pub fn create_test_cluster_scope(load_balancers: Vec<LoadBalancerSpec>) -> Arc<ClusterScope> {
    let cluster = create_test_cluster(load_balancers);
    Arc::new(ClusterScope::new(&cluster, test_config()).expect("cluster scope"))
}

/// Helper to create a test AzureMachine
#[cfg(test)]
pub fn create_test_machine(name: &str) -> AzureMachine {
    AzureMachine {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some("default".to_string()),
            ..Default::default()
        },
        spec: AzureMachineSpec {
            vm_size: "Standard_D2s_v3".to_string(),
            failure_domain: Some("1".to_string()),
            image: Some(Image::Marketplace(MarketplaceImage {
                publisher: "cncf-upstream".to_string(),
                offer: "capi".to_string(),
                sku: "k8s-1dot18dot2-ubuntu-1804".to_string(),
                version: "latest".to_string(),
            })),
            identity: VmIdentity::None,
            user_assigned_identities: Vec::new(),
            os_disk: OsDisk {
                os_type: "Linux".to_string(),
                disk_size_gb: 30,
                managed_disk: ManagedDisk {
                    storage_account_type: "Premium_LRS".to_string(),
                },
                diff_disk_settings: None,
            },
            data_disks: Vec::new(),
            ssh_public_key: String::new(),
            additional_tags: Tags::new(),
            accelerated_networking: None,
            allocate_public_ip: false,
        },
        status: None,
    }
}

/// Helper to create a test MachineScope for a (possibly customized) machine
#[cfg(test)]
pub fn create_test_machine_scope(machine: &AzureMachine, role: MachineRole) -> Arc<MachineScope> {
    Arc::new(
        MachineScope::new(create_test_cluster_scope(Vec::new()), machine, role)
            .expect("machine scope"),
    )
}

/// Mock client and a client set backed by it
#[cfg(test)]
pub fn create_test_clients() -> (Arc<MockArmClient>, ClientSet) {
    let mock = Arc::new(MockArmClient::new("123"));
    let clients = ClientSet::from_client(mock.clone());
    (mock, clients)
}

/// Load balancer spec with the default API server port
#[cfg(test)]
pub fn lb_spec(name: &str, role: LoadBalancerRole) -> LoadBalancerSpec {
    LoadBalancerSpec {
        name: name.to_string(),
        role,
        subnet_name: String::new(),
        subnet_cidr: String::new(),
        preferred_private_ip: None,
        public_ip_name: String::new(),
        api_server_port: DEFAULT_API_SERVER_PORT,
    }
}
