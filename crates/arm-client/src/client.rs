//! Resource Manager REST client
//!
//! Implements every resource client trait on top of [`HttpClient`]. Paths
//! follow the provider layout:
//! `/subscriptions/{sub}/resourceGroups/{rg}/providers/{namespace}/{type}/{name}`

use crate::arm_trait::*;
use crate::common::{HttpClient, ResourceId};
use crate::error::ArmError;
use crate::models::*;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// API versions used per resource provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiVersions {
    pub network: &'static str,
    pub compute: &'static str,
    pub resource_skus: &'static str,
}

impl ApiVersions {
    /// Versions served by the public and sovereign clouds
    pub const LATEST: ApiVersions = ApiVersions {
        network: "2019-06-01",
        compute: "2019-07-01",
        resource_skus: "2019-04-01",
    };

    /// Versions served by the on-premises stack profile
    pub const STACK_PROFILE: ApiVersions = ApiVersions {
        network: "2017-10-01",
        compute: "2017-12-01",
        resource_skus: "2017-09-01",
    };
}

impl Default for ApiVersions {
    fn default() -> Self {
        Self::LATEST
    }
}

/// Resource Manager API client
#[derive(Debug)]
pub struct ArmClient {
    http: HttpClient,
    subscription_id: String,
    api_versions: ApiVersions,
}

impl ArmClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `endpoint` - Resource Manager endpoint (e.g., "https://management.azure.com/")
    /// * `subscription_id` - subscription every path is scoped to
    /// * `token` - bearer token; acquiring and refreshing it is the caller's job
    pub fn new(endpoint: String, subscription_id: String, token: String) -> Result<Self, ArmError> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;

        Ok(Self {
            http: HttpClient::new(client, endpoint, token),
            subscription_id,
            api_versions: ApiVersions::default(),
        })
    }

    /// Use a different set of API versions
    pub fn with_api_versions(mut self, api_versions: ApiVersions) -> Self {
        self.api_versions = api_versions;
        self
    }

    /// Get the Resource Manager endpoint
    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    fn network_path(&self, resource_group: &str, resource_type: &str, name: &str) -> String {
        ResourceId::network(&self.subscription_id, resource_group, resource_type, name).to_string()
    }

    fn compute_path(&self, resource_group: &str, resource_type: &str, name: &str) -> String {
        ResourceId::compute(&self.subscription_id, resource_group, resource_type, name).to_string()
    }

    fn subnet_path(&self, resource_group: &str, vnet: &str, name: &str) -> String {
        ResourceId::network(&self.subscription_id, resource_group, "virtualNetworks", vnet)
            .child("subnets", name)
            .to_string()
    }
}

#[async_trait::async_trait]
impl LoadBalancersClient for ArmClient {
    async fn get(&self, resource_group: &str, name: &str) -> Result<LoadBalancer, ArmError> {
        let path = self.network_path(resource_group, "loadBalancers", name);
        self.http.get(&path, self.api_versions.network).await
    }

    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        lb: &LoadBalancer,
    ) -> Result<LoadBalancer, ArmError> {
        let path = self.network_path(resource_group, "loadBalancers", name);
        self.http.put(&path, self.api_versions.network, lb).await
    }

    async fn delete(&self, resource_group: &str, name: &str) -> Result<(), ArmError> {
        let path = self.network_path(resource_group, "loadBalancers", name);
        self.http.delete(&path, self.api_versions.network).await
    }
}

#[async_trait::async_trait]
impl PublicIpsClient for ArmClient {
    async fn get(&self, resource_group: &str, name: &str) -> Result<PublicIpAddress, ArmError> {
        let path = self.network_path(resource_group, "publicIPAddresses", name);
        self.http.get(&path, self.api_versions.network).await
    }

    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        ip: &PublicIpAddress,
    ) -> Result<PublicIpAddress, ArmError> {
        let path = self.network_path(resource_group, "publicIPAddresses", name);
        self.http.put(&path, self.api_versions.network, ip).await
    }

    async fn delete(&self, resource_group: &str, name: &str) -> Result<(), ArmError> {
        let path = self.network_path(resource_group, "publicIPAddresses", name);
        self.http.delete(&path, self.api_versions.network).await
    }
}

#[async_trait::async_trait]
impl SubnetsClient for ArmClient {
    async fn get(&self, resource_group: &str, vnet: &str, name: &str) -> Result<Subnet, ArmError> {
        let path = self.subnet_path(resource_group, vnet, name);
        self.http.get(&path, self.api_versions.network).await
    }

    async fn create_or_update(
        &self,
        resource_group: &str,
        vnet: &str,
        name: &str,
        subnet: &Subnet,
    ) -> Result<Subnet, ArmError> {
        let path = self.subnet_path(resource_group, vnet, name);
        self.http.put(&path, self.api_versions.network, subnet).await
    }

    async fn delete(&self, resource_group: &str, vnet: &str, name: &str) -> Result<(), ArmError> {
        let path = self.subnet_path(resource_group, vnet, name);
        self.http.delete(&path, self.api_versions.network).await
    }
}

#[async_trait::async_trait]
impl VirtualNetworksClient for ArmClient {
    async fn get(&self, resource_group: &str, name: &str) -> Result<VirtualNetwork, ArmError> {
        let path = self.network_path(resource_group, "virtualNetworks", name);
        self.http.get(&path, self.api_versions.network).await
    }

    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        vnet: &VirtualNetwork,
    ) -> Result<VirtualNetwork, ArmError> {
        let path = self.network_path(resource_group, "virtualNetworks", name);
        self.http.put(&path, self.api_versions.network, vnet).await
    }

    async fn delete(&self, resource_group: &str, name: &str) -> Result<(), ArmError> {
        let path = self.network_path(resource_group, "virtualNetworks", name);
        self.http.delete(&path, self.api_versions.network).await
    }

    async fn check_ip_address_availability(
        &self,
        resource_group: &str,
        vnet: &str,
        ip_address: &str,
    ) -> Result<IpAddressAvailabilityResult, ArmError> {
        let path = format!(
            "{}/CheckIPAddressAvailability?ipAddress={}",
            self.network_path(resource_group, "virtualNetworks", vnet),
            urlencoding::encode(ip_address)
        );
        debug!("Checking availability of {} in VNet {}", ip_address, vnet);
        self.http.get(&path, self.api_versions.network).await
    }
}

#[async_trait::async_trait]
impl NetworkInterfacesClient for ArmClient {
    async fn get(&self, resource_group: &str, name: &str) -> Result<NetworkInterface, ArmError> {
        let path = self.network_path(resource_group, "networkInterfaces", name);
        self.http.get(&path, self.api_versions.network).await
    }

    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        nic: &NetworkInterface,
    ) -> Result<NetworkInterface, ArmError> {
        let path = self.network_path(resource_group, "networkInterfaces", name);
        self.http.put(&path, self.api_versions.network, nic).await
    }

    async fn delete(&self, resource_group: &str, name: &str) -> Result<(), ArmError> {
        let path = self.network_path(resource_group, "networkInterfaces", name);
        self.http.delete(&path, self.api_versions.network).await
    }
}

#[async_trait::async_trait]
impl VirtualMachinesClient for ArmClient {
    async fn get(&self, resource_group: &str, name: &str) -> Result<VirtualMachine, ArmError> {
        let path = self.compute_path(resource_group, "virtualMachines", name);
        self.http.get(&path, self.api_versions.compute).await
    }

    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        vm: &VirtualMachine,
    ) -> Result<VirtualMachine, ArmError> {
        let path = self.compute_path(resource_group, "virtualMachines", name);
        self.http.put(&path, self.api_versions.compute, vm).await
    }

    async fn delete(&self, resource_group: &str, name: &str) -> Result<(), ArmError> {
        let path = self.compute_path(resource_group, "virtualMachines", name);
        self.http.delete(&path, self.api_versions.compute).await
    }
}

#[async_trait::async_trait]
impl DisksClient for ArmClient {
    async fn delete(&self, resource_group: &str, name: &str) -> Result<(), ArmError> {
        let path = self.compute_path(resource_group, "disks", name);
        self.http.delete(&path, self.api_versions.compute).await
    }
}

#[async_trait::async_trait]
impl ResourceSkusClient for ArmClient {
    async fn list(&self, location: Option<&str>) -> Result<Vec<ResourceSku>, ArmError> {
        let mut path = format!(
            "/subscriptions/{}/providers/Microsoft.Compute/skus",
            self.subscription_id
        );
        if let Some(location) = location {
            let filter = format!("location eq '{}'", location);
            path = format!("{}?$filter={}", path, urlencoding::encode(&filter));
        }
        let url = self.http.build_url(&path, self.api_versions.resource_skus);
        self.http.fetch_all_pages(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subnet_path() {
        let client = ArmClient::new(
            "https://management.azure.com".to_string(),
            "123".to_string(),
            "token".to_string(),
        )
        .unwrap();
        assert_eq!(
            client.subnet_path("my-rg", "my-vnet", "my-subnet"),
            "/subscriptions/123/resourceGroups/my-rg/providers/Microsoft.Network/virtualNetworks/my-vnet/subnets/my-subnet"
        );
    }

    #[test]
    fn test_stack_profile_versions() {
        let client = ArmClient::new(
            "https://management.local.azurestack.external".to_string(),
            "123".to_string(),
            "token".to_string(),
        )
        .unwrap()
        .with_api_versions(ApiVersions::STACK_PROFILE);
        assert_eq!(client.api_versions.network, "2017-10-01");
        assert_eq!(client.base_url(), "https://management.local.azurestack.external");
    }
}
