//! Per-resource-kind client traits
//!
//! Each trait wraps a single resource type of the provider API. The REST
//! adapter ([`crate::ArmClient`]) implements all of them, and so does the
//! in-memory mock behind the `test-util` feature, so services can be unit
//! tested without a subscription.
//!
//! All async methods must be `Send` to work with Tokio's work-stealing runtime.

use crate::error::ArmError;
use crate::models::*;

/// Load balancer operations
#[async_trait::async_trait]
pub trait LoadBalancersClient: Send + Sync {
    async fn get(&self, resource_group: &str, name: &str) -> Result<LoadBalancer, ArmError>;
    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        lb: &LoadBalancer,
    ) -> Result<LoadBalancer, ArmError>;
    async fn delete(&self, resource_group: &str, name: &str) -> Result<(), ArmError>;
}

/// Public IP address operations
#[async_trait::async_trait]
pub trait PublicIpsClient: Send + Sync {
    async fn get(&self, resource_group: &str, name: &str) -> Result<PublicIpAddress, ArmError>;
    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        ip: &PublicIpAddress,
    ) -> Result<PublicIpAddress, ArmError>;
    async fn delete(&self, resource_group: &str, name: &str) -> Result<(), ArmError>;
}

/// Subnet operations (subnets are children of a virtual network)
#[async_trait::async_trait]
pub trait SubnetsClient: Send + Sync {
    async fn get(&self, resource_group: &str, vnet: &str, name: &str) -> Result<Subnet, ArmError>;
    async fn create_or_update(
        &self,
        resource_group: &str,
        vnet: &str,
        name: &str,
        subnet: &Subnet,
    ) -> Result<Subnet, ArmError>;
    async fn delete(&self, resource_group: &str, vnet: &str, name: &str) -> Result<(), ArmError>;
}

/// Virtual network operations
#[async_trait::async_trait]
pub trait VirtualNetworksClient: Send + Sync {
    async fn get(&self, resource_group: &str, name: &str) -> Result<VirtualNetwork, ArmError>;
    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        vnet: &VirtualNetwork,
    ) -> Result<VirtualNetwork, ArmError>;
    async fn delete(&self, resource_group: &str, name: &str) -> Result<(), ArmError>;

    /// Ask whether `ip_address` is free inside the virtual network
    async fn check_ip_address_availability(
        &self,
        resource_group: &str,
        vnet: &str,
        ip_address: &str,
    ) -> Result<IpAddressAvailabilityResult, ArmError>;
}

/// Network interface operations
#[async_trait::async_trait]
pub trait NetworkInterfacesClient: Send + Sync {
    async fn get(&self, resource_group: &str, name: &str) -> Result<NetworkInterface, ArmError>;
    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        nic: &NetworkInterface,
    ) -> Result<NetworkInterface, ArmError>;
    async fn delete(&self, resource_group: &str, name: &str) -> Result<(), ArmError>;
}

/// Virtual machine operations
#[async_trait::async_trait]
pub trait VirtualMachinesClient: Send + Sync {
    async fn get(&self, resource_group: &str, name: &str) -> Result<VirtualMachine, ArmError>;
    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        vm: &VirtualMachine,
    ) -> Result<VirtualMachine, ArmError>;
    async fn delete(&self, resource_group: &str, name: &str) -> Result<(), ArmError>;
}

/// Managed disk operations
#[async_trait::async_trait]
pub trait DisksClient: Send + Sync {
    async fn delete(&self, resource_group: &str, name: &str) -> Result<(), ArmError>;
}

/// Compute resource SKU listing
#[async_trait::async_trait]
pub trait ResourceSkusClient: Send + Sync {
    /// List every SKU visible to the subscription, following `nextLink` pages.
    /// `location` narrows the listing server-side when set.
    async fn list(&self, location: Option<&str>) -> Result<Vec<ResourceSku>, ArmError>;
}
