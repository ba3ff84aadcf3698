//! Mock Resource Manager client for unit testing
//!
//! This module provides an in-memory implementation of every resource
//! client trait so services can be tested without a subscription.
//!
//! The mock is organized into domain-specific modules:
//! - `network.rs` - load balancers, public IPs, virtual networks, subnets, NICs
//! - `compute.rs` - virtual machines, disks, resource SKUs
//!
//! Besides storing resources, the mock records every call it receives (with
//! the request body for writes), can be told to fail a specific call with a
//! given HTTP status, and can be told to never answer a call so cancellation
//! can be exercised.

mod compute;
mod network;

use crate::arm_trait::*;
use crate::error::ArmError;
use crate::models::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Resource kind a mock call targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockKind {
    LoadBalancer,
    PublicIp,
    VirtualNetwork,
    Subnet,
    NetworkInterface,
    VirtualMachine,
    Disk,
    ResourceSku,
}

/// Operation a mock call performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    Get,
    CreateOrUpdate,
    Delete,
    CheckIpAddressAvailability,
    List,
}

/// A call received by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub kind: MockKind,
    pub op: MockOp,
    /// `rg/name`, `rg/vnet/subnet`, the probed IP, or the listing location
    pub target: String,
    /// Request body for writes
    pub body: Option<serde_json::Value>,
}

#[derive(Debug, Default)]
pub(crate) struct MockState {
    pub(crate) load_balancers: HashMap<String, LoadBalancer>,
    pub(crate) public_ips: HashMap<String, PublicIpAddress>,
    pub(crate) virtual_networks: HashMap<String, VirtualNetwork>,
    pub(crate) subnets: HashMap<String, Subnet>,
    pub(crate) network_interfaces: HashMap<String, NetworkInterface>,
    pub(crate) virtual_machines: HashMap<String, VirtualMachine>,
    pub(crate) disks: HashMap<String, ()>,
    pub(crate) resource_skus: Vec<ResourceSku>,
    /// Availability answers keyed by IP; unknown IPs are available
    pub(crate) ip_availability: HashMap<String, IpAddressAvailabilityResult>,
    failures: HashMap<(MockKind, MockOp, String), (u16, String)>,
    hangs: Vec<(MockKind, MockOp, String)>,
    calls: Vec<MockCall>,
}

/// Mock Resource Manager client for testing
#[derive(Debug, Clone)]
pub struct MockArmClient {
    pub(crate) subscription_id: String,
    state: Arc<Mutex<MockState>>,
}

impl Default for MockArmClient {
    fn default() -> Self {
        Self::new("123")
    }
}

impl MockArmClient {
    /// Create a new, empty mock client
    pub fn new(subscription_id: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a load balancer to the mock store (for test setup)
    pub fn add_load_balancer(&self, resource_group: &str, lb: LoadBalancer) {
        let key = key(resource_group, lb.name.as_deref().unwrap_or_default());
        self.state().load_balancers.insert(key, lb);
    }

    /// Add a public IP to the mock store (for test setup)
    pub fn add_public_ip(&self, resource_group: &str, ip: PublicIpAddress) {
        let key = key(resource_group, ip.name.as_deref().unwrap_or_default());
        self.state().public_ips.insert(key, ip);
    }

    /// Add a virtual network to the mock store (for test setup)
    pub fn add_virtual_network(&self, resource_group: &str, vnet: VirtualNetwork) {
        let key = key(resource_group, vnet.name.as_deref().unwrap_or_default());
        self.state().virtual_networks.insert(key, vnet);
    }

    /// Add a subnet to the mock store (for test setup)
    pub fn add_subnet(&self, resource_group: &str, vnet: &str, subnet: Subnet) {
        let key = subnet_key(resource_group, vnet, subnet.name.as_deref().unwrap_or_default());
        self.state().subnets.insert(key, subnet);
    }

    /// Add a network interface to the mock store (for test setup)
    pub fn add_network_interface(&self, resource_group: &str, nic: NetworkInterface) {
        let key = key(resource_group, nic.name.as_deref().unwrap_or_default());
        self.state().network_interfaces.insert(key, nic);
    }

    /// Add a virtual machine to the mock store (for test setup)
    pub fn add_virtual_machine(&self, resource_group: &str, vm: VirtualMachine) {
        let key = key(resource_group, vm.name.as_deref().unwrap_or_default());
        self.state().virtual_machines.insert(key, vm);
    }

    /// Add a managed disk to the mock store (for test setup)
    pub fn add_disk(&self, resource_group: &str, name: &str) {
        self.state().disks.insert(key(resource_group, name), ());
    }

    /// Replace the SKU listing
    pub fn set_resource_skus(&self, skus: Vec<ResourceSku>) {
        self.state().resource_skus = skus;
    }

    /// Answer availability checks for `ip` with `result`
    pub fn set_ip_availability(&self, ip: &str, result: IpAddressAvailabilityResult) {
        self.state().ip_availability.insert(ip.to_string(), result);
    }

    /// Make the matching call fail with an API error of the given status.
    ///
    /// `target` uses the same format as [`MockCall::target`].
    pub fn fail(&self, kind: MockKind, op: MockOp, target: &str, status: u16, message: &str) {
        self.state()
            .failures
            .insert((kind, op, target.to_string()), (status, message.to_string()));
    }

    /// Make the matching call never complete
    pub fn hang(&self, kind: MockKind, op: MockOp, target: &str) {
        self.state().hangs.push((kind, op, target.to_string()));
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.state().calls.clone()
    }

    /// Calls of one kind and operation, in order
    pub fn calls_to(&self, kind: MockKind, op: MockOp) -> Vec<MockCall> {
        self.state()
            .calls
            .iter()
            .filter(|c| c.kind == kind && c.op == op)
            .cloned()
            .collect()
    }

    /// Look up a stored load balancer
    pub fn load_balancer(&self, resource_group: &str, name: &str) -> Option<LoadBalancer> {
        self.state().load_balancers.get(&key(resource_group, name)).cloned()
    }

    /// Look up a stored network interface
    pub fn network_interface(&self, resource_group: &str, name: &str) -> Option<NetworkInterface> {
        self.state()
            .network_interfaces
            .get(&key(resource_group, name))
            .cloned()
    }

    /// Look up a stored subnet
    pub fn subnet(&self, resource_group: &str, vnet: &str, name: &str) -> Option<Subnet> {
        self.state().subnets.get(&subnet_key(resource_group, vnet, name)).cloned()
    }

    /// Look up a stored virtual machine
    pub fn virtual_machine(&self, resource_group: &str, name: &str) -> Option<VirtualMachine> {
        self.state()
            .virtual_machines
            .get(&key(resource_group, name))
            .cloned()
    }

    /// True if the disk is in the mock store
    pub fn has_disk(&self, resource_group: &str, name: &str) -> bool {
        self.state().disks.contains_key(&key(resource_group, name))
    }

    /// Record a call, then apply any configured hang or failure.
    pub(crate) async fn enter<B: serde::Serialize>(
        &self,
        kind: MockKind,
        op: MockOp,
        target: &str,
        body: Option<&B>,
    ) -> Result<(), ArmError> {
        let (hang, failure) = {
            let mut state = self.state();
            state.calls.push(MockCall {
                kind,
                op,
                target: target.to_string(),
                body: body.and_then(|b| serde_json::to_value(b).ok()),
            });
            let probe = (kind, op, target.to_string());
            (state.hangs.contains(&probe), state.failures.get(&probe).cloned())
        };

        if hang {
            std::future::pending::<()>().await;
        }
        match failure {
            Some((status, message)) => Err(ArmError::api(status, message)),
            None => Ok(()),
        }
    }
}

pub(crate) fn key(resource_group: &str, name: &str) -> String {
    format!("{}/{}", resource_group, name)
}

pub(crate) fn subnet_key(resource_group: &str, vnet: &str, name: &str) -> String {
    format!("{}/{}/{}", resource_group, vnet, name)
}

pub(crate) fn not_found(kind: &str, resource_group: &str, name: &str) -> ArmError {
    ArmError::not_found(format!(
        "The Resource '{}/{}' under resource group '{}' was not found.",
        kind, name, resource_group
    ))
}

#[async_trait::async_trait]
impl LoadBalancersClient for MockArmClient {
    async fn get(&self, resource_group: &str, name: &str) -> Result<LoadBalancer, ArmError> {
        network::get_load_balancer(self, resource_group, name).await
    }

    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        lb: &LoadBalancer,
    ) -> Result<LoadBalancer, ArmError> {
        network::put_load_balancer(self, resource_group, name, lb).await
    }

    async fn delete(&self, resource_group: &str, name: &str) -> Result<(), ArmError> {
        network::delete_load_balancer(self, resource_group, name).await
    }
}

#[async_trait::async_trait]
impl PublicIpsClient for MockArmClient {
    async fn get(&self, resource_group: &str, name: &str) -> Result<PublicIpAddress, ArmError> {
        network::get_public_ip(self, resource_group, name).await
    }

    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        ip: &PublicIpAddress,
    ) -> Result<PublicIpAddress, ArmError> {
        network::put_public_ip(self, resource_group, name, ip).await
    }

    async fn delete(&self, resource_group: &str, name: &str) -> Result<(), ArmError> {
        network::delete_public_ip(self, resource_group, name).await
    }
}

#[async_trait::async_trait]
impl SubnetsClient for MockArmClient {
    async fn get(&self, resource_group: &str, vnet: &str, name: &str) -> Result<Subnet, ArmError> {
        network::get_subnet(self, resource_group, vnet, name).await
    }

    async fn create_or_update(
        &self,
        resource_group: &str,
        vnet: &str,
        name: &str,
        subnet: &Subnet,
    ) -> Result<Subnet, ArmError> {
        network::put_subnet(self, resource_group, vnet, name, subnet).await
    }

    async fn delete(&self, resource_group: &str, vnet: &str, name: &str) -> Result<(), ArmError> {
        network::delete_subnet(self, resource_group, vnet, name).await
    }
}

#[async_trait::async_trait]
impl VirtualNetworksClient for MockArmClient {
    async fn get(&self, resource_group: &str, name: &str) -> Result<VirtualNetwork, ArmError> {
        network::get_virtual_network(self, resource_group, name).await
    }

    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        vnet: &VirtualNetwork,
    ) -> Result<VirtualNetwork, ArmError> {
        network::put_virtual_network(self, resource_group, name, vnet).await
    }

    async fn delete(&self, resource_group: &str, name: &str) -> Result<(), ArmError> {
        network::delete_virtual_network(self, resource_group, name).await
    }

    async fn check_ip_address_availability(
        &self,
        resource_group: &str,
        vnet: &str,
        ip_address: &str,
    ) -> Result<IpAddressAvailabilityResult, ArmError> {
        network::check_ip_address_availability(self, resource_group, vnet, ip_address).await
    }
}

#[async_trait::async_trait]
impl NetworkInterfacesClient for MockArmClient {
    async fn get(&self, resource_group: &str, name: &str) -> Result<NetworkInterface, ArmError> {
        network::get_network_interface(self, resource_group, name).await
    }

    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        nic: &NetworkInterface,
    ) -> Result<NetworkInterface, ArmError> {
        network::put_network_interface(self, resource_group, name, nic).await
    }

    async fn delete(&self, resource_group: &str, name: &str) -> Result<(), ArmError> {
        network::delete_network_interface(self, resource_group, name).await
    }
}

#[async_trait::async_trait]
impl VirtualMachinesClient for MockArmClient {
    async fn get(&self, resource_group: &str, name: &str) -> Result<VirtualMachine, ArmError> {
        compute::get_virtual_machine(self, resource_group, name).await
    }

    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        vm: &VirtualMachine,
    ) -> Result<VirtualMachine, ArmError> {
        compute::put_virtual_machine(self, resource_group, name, vm).await
    }

    async fn delete(&self, resource_group: &str, name: &str) -> Result<(), ArmError> {
        compute::delete_virtual_machine(self, resource_group, name).await
    }
}

#[async_trait::async_trait]
impl DisksClient for MockArmClient {
    async fn delete(&self, resource_group: &str, name: &str) -> Result<(), ArmError> {
        compute::delete_disk(self, resource_group, name).await
    }
}

#[async_trait::async_trait]
impl ResourceSkusClient for MockArmClient {
    async fn list(&self, location: Option<&str>) -> Result<Vec<ResourceSku>, ArmError> {
        compute::list_resource_skus(self, location).await
    }
}
