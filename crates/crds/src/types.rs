//! Shared API types
//!
//! Types embedded in both `AzureCluster` and `AzureMachine`, plus the
//! observed-state records (`Vm`, `Vmss`, `LoadBalancerState`) that the
//! converters produce from provider objects.

use k8s_openapi::api::core::v1::NodeAddress;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resource tags (ordered so serialized objects are deterministic)
pub type Tags = BTreeMap<String, String>;

/// Default API server port
pub const DEFAULT_API_SERVER_PORT: u16 = 6443;

fn default_api_server_port() -> u16 {
    DEFAULT_API_SERVER_PORT
}

/// Role a load balancer plays for the cluster
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub enum LoadBalancerRole {
    /// Public load balancer in front of the control plane
    #[serde(rename = "APIServer")]
    ApiServer,
    /// Private load balancer in front of the control plane
    Internal,
    /// Outbound-only load balancer for worker nodes
    NodeOutbound,
}

impl LoadBalancerRole {
    /// Value used for the role tag
    pub fn tag_value(self) -> &'static str {
        match self {
            Self::ApiServer => "apiserver",
            Self::Internal => "internal",
            Self::NodeOutbound => "nodeOutbound",
        }
    }
}

/// Desired state of one load balancer
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerSpec {
    /// Load balancer name
    pub name: String,

    pub role: LoadBalancerRole,

    /// Subnet the private frontend binds to (required for `Internal`)
    #[serde(default)]
    pub subnet_name: String,

    /// CIDR of that subnet, used to derive a default private IP
    #[serde(default)]
    pub subnet_cidr: String,

    /// Private IP to request for an `Internal` load balancer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_private_ip: Option<String>,

    /// Public IP resource the frontend binds to (required unless `Internal`)
    #[serde(default)]
    pub public_ip_name: String,

    #[serde(default = "default_api_server_port")]
    pub api_server_port: u16,
}

/// Virtual network the cluster lives in
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct VnetSpec {
    /// Resource group of the virtual network (defaults to the cluster's)
    #[serde(default)]
    pub resource_group: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr_block: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SubnetRole {
    ControlPlane,
    #[default]
    Node,
}

/// Subnet inside the cluster's virtual network
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubnetSpec {
    #[serde(default)]
    pub role: SubnetRole,

    pub name: String,

    pub cidr_block: String,

    /// Network security group name, if one is attached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_group: Option<String>,

    /// Route table name, if one is attached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_table: Option<String>,
}

/// Network layout of a cluster
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSpec {
    pub vnet: VnetSpec,

    #[serde(default)]
    pub subnets: Vec<SubnetSpec>,
}

/// OS image for a machine
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Image {
    /// Full resource ID of a managed image
    Id(String),
    /// Image version from a shared image gallery
    SharedGallery(SharedGalleryImage),
    /// Marketplace image
    Marketplace(MarketplaceImage),
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SharedGalleryImage {
    pub subscription_id: String,
    pub resource_group: String,
    pub gallery: String,
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceImage {
    pub publisher: String,
    pub offer: String,
    pub sku: String,
    pub version: String,
}

/// OS disk of a machine
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct OsDisk {
    pub os_type: String,

    #[serde(rename = "diskSizeGB")]
    pub disk_size_gb: i32,

    #[serde(default)]
    pub managed_disk: ManagedDisk,

    /// Ephemeral OS disk settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_disk_settings: Option<DiffDiskSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ManagedDisk {
    #[serde(default)]
    pub storage_account_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DiffDiskSettings {
    /// Placement of the ephemeral disk (only "Local" is supported)
    pub option: String,
}

/// Data disk attached to a machine
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DataDisk {
    /// Suffix appended to the machine name to form the disk name
    pub name_suffix: String,

    #[serde(rename = "diskSizeGB")]
    pub disk_size_gb: i32,

    /// Logical unit number; must be unique per machine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lun: Option<i32>,
}

/// Managed identity type of a machine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
pub enum VmIdentity {
    #[default]
    None,
    SystemAssigned,
    UserAssigned,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserAssignedIdentity {
    /// Identity resource ID, optionally prefixed with `azure:///`
    #[serde(rename = "providerID")]
    pub provider_id: String,
}

/// Provisioning state of a VM or scale set
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
pub enum VmState {
    Creating,
    Deleting,
    Failed,
    Migrating,
    Succeeded,
    Updating,
    #[default]
    #[serde(other)]
    Unknown,
}

impl VmState {
    /// Parse a provider provisioning state
    pub fn from_provisioning_state(state: &str) -> Self {
        match state {
            "Creating" => Self::Creating,
            "Deleting" => Self::Deleting,
            "Failed" => Self::Failed,
            "Migrating" => Self::Migrating,
            "Succeeded" => Self::Succeeded,
            "Updating" => Self::Updating,
            _ => Self::Unknown,
        }
    }
}

/// Observed state of a virtual machine
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Vm {
    pub id: String,
    pub name: String,
    pub availability_zone: String,
    pub vm_size: String,
    pub image: Option<Image>,
    pub identity: VmIdentity,
    pub tags: Tags,
    pub state: VmState,
    pub addresses: Vec<NodeAddress>,
}

/// Observed state of a virtual machine scale set
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Vmss {
    pub id: String,
    pub name: String,
    pub sku: String,
    pub capacity: i64,
    pub zones: Vec<String>,
    pub state: VmState,
    pub tags: Tags,
    pub instances: Vec<VmssVm>,
}

/// Observed state of one scale set instance
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VmssVm {
    pub id: String,
    pub instance_id: String,
    pub name: String,
    pub availability_zone: String,
    pub state: VmState,
}

/// Observed state of a load balancer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadBalancerState {
    pub id: String,
    pub name: String,
    pub sku: String,
    pub frontend_ips: Vec<FrontendIpState>,
    pub backend_pools: Vec<String>,
    pub tags: Tags,
}

impl LoadBalancerState {
    /// Private IP bound to the first frontend, if any
    pub fn private_ip(&self) -> Option<&str> {
        self.frontend_ips
            .first()
            .and_then(|f| f.private_ip.as_deref())
            .filter(|ip| !ip.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrontendIpState {
    pub name: String,
    pub private_ip: Option<String>,
    pub public_ip_id: Option<String>,
}
