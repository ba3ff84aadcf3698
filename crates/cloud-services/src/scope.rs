//! Reconciliation scopes and the client set services call through.
//!
//! A scope answers "where and for whom" (subscription, resource group,
//! location, cluster, tags, virtual network); the [`ClientSet`] answers
//! "through what". Both are built fresh for every pass.

use crate::config::CloudConfig;
use crate::error::ServiceError;
use arm_client::{
    DisksClient, LoadBalancerSkuName, LoadBalancersClient, NetworkInterfacesClient,
    PublicIpsClient, ResourceSkusClient, SubnetsClient, VirtualMachinesClient,
    VirtualNetworksClient,
};
use crds::tags::{CONTROL_PLANE_ROLE_TAG_VALUE, NODE_ROLE_TAG_VALUE};
use crds::{AzureCluster, AzureMachine, AzureMachineSpec, LoadBalancerSpec, SubnetSpec, Tags};
use std::sync::Arc;
use tracing::{Span, info_span};

/// Virtual network a scope's resources live in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VnetRef {
    pub resource_group: String,
    pub name: String,
}

/// What every service needs to know about the cluster it works for
pub trait Scope: Send + Sync {
    fn subscription_id(&self) -> &str;
    fn resource_group(&self) -> &str;
    fn location(&self) -> &str;
    fn cluster_name(&self) -> &str;
    /// Tags applied on top of the ownership and role tags
    fn additional_tags(&self) -> Tags;
    fn vnet(&self) -> VnetRef;
    fn load_balancer_sku(&self) -> LoadBalancerSkuName;
    /// Span the services log under
    fn span(&self) -> &Span;
}

/// Scope of one cluster
#[derive(Debug, Clone)]
pub struct ClusterScope {
    cluster_name: String,
    subscription_id: String,
    resource_group: String,
    location: String,
    vnet: VnetRef,
    subnets: Vec<SubnetSpec>,
    load_balancers: Vec<LoadBalancerSpec>,
    additional_tags: Tags,
    config: CloudConfig,
    span: Span,
}

impl ClusterScope {
    /// Build a scope from a cluster object and the cloud configuration
    pub fn new(cluster: &AzureCluster, config: CloudConfig) -> Result<Self, ServiceError> {
        let spec = &cluster.spec;
        let cluster_name = cluster.cluster_name();
        if cluster_name.is_empty() {
            return Err(ServiceError::Config("AzureCluster has no name".to_string()));
        }
        if spec.resource_group.is_empty() {
            return Err(ServiceError::Config(format!(
                "AzureCluster {} has no resource group",
                cluster_name
            )));
        }

        let subscription_id = config.resolve_subscription(spec.subscription_id.as_deref())?;
        let vnet_spec = &spec.network_spec.vnet;
        let vnet = VnetRef {
            resource_group: if vnet_spec.resource_group.is_empty() {
                spec.resource_group.clone()
            } else {
                vnet_spec.resource_group.clone()
            },
            name: vnet_spec.name.clone(),
        };

        let span = info_span!(
            "cluster",
            cluster = %cluster_name,
            resource_group = %spec.resource_group
        );

        Ok(Self {
            cluster_name: cluster_name.to_string(),
            subscription_id,
            resource_group: spec.resource_group.clone(),
            location: spec.location.clone(),
            vnet,
            subnets: spec.network_spec.subnets.clone(),
            load_balancers: spec.load_balancers.clone(),
            additional_tags: spec.additional_tags.clone(),
            config,
            span,
        })
    }

    /// Load balancers to converge, in declaration order
    pub fn load_balancer_specs(&self) -> &[LoadBalancerSpec] {
        &self.load_balancers
    }

    pub fn subnet_specs(&self) -> &[SubnetSpec] {
        &self.subnets
    }

    pub fn config(&self) -> &CloudConfig {
        &self.config
    }

    /// DNS suffix for public VM names in this cluster's location
    pub fn vm_dns_suffix(&self) -> String {
        self.config.vm_dns_suffix(&self.location)
    }
}

impl Scope for ClusterScope {
    fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    fn resource_group(&self) -> &str {
        &self.resource_group
    }

    fn location(&self) -> &str {
        &self.location
    }

    fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    fn additional_tags(&self) -> Tags {
        self.additional_tags.clone()
    }

    fn vnet(&self) -> VnetRef {
        self.vnet.clone()
    }

    fn load_balancer_sku(&self) -> LoadBalancerSkuName {
        self.config.load_balancer_sku()
    }

    fn span(&self) -> &Span {
        &self.span
    }
}

/// Role a machine plays in the cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineRole {
    ControlPlane,
    Node,
}

impl MachineRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ControlPlane => CONTROL_PLANE_ROLE_TAG_VALUE,
            Self::Node => NODE_ROLE_TAG_VALUE,
        }
    }
}

/// Scope of one machine inside a cluster
#[derive(Debug, Clone)]
pub struct MachineScope {
    cluster: Arc<ClusterScope>,
    name: String,
    role: MachineRole,
    spec: AzureMachineSpec,
    span: Span,
}

impl MachineScope {
    pub fn new(cluster: Arc<ClusterScope>, machine: &AzureMachine, role: MachineRole) -> Result<Self, ServiceError> {
        let name = machine
            .metadata
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ServiceError::Config("AzureMachine has no name".to_string()))?;
        let span = info_span!(parent: cluster.span(), "machine", machine = %name, role = role.as_str());
        Ok(Self {
            cluster,
            name,
            role,
            spec: machine.spec.clone(),
            span,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> MachineRole {
        self.role
    }

    pub fn spec(&self) -> &AzureMachineSpec {
        &self.spec
    }

    pub fn cluster(&self) -> &ClusterScope {
        &self.cluster
    }
}

impl Scope for MachineScope {
    fn subscription_id(&self) -> &str {
        self.cluster.subscription_id()
    }

    fn resource_group(&self) -> &str {
        self.cluster.resource_group()
    }

    fn location(&self) -> &str {
        self.cluster.location()
    }

    fn cluster_name(&self) -> &str {
        self.cluster.cluster_name()
    }

    /// Cluster tags with the machine's own tags layered on top
    fn additional_tags(&self) -> Tags {
        let mut tags = self.cluster.additional_tags();
        tags.extend(self.spec.additional_tags.clone());
        tags
    }

    fn vnet(&self) -> VnetRef {
        self.cluster.vnet()
    }

    fn load_balancer_sku(&self) -> LoadBalancerSkuName {
        self.cluster.load_balancer_sku()
    }

    fn span(&self) -> &Span {
        &self.span
    }
}

/// One client per resource kind
#[derive(Clone)]
pub struct ClientSet {
    pub load_balancers: Arc<dyn LoadBalancersClient>,
    pub public_ips: Arc<dyn PublicIpsClient>,
    pub virtual_networks: Arc<dyn VirtualNetworksClient>,
    pub subnets: Arc<dyn SubnetsClient>,
    pub network_interfaces: Arc<dyn NetworkInterfacesClient>,
    pub virtual_machines: Arc<dyn VirtualMachinesClient>,
    pub disks: Arc<dyn DisksClient>,
    pub resource_skus: Arc<dyn ResourceSkusClient>,
}

impl std::fmt::Debug for ClientSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSet").finish_non_exhaustive()
    }
}

impl ClientSet {
    /// Use one client that implements every resource kind
    pub fn from_client<C>(client: Arc<C>) -> Self
    where
        C: LoadBalancersClient
            + PublicIpsClient
            + VirtualNetworksClient
            + SubnetsClient
            + NetworkInterfacesClient
            + VirtualMachinesClient
            + DisksClient
            + ResourceSkusClient
            + 'static,
    {
        Self {
            load_balancers: client.clone(),
            public_ips: client.clone(),
            virtual_networks: client.clone(),
            subnets: client.clone(),
            network_interfaces: client.clone(),
            virtual_machines: client.clone(),
            disks: client.clone(),
            resource_skus: client,
        }
    }
}
