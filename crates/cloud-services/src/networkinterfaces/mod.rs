//! Network interface reconciliation.
//!
//! A NIC has a single primary IP configuration bound to a subnet of the
//! cluster's virtual network, optionally with a public IP, load balancer
//! backend pools and inbound NAT rules.

#[cfg(test)]
mod networkinterfaces_test;

use crate::context::Context;
use crate::converters::tags_to_map;
use crate::error::ServiceError;
use crate::resourceskus::{self, ACCELERATED_NETWORKING, VIRTUAL_MACHINES};
use crate::scope::{ClientSet, Scope};
use arm_client::{
    InterfaceIpConfiguration, InterfaceIpConfigurationProperties, IpAllocationMethod,
    NetworkInterface, NetworkInterfaceProperties, ResourceId, SubResource,
};
use crds::tags::{self, BuildParams, ResourceLifecycle};
use std::sync::Arc;
use tracing::{Instrument, debug};

/// Name of the single IP configuration on every NIC
pub const IP_CONFIGURATION_NAME: &str = "pipConfig";

/// Backend pool of a load balancer in the scope's resource group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendPoolRef {
    pub load_balancer: String,
    pub pool: String,
}

/// Inbound NAT rule of a load balancer in the scope's resource group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundNatRuleRef {
    pub load_balancer: String,
    pub rule: String,
}

/// Desired state of one network interface
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NicSpec {
    pub name: String,
    /// Subnet of the cluster's virtual network
    pub subnet_name: String,
    /// Static private IP; dynamic allocation when unset
    pub static_ip_address: Option<String>,
    /// Public IP resource in the scope's resource group
    pub public_ip_name: Option<String>,
    pub backend_pools: Vec<BackendPoolRef>,
    pub inbound_nat_rules: Vec<InboundNatRuleRef>,
    /// VM size; used to detect accelerated networking when not set explicitly
    pub vm_size: String,
    pub accelerated_networking: Option<bool>,
}

pub struct Service {
    scope: Arc<dyn Scope>,
    clients: ClientSet,
    skus: Arc<resourceskus::Cache>,
}

impl Service {
    pub fn new(scope: Arc<dyn Scope>, clients: ClientSet, skus: Arc<resourceskus::Cache>) -> Self {
        Self { scope, clients, skus }
    }

    fn lb_child_id(&self, load_balancer: &str, child_type: &str, child: &str) -> SubResource {
        SubResource::new(
            ResourceId::network(
                self.scope.subscription_id(),
                self.scope.resource_group(),
                "loadBalancers",
                load_balancer,
            )
            .child(child_type, child)
            .to_string(),
        )
    }

    async fn accelerated_networking(&self, ctx: &Context, spec: &NicSpec) -> Result<bool, ServiceError> {
        match spec.accelerated_networking {
            Some(enabled) => Ok(enabled),
            None if spec.vm_size.is_empty() => Ok(false),
            None => {
                self.skus
                    .has_capability(ctx, &spec.vm_size, VIRTUAL_MACHINES, ACCELERATED_NETWORKING)
                    .await
            }
        }
    }

    /// Create or update every network interface in `specs`.
    pub async fn reconcile(&self, ctx: &Context, specs: &[NicSpec]) -> Result<(), ServiceError> {
        async {
            for spec in specs {
                self.reconcile_one(ctx, spec).await?;
            }
            Ok(())
        }
        .instrument(self.scope.span().clone())
        .await
    }

    async fn reconcile_one(&self, ctx: &Context, spec: &NicSpec) -> Result<(), ServiceError> {
        let resource_group = self.scope.resource_group();
        let vnet = self.scope.vnet();

        debug!("Getting subnet {}", spec.subnet_name);
        let subnet = ctx
            .run(
                self.clients
                    .subnets
                    .get(&vnet.resource_group, &vnet.name, &spec.subnet_name),
            )
            .await?
            .map_err(|e| ServiceError::provider(format!("failed to get subnet {}", spec.subnet_name), e))?;

        let (private_ip_address, allocation) = match &spec.static_ip_address {
            Some(ip) if !ip.is_empty() => (Some(ip.clone()), IpAllocationMethod::Static),
            _ => (None, IpAllocationMethod::Dynamic),
        };

        let public_ip_address = spec.public_ip_name.as_deref().map(|name| {
            SubResource::new(
                ResourceId::network(
                    self.scope.subscription_id(),
                    resource_group,
                    "publicIPAddresses",
                    name,
                )
                .to_string(),
            )
        });

        let backend_pools: Vec<SubResource> = spec
            .backend_pools
            .iter()
            .map(|p| self.lb_child_id(&p.load_balancer, "backendAddressPools", &p.pool))
            .collect();
        let inbound_nat_rules: Vec<SubResource> = spec
            .inbound_nat_rules
            .iter()
            .map(|r| self.lb_child_id(&r.load_balancer, "inboundNatRules", &r.rule))
            .collect();

        let accelerated = self.accelerated_networking(ctx, spec).await?;

        let additional = self.scope.additional_tags();
        let nic = NetworkInterface {
            id: None,
            name: None,
            location: Some(self.scope.location().to_string()),
            tags: tags_to_map(tags::build(BuildParams {
                cluster_name: self.scope.cluster_name(),
                lifecycle: ResourceLifecycle::Owned,
                name: Some(&spec.name),
                role: None,
                additional: &additional,
            })),
            properties: Some(NetworkInterfaceProperties {
                ip_configurations: Some(vec![InterfaceIpConfiguration {
                    id: None,
                    name: Some(IP_CONFIGURATION_NAME.to_string()),
                    properties: Some(InterfaceIpConfigurationProperties {
                        private_ip_address,
                        private_ip_allocation_method: Some(allocation),
                        subnet: subnet.id.map(SubResource::new),
                        public_ip_address,
                        load_balancer_backend_address_pools: (!backend_pools.is_empty())
                            .then_some(backend_pools),
                        load_balancer_inbound_nat_rules: (!inbound_nat_rules.is_empty())
                            .then_some(inbound_nat_rules),
                        primary: Some(true),
                    }),
                }]),
                enable_accelerated_networking: Some(accelerated),
            }),
        };

        debug!("Creating network interface {}", spec.name);
        ctx.run(
            self.clients
                .network_interfaces
                .create_or_update(resource_group, &spec.name, &nic),
        )
        .await?
        .map_err(|e| {
            ServiceError::provider(
                format!(
                    "failed to create network interface {} in resource group {}",
                    spec.name, resource_group
                ),
                e,
            )
        })?;
        debug!("Successfully created network interface {}", spec.name);
        Ok(())
    }

    /// Delete every network interface in `specs`; missing ones are skipped.
    pub async fn delete(&self, ctx: &Context, specs: &[NicSpec]) -> Result<(), ServiceError> {
        let resource_group = self.scope.resource_group();
        async {
            for spec in specs {
                debug!("Deleting network interface {}", spec.name);
                match ctx
                    .run(self.clients.network_interfaces.delete(resource_group, &spec.name))
                    .await?
                {
                    Ok(()) => debug!("Deleted network interface {}", spec.name),
                    Err(e) if e.is_not_found() => {
                        debug!("Network interface {} already deleted", spec.name);
                    }
                    Err(e) => {
                        return Err(ServiceError::provider(
                            format!(
                                "failed to delete network interface {} in resource group {}",
                                spec.name, resource_group
                            ),
                            e,
                        ));
                    }
                }
            }
            Ok(())
        }
        .instrument(self.scope.span().clone())
        .await
    }
}
