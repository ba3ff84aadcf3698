//! Subnet reconciliation.


use crate::context::Context;
use crate::error::ServiceError;
use crate::scope::{ClientSet, Scope};
use arm_client::{ResourceId, SubResource, Subnet, SubnetProperties};
use crds::SubnetSpec;
use std::sync::Arc;
use tracing::{Instrument, debug};

pub struct Service {
    scope: Arc<dyn Scope>,
    clients: ClientSet,
}

impl Service {
    pub fn new(scope: Arc<dyn Scope>, clients: ClientSet) -> Self {
        Self { scope, clients }
    }

    fn build(&self, spec: &SubnetSpec) -> Subnet {
        let vnet = self.scope.vnet();
        let network_id = |resource_type: &str, name: &str| {
            SubResource::new(
                ResourceId::network(
                    self.scope.subscription_id(),
                    &vnet.resource_group,
                    resource_type,
                    name,
                )
                .to_string(),
            )
        };

        Subnet {
            id: None,
            name: Some(spec.name.clone()),
            properties: Some(SubnetProperties {
                address_prefix: Some(spec.cidr_block.clone()),
                network_security_group: spec
                    .security_group
                    .as_deref()
                    .map(|name| network_id("networkSecurityGroups", name)),
                route_table: spec
                    .route_table
                    .as_deref()
                    .map(|name| network_id("routeTables", name)),
            }),
        }
    }

    /// Create subnets that are missing or whose address prefix differs.
    pub async fn reconcile(&self, ctx: &Context, specs: &[SubnetSpec]) -> Result<(), ServiceError> {
        let vnet = self.scope.vnet();
        async {
            for spec in specs {
                let existing = match ctx
                    .run(self.clients.subnets.get(&vnet.resource_group, &vnet.name, &spec.name))
                    .await?
                {
                    Ok(subnet) => Some(subnet),
                    Err(e) if e.is_not_found() => None,
                    Err(e) => {
                        return Err(ServiceError::provider(
                            format!("failed to get subnet {}", spec.name),
                            e,
                        ));
                    }
                };

                let current_prefix = existing
                    .as_ref()
                    .and_then(|s| s.properties.as_ref())
                    .and_then(|p| p.address_prefix.as_deref());
                if current_prefix == Some(spec.cidr_block.as_str()) {
                    debug!("Subnet {} is up to date", spec.name);
                    continue;
                }

                debug!("Creating subnet {} with prefix {}", spec.name, spec.cidr_block);
                let subnet = self.build(spec);
                ctx.run(self.clients.subnets.create_or_update(
                    &vnet.resource_group,
                    &vnet.name,
                    &spec.name,
                    &subnet,
                ))
                .await?
                .map_err(|e| {
                    ServiceError::provider(
                        format!(
                            "failed to create subnet {} in resource group {}",
                            spec.name, vnet.resource_group
                        ),
                        e,
                    )
                })?;
                debug!("Successfully created subnet {}", spec.name);
            }
            Ok(())
        }
        .instrument(self.scope.span().clone())
        .await
    }

    /// Delete every subnet in `specs`; missing ones are skipped.
    pub async fn delete(&self, ctx: &Context, specs: &[SubnetSpec]) -> Result<(), ServiceError> {
        let vnet = self.scope.vnet();
        async {
            for spec in specs {
                debug!("Deleting subnet {}", spec.name);
                match ctx
                    .run(self.clients.subnets.delete(&vnet.resource_group, &vnet.name, &spec.name))
                    .await?
                {
                    Ok(()) => debug!("Deleted subnet {}", spec.name),
                    Err(e) if e.is_not_found() => debug!("Subnet {} already deleted", spec.name),
                    Err(e) => {
                        return Err(ServiceError::provider(
                            format!(
                                "failed to delete subnet {} in resource group {}",
                                spec.name, vnet.resource_group
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
