//! Load balancer reconciliation.
//!
//! Each pass converges the given specs strictly in order. The first
//! failure stops the pass; specs after it are left untouched.

mod builder;


pub use builder::{
    FrontendConfig, LB_RULE_NAME, OUTBOUND_NAT_RULE_NAME, PROBE_NAME, backend_pool_name, build,
    frontend_name,
};

use crate::context::Context;
use crate::converters::sdk_to_load_balancer;
use crate::error::ServiceError;
use crate::ipalloc;
use crate::scope::{ClientSet, Scope};
use crds::{LoadBalancerRole, LoadBalancerSpec};
use std::sync::Arc;
use tracing::{Instrument, debug};

/// Converges load balancers for one scope
pub struct Service {
    scope: Arc<dyn Scope>,
    clients: ClientSet,
}

impl Service {
    pub fn new(scope: Arc<dyn Scope>, clients: ClientSet) -> Self {
        Self { scope, clients }
    }

    /// Create or update every load balancer in `specs`.
    pub async fn reconcile(&self, ctx: &Context, specs: &[LoadBalancerSpec]) -> Result<(), ServiceError> {
        async {
            for spec in specs {
                self.reconcile_one(ctx, spec).await?;
            }
            Ok(())
        }
        .instrument(self.scope.span().clone())
        .await
    }

    async fn reconcile_one(&self, ctx: &Context, spec: &LoadBalancerSpec) -> Result<(), ServiceError> {
        spec.validate()?;
        let resource_group = self.scope.resource_group();
        debug!("Creating load balancer {}", spec.name);

        let frontend = match spec.role {
            LoadBalancerRole::Internal => self.private_frontend(ctx, spec).await?,
            LoadBalancerRole::ApiServer | LoadBalancerRole::NodeOutbound => {
                self.public_frontend(ctx, spec).await?
            }
        };

        let lb = build(self.scope.as_ref(), spec, frontend);
        ctx.run(
            self.clients
                .load_balancers
                .create_or_update(resource_group, &spec.name, &lb),
        )
        .await?
        .map_err(|e| {
            ServiceError::provider(format!("failed to create load balancer {}", spec.name), e)
        })?;

        debug!("Successfully created load balancer {}", spec.name);
        Ok(())
    }

    /// Frontend for an internal load balancer: keep the IP it already has,
    /// or allocate one.
    async fn private_frontend(&self, ctx: &Context, spec: &LoadBalancerSpec) -> Result<FrontendConfig, ServiceError> {
        let resource_group = self.scope.resource_group();
        let vnet = self.scope.vnet();

        let existing = match ctx
            .run(self.clients.load_balancers.get(resource_group, &spec.name))
            .await?
        {
            Ok(lb) => sdk_to_load_balancer(&lb).private_ip().map(str::to_string),
            Err(e) if e.is_not_found() => {
                debug!(
                    "Internal load balancer {} not found in resource group {}",
                    spec.name, resource_group
                );
                None
            }
            Err(e) => {
                return Err(ServiceError::provider("failed to look for existing internal LB", e));
            }
        };

        let ip = match existing {
            Some(ip) => ip,
            None => {
                ipalloc::allocate(
                    ctx,
                    self.clients.virtual_networks.as_ref(),
                    &vnet.resource_group,
                    &vnet.name,
                    &spec.subnet_cidr,
                    spec.preferred_private_ip.as_deref(),
                )
                .await?
            }
        };
        debug!("Setting internal load balancer IP {}", ip);

        debug!("Getting subnet {}", spec.subnet_name);
        let subnet = ctx
            .run(
                self.clients
                    .subnets
                    .get(&vnet.resource_group, &vnet.name, &spec.subnet_name),
            )
            .await?
            .map_err(|e| ServiceError::provider("failed to get subnet", e))?;

        Ok(FrontendConfig::Private { ip, subnet })
    }

    async fn public_frontend(&self, ctx: &Context, spec: &LoadBalancerSpec) -> Result<FrontendConfig, ServiceError> {
        let resource_group = self.scope.resource_group();
        debug!("Getting public ip {}", spec.public_ip_name);

        let public_ip = ctx
            .run(self.clients.public_ips.get(resource_group, &spec.public_ip_name))
            .await?
            .map_err(|e| {
                if e.is_not_found() {
                    ServiceError::provider(
                        format!(
                            "public ip {} not found in RG {}",
                            spec.public_ip_name, resource_group
                        ),
                        e,
                    )
                } else {
                    ServiceError::provider("failed to look for existing public IP", e)
                }
            })?;

        Ok(FrontendConfig::Public { public_ip })
    }

    /// Delete every load balancer in `specs`; missing ones are skipped.
    pub async fn delete(&self, ctx: &Context, specs: &[LoadBalancerSpec]) -> Result<(), ServiceError> {
        let resource_group = self.scope.resource_group();
        async {
            for spec in specs {
                debug!("Deleting load balancer {}", spec.name);
                match ctx
                    .run(self.clients.load_balancers.delete(resource_group, &spec.name))
                    .await?
                {
                    Ok(()) => debug!("Deleted load balancer {}", spec.name),
                    Err(e) if e.is_not_found() => {
                        debug!("Load balancer {} already deleted", spec.name);
                    }
                    Err(e) => {
                        return Err(ServiceError::provider(
                            format!(
                                "failed to delete load balancer {} in resource group {}",
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
