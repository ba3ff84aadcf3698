//! Resource SKU lookups.
//!
//! The SKU listing for a location is large and slow, so a [`Cache`] fetches
//! it once and answers every lookup of the pass from memory.

#[cfg(test)]
mod resourceskus_test;

use crate::context::Context;
use crate::error::ServiceError;
use arm_client::{ResourceSku, ResourceSkusClient};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

/// Resource type of virtual machine SKUs
pub const VIRTUAL_MACHINES: &str = "virtualMachines";

/// Capability a VM size needs for ephemeral OS disks
pub const EPHEMERAL_OS_DISK: &str = "EphemeralOSDiskSupported";

/// Capability a VM size needs for accelerated networking
pub const ACCELERATED_NETWORKING: &str = "AcceleratedNetworkingEnabled";

/// SKUs of one location, listed on first use
pub struct Cache {
    client: Arc<dyn ResourceSkusClient>,
    location: String,
    skus: OnceCell<Vec<ResourceSku>>,
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("location", &self.location)
            .field("loaded", &self.skus.initialized())
            .finish_non_exhaustive()
    }
}

impl Cache {
    pub fn new(client: Arc<dyn ResourceSkusClient>, location: impl Into<String>) -> Self {
        Self {
            client,
            location: location.into(),
            skus: OnceCell::new(),
        }
    }

    async fn skus(&self, ctx: &Context) -> Result<&[ResourceSku], ServiceError> {
        let skus = self
            .skus
            .get_or_try_init(|| async {
                debug!("Listing resource SKUs in {}", self.location);
                ctx.run(self.client.list(Some(&self.location)))
                    .await?
                    .map_err(|e| ServiceError::provider("failed to list resource skus", e))
            })
            .await?;
        Ok(skus)
    }

    /// Find the SKU called `name` of `resource_type`.
    pub async fn get(&self, ctx: &Context, name: &str, resource_type: &str) -> Result<ResourceSku, ServiceError> {
        self.skus(ctx)
            .await?
            .iter()
            .find(|sku| {
                sku.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(name))
                    && sku.resource_type.as_deref() == Some(resource_type)
            })
            .cloned()
            .ok_or_else(|| ServiceError::SkuNotFound {
                name: name.to_string(),
                resource_type: resource_type.to_string(),
            })
    }

    /// True if the SKU exists and advertises `capability`.
    pub async fn has_capability(
        &self,
        ctx: &Context,
        name: &str,
        resource_type: &str,
        capability: &str,
    ) -> Result<bool, ServiceError> {
        Ok(self.get(ctx, name, resource_type).await?.has_capability(capability))
    }
}
