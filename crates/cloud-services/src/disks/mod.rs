//! Managed disk cleanup.
//!
//! Disks outlive the VM that used them, so they are deleted explicitly
//! once the VM is gone.


use crate::context::Context;
use crate::error::ServiceError;
use crate::scope::Scope;
use arm_client::DisksClient;
use std::sync::Arc;
use tracing::{Instrument, debug};

/// Name of the OS disk created for `vm_name`
pub fn os_disk_name(vm_name: &str) -> String {
    format!("{}_OSDisk", vm_name)
}

/// Name of the data disk created for `vm_name` with `suffix`
pub fn data_disk_name(vm_name: &str, suffix: &str) -> String {
    format!("{}_{}", vm_name, suffix)
}

pub struct Service {
    scope: Arc<dyn Scope>,
    client: Arc<dyn DisksClient>,
}

impl Service {
    pub fn new(scope: Arc<dyn Scope>, client: Arc<dyn DisksClient>) -> Self {
        Self { scope, client }
    }

    /// Delete the named disks in order. Missing disks are skipped.
    pub async fn delete(&self, ctx: &Context, names: &[String]) -> Result<(), ServiceError> {
        let resource_group = self.scope.resource_group();
        async {
            for name in names {
                debug!("Deleting disk {}", name);
                match ctx.run(self.client.delete(resource_group, name)).await? {
                    Ok(()) => debug!("Deleted disk {}", name),
                    Err(e) if e.is_not_found() => debug!("Disk {} already deleted", name),
                    Err(e) => {
                        return Err(ServiceError::provider(
                            format!(
                                "failed to delete disk {} in resource group {}",
                                name, resource_group
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
