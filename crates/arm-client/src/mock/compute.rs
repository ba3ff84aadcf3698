//! Compute operations for MockArmClient
//!
//! Handles virtual machines, disks and resource SKUs

use super::{MockArmClient, MockKind, MockOp, key, not_found};
use crate::common::ResourceId;
use crate::error::ArmError;
use crate::models::*;

pub async fn get_virtual_machine(
    client: &MockArmClient,
    resource_group: &str,
    name: &str,
) -> Result<VirtualMachine, ArmError> {
    let target = key(resource_group, name);
    client
        .enter::<()>(MockKind::VirtualMachine, MockOp::Get, &target, None)
        .await?;
    client
        .state()
        .virtual_machines
        .get(&target)
        .cloned()
        .ok_or_else(|| not_found("Microsoft.Compute/virtualMachines", resource_group, name))
}

pub async fn put_virtual_machine(
    client: &MockArmClient,
    resource_group: &str,
    name: &str,
    vm: &VirtualMachine,
) -> Result<VirtualMachine, ArmError> {
    let target = key(resource_group, name);
    client
        .enter(MockKind::VirtualMachine, MockOp::CreateOrUpdate, &target, Some(vm))
        .await?;

    let mut stored = vm.clone();
    stored.id = Some(
        ResourceId::compute(&client.subscription_id, resource_group, "virtualMachines", name)
            .to_string(),
    );
    stored.name = Some(name.to_string());
    if let Some(props) = stored.properties.as_mut() {
        props.provisioning_state = Some("Succeeded".to_string());
    }
    client.state().virtual_machines.insert(target, stored.clone());
    Ok(stored)
}

pub async fn delete_virtual_machine(
    client: &MockArmClient,
    resource_group: &str,
    name: &str,
) -> Result<(), ArmError> {
    let target = key(resource_group, name);
    client
        .enter::<()>(MockKind::VirtualMachine, MockOp::Delete, &target, None)
        .await?;
    client
        .state()
        .virtual_machines
        .remove(&target)
        .map(|_| ())
        .ok_or_else(|| not_found("Microsoft.Compute/virtualMachines", resource_group, name))
}

pub async fn delete_disk(
    client: &MockArmClient,
    resource_group: &str,
    name: &str,
) -> Result<(), ArmError> {
    let target = key(resource_group, name);
    client
        .enter::<()>(MockKind::Disk, MockOp::Delete, &target, None)
        .await?;
    client
        .state()
        .disks
        .remove(&target)
        .ok_or_else(|| not_found("Microsoft.Compute/disks", resource_group, name))
}

pub async fn list_resource_skus(
    client: &MockArmClient,
    location: Option<&str>,
) -> Result<Vec<ResourceSku>, ArmError> {
    client
        .enter::<()>(
            MockKind::ResourceSku,
            MockOp::List,
            location.unwrap_or_default(),
            None,
        )
        .await?;

    let skus = client.state().resource_skus.clone();
    Ok(match location {
        Some(location) => skus
            .into_iter()
            .filter(|sku| match &sku.locations {
                Some(locations) => locations.iter().any(|l| l.eq_ignore_ascii_case(location)),
                None => true,
            })
            .collect(),
        None => skus,
    })
}
