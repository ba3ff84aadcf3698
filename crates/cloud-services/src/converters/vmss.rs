use super::map_to_tags;
use arm_client::{VirtualMachineScaleSet, VirtualMachineScaleSetVm};
use crds::{VmState, Vmss, VmssVm};

fn first_zone(zones: Option<&Vec<String>>) -> String {
    zones.and_then(|z| z.first().cloned()).unwrap_or_default()
}

fn state(provisioning_state: Option<&str>) -> VmState {
    provisioning_state
        .map(VmState::from_provisioning_state)
        .unwrap_or_default()
}

/// Convert a wire scale set and its instances (kept in input order).
pub fn sdk_to_vmss(vmss: &VirtualMachineScaleSet, instances: &[VirtualMachineScaleSetVm]) -> Vmss {
    let sku = vmss.sku.as_ref();

    Vmss {
        id: vmss.id.clone().unwrap_or_default(),
        name: vmss.name.clone().unwrap_or_default(),
        sku: sku.and_then(|s| s.name.clone()).unwrap_or_default(),
        capacity: sku.and_then(|s| s.capacity).unwrap_or_default(),
        zones: vmss.zones.clone().unwrap_or_default(),
        state: state(
            vmss.properties
                .as_ref()
                .and_then(|p| p.provisioning_state.as_deref()),
        ),
        tags: map_to_tags(vmss.tags.as_ref()),
        instances: instances
            .iter()
            .map(|instance| VmssVm {
                id: instance.id.clone().unwrap_or_default(),
                instance_id: instance.instance_id.clone().unwrap_or_default(),
                name: instance.name.clone().unwrap_or_default(),
                availability_zone: first_zone(instance.zones.as_ref()),
                state: state(
                    instance
                        .properties
                        .as_ref()
                        .and_then(|p| p.provisioning_state.as_deref()),
                ),
            })
            .collect(),
    }
}
