use super::{map_to_tags, sdk_to_image};
use arm_client::{ResourceIdentityType, VirtualMachine};
use crds::{Vm, VmIdentity, VmState};

/// Convert a wire virtual machine. Addresses are left empty; they live on
/// the NICs and need extra lookups.
pub fn sdk_to_vm(vm: &VirtualMachine) -> Vm {
    let properties = vm.properties.as_ref();

    Vm {
        id: vm.id.clone().unwrap_or_default(),
        name: vm.name.clone().unwrap_or_default(),
        availability_zone: vm
            .zones
            .as_ref()
            .and_then(|zones| zones.first().cloned())
            .unwrap_or_default(),
        vm_size: properties
            .and_then(|p| p.hardware_profile.as_ref())
            .and_then(|h| h.vm_size.clone())
            .unwrap_or_default(),
        image: properties
            .and_then(|p| p.storage_profile.as_ref())
            .and_then(|s| s.image_reference.as_ref())
            .and_then(sdk_to_image),
        identity: match vm.identity.as_ref().map(|i| i.identity_type) {
            Some(ResourceIdentityType::SystemAssigned) => VmIdentity::SystemAssigned,
            Some(ResourceIdentityType::UserAssigned) => VmIdentity::UserAssigned,
            Some(ResourceIdentityType::None) | None => VmIdentity::None,
        },
        tags: map_to_tags(vm.tags.as_ref()),
        state: properties
            .and_then(|p| p.provisioning_state.as_deref())
            .map(VmState::from_provisioning_state)
            .unwrap_or_default(),
        addresses: Vec::new(),
    }
}
