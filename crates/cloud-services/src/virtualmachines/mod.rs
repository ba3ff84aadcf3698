//! Virtual machine reconciliation.
//!
//! A VM is created against NICs that already exist; its OS and data disks
//! are created with it and cleaned up separately by [`crate::disks`].

#[cfg(test)]
mod virtualmachines_test;

use crate::context::Context;
use crate::converters::{image_to_sdk, sdk_to_vm, tags_to_map};
use crate::disks::{data_disk_name, os_disk_name};
use crate::error::ServiceError;
use crate::resourceskus::{self, EPHEMERAL_OS_DISK, VIRTUAL_MACHINES};
use crate::scope::{ClientSet, MachineScope, Scope};
use arm_client::{
    DataDisk as WireDataDisk, DiffDiskSettings as WireDiffDiskSettings, DiskCreateOption,
    HardwareProfile, LinuxConfiguration, ManagedDiskParameters, NetworkInterfaceReference,
    NetworkInterfaceReferenceProperties, NetworkProfile, OsDisk as WireOsDisk, OsProfile,
    ResourceIdentityType, SshConfiguration, SshPublicKey, StorageProfile,
    UserAssignedIdentityValue, VirtualMachine, VirtualMachineIdentity, VirtualMachineProperties,
    resource_name_from_id,
};
use crds::tags::{self, BuildParams, ResourceLifecycle, cloud_provider_tag_key};
use crds::{DataDisk, Image, OsDisk, UserAssignedIdentity, Vm, VmIdentity};
use k8s_openapi::api::core::v1::NodeAddress;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{Instrument, debug};

/// Login user on every VM
pub const DEFAULT_USER_NAME: &str = "capi";

const PROVIDER_ID_PREFIX: &str = "azure:///";

const NODE_INTERNAL_IP: &str = "InternalIP";
const NODE_EXTERNAL_IP: &str = "ExternalIP";

/// Desired state of one virtual machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spec {
    pub name: String,
    /// NICs to attach; the first one is primary
    pub nic_names: Vec<String>,
    pub ssh_key_data: String,
    pub size: String,
    pub zone: String,
    pub image: Option<Image>,
    pub identity: VmIdentity,
    pub os_disk: OsDisk,
    pub data_disks: Vec<DataDisk>,
    /// Base64 bootstrap data handed to the guest
    pub custom_data: String,
    pub user_assigned_identities: Vec<UserAssignedIdentity>,
}

impl Spec {
    /// Spec for the machine in `scope`, attached to `nic_names`
    pub fn for_machine(scope: &MachineScope, nic_names: Vec<String>, custom_data: impl Into<String>) -> Self {
        let machine = scope.spec();
        Self {
            name: scope.name().to_string(),
            nic_names,
            ssh_key_data: machine.ssh_public_key.clone(),
            size: machine.vm_size.clone(),
            zone: machine.failure_domain.clone().unwrap_or_default(),
            image: machine.image.clone(),
            identity: machine.identity,
            os_disk: machine.os_disk.clone(),
            data_disks: machine.data_disks.clone(),
            custom_data: custom_data.into(),
            user_assigned_identities: machine.user_assigned_identities.clone(),
        }
    }

    /// Names of every disk created with this VM, OS disk first
    pub fn disk_names(&self) -> Vec<String> {
        std::iter::once(os_disk_name(&self.name))
            .chain(
                self.data_disks
                    .iter()
                    .map(|d| data_disk_name(&self.name, &d.name_suffix)),
            )
            .collect()
    }
}

pub struct Service {
    scope: Arc<MachineScope>,
    clients: ClientSet,
    skus: Arc<resourceskus::Cache>,
}

impl Service {
    pub fn new(scope: Arc<MachineScope>, clients: ClientSet, skus: Arc<resourceskus::Cache>) -> Self {
        Self { scope, clients, skus }
    }

    /// Observed state of VM `name`, including the addresses of its NICs.
    pub async fn get(&self, ctx: &Context, name: &str) -> Result<Vm, ServiceError> {
        let resource_group = self.scope.resource_group();
        let vm = ctx
            .run(self.clients.virtual_machines.get(resource_group, name))
            .await?
            .map_err(|e| {
                if e.is_not_found() {
                    ServiceError::provider(format!("VM {} not found", name), e)
                } else {
                    ServiceError::provider(format!("failed to get VM {}", name), e)
                }
            })?;

        let mut converted = sdk_to_vm(&vm);
        converted.addresses = self.addresses(ctx, &vm).await?;
        Ok(converted)
    }

    async fn addresses(&self, ctx: &Context, vm: &VirtualMachine) -> Result<Vec<NodeAddress>, ServiceError> {
        let resource_group = self.scope.resource_group();
        let nic_ids = vm
            .properties
            .as_ref()
            .and_then(|p| p.network_profile.as_ref())
            .map(|n| n.network_interfaces.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|r| r.id.as_deref());

        let mut addresses = Vec::new();
        for nic_id in nic_ids {
            let nic_name = resource_name_from_id(nic_id);
            let nic = ctx
                .run(self.clients.network_interfaces.get(resource_group, nic_name))
                .await?
                .map_err(|e| {
                    ServiceError::provider(format!("failed to get network interface {}", nic_name), e)
                })?;

            let ip_configs = nic
                .properties
                .and_then(|p| p.ip_configurations)
                .unwrap_or_default();
            for props in ip_configs.into_iter().filter_map(|c| c.properties) {
                if let Some(ip) = props.private_ip_address {
                    addresses.push(NodeAddress {
                        address: ip,
                        type_: NODE_INTERNAL_IP.to_string(),
                    });
                }

                let Some(public_ip_id) = props.public_ip_address.and_then(|p| p.id) else {
                    continue;
                };
                // Only the ID is populated on the NIC; the address needs its own lookup
                let public_ip_name = resource_name_from_id(&public_ip_id);
                let public_ip = ctx
                    .run(self.clients.public_ips.get(resource_group, public_ip_name))
                    .await?
                    .map_err(|e| {
                        ServiceError::provider(format!("failed to get public ip {}", public_ip_name), e)
                    })?;
                addresses.push(NodeAddress {
                    address: public_ip
                        .properties
                        .and_then(|p| p.ip_address)
                        .unwrap_or_default(),
                    type_: NODE_EXTERNAL_IP.to_string(),
                });
            }
        }
        Ok(addresses)
    }

    /// Create or update the VM described by `spec`.
    pub async fn reconcile(&self, ctx: &Context, spec: &Spec) -> Result<(), ServiceError> {
        async {
            let identity = identity(spec)?;
            let storage_profile = self.storage_profile(ctx, spec).await?;
            let network_profile = self.network_profile(ctx, spec).await?;

            debug!("Creating VM {}", spec.name);

            let mut additional = self.scope.additional_tags();
            additional.insert(
                cloud_provider_tag_key(self.scope.name()),
                ResourceLifecycle::Owned.as_str().to_string(),
            );
            let tags = tags::build(BuildParams {
                cluster_name: self.scope.cluster_name(),
                lifecycle: ResourceLifecycle::Owned,
                name: Some(self.scope.name()),
                role: Some(self.scope.role().as_str()),
                additional: &additional,
            });

            let vm = VirtualMachine {
                id: None,
                name: None,
                location: Some(self.scope.location().to_string()),
                tags: tags_to_map(tags),
                zones: (!spec.zone.is_empty()).then(|| vec![spec.zone.clone()]),
                identity,
                properties: Some(VirtualMachineProperties {
                    hardware_profile: Some(HardwareProfile {
                        vm_size: Some(spec.size.clone()),
                    }),
                    storage_profile: Some(storage_profile),
                    os_profile: Some(os_profile(spec)),
                    network_profile: Some(network_profile),
                    provisioning_state: None,
                }),
            };

            let resource_group = self.scope.resource_group();
            ctx.run(
                self.clients
                    .virtual_machines
                    .create_or_update(resource_group, &spec.name, &vm),
            )
            .await?
            .map_err(|e| ServiceError::provider(format!("cannot create VM {}", spec.name), e))?;

            debug!("Successfully created VM {}", spec.name);
            Ok(())
        }
        .instrument(self.scope.span().clone())
        .await
    }

    async fn storage_profile(&self, ctx: &Context, spec: &Spec) -> Result<StorageProfile, ServiceError> {
        let image_reference = image_to_sdk(spec.image.as_ref())?;

        let diff_disk_settings = match &spec.os_disk.diff_disk_settings {
            Some(settings) => {
                let sku = self.skus.get(ctx, &spec.size, VIRTUAL_MACHINES).await?;
                if !sku.has_capability(EPHEMERAL_OS_DISK) {
                    return Err(ServiceError::Validation(format!(
                        "vm size {} does not support ephemeral os. select a different vm size or disable ephemeral os",
                        spec.size
                    )));
                }
                Some(WireDiffDiskSettings {
                    option: Some(settings.option.clone()),
                })
            }
            None => None,
        };

        let data_disks = spec
            .data_disks
            .iter()
            .zip(0..)
            .map(|(disk, index)| WireDataDisk {
                lun: disk.lun.unwrap_or(index),
                name: Some(data_disk_name(&spec.name, &disk.name_suffix)),
                create_option: DiskCreateOption::Empty,
                disk_size_gb: Some(disk.disk_size_gb),
            })
            .collect();

        Ok(StorageProfile {
            image_reference: Some(image_reference),
            os_disk: Some(WireOsDisk {
                name: Some(os_disk_name(&spec.name)),
                os_type: Some(spec.os_disk.os_type.clone()),
                create_option: DiskCreateOption::FromImage,
                disk_size_gb: Some(spec.os_disk.disk_size_gb),
                managed_disk: Some(ManagedDiskParameters {
                    storage_account_type: Some(spec.os_disk.managed_disk.storage_account_type.clone()),
                }),
                diff_disk_settings,
            }),
            data_disks: Some(data_disks),
        })
    }

    async fn network_profile(&self, ctx: &Context, spec: &Spec) -> Result<NetworkProfile, ServiceError> {
        let resource_group = self.scope.resource_group();
        let mut network_interfaces = Vec::with_capacity(spec.nic_names.len());
        for (index, nic_name) in spec.nic_names.iter().enumerate() {
            debug!("Getting network interface {}", nic_name);
            let nic = ctx
                .run(self.clients.network_interfaces.get(resource_group, nic_name))
                .await?
                .map_err(|e| {
                    ServiceError::provider(format!("failed to get network interface {}", nic_name), e)
                })?;
            network_interfaces.push(NetworkInterfaceReference {
                id: nic.id,
                properties: Some(NetworkInterfaceReferenceProperties {
                    primary: Some(index == 0),
                }),
            });
        }
        Ok(NetworkProfile { network_interfaces })
    }

    /// Delete VM `name`. A missing VM is not an error.
    pub async fn delete(&self, ctx: &Context, name: &str) -> Result<(), ServiceError> {
        let resource_group = self.scope.resource_group();
        async {
            debug!("Deleting VM {}", name);
            match ctx
                .run(self.clients.virtual_machines.delete(resource_group, name))
                .await?
            {
                Ok(()) => {
                    debug!("Successfully deleted VM {}", name);
                    Ok(())
                }
                Err(e) if e.is_not_found() => Ok(()),
                Err(e) => Err(ServiceError::provider(
                    format!("failed to delete VM {} in resource group {}", name, resource_group),
                    e,
                )),
            }
        }
        .instrument(self.scope.span().clone())
        .await
    }
}

fn os_profile(spec: &Spec) -> OsProfile {
    OsProfile {
        computer_name: Some(spec.name.clone()),
        admin_username: Some(DEFAULT_USER_NAME.to_string()),
        custom_data: (!spec.custom_data.is_empty()).then(|| spec.custom_data.clone()),
        linux_configuration: Some(LinuxConfiguration {
            disable_password_authentication: Some(true),
            ssh: Some(SshConfiguration {
                public_keys: vec![SshPublicKey {
                    path: Some(format!("/home/{}/.ssh/authorized_keys", DEFAULT_USER_NAME)),
                    key_data: Some(spec.ssh_key_data.clone()),
                }],
            }),
        }),
    }
}

fn identity(spec: &Spec) -> Result<Option<VirtualMachineIdentity>, ServiceError> {
    match spec.identity {
        VmIdentity::None => Ok(None),
        VmIdentity::SystemAssigned => Ok(Some(VirtualMachineIdentity {
            identity_type: ResourceIdentityType::SystemAssigned,
            principal_id: None,
            user_assigned_identities: None,
        })),
        VmIdentity::UserAssigned => {
            if spec.user_assigned_identities.is_empty() {
                return Err(ServiceError::Validation(
                    "cannot create VM: The user-assigned identity provider ids must not be null or empty for 'UserAssigned' identity type."
                        .to_string(),
                ));
            }
            let identities: BTreeMap<String, UserAssignedIdentityValue> = spec
                .user_assigned_identities
                .iter()
                .map(|id| {
                    let key = id
                        .provider_id
                        .strip_prefix(PROVIDER_ID_PREFIX)
                        .unwrap_or(&id.provider_id);
                    (key.to_string(), UserAssignedIdentityValue::default())
                })
                .collect();
            Ok(Some(VirtualMachineIdentity {
                identity_type: ResourceIdentityType::UserAssigned,
                principal_id: None,
                user_assigned_identities: Some(identities),
            }))
        }
    }
}
