//! AzureMachine CRD
//!
//! Declares a single virtual machine: size, image, disks, identity and
//! login key.

use crate::types::{DataDisk, Image, OsDisk, Tags, UserAssignedIdentity, VmIdentity, VmState};
use crate::validation::{self, ValidationErrors};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "infrastructure.cluster.x-k8s.io",
    version = "v1alpha3",
    kind = "AzureMachine",
    namespaced,
    status = "AzureMachineStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct AzureMachineSpec {
    /// VM size (e.g. "Standard_D2s_v3")
    pub vm_size: String,

    /// Availability zone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_domain: Option<String>,

    /// OS image; the provider default is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,

    #[serde(default)]
    pub identity: VmIdentity,

    /// Identities to attach when `identity` is `UserAssigned`
    #[serde(default)]
    pub user_assigned_identities: Vec<UserAssignedIdentity>,

    pub os_disk: OsDisk,

    #[serde(default)]
    pub data_disks: Vec<DataDisk>,

    /// Base64-encoded OpenSSH public key
    #[serde(default)]
    pub ssh_public_key: String,

    /// Extra tags, merged over the cluster's additional tags
    #[serde(default)]
    pub additional_tags: Tags,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accelerated_networking: Option<bool>,

    /// Attach a public IP to the machine's NIC
    #[serde(default)]
    pub allocate_public_ip: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct AzureMachineStatus {
    #[serde(default)]
    pub ready: bool,

    /// Last observed provisioning state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_state: Option<VmState>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_message: Option<String>,
}

impl AzureMachineSpec {
    /// Validate the fields the provider would otherwise reject late.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();
        errors.extend(validation::validate_ssh_key(&self.ssh_public_key, "spec.sshPublicKey"));
        errors.extend(validation::validate_os_disk(&self.os_disk, "spec.osDisk"));
        errors.extend(validation::validate_data_disks(&self.data_disks, "spec.dataDisks"));
        ValidationErrors::from_vec(errors)
    }
}
