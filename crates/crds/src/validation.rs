//! Field validation for the API types
//!
//! Errors carry the JSON path of the offending field, Kubernetes style
//! (`spec.dataDisks[1].lun`).

use crate::types::{DataDisk, LoadBalancerRole, LoadBalancerSpec, OsDisk};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Largest OS disk accepted, in GB
pub const MAX_OS_DISK_SIZE_GB: i32 = 2048;
/// Largest data disk accepted, in GB
pub const MAX_DATA_DISK_SIZE_GB: i32 = 32767;

/// Storage account types a managed disk may use
pub const STORAGE_ACCOUNT_TYPES: [&str; 4] =
    ["Premium_LRS", "StandardSSD_LRS", "Standard_LRS", "UltraSSD_LRS"];

/// Storage account type required for ephemeral OS disks
pub const EPHEMERAL_STORAGE_ACCOUNT_TYPE: &str = "Standard_LRS";

const SSH_KEY_TYPES: [&str; 6] = [
    "ssh-rsa",
    "ssh-dss",
    "ssh-ed25519",
    "ecdsa-sha2-nistp256",
    "ecdsa-sha2-nistp384",
    "ecdsa-sha2-nistp521",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    Required,
    Invalid,
    Duplicate,
    Forbidden,
}

impl fmt::Display for FieldErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Required => "Required value",
            Self::Invalid => "Invalid value",
            Self::Duplicate => "Duplicate value",
            Self::Forbidden => "Forbidden",
        })
    }
}

/// A single invalid field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {kind}: {detail}")]
pub struct FieldError {
    pub field: String,
    pub kind: FieldErrorKind,
    pub detail: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, kind: FieldErrorKind, detail: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind,
            detail: detail.into(),
        }
    }

    pub fn required(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(field, FieldErrorKind::Required, detail)
    }

    pub fn invalid(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(field, FieldErrorKind::Invalid, detail)
    }
}

/// One or more invalid fields
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", messages.join(", "))
    }
}

impl ValidationErrors {
    /// `Ok(())` when `errors` is empty
    pub fn from_vec(errors: Vec<FieldError>) -> Result<(), Self> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self(errors))
        }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }
}

/// Validate a base64-encoded OpenSSH authorized key.
pub fn validate_ssh_key(ssh_key: &str, field: &str) -> Vec<FieldError> {
    match parse_authorized_key(ssh_key) {
        Ok(()) => Vec::new(),
        Err(detail) => vec![FieldError::required(field, detail)],
    }
}

fn parse_authorized_key(ssh_key: &str) -> Result<(), String> {
    let decoded = STANDARD
        .decode(ssh_key.trim())
        .map_err(|e| format!("the SSH public key is not valid base64: {}", e))?;
    let line = String::from_utf8(decoded)
        .map_err(|_| "the SSH public key is not valid text".to_string())?;

    let mut parts = line.split_whitespace();
    let key_type = parts.next().ok_or("the SSH public key is empty")?;
    let blob = parts.next().ok_or("the SSH public key has no key data")?;
    if !SSH_KEY_TYPES.contains(&key_type) {
        return Err(format!("unsupported SSH key type {}", key_type));
    }

    let blob = STANDARD
        .decode(blob)
        .map_err(|e| format!("the SSH key data is not valid base64: {}", e))?;
    let fields = split_wire_strings(&blob).ok_or("the SSH key data is malformed")?;
    match fields.first() {
        Some(embedded) if *embedded == key_type.as_bytes() && fields.len() >= 2 => Ok(()),
        _ => Err("the SSH key data does not match its key type".to_string()),
    }
}

/// Split an SSH wire blob into its length-prefixed fields; `None` if any
/// length overruns the buffer.
fn split_wire_strings(mut blob: &[u8]) -> Option<Vec<&[u8]>> {
    let mut fields = Vec::new();
    while !blob.is_empty() {
        let (len, rest) = blob.split_first_chunk::<4>()?;
        let len = u32::from_be_bytes(*len) as usize;
        if rest.len() < len {
            return None;
        }
        let (field, rest) = rest.split_at(len);
        fields.push(field);
        blob = rest;
    }
    Some(fields)
}

/// Validate the OS disk.
pub fn validate_os_disk(os_disk: &OsDisk, field: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if os_disk.disk_size_gb <= 0 || os_disk.disk_size_gb > MAX_OS_DISK_SIZE_GB {
        errors.push(FieldError::invalid(
            format!("{}.diskSizeGB", field),
            format!(
                "{}: the OS disk size must be between 1 and {} GB",
                os_disk.disk_size_gb, MAX_OS_DISK_SIZE_GB
            ),
        ));
    }

    if os_disk.os_type.is_empty() {
        errors.push(FieldError::required(
            format!("{}.osType", field),
            "the OS type cannot be empty",
        ));
    }

    let storage_field = format!("{}.managedDisk.storageAccountType", field);
    let storage = os_disk.managed_disk.storage_account_type.as_str();
    if storage.is_empty() {
        errors.push(FieldError::required(
            storage_field,
            "the storage account type cannot be empty",
        ));
    } else if !STORAGE_ACCOUNT_TYPES.contains(&storage) {
        errors.push(FieldError::invalid(
            storage_field,
            format!(
                "{}: allowed values are {}",
                storage,
                STORAGE_ACCOUNT_TYPES.join(", ")
            ),
        ));
    } else if os_disk.diff_disk_settings.is_some() && storage != EPHEMERAL_STORAGE_ACCOUNT_TYPE {
        errors.push(FieldError::new(
            storage_field,
            FieldErrorKind::Forbidden,
            format!(
                "ephemeral OS disks require storage account type {}",
                EPHEMERAL_STORAGE_ACCOUNT_TYPE
            ),
        ));
    }

    errors
}

/// Validate the data disks: unique suffixes, unique LUNs, sizes in range.
pub fn validate_data_disks(disks: &[DataDisk], field: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let mut names = HashSet::new();
    let mut luns = HashSet::new();

    for (i, disk) in disks.iter().enumerate() {
        let path = format!("{}[{}]", field, i);

        if disk.name_suffix.is_empty() {
            errors.push(FieldError::required(
                format!("{}.nameSuffix", path),
                "the name suffix cannot be empty",
            ));
        } else if !names.insert(disk.name_suffix.as_str()) {
            errors.push(FieldError::new(
                format!("{}.nameSuffix", path),
                FieldErrorKind::Duplicate,
                disk.name_suffix.clone(),
            ));
        }

        if disk.disk_size_gb <= 0 || disk.disk_size_gb > MAX_DATA_DISK_SIZE_GB {
            errors.push(FieldError::invalid(
                format!("{}.diskSizeGB", path),
                format!(
                    "{}: the disk size must be between 1 and {} GB",
                    disk.disk_size_gb, MAX_DATA_DISK_SIZE_GB
                ),
            ));
        }

        if let Some(lun) = disk.lun
            && !luns.insert(lun)
        {
            errors.push(FieldError::new(
                format!("{}.lun", path),
                FieldErrorKind::Duplicate,
                lun.to_string(),
            ));
        }
    }

    errors
}

/// Validate a load balancer spec: internal load balancers need a subnet,
/// every other role needs a public IP.
pub fn validate_load_balancer(spec: &LoadBalancerSpec, field: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if spec.name.is_empty() {
        errors.push(FieldError::required(
            format!("{}.name", field),
            "the load balancer name cannot be empty",
        ));
    }

    match spec.role {
        LoadBalancerRole::Internal => {
            if spec.subnet_name.is_empty() {
                errors.push(FieldError::required(
                    format!("{}.subnetName", field),
                    "an internal load balancer needs a subnet",
                ));
            }
        }
        LoadBalancerRole::ApiServer | LoadBalancerRole::NodeOutbound => {
            if spec.public_ip_name.is_empty() {
                errors.push(FieldError::required(
                    format!("{}.publicIPName", field),
                    "a public load balancer needs a public IP",
                ));
            }
        }
    }

    errors
}

impl LoadBalancerSpec {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        ValidationErrors::from_vec(validate_load_balancer(self, "loadBalancer"))
    }
}
