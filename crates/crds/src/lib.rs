//! Cluster infrastructure API types
//!
//! Kubernetes Custom Resource Definitions (`AzureCluster`, `AzureMachine`),
//! the shared types they embed, observed-state records, tag conventions and
//! field validation.

pub mod azure_cluster;
pub mod azure_machine;
pub mod tags;
pub mod types;
pub mod validation;

pub use azure_cluster::*;
pub use azure_machine::*;
pub use types::*;
pub use validation::{FieldError, FieldErrorKind, ValidationErrors};
