//! Resource Manager REST API Client
//!
//! A Rust client library for the cloud provider's resource-management API.
//! Provides type-safe wire models and one async client trait per resource
//! kind (load balancers, public IPs, virtual networks, subnets, network
//! interfaces, virtual machines, disks and resource SKUs).
//!
//! # Example
//!
//! ```no_run
//! use arm_client::{ArmClient, LoadBalancersClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ArmClient::new(
//!     "https://management.azure.com/".to_string(),
//!     "subscription-id".to_string(),
//!     "bearer-token".to_string(),
//! )?;
//!
//! let lb = client.get("my-rg", "my-cluster-internal-lb").await?;
//! println!("{:?}", lb.properties);
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Long-running operations**: PUT and DELETE wait for the provider to
//!   report a terminal state
//! - **Pagination**: listings follow `nextLink`
//! - **Error classification**: [`classify_error`] buckets failures by HTTP status
//! - **Mocking**: `test-util` enables [`MockArmClient`], an in-memory provider

pub mod client;
pub mod common;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod arm_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use arm_trait::*;
pub use client::{ApiVersions, ArmClient};
pub use common::{
    COMPUTE_PROVIDER, HttpClient, IDENTITY_PROVIDER, NETWORK_PROVIDER, ResourceId,
    resource_group_path, resource_name_from_id,
};
pub use error::{ArmError, ErrorKind, classify_error};
pub use models::*;
#[cfg(feature = "test-util")]
pub use mock::{MockArmClient, MockCall, MockKind, MockOp};
