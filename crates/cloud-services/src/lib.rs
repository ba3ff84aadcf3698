//! Reconciliation core
//!
//! Converges declared cluster infrastructure against the cloud provider.
//! Each resource kind has a service that takes a scope (where and for
//! whom), a client set (through what) and a cancellation [`Context`], and
//! drives the provider until the declared specs exist (or are gone).
//!
//! # Example
//!
//! ```no_run
//! use cloud_services::{ClientSet, CloudConfig, ClusterScope, Context, loadbalancers};
//! use std::sync::Arc;
//!
//! # async fn example(cluster: crds::AzureCluster, clients: ClientSet) -> Result<(), Box<dyn std::error::Error>> {
//! let scope = Arc::new(ClusterScope::new(&cluster, CloudConfig::from_env()?)?);
//! let service = loadbalancers::Service::new(scope.clone(), clients);
//! service.reconcile(&Context::background(), scope.load_balancer_specs()).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod converters;
pub mod disks;
pub mod error;
pub mod ipalloc;
pub mod loadbalancers;
pub mod networkinterfaces;
pub mod resourceskus;
pub mod scope;
pub mod subnets;
pub mod virtualmachines;

#[cfg(test)]
mod test_utils;

pub use config::CloudConfig;
pub use context::{CancelHandle, Context};
pub use error::ServiceError;
pub use scope::{ClientSet, ClusterScope, MachineRole, MachineScope, Scope, VnetRef};
