//! Service error types.
//!
//! Provider failures are wrapped with the operation and resource they
//! belong to; the underlying [`ArmError`] stays reachable through
//! [`std::error::Error::source`] and [`ServiceError::kind`].

use arm_client::{ArmError, ErrorKind};
use crds::ValidationErrors;
use thiserror::Error;

/// Errors that can occur while converging resources.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A provider call failed
    #[error("{context}: {source}")]
    Provider {
        /// Operation and resource the call was for
        context: String,
        #[source]
        source: ArmError,
    },

    /// A spec failed field validation before any provider call
    #[error("invalid spec: {0}")]
    InvalidSpec(#[from] ValidationErrors),

    /// A spec is well-formed but cannot be satisfied
    #[error("{0}")]
    Validation(String),

    /// No free private IP could be found
    #[error("IP {ip} is not available in VNet {vnet} and there were no other available IPs found")]
    IpExhausted { ip: String, vnet: String },

    /// The SKU listing has no entry for the requested name
    #[error("resource sku with name '{name}' and category '{resource_type}' not found")]
    SkuNotFound { name: String, resource_type: String },

    /// The caller's context was cancelled mid-operation
    #[error("operation cancelled")]
    Cancelled,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ServiceError {
    /// Wrap a provider error with context
    pub fn provider(context: impl Into<String>, source: ArmError) -> Self {
        Self::Provider {
            context: context.into(),
            source,
        }
    }

    /// Classification of the underlying provider error, if there is one
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Provider { source, .. } => Some(source.kind()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == Some(ErrorKind::NotFound)
    }
}
