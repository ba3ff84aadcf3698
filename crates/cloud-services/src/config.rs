//! Cloud configuration.
//!
//! Cloud-specific strings (Resource Manager endpoint, VM DNS zone, load
//! balancer SKU, API versions) live in one immutable table. [`CloudConfig`]
//! picks an entry from the environment and is handed to the scopes.

use crate::error::ServiceError;
use arm_client::{ApiVersions, LoadBalancerSkuName};
use tracing::debug;

pub const SUBSCRIPTION_ID_ENV: &str = "AZURE_SUBSCRIPTION_ID";
pub const ENVIRONMENT_ENV: &str = "AZURE_ENVIRONMENT";
pub const ARM_ENDPOINT_ENV: &str = "AZURE_ARM_ENDPOINT";

/// Name of the on-premises stack environment
pub const AZURE_STACK_CLOUD_NAME: &str = "AzureStackCloud";

/// One cloud's fixed settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloudEnvironment {
    pub name: &'static str,
    /// Resource Manager endpoint; empty when it must come from `AZURE_ARM_ENDPOINT`
    pub resource_manager_endpoint: &'static str,
    /// Zone public VM DNS names live under; empty when derived from the endpoint
    pub vm_dns_zone: &'static str,
    pub load_balancer_sku: LoadBalancerSkuName,
    pub api_versions: ApiVersions,
}

pub const PUBLIC_CLOUD: CloudEnvironment = CloudEnvironment {
    name: "AzurePublicCloud",
    resource_manager_endpoint: "https://management.azure.com/",
    vm_dns_zone: "cloudapp.azure.com",
    load_balancer_sku: LoadBalancerSkuName::Standard,
    api_versions: ApiVersions::LATEST,
};

pub const CHINA_CLOUD: CloudEnvironment = CloudEnvironment {
    name: "AzureChinaCloud",
    resource_manager_endpoint: "https://management.chinacloudapi.cn/",
    vm_dns_zone: "cloudapp.chinacloudapi.cn",
    load_balancer_sku: LoadBalancerSkuName::Standard,
    api_versions: ApiVersions::LATEST,
};

pub const GERMAN_CLOUD: CloudEnvironment = CloudEnvironment {
    name: "AzureGermanCloud",
    resource_manager_endpoint: "https://management.microsoftazure.de/",
    vm_dns_zone: "cloudapp.microsoftazure.de",
    load_balancer_sku: LoadBalancerSkuName::Standard,
    api_versions: ApiVersions::LATEST,
};

pub const US_GOVERNMENT_CLOUD: CloudEnvironment = CloudEnvironment {
    name: "AzureUSGovernmentCloud",
    resource_manager_endpoint: "https://management.usgovcloudapi.net/",
    vm_dns_zone: "cloudapp.usgovcloudapi.net",
    load_balancer_sku: LoadBalancerSkuName::Standard,
    api_versions: ApiVersions::LATEST,
};

pub const AZURE_STACK_CLOUD: CloudEnvironment = CloudEnvironment {
    name: AZURE_STACK_CLOUD_NAME,
    resource_manager_endpoint: "",
    vm_dns_zone: "",
    load_balancer_sku: LoadBalancerSkuName::Basic,
    api_versions: ApiVersions::STACK_PROFILE,
};

/// Every known environment
pub const ENVIRONMENTS: [CloudEnvironment; 5] = [
    PUBLIC_CLOUD,
    CHINA_CLOUD,
    GERMAN_CLOUD,
    US_GOVERNMENT_CLOUD,
    AZURE_STACK_CLOUD,
];

/// Look up an environment by name (case-insensitive)
pub fn environment_by_name(name: &str) -> Option<CloudEnvironment> {
    ENVIRONMENTS
        .iter()
        .find(|env| env.name.eq_ignore_ascii_case(name))
        .copied()
}

/// Configuration shared by every scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudConfig {
    /// Subscription from the environment; a cluster may override it
    pub subscription_id: Option<String>,
    pub environment: CloudEnvironment,
    /// Resolved Resource Manager endpoint
    pub resource_manager_endpoint: String,
}

impl CloudConfig {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self, ServiceError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServiceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = match read(ENVIRONMENT_ENV) {
            Some(name) => environment_by_name(&name).ok_or_else(|| {
                ServiceError::Config(format!("unknown cloud environment {}", name))
            })?,
            None => PUBLIC_CLOUD,
        };

        let resource_manager_endpoint = match read(ARM_ENDPOINT_ENV) {
            Some(endpoint) => endpoint,
            None if environment.resource_manager_endpoint.is_empty() => {
                return Err(ServiceError::Config(format!(
                    "{} is required for {}",
                    ARM_ENDPOINT_ENV, environment.name
                )));
            }
            None => environment.resource_manager_endpoint.to_string(),
        };

        debug!(
            "Using cloud environment {} at {}",
            environment.name, resource_manager_endpoint
        );

        Ok(Self {
            subscription_id: read(SUBSCRIPTION_ID_ENV),
            environment,
            resource_manager_endpoint,
        })
    }

    /// Subscription to use: `preferred` if set, else the configured one
    pub fn resolve_subscription(&self, preferred: Option<&str>) -> Result<String, ServiceError> {
        preferred
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| self.subscription_id.clone())
            .ok_or_else(|| {
                ServiceError::Config(format!("{} environment variable is not set", SUBSCRIPTION_ID_ENV))
            })
    }

    /// DNS suffix for public VM names in `location`.
    ///
    /// On the stack environment the suffix is derived from the endpoint:
    /// `https://management.<location>.<suffix>/` becomes `cloudapp.<suffix>`.
    pub fn vm_dns_suffix(&self, location: &str) -> String {
        if !self.environment.vm_dns_zone.is_empty() {
            return self.environment.vm_dns_zone.to_string();
        }
        let prefix = format!("https://management.{}.", location);
        let suffix = self
            .resource_manager_endpoint
            .strip_prefix(&prefix)
            .unwrap_or(&self.resource_manager_endpoint)
            .trim_end_matches('/');
        format!("cloudapp.{}", suffix)
    }

    pub fn load_balancer_sku(&self) -> LoadBalancerSkuName {
        self.environment.load_balancer_sku
    }

    pub fn api_versions(&self) -> ApiVersions {
        self.environment.api_versions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_to_public_cloud() {
        let config = CloudConfig::from_lookup(lookup(&[(SUBSCRIPTION_ID_ENV, "123")])).unwrap();
        assert_eq!(config.environment, PUBLIC_CLOUD);
        assert_eq!(config.resource_manager_endpoint, "https://management.azure.com/");
        assert_eq!(config.subscription_id.as_deref(), Some("123"));
        assert_eq!(config.load_balancer_sku(), LoadBalancerSkuName::Standard);
        assert_eq!(config.vm_dns_suffix("eastus"), "cloudapp.azure.com");
    }

    #[test]
    fn test_sovereign_cloud_dns_zones() {
        for (name, zone) in [
            ("AzureChinaCloud", "cloudapp.chinacloudapi.cn"),
            ("AzureGermanCloud", "cloudapp.microsoftazure.de"),
            ("AzureUSGovernmentCloud", "cloudapp.usgovcloudapi.net"),
        ] {
            let config = CloudConfig::from_lookup(lookup(&[(ENVIRONMENT_ENV, name)])).unwrap();
            assert_eq!(config.vm_dns_suffix("anywhere"), zone);
        }
    }

    #[test]
    fn test_stack_requires_endpoint() {
        let err = CloudConfig::from_lookup(lookup(&[(ENVIRONMENT_ENV, "AzureStackCloud")])).unwrap_err();
        assert!(err.to_string().contains(ARM_ENDPOINT_ENV));
    }

    #[test]
    fn test_stack_dns_suffix_and_sku() {
        let config = CloudConfig::from_lookup(lookup(&[
            (ENVIRONMENT_ENV, "azurestackcloud"),
            (ARM_ENDPOINT_ENV, "https://management.local.azurestack.external/"),
        ]))
        .unwrap();
        assert_eq!(config.vm_dns_suffix("local"), "cloudapp.azurestack.external");
        assert_eq!(config.load_balancer_sku(), LoadBalancerSkuName::Basic);
        assert_eq!(config.api_versions(), ApiVersions::STACK_PROFILE);
    }

    #[test]
    fn test_unknown_environment() {
        assert!(CloudConfig::from_lookup(lookup(&[(ENVIRONMENT_ENV, "Mars")])).is_err());
    }

    #[test]
    fn test_resolve_subscription() {
        let config = CloudConfig::from_lookup(lookup(&[])).unwrap();
        assert!(config.resolve_subscription(None).is_err());
        assert_eq!(config.resolve_subscription(Some("abc")).unwrap(), "abc");
    }
}
