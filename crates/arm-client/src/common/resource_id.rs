//! Resource ID construction
//!
//! `/subscriptions/{sub}/resourceGroups/{rg}/providers/{namespace}/{type}/{name}[/{subType}/{subName}]`

use std::fmt;

/// Network resource provider namespace
pub const NETWORK_PROVIDER: &str = "Microsoft.Network";
/// Compute resource provider namespace
pub const COMPUTE_PROVIDER: &str = "Microsoft.Compute";
/// Managed identity resource provider namespace
pub const IDENTITY_PROVIDER: &str = "Microsoft.ManagedIdentity";

/// A fully-qualified resource ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceId {
    subscription_id: String,
    resource_group: String,
    provider: String,
    resource_type: String,
    name: String,
    child: Option<(String, String)>,
}

impl ResourceId {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        provider: impl Into<String>,
        resource_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            provider: provider.into(),
            resource_type: resource_type.into(),
            name: name.into(),
            child: None,
        }
    }

    /// Network resource (`Microsoft.Network/{type}/{name}`)
    pub fn network(
        subscription_id: &str,
        resource_group: &str,
        resource_type: &str,
        name: &str,
    ) -> Self {
        Self::new(subscription_id, resource_group, NETWORK_PROVIDER, resource_type, name)
    }

    /// Compute resource (`Microsoft.Compute/{type}/{name}`)
    pub fn compute(
        subscription_id: &str,
        resource_group: &str,
        resource_type: &str,
        name: &str,
    ) -> Self {
        Self::new(subscription_id, resource_group, COMPUTE_PROVIDER, resource_type, name)
    }

    /// Append a child segment (`/{subType}/{subName}`)
    pub fn child(mut self, sub_type: impl Into<String>, sub_name: impl Into<String>) -> Self {
        self.child = Some((sub_type.into(), sub_name.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/subscriptions/{}/resourceGroups/{}/providers/{}/{}/{}",
            self.subscription_id, self.resource_group, self.provider, self.resource_type, self.name
        )?;
        if let Some((sub_type, sub_name)) = &self.child {
            write!(f, "/{}/{}", sub_type, sub_name)?;
        }
        Ok(())
    }
}

impl From<ResourceId> for String {
    fn from(id: ResourceId) -> Self {
        id.to_string()
    }
}

/// Path of a resource group (`/subscriptions/{sub}/resourceGroups/{rg}`)
pub fn resource_group_path(subscription_id: &str, resource_group: &str) -> String {
    format!("/subscriptions/{}/resourceGroups/{}", subscription_id, resource_group)
}

/// Last path segment of a resource ID, which is the resource's name.
pub fn resource_name_from_id(id: &str) -> &str {
    id.trim_end_matches('/').rsplit('/').next().unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_resource_id_has_single_leading_slash() {
        let id = ResourceId::network("123", "my-rg", "loadBalancers", "my-lb")
            .child("frontendIPConfigurations", "my-lb-frontEnd");
        assert_eq!(
            id.to_string(),
            "/subscriptions/123/resourceGroups/my-rg/providers/Microsoft.Network/loadBalancers/my-lb/frontendIPConfigurations/my-lb-frontEnd"
        );
    }

    #[test]
    fn test_resource_name_from_id() {
        assert_eq!(
            resource_name_from_id(
                "/subscriptions/123/resourceGroups/my-rg/providers/Microsoft.Network/networkInterfaces/my-nic"
            ),
            "my-nic"
        );
        assert_eq!(resource_name_from_id("plain-name"), "plain-name");
        assert_eq!(resource_name_from_id("/a/b/c/"), "c");
    }
}
