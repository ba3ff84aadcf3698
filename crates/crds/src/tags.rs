//! Resource tag conventions
//!
//! Every resource the controllers create carries an ownership tag keyed by
//! cluster name plus optional role and name tags. Lookups rely on these keys,
//! so they must never change.

use crate::types::Tags;

/// Prefix shared by all provider tag keys
pub const NAME_AZURE_PROVIDER_PREFIX: &str = "sigs.k8s.io_cluster-api-provider-azure_";

/// Tag key holding the resource's role
pub const NAME_AZURE_CLUSTER_API_ROLE: &str = "sigs.k8s.io_cluster-api-provider-azure_role";

/// Tag key holding the resource's name
pub const NAME_TAG: &str = "Name";

/// Tag value for the control-plane machine role
pub const CONTROL_PLANE_ROLE_TAG_VALUE: &str = "control-plane";

/// Tag value for the worker machine role
pub const NODE_ROLE_TAG_VALUE: &str = "node";

/// Whether the cluster owns the resource or merely uses it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceLifecycle {
    /// Created by the cluster; deleted with it
    Owned,
    /// Pre-existing; left alone on delete
    Shared,
}

impl ResourceLifecycle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owned => "owned",
            Self::Shared => "shared",
        }
    }
}

/// Ownership tag key for `cluster_name`
pub fn cluster_tag_key(cluster_name: &str) -> String {
    format!("{}cluster_{}", NAME_AZURE_PROVIDER_PREFIX, cluster_name)
}

/// Tag key the in-tree cloud provider uses to find machines of a cluster
pub fn cloud_provider_tag_key(name: &str) -> String {
    format!("kubernetes.io_cluster_{}", name)
}

/// Inputs to [`build`]
#[derive(Debug, Clone)]
pub struct BuildParams<'a> {
    pub cluster_name: &'a str,
    pub lifecycle: ResourceLifecycle,
    pub name: Option<&'a str>,
    pub role: Option<&'a str>,
    pub additional: &'a Tags,
}

/// Build the tag map for a resource.
///
/// Additional tags are applied first; the ownership, role and name tags win
/// on key collisions.
pub fn build(params: BuildParams<'_>) -> Tags {
    let mut tags = params.additional.clone();
    tags.insert(
        cluster_tag_key(params.cluster_name),
        params.lifecycle.as_str().to_string(),
    );
    if let Some(role) = params.role {
        tags.insert(NAME_AZURE_CLUSTER_API_ROLE.to_string(), role.to_string());
    }
    if let Some(name) = params.name {
        tags.insert(NAME_TAG.to_string(), name.to_string());
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_owned_with_role() {
        let mut additional = Tags::new();
        additional.insert("foo".to_string(), "bar".to_string());

        let tags = build(BuildParams {
            cluster_name: "my-cluster",
            lifecycle: ResourceLifecycle::Owned,
            name: None,
            role: Some("apiserver"),
            additional: &additional,
        });

        assert_eq!(tags.len(), 3);
        assert_eq!(
            tags["sigs.k8s.io_cluster-api-provider-azure_cluster_my-cluster"],
            "owned"
        );
        assert_eq!(tags["sigs.k8s.io_cluster-api-provider-azure_role"], "apiserver");
        assert_eq!(tags["foo"], "bar");
    }

    #[test]
    fn test_ownership_tag_overrides_additional() {
        let mut additional = Tags::new();
        additional.insert(cluster_tag_key("c1"), "shared".to_string());

        let tags = build(BuildParams {
            cluster_name: "c1",
            lifecycle: ResourceLifecycle::Owned,
            name: Some("vm-0"),
            role: None,
            additional: &additional,
        });

        assert_eq!(tags[&cluster_tag_key("c1")], "owned");
        assert_eq!(tags[NAME_TAG], "vm-0");
    }
}
