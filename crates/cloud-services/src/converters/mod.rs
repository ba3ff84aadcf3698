//! Conversions between provider wire objects and observed-state records.
//!
//! Every converter is total on well-formed input: missing optional fields
//! become empty values, and collections keep their order and length.

mod image;
mod loadbalancer;
mod vm;
mod vmss;


pub use image::{image_to_sdk, sdk_to_image};
pub use loadbalancer::sdk_to_load_balancer;
pub use vm::sdk_to_vm;
pub use vmss::sdk_to_vmss;

use crds::Tags;

/// Wire tags to a plain map
pub fn map_to_tags(tags: Option<&Tags>) -> Tags {
    tags.cloned().unwrap_or_default()
}

/// Plain map to wire tags; an empty map is sent as no tags
pub fn tags_to_map(tags: Tags) -> Option<Tags> {
    (!tags.is_empty()).then_some(tags)
}
