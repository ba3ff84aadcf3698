//! Private IP selection for internal load balancers.

use crate::context::Context;
use crate::error::ServiceError;
use arm_client::VirtualNetworksClient;
use tracing::debug;

/// Address handed out when the subnet uses the default control-plane range
pub const DEFAULT_INTERNAL_LB_IP_ADDRESS: &str = "10.0.0.100";

/// Default control-plane subnet range
pub const DEFAULT_CONTROL_PLANE_SUBNET_CIDR: &str = "10.0.0.0/16";

/// First address to try when the caller has no preference.
///
/// Custom ranges are truncated textually after the last `.`, so only
/// octet-aligned prefixes yield an address inside the subnet. Input with
/// no `.` keeps nothing and yields `"0"`.
pub fn default_candidate(subnet_cidr: &str) -> String {
    if subnet_cidr == DEFAULT_CONTROL_PLANE_SUBNET_CIDR {
        return DEFAULT_INTERNAL_LB_IP_ADDRESS.to_string();
    }
    let prefix = subnet_cidr
        .rfind('.')
        .map_or("", |index| &subnet_cidr[..=index]);
    format!("{}0", prefix)
}

/// Pick a free private IP in `vnet`.
///
/// Tries `preferred` (or the default candidate for `subnet_cidr`) and falls
/// back to the first alternative the provider suggests.
pub async fn allocate(
    ctx: &Context,
    client: &dyn VirtualNetworksClient,
    resource_group: &str,
    vnet: &str,
    subnet_cidr: &str,
    preferred: Option<&str>,
) -> Result<String, ServiceError> {
    let candidate = match preferred.filter(|ip| !ip.is_empty()) {
        Some(ip) => ip.to_string(),
        None => default_candidate(subnet_cidr),
    };

    debug!("Checking availability of {} in VNet {}", candidate, vnet);
    let result = ctx
        .run(client.check_ip_address_availability(resource_group, vnet, &candidate))
        .await?
        .map_err(|e| ServiceError::provider("failed to check IP availability", e))?;

    if result.available.unwrap_or(false) {
        return Ok(candidate);
    }

    match result
        .available_ip_addresses
        .and_then(|ips| ips.into_iter().next())
    {
        Some(alternative) => {
            debug!("{} is taken, using {}", candidate, alternative);
            Ok(alternative)
        }
        None => Err(ServiceError::IpExhausted {
            ip: candidate,
            vnet: vnet.to_string(),
        }),
    }
}
