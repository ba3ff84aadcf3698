use super::map_to_tags;
use arm_client::{LoadBalancer, resource_name_from_id};
use crds::{FrontendIpState, LoadBalancerState};

/// Convert a wire load balancer into its observed state.
pub fn sdk_to_load_balancer(lb: &LoadBalancer) -> LoadBalancerState {
    let properties = lb.properties.as_ref();

    LoadBalancerState {
        id: lb.id.clone().unwrap_or_default(),
        name: lb.name.clone().unwrap_or_default(),
        sku: lb
            .sku
            .as_ref()
            .and_then(|s| s.name)
            .map(|name| name.as_str().to_string())
            .unwrap_or_default(),
        frontend_ips: properties
            .and_then(|p| p.frontend_ip_configurations.as_ref())
            .map(|frontends| {
                frontends
                    .iter()
                    .map(|f| {
                        let props = f.properties.as_ref();
                        FrontendIpState {
                            name: f.name.clone().unwrap_or_default(),
                            private_ip: props.and_then(|p| p.private_ip_address.clone()),
                            public_ip_id: props
                                .and_then(|p| p.public_ip_address.as_ref())
                                .and_then(|ip| ip.id.clone()),
                        }
                    })
                    .collect()
            })
            .unwrap_or_default(),
        backend_pools: properties
            .and_then(|p| p.backend_address_pools.as_ref())
            .map(|pools| {
                pools
                    .iter()
                    .map(|pool| {
                        pool.name
                            .clone()
                            .or_else(|| pool.id.as_deref().map(|id| resource_name_from_id(id).to_string()))
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .unwrap_or_default(),
        tags: map_to_tags(lb.tags.as_ref()),
    }
}
