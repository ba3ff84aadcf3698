//! Wire object construction for load balancers.
//!
//! [`build`] is pure: identical inputs serialize to identical JSON.

use crate::converters::tags_to_map;
use crate::scope::Scope;
use arm_client::{
    BackendAddressPool, FrontendIpConfiguration, FrontendIpConfigurationProperties,
    IpAllocationMethod, LoadBalancer, LoadBalancerProperties, LoadBalancerSku, LoadBalancingRule,
    LoadBalancingRuleProperties, LoadDistribution, OutboundNatRule, OutboundNatRuleProperties,
    Probe, ProbeProperties, ProbeProtocol, PublicIpAddress, ResourceId, SubResource, Subnet,
    TransportProtocol,
};
use crds::tags::{self, BuildParams, ResourceLifecycle};
use crds::{LoadBalancerRole, LoadBalancerSpec};

pub const PROBE_NAME: &str = "tcpHTTPSProbe";
pub const LB_RULE_NAME: &str = "LBRuleHTTPS";
pub const OUTBOUND_NAT_RULE_NAME: &str = "OutboundNATAllProtocols";

const PROBE_INTERVAL_SECONDS: i32 = 15;
const PROBE_COUNT: i32 = 4;
const IDLE_TIMEOUT_MINUTES: i32 = 4;

/// How the single frontend binds to the network
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontendConfig {
    /// Static private IP in a subnet (internal load balancers)
    Private { ip: String, subnet: Subnet },
    /// Dynamic binding to a public IP resource
    Public { public_ip: PublicIpAddress },
}

pub fn frontend_name(spec: &LoadBalancerSpec) -> String {
    format!("{}-frontEnd", spec.name)
}

pub fn backend_pool_name(spec: &LoadBalancerSpec) -> String {
    match spec.role {
        LoadBalancerRole::NodeOutbound => format!("{}-outboundBackendPool", spec.name),
        LoadBalancerRole::ApiServer | LoadBalancerRole::Internal => {
            format!("{}-backendPool", spec.name)
        }
    }
}

/// IDs of the sub-resources rules point at
struct SubResourceIds {
    frontend: String,
    backend_pool: String,
    probe: String,
}

impl SubResourceIds {
    fn new(scope: &dyn Scope, spec: &LoadBalancerSpec) -> Self {
        let lb = ResourceId::network(
            scope.subscription_id(),
            scope.resource_group(),
            "loadBalancers",
            &spec.name,
        );
        Self {
            frontend: lb
                .clone()
                .child("frontendIPConfigurations", frontend_name(spec))
                .to_string(),
            backend_pool: lb
                .clone()
                .child("backendAddressPools", backend_pool_name(spec))
                .to_string(),
            probe: lb.child("probes", PROBE_NAME).to_string(),
        }
    }
}

fn frontend(spec: &LoadBalancerSpec, config: FrontendConfig) -> FrontendIpConfiguration {
    let properties = match config {
        FrontendConfig::Private { ip, subnet } => FrontendIpConfigurationProperties {
            private_ip_address: Some(ip),
            private_ip_allocation_method: Some(IpAllocationMethod::Static),
            subnet: Some(subnet),
            public_ip_address: None,
        },
        FrontendConfig::Public { public_ip } => FrontendIpConfigurationProperties {
            private_ip_address: None,
            private_ip_allocation_method: Some(IpAllocationMethod::Dynamic),
            subnet: None,
            public_ip_address: Some(public_ip),
        },
    };
    FrontendIpConfiguration {
        id: None,
        name: Some(frontend_name(spec)),
        properties: Some(properties),
    }
}

fn probe(spec: &LoadBalancerSpec) -> Probe {
    Probe {
        id: None,
        name: Some(PROBE_NAME.to_string()),
        properties: Some(ProbeProperties {
            protocol: ProbeProtocol::Tcp,
            port: i32::from(spec.api_server_port),
            request_path: None,
            interval_in_seconds: Some(PROBE_INTERVAL_SECONDS),
            number_of_probes: Some(PROBE_COUNT),
        }),
    }
}

fn api_server_rule(
    spec: &LoadBalancerSpec,
    ids: &SubResourceIds,
    disable_outbound_snat: Option<bool>,
) -> LoadBalancingRule {
    let port = i32::from(spec.api_server_port);
    LoadBalancingRule {
        id: None,
        name: Some(LB_RULE_NAME.to_string()),
        properties: Some(LoadBalancingRuleProperties {
            protocol: TransportProtocol::Tcp,
            frontend_port: port,
            backend_port: port,
            idle_timeout_in_minutes: Some(IDLE_TIMEOUT_MINUTES),
            enable_floating_ip: Some(false),
            disable_outbound_snat,
            load_distribution: LoadDistribution::Default,
            frontend_ip_configuration: Some(SubResource::new(&ids.frontend)),
            backend_address_pool: Some(SubResource::new(&ids.backend_pool)),
            probe: Some(SubResource::new(&ids.probe)),
        }),
    }
}

fn outbound_nat_rule(ids: &SubResourceIds) -> OutboundNatRule {
    OutboundNatRule {
        id: None,
        name: Some(OUTBOUND_NAT_RULE_NAME.to_string()),
        properties: Some(OutboundNatRuleProperties {
            frontend_ip_configurations: vec![SubResource::new(&ids.frontend)],
            backend_address_pool: Some(SubResource::new(&ids.backend_pool)),
        }),
    }
}

/// Assemble the full load balancer for `spec` with the given frontend binding.
pub fn build(scope: &dyn Scope, spec: &LoadBalancerSpec, config: FrontendConfig) -> LoadBalancer {
    let ids = SubResourceIds::new(scope, spec);

    let (probes, rules, outbound_nat_rules) = match spec.role {
        // SNAT is disabled on the rule; outbound traffic goes through the NAT rule
        LoadBalancerRole::ApiServer => (
            Some(vec![probe(spec)]),
            Some(vec![api_server_rule(spec, &ids, Some(true))]),
            Some(vec![outbound_nat_rule(&ids)]),
        ),
        LoadBalancerRole::Internal => (
            Some(vec![probe(spec)]),
            Some(vec![api_server_rule(spec, &ids, None)]),
            None,
        ),
        LoadBalancerRole::NodeOutbound => (None, None, Some(vec![outbound_nat_rule(&ids)])),
    };

    let additional = scope.additional_tags();
    let tags = tags::build(BuildParams {
        cluster_name: scope.cluster_name(),
        lifecycle: ResourceLifecycle::Owned,
        name: None,
        role: Some(spec.role.tag_value()),
        additional: &additional,
    });

    LoadBalancer {
        id: None,
        name: None,
        location: Some(scope.location().to_string()),
        tags: tags_to_map(tags),
        sku: Some(LoadBalancerSku {
            name: Some(scope.load_balancer_sku()),
        }),
        properties: Some(LoadBalancerProperties {
            frontend_ip_configurations: Some(vec![frontend(spec, config)]),
            backend_address_pools: Some(vec![BackendAddressPool {
                id: None,
                name: Some(backend_pool_name(spec)),
            }]),
            load_balancing_rules: rules,
            probes,
            outbound_nat_rules,
            provisioning_state: None,
        }),
    }
}
