//! Network operations for MockArmClient
//!
//! Handles load balancers, public IPs, virtual networks, subnets and
//! network interfaces

use super::{MockArmClient, MockKind, MockOp, key, not_found, subnet_key};
use crate::common::ResourceId;
use crate::error::ArmError;
use crate::models::*;

pub async fn get_load_balancer(
    client: &MockArmClient,
    resource_group: &str,
    name: &str,
) -> Result<LoadBalancer, ArmError> {
    let target = key(resource_group, name);
    client
        .enter::<()>(MockKind::LoadBalancer, MockOp::Get, &target, None)
        .await?;
    client
        .state()
        .load_balancers
        .get(&target)
        .cloned()
        .ok_or_else(|| not_found("Microsoft.Network/loadBalancers", resource_group, name))
}

pub async fn put_load_balancer(
    client: &MockArmClient,
    resource_group: &str,
    name: &str,
    lb: &LoadBalancer,
) -> Result<LoadBalancer, ArmError> {
    let target = key(resource_group, name);
    client
        .enter(MockKind::LoadBalancer, MockOp::CreateOrUpdate, &target, Some(lb))
        .await?;

    let mut stored = lb.clone();
    stored.id = Some(
        ResourceId::network(&client.subscription_id, resource_group, "loadBalancers", name)
            .to_string(),
    );
    if let Some(props) = stored.properties.as_mut() {
        props.provisioning_state = Some("Succeeded".to_string());
    }
    client.state().load_balancers.insert(target, stored.clone());
    Ok(stored)
}

pub async fn delete_load_balancer(
    client: &MockArmClient,
    resource_group: &str,
    name: &str,
) -> Result<(), ArmError> {
    let target = key(resource_group, name);
    client
        .enter::<()>(MockKind::LoadBalancer, MockOp::Delete, &target, None)
        .await?;
    client
        .state()
        .load_balancers
        .remove(&target)
        .map(|_| ())
        .ok_or_else(|| not_found("Microsoft.Network/loadBalancers", resource_group, name))
}

pub async fn get_public_ip(
    client: &MockArmClient,
    resource_group: &str,
    name: &str,
) -> Result<PublicIpAddress, ArmError> {
    let target = key(resource_group, name);
    client
        .enter::<()>(MockKind::PublicIp, MockOp::Get, &target, None)
        .await?;
    client
        .state()
        .public_ips
        .get(&target)
        .cloned()
        .ok_or_else(|| not_found("Microsoft.Network/publicIPAddresses", resource_group, name))
}

pub async fn put_public_ip(
    client: &MockArmClient,
    resource_group: &str,
    name: &str,
    ip: &PublicIpAddress,
) -> Result<PublicIpAddress, ArmError> {
    let target = key(resource_group, name);
    client
        .enter(MockKind::PublicIp, MockOp::CreateOrUpdate, &target, Some(ip))
        .await?;

    let mut stored = ip.clone();
    stored.id = Some(
        ResourceId::network(&client.subscription_id, resource_group, "publicIPAddresses", name)
            .to_string(),
    );
    client.state().public_ips.insert(target, stored.clone());
    Ok(stored)
}

pub async fn delete_public_ip(
    client: &MockArmClient,
    resource_group: &str,
    name: &str,
) -> Result<(), ArmError> {
    let target = key(resource_group, name);
    client
        .enter::<()>(MockKind::PublicIp, MockOp::Delete, &target, None)
        .await?;
    client
        .state()
        .public_ips
        .remove(&target)
        .map(|_| ())
        .ok_or_else(|| not_found("Microsoft.Network/publicIPAddresses", resource_group, name))
}

pub async fn get_virtual_network(
    client: &MockArmClient,
    resource_group: &str,
    name: &str,
) -> Result<VirtualNetwork, ArmError> {
    let target = key(resource_group, name);
    client
        .enter::<()>(MockKind::VirtualNetwork, MockOp::Get, &target, None)
        .await?;
    client
        .state()
        .virtual_networks
        .get(&target)
        .cloned()
        .ok_or_else(|| not_found("Microsoft.Network/virtualNetworks", resource_group, name))
}

pub async fn put_virtual_network(
    client: &MockArmClient,
    resource_group: &str,
    name: &str,
    vnet: &VirtualNetwork,
) -> Result<VirtualNetwork, ArmError> {
    let target = key(resource_group, name);
    client
        .enter(MockKind::VirtualNetwork, MockOp::CreateOrUpdate, &target, Some(vnet))
        .await?;

    let mut stored = vnet.clone();
    stored.id = Some(
        ResourceId::network(&client.subscription_id, resource_group, "virtualNetworks", name)
            .to_string(),
    );
    client.state().virtual_networks.insert(target, stored.clone());
    Ok(stored)
}

pub async fn delete_virtual_network(
    client: &MockArmClient,
    resource_group: &str,
    name: &str,
) -> Result<(), ArmError> {
    let target = key(resource_group, name);
    client
        .enter::<()>(MockKind::VirtualNetwork, MockOp::Delete, &target, None)
        .await?;
    client
        .state()
        .virtual_networks
        .remove(&target)
        .map(|_| ())
        .ok_or_else(|| not_found("Microsoft.Network/virtualNetworks", resource_group, name))
}

pub async fn check_ip_address_availability(
    client: &MockArmClient,
    _resource_group: &str,
    _vnet: &str,
    ip_address: &str,
) -> Result<IpAddressAvailabilityResult, ArmError> {
    client
        .enter::<()>(
            MockKind::VirtualNetwork,
            MockOp::CheckIpAddressAvailability,
            ip_address,
            None,
        )
        .await?;
    Ok(client
        .state()
        .ip_availability
        .get(ip_address)
        .cloned()
        .unwrap_or_else(IpAddressAvailabilityResult::available))
}

pub async fn get_subnet(
    client: &MockArmClient,
    resource_group: &str,
    vnet: &str,
    name: &str,
) -> Result<Subnet, ArmError> {
    let target = subnet_key(resource_group, vnet, name);
    client
        .enter::<()>(MockKind::Subnet, MockOp::Get, &target, None)
        .await?;
    client
        .state()
        .subnets
        .get(&target)
        .cloned()
        .ok_or_else(|| {
            not_found(
                &format!("Microsoft.Network/virtualNetworks/{}/subnets", vnet),
                resource_group,
                name,
            )
        })
}

pub async fn put_subnet(
    client: &MockArmClient,
    resource_group: &str,
    vnet: &str,
    name: &str,
    subnet: &Subnet,
) -> Result<Subnet, ArmError> {
    let target = subnet_key(resource_group, vnet, name);
    client
        .enter(MockKind::Subnet, MockOp::CreateOrUpdate, &target, Some(subnet))
        .await?;

    let mut stored = subnet.clone();
    stored.id = Some(
        ResourceId::network(&client.subscription_id, resource_group, "virtualNetworks", vnet)
            .child("subnets", name)
            .to_string(),
    );
    stored.name = Some(name.to_string());
    client.state().subnets.insert(target, stored.clone());
    Ok(stored)
}

pub async fn delete_subnet(
    client: &MockArmClient,
    resource_group: &str,
    vnet: &str,
    name: &str,
) -> Result<(), ArmError> {
    let target = subnet_key(resource_group, vnet, name);
    client
        .enter::<()>(MockKind::Subnet, MockOp::Delete, &target, None)
        .await?;
    client
        .state()
        .subnets
        .remove(&target)
        .map(|_| ())
        .ok_or_else(|| {
            not_found(
                &format!("Microsoft.Network/virtualNetworks/{}/subnets", vnet),
                resource_group,
                name,
            )
        })
}

pub async fn get_network_interface(
    client: &MockArmClient,
    resource_group: &str,
    name: &str,
) -> Result<NetworkInterface, ArmError> {
    let target = key(resource_group, name);
    client
        .enter::<()>(MockKind::NetworkInterface, MockOp::Get, &target, None)
        .await?;
    client
        .state()
        .network_interfaces
        .get(&target)
        .cloned()
        .ok_or_else(|| not_found("Microsoft.Network/networkInterfaces", resource_group, name))
}

pub async fn put_network_interface(
    client: &MockArmClient,
    resource_group: &str,
    name: &str,
    nic: &NetworkInterface,
) -> Result<NetworkInterface, ArmError> {
    let target = key(resource_group, name);
    client
        .enter(MockKind::NetworkInterface, MockOp::CreateOrUpdate, &target, Some(nic))
        .await?;

    let mut stored = nic.clone();
    stored.id = Some(
        ResourceId::network(&client.subscription_id, resource_group, "networkInterfaces", name)
            .to_string(),
    );
    client.state().network_interfaces.insert(target, stored.clone());
    Ok(stored)
}

pub async fn delete_network_interface(
    client: &MockArmClient,
    resource_group: &str,
    name: &str,
) -> Result<(), ArmError> {
    let target = key(resource_group, name);
    client
        .enter::<()>(MockKind::NetworkInterface, MockOp::Delete, &target, None)
        .await?;
    client
        .state()
        .network_interfaces
        .remove(&target)
        .map(|_| ())
        .ok_or_else(|| not_found("Microsoft.Network/networkInterfaces", resource_group, name))
}
