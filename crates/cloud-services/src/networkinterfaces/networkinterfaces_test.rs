//! Unit tests for network interface reconciliation

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::test_utils::*;
    use arm_client::{
        MockArmClient, MockKind, MockOp, ResourceSku, ResourceSkuCapability, Subnet,
    };

    const LB_PREFIX: &str =
        "/subscriptions/123/resourceGroups/my-rg/providers/Microsoft.Network/loadBalancers";

    fn service() -> (Arc<MockArmClient>, Service) {
        let (mock, clients) = create_test_clients();
        let scope = create_test_cluster_scope(Vec::new());
        let skus = Arc::new(resourceskus::Cache::new(clients.resource_skus.clone(), "testlocation"));
        mock.add_subnet(
            "my-rg",
            "my-vnet",
            Subnet {
                id: Some("cp-subnet-id".to_string()),
                name: Some("my-cp-subnet".to_string()),
                properties: None,
            },
        );
        (mock, Service::new(scope, clients, skus))
    }

    fn control_plane_nic() -> NicSpec {
        NicSpec {
            name: "my-vm-nic".to_string(),
            subnet_name: "my-cp-subnet".to_string(),
            backend_pools: vec![
                BackendPoolRef {
                    load_balancer: "my-publiclb".to_string(),
                    pool: "my-publiclb-backendPool".to_string(),
                },
                BackendPoolRef {
                    load_balancer: "my-internallb".to_string(),
                    pool: "my-internallb-backendPool".to_string(),
                },
            ],
            inbound_nat_rules: vec![InboundNatRuleRef {
                load_balancer: "my-publiclb".to_string(),
                rule: "my-vm".to_string(),
            }],
            accelerated_networking: Some(false),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_control_plane_nic() {
        let (mock, service) = service();

        service
            .reconcile(&Context::background(), &[control_plane_nic()])
            .await
            .unwrap();

        let nic = mock.network_interface("my-rg", "my-vm-nic").unwrap();
        assert_eq!(nic.tags.unwrap()["Name"], "my-vm-nic");
        let props = nic.properties.unwrap();
        assert_eq!(props.enable_accelerated_networking, Some(false));

        let ip_config = props.ip_configurations.unwrap()[0].properties.clone().unwrap();
        assert_eq!(ip_config.primary, Some(true));
        assert_eq!(ip_config.private_ip_allocation_method, Some(IpAllocationMethod::Dynamic));
        assert_eq!(ip_config.subnet.and_then(|s| s.id).as_deref(), Some("cp-subnet-id"));
        assert!(ip_config.public_ip_address.is_none());

        let pools: Vec<String> = ip_config
            .load_balancer_backend_address_pools
            .unwrap()
            .into_iter()
            .filter_map(|p| p.id)
            .collect();
        assert_eq!(
            pools,
            vec![
                format!("{}/my-publiclb/backendAddressPools/my-publiclb-backendPool", LB_PREFIX),
                format!("{}/my-internallb/backendAddressPools/my-internallb-backendPool", LB_PREFIX),
            ]
        );
        assert_eq!(
            ip_config.load_balancer_inbound_nat_rules.unwrap()[0].id.as_deref(),
            Some(format!("{}/my-publiclb/inboundNatRules/my-vm", LB_PREFIX).as_str())
        );
    }

    #[tokio::test]
    async fn test_static_ip_and_public_ip() {
        let (mock, service) = service();
        let spec = NicSpec {
            name: "bastion-nic".to_string(),
            subnet_name: "my-cp-subnet".to_string(),
            static_ip_address: Some("10.0.0.10".to_string()),
            public_ip_name: Some("bastion-ip".to_string()),
            accelerated_networking: Some(true),
            ..Default::default()
        };

        service.reconcile(&Context::background(), &[spec]).await.unwrap();

        let body = mock.calls_to(MockKind::NetworkInterface, MockOp::CreateOrUpdate)[0]
            .body
            .clone()
            .unwrap();
        let ip_config = &body["properties"]["ipConfigurations"][0]["properties"];
        assert_eq!(ip_config["privateIPAddress"], "10.0.0.10");
        assert_eq!(ip_config["privateIPAllocationMethod"], "Static");
        assert_eq!(
            ip_config["publicIPAddress"]["id"],
            "/subscriptions/123/resourceGroups/my-rg/providers/Microsoft.Network/publicIPAddresses/bastion-ip"
        );
        assert!(ip_config.get("loadBalancerBackendAddressPools").is_none());
        assert_eq!(body["properties"]["enableAcceleratedNetworking"], true);
    }

    #[tokio::test]
    async fn test_accelerated_networking_from_sku() {
        let (mock, service) = service();
        mock.set_resource_skus(vec![ResourceSku {
            name: Some("Standard_D2s_v3".to_string()),
            resource_type: Some("virtualMachines".to_string()),
            locations: None,
            capabilities: Some(vec![ResourceSkuCapability {
                name: Some(ACCELERATED_NETWORKING.to_string()),
                value: Some("True".to_string()),
            }]),
        }]);
        let spec = NicSpec {
            name: "my-vm-nic".to_string(),
            subnet_name: "my-cp-subnet".to_string(),
            vm_size: "Standard_D2s_v3".to_string(),
            ..Default::default()
        };

        service.reconcile(&Context::background(), &[spec]).await.unwrap();

        let nic = mock.network_interface("my-rg", "my-vm-nic").unwrap();
        assert_eq!(nic.properties.unwrap().enable_accelerated_networking, Some(true));
    }

    #[tokio::test]
    async fn test_subnet_not_found() {
        let (mock, service) = service();
        let spec = NicSpec {
            name: "my-vm-nic".to_string(),
            subnet_name: "missing".to_string(),
            ..Default::default()
        };

        let err = service
            .reconcile(&Context::background(), &[spec])
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("failed to get subnet missing"));
        assert!(err.is_not_found());
        assert!(mock.calls_to(MockKind::NetworkInterface, MockOp::CreateOrUpdate).is_empty());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (mock, service) = service();
        let ctx = Context::background();
        service.reconcile(&ctx, &[control_plane_nic()]).await.unwrap();

        service.delete(&ctx, &[control_plane_nic()]).await.unwrap();
        service.delete(&ctx, &[control_plane_nic()]).await.unwrap();
        assert!(mock.network_interface("my-rg", "my-vm-nic").is_none());
    }
}
