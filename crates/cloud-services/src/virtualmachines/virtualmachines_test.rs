//! Unit tests for virtual machine reconciliation

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::scope::MachineRole;
    use crate::test_utils::*;
    use arm_client::{
        InterfaceIpConfiguration, InterfaceIpConfigurationProperties, MockArmClient, MockKind,
        MockOp, NetworkInterface, NetworkInterfaceProperties, PublicIpAddress,
        PublicIpAddressProperties, ResourceSku, ResourceSkuCapability, SubResource,
    };
    use crds::{AzureMachine, DiffDiskSettings, MarketplaceImage};

    const NIC_ID: &str =
        "/subscriptions/123/resourceGroups/my-rg/providers/Microsoft.Network/networkInterfaces/my-vm-nic";

    fn service_for(machine: &AzureMachine) -> (Arc<MockArmClient>, Service, Spec) {
        let (mock, clients) = create_test_clients();
        let scope = create_test_machine_scope(machine, MachineRole::ControlPlane);
        let skus = Arc::new(resourceskus::Cache::new(clients.resource_skus.clone(), "testlocation"));
        let spec = Spec::for_machine(&scope, vec!["my-vm-nic".to_string()], "Y2xvdWQtaW5pdA==");
        mock.add_network_interface(
            "my-rg",
            NetworkInterface {
                id: Some(NIC_ID.to_string()),
                name: Some("my-vm-nic".to_string()),
                ..Default::default()
            },
        );
        (mock, Service::new(scope, clients, skus), spec)
    }

    fn ephemeral_machine() -> AzureMachine {
        let mut machine = create_test_machine("my-vm");
        machine.spec.os_disk.managed_disk.storage_account_type = "Standard_LRS".to_string();
        machine.spec.os_disk.diff_disk_settings = Some(DiffDiskSettings {
            option: "Local".to_string(),
        });
        machine
    }

    fn vm_sku(ephemeral: bool) -> ResourceSku {
        ResourceSku {
            name: Some("Standard_D2s_v3".to_string()),
            resource_type: Some("virtualMachines".to_string()),
            locations: Some(vec!["testlocation".to_string()]),
            capabilities: Some(vec![ResourceSkuCapability {
                name: Some(EPHEMERAL_OS_DISK.to_string()),
                value: Some(if ephemeral { "True" } else { "False" }.to_string()),
            }]),
        }
    }

    #[tokio::test]
    async fn test_create_vm() {
        let mut machine = create_test_machine("my-vm");
        machine.spec.data_disks = vec![DataDisk {
            name_suffix: "etcddisk".to_string(),
            disk_size_gb: 128,
            lun: None,
        }];
        machine
            .spec
            .additional_tags
            .insert("team".to_string(), "infra".to_string());
        let (mock, service, spec) = service_for(&machine);

        service.reconcile(&Context::background(), &spec).await.unwrap();

        let body = mock.calls_to(MockKind::VirtualMachine, MockOp::CreateOrUpdate)[0]
            .body
            .clone()
            .unwrap();
        assert_eq!(body["location"], "testlocation");
        assert_eq!(body["zones"], serde_json::json!(["1"]));
        assert!(body.get("identity").is_none());

        let tags = &body["tags"];
        assert_eq!(tags["sigs.k8s.io_cluster-api-provider-azure_cluster_my-cluster"], "owned");
        assert_eq!(tags["sigs.k8s.io_cluster-api-provider-azure_role"], "control-plane");
        assert_eq!(tags["Name"], "my-vm");
        assert_eq!(tags["kubernetes.io_cluster_my-vm"], "owned");
        assert_eq!(tags["team"], "infra");

        let props = &body["properties"];
        assert_eq!(props["hardwareProfile"]["vmSize"], "Standard_D2s_v3");
        let storage = &props["storageProfile"];
        assert_eq!(storage["osDisk"]["name"], "my-vm_OSDisk");
        assert_eq!(storage["osDisk"]["createOption"], "FromImage");
        assert_eq!(storage["osDisk"]["managedDisk"]["storageAccountType"], "Premium_LRS");
        assert!(storage["osDisk"].get("diffDiskSettings").is_none());
        assert_eq!(storage["dataDisks"][0]["name"], "my-vm_etcddisk");
        assert_eq!(storage["dataDisks"][0]["lun"], 0);
        assert_eq!(storage["dataDisks"][0]["createOption"], "Empty");
        assert_eq!(storage["imageReference"]["publisher"], "cncf-upstream");

        let os = &props["osProfile"];
        assert_eq!(os["computerName"], "my-vm");
        assert_eq!(os["adminUsername"], "capi");
        assert_eq!(os["customData"], "Y2xvdWQtaW5pdA==");
        assert_eq!(os["linuxConfiguration"]["disablePasswordAuthentication"], true);
        assert_eq!(
            os["linuxConfiguration"]["ssh"]["publicKeys"][0]["path"],
            "/home/capi/.ssh/authorized_keys"
        );

        let nics = &props["networkProfile"]["networkInterfaces"];
        assert_eq!(nics[0]["id"], NIC_ID);
        assert_eq!(nics[0]["properties"]["primary"], true);
    }

    #[tokio::test]
    async fn test_system_assigned_identity() {
        let mut machine = create_test_machine("my-vm");
        machine.spec.identity = VmIdentity::SystemAssigned;
        let (mock, service, spec) = service_for(&machine);

        service.reconcile(&Context::background(), &spec).await.unwrap();

        let vm = mock.virtual_machine("my-rg", "my-vm").unwrap();
        assert_eq!(
            vm.identity.map(|i| i.identity_type),
            Some(ResourceIdentityType::SystemAssigned)
        );
    }

    #[tokio::test]
    async fn test_user_assigned_identities() {
        let mut machine = create_test_machine("my-vm");
        machine.spec.identity = VmIdentity::UserAssigned;
        machine.spec.user_assigned_identities = vec![
            UserAssignedIdentity {
                provider_id: "azure:///subscriptions/123/resourceGroups/my-rg/providers/Microsoft.ManagedIdentity/userAssignedIdentities/id1".to_string(),
            },
            UserAssignedIdentity {
                provider_id: "/subscriptions/123/resourceGroups/my-rg/providers/Microsoft.ManagedIdentity/userAssignedIdentities/id2".to_string(),
            },
        ];
        let (mock, service, spec) = service_for(&machine);

        service.reconcile(&Context::background(), &spec).await.unwrap();

        let identity = mock.virtual_machine("my-rg", "my-vm").unwrap().identity.unwrap();
        assert_eq!(identity.identity_type, ResourceIdentityType::UserAssigned);
        let keys: Vec<String> = identity
            .user_assigned_identities
            .unwrap()
            .into_keys()
            .collect();
        assert_eq!(
            keys,
            vec![
                "/subscriptions/123/resourceGroups/my-rg/providers/Microsoft.ManagedIdentity/userAssignedIdentities/id2",
                "subscriptions/123/resourceGroups/my-rg/providers/Microsoft.ManagedIdentity/userAssignedIdentities/id1",
            ]
        );
    }

    #[tokio::test]
    async fn test_user_assigned_without_identities() {
        let mut machine = create_test_machine("my-vm");
        machine.spec.identity = VmIdentity::UserAssigned;
        let (mock, service, spec) = service_for(&machine);

        let err = service.reconcile(&Context::background(), &spec).await.unwrap_err();

        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(err.to_string().contains("must not be null or empty"));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_ephemeral_os_disk() {
        let (mock, service, spec) = service_for(&ephemeral_machine());
        mock.set_resource_skus(vec![vm_sku(true)]);

        service.reconcile(&Context::background(), &spec).await.unwrap();

        let body = mock.calls_to(MockKind::VirtualMachine, MockOp::CreateOrUpdate)[0]
            .body
            .clone()
            .unwrap();
        assert_eq!(
            body["properties"]["storageProfile"]["osDisk"]["diffDiskSettings"]["option"],
            "Local"
        );
    }

    #[tokio::test]
    async fn test_ephemeral_os_disk_unsupported() {
        let (mock, service, spec) = service_for(&ephemeral_machine());
        mock.set_resource_skus(vec![vm_sku(false)]);

        let err = service.reconcile(&Context::background(), &spec).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "vm size Standard_D2s_v3 does not support ephemeral os. select a different vm size or disable ephemeral os"
        );
        assert!(mock.calls_to(MockKind::VirtualMachine, MockOp::CreateOrUpdate).is_empty());
    }

    #[tokio::test]
    async fn test_ephemeral_os_disk_unknown_size() {
        let (_mock, service, spec) = service_for(&ephemeral_machine());

        let err = service.reconcile(&Context::background(), &spec).await.unwrap_err();

        assert!(matches!(err, ServiceError::SkuNotFound { .. }));
    }

    #[tokio::test]
    async fn test_missing_image() {
        let mut machine = create_test_machine("my-vm");
        machine.spec.image = None;
        let (_mock, service, spec) = service_for(&machine);

        let err = service.reconcile(&Context::background(), &spec).await.unwrap_err();
        assert_eq!(err.to_string(), "image is nil");
    }

    #[tokio::test]
    async fn test_missing_image_checked_before_sku_listing() {
        let mut machine = ephemeral_machine();
        machine.spec.image = None;
        let (mock, service, spec) = service_for(&machine);
        mock.set_resource_skus(vec![vm_sku(true)]);

        let err = service.reconcile(&Context::background(), &spec).await.unwrap_err();

        assert_eq!(err.to_string(), "image is nil");
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_nic() {
        let (_mock, service, mut spec) = service_for(&create_test_machine("my-vm"));
        spec.nic_names = vec!["my-vm-nic".to_string(), "other-nic".to_string()];

        let err = service.reconcile(&Context::background(), &spec).await.unwrap_err();
        assert!(err.to_string().starts_with("failed to get network interface other-nic"));
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_create_failure() {
        let (mock, service, spec) = service_for(&create_test_machine("my-vm"));
        mock.fail(
            MockKind::VirtualMachine,
            MockOp::CreateOrUpdate,
            "my-rg/my-vm",
            409,
            "OperationNotAllowed",
        );

        let err = service.reconcile(&Context::background(), &spec).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot create VM my-vm: OperationNotAllowed: StatusCode=409"
        );
    }

    #[tokio::test]
    async fn test_get_with_addresses() {
        let (mock, service, spec) = service_for(&create_test_machine("my-vm"));
        service.reconcile(&Context::background(), &spec).await.unwrap();
        mock.add_network_interface(
            "my-rg",
            NetworkInterface {
                id: Some(NIC_ID.to_string()),
                name: Some("my-vm-nic".to_string()),
                properties: Some(NetworkInterfaceProperties {
                    ip_configurations: Some(vec![InterfaceIpConfiguration {
                        properties: Some(InterfaceIpConfigurationProperties {
                            private_ip_address: Some("10.0.0.4".to_string()),
                            public_ip_address: Some(SubResource::new(
                                "/subscriptions/123/resourceGroups/my-rg/providers/Microsoft.Network/publicIPAddresses/my-vm-ip",
                            )),
                            ..Default::default()
                        }),
                        ..Default::default()
                    }]),
                    enable_accelerated_networking: None,
                }),
                ..Default::default()
            },
        );
        mock.add_public_ip(
            "my-rg",
            PublicIpAddress {
                name: Some("my-vm-ip".to_string()),
                properties: Some(PublicIpAddressProperties {
                    ip_address: Some("20.1.2.3".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            },
        );

        let vm = service.get(&Context::background(), "my-vm").await.unwrap();

        assert_eq!(vm.name, "my-vm");
        assert_eq!(vm.vm_size, "Standard_D2s_v3");
        assert_eq!(vm.availability_zone, "1");
        assert_eq!(vm.state, crds::VmState::Succeeded);
        assert_eq!(
            vm.image,
            Some(Image::Marketplace(MarketplaceImage {
                publisher: "cncf-upstream".to_string(),
                offer: "capi".to_string(),
                sku: "k8s-1dot18dot2-ubuntu-1804".to_string(),
                version: "latest".to_string(),
            }))
        );
        assert_eq!(
            vm.addresses,
            vec![
                NodeAddress {
                    address: "10.0.0.4".to_string(),
                    type_: "InternalIP".to_string(),
                },
                NodeAddress {
                    address: "20.1.2.3".to_string(),
                    type_: "ExternalIP".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let (_mock, service, _spec) = service_for(&create_test_machine("my-vm"));

        let err = service.get(&Context::background(), "my-vm").await.unwrap_err();
        assert!(err.to_string().starts_with("VM my-vm not found"));
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete() {
        let (mock, service, spec) = service_for(&create_test_machine("my-vm"));
        let ctx = Context::background();
        service.reconcile(&ctx, &spec).await.unwrap();

        service.delete(&ctx, "my-vm").await.unwrap();
        assert!(mock.virtual_machine("my-rg", "my-vm").is_none());
        service.delete(&ctx, "my-vm").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_failure() {
        let (mock, service, _spec) = service_for(&create_test_machine("my-vm"));
        mock.fail(MockKind::VirtualMachine, MockOp::Delete, "my-rg/my-vm", 500, "Internal Server Error");

        let err = service.delete(&Context::background(), "my-vm").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to delete VM my-vm in resource group my-rg: Internal Server Error: StatusCode=500"
        );
    }

    #[test]
    fn test_disk_names() {
        let mut machine = create_test_machine("my-vm");
        machine.spec.data_disks = vec![DataDisk {
            name_suffix: "etcddisk".to_string(),
            disk_size_gb: 128,
            lun: Some(0),
        }];
        let scope = create_test_machine_scope(&machine, MachineRole::ControlPlane);
        let spec = Spec::for_machine(&scope, Vec::new(), "");
        assert_eq!(spec.disk_names(), vec!["my-vm_OSDisk", "my-vm_etcddisk"]);
    }
}
