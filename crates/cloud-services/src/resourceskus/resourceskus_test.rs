//! Unit tests for the resource SKU cache

#[cfg(test)]
mod tests {
    use super::super::*;
    use arm_client::{MockArmClient, MockKind, MockOp, ResourceSkuCapability};

    fn sku(name: &str, resource_type: &str, capabilities: &[(&str, &str)]) -> ResourceSku {
        ResourceSku {
            name: Some(name.to_string()),
            resource_type: Some(resource_type.to_string()),
            locations: Some(vec!["testlocation".to_string()]),
            capabilities: Some(
                capabilities
                    .iter()
                    .map(|(n, v)| ResourceSkuCapability {
                        name: Some(n.to_string()),
                        value: Some(v.to_string()),
                    })
                    .collect(),
            ),
        }
    }

    fn cache() -> (Arc<MockArmClient>, Cache) {
        let mock = Arc::new(MockArmClient::default());
        mock.set_resource_skus(vec![
            sku("Standard_D2s_v3", VIRTUAL_MACHINES, &[(EPHEMERAL_OS_DISK, "True")]),
            sku("Standard_B1s", VIRTUAL_MACHINES, &[(EPHEMERAL_OS_DISK, "False")]),
            sku("Standard_D2s_v3", "disks", &[]),
        ]);
        let cache = Cache::new(mock.clone(), "testlocation");
        (mock, cache)
    }

    #[tokio::test]
    async fn test_lists_once() {
        let (mock, cache) = cache();
        let ctx = Context::background();

        let found = cache.get(&ctx, "Standard_D2s_v3", VIRTUAL_MACHINES).await.unwrap();
        assert_eq!(found.resource_type.as_deref(), Some(VIRTUAL_MACHINES));
        cache.get(&ctx, "Standard_B1s", VIRTUAL_MACHINES).await.unwrap();

        let lists = mock.calls_to(MockKind::ResourceSku, MockOp::List);
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].target, "testlocation");
    }

    #[tokio::test]
    async fn test_has_capability() {
        let (_mock, cache) = cache();
        let ctx = Context::background();
        assert!(
            cache
                .has_capability(&ctx, "Standard_D2s_v3", VIRTUAL_MACHINES, EPHEMERAL_OS_DISK)
                .await
                .unwrap()
        );
        assert!(
            !cache
                .has_capability(&ctx, "Standard_B1s", VIRTUAL_MACHINES, EPHEMERAL_OS_DISK)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_missing_sku() {
        let (_mock, cache) = cache();
        let err = cache
            .get(&Context::background(), "Standard_Z9", VIRTUAL_MACHINES)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::SkuNotFound { .. }));
        assert_eq!(
            err.to_string(),
            "resource sku with name 'Standard_Z9' and category 'virtualMachines' not found"
        );
    }

    #[tokio::test]
    async fn test_list_failure_is_not_cached() {
        let (mock, cache) = cache();
        mock.fail(MockKind::ResourceSku, MockOp::List, "testlocation", 429, "Too Many Requests");
        let ctx = Context::background();

        let err = cache.get(&ctx, "Standard_B1s", VIRTUAL_MACHINES).await.unwrap_err();
        assert!(err.to_string().starts_with("failed to list resource skus"));
        // a failed listing leaves the cache empty, so the next lookup lists again
        let _ = cache.get(&ctx, "Standard_B1s", VIRTUAL_MACHINES).await;
        assert_eq!(mock.calls_to(MockKind::ResourceSku, MockOp::List).len(), 2);
    }
}
