//! Integration tests for the Resource Manager client
//!
//! These tests require a real subscription.
//! Set ARM_ENDPOINT, AZURE_SUBSCRIPTION_ID, ARM_TOKEN and (for the
//! resource tests) ARM_RESOURCE_GROUP / ARM_VNET environment variables to run.

use arm_client::{
    ArmClient, ErrorKind, LoadBalancersClient, ResourceSkusClient, VirtualNetworksClient,
};

fn client() -> ArmClient {
    let endpoint = std::env::var("ARM_ENDPOINT")
        .unwrap_or_else(|_| "https://management.azure.com/".to_string());
    let subscription = std::env::var("AZURE_SUBSCRIPTION_ID")
        .expect("AZURE_SUBSCRIPTION_ID environment variable must be set");
    let token = std::env::var("ARM_TOKEN").expect("ARM_TOKEN environment variable must be set");

    ArmClient::new(endpoint, subscription, token).expect("Failed to create client")
}

#[tokio::test]
#[ignore] // Requires a subscription
async fn test_list_resource_skus() {
    let client = client();

    let skus = client
        .list(Some("eastus"))
        .await
        .expect("Failed to list resource SKUs");

    println!("Found {} SKUs", skus.len());
    assert!(!skus.is_empty());
}

#[tokio::test]
#[ignore]
async fn test_missing_load_balancer_is_not_found() {
    let client = client();
    let rg = std::env::var("ARM_RESOURCE_GROUP")
        .expect("ARM_RESOURCE_GROUP environment variable must be set");

    let err = LoadBalancersClient::get(&client, &rg, "lb-that-does-not-exist")
        .await
        .expect_err("load balancer should not exist");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
#[ignore]
async fn test_check_ip_address_availability() {
    let client = client();
    let rg = std::env::var("ARM_RESOURCE_GROUP")
        .expect("ARM_RESOURCE_GROUP environment variable must be set");
    let vnet = std::env::var("ARM_VNET").expect("ARM_VNET environment variable must be set");

    let result = client
        .check_ip_address_availability(&rg, &vnet, "10.0.0.100")
        .await
        .expect("Failed to check IP availability");

    println!("Availability: {:?}", result);
    assert!(result.available.is_some());
}
