//! Load Balancer Apply
//!
//! One-shot reconcile of the load balancers declared in an `AzureCluster`
//! manifest.
//!
//! Usage: `lb-apply [reconcile|delete]` (default `reconcile`)
//!
//! Environment:
//! - `CLUSTER_MANIFEST`: path to the `AzureCluster` YAML
//! - `ARM_TOKEN`: bearer token for the Resource Manager API
//! - `AZURE_SUBSCRIPTION_ID`, `AZURE_ENVIRONMENT`, `AZURE_ARM_ENDPOINT`:
//!   see [`cloud_services::config`]

use anyhow::{Context as _, Result, bail};
use arm_client::ArmClient;
use cloud_services::{ClientSet, CloudConfig, ClusterScope, Context, Scope, loadbalancers};
use crds::AzureCluster;
use std::env;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Reconcile,
    Delete,
}

impl Action {
    fn parse(arg: Option<&str>) -> Result<Self> {
        match arg {
            None | Some("reconcile") => Ok(Self::Reconcile),
            Some("delete") => Ok(Self::Delete),
            Some(other) => bail!("unknown action {other:?}, expected reconcile or delete"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let action = Action::parse(env::args().nth(1).as_deref())?;

    let manifest_path = env::var("CLUSTER_MANIFEST")
        .context("CLUSTER_MANIFEST environment variable is required")?;
    let token = env::var("ARM_TOKEN").context("ARM_TOKEN environment variable is required")?;
    let config = CloudConfig::from_env()?;

    let manifest = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path))?;
    let cluster: AzureCluster = serde_yaml::from_str(&manifest)
        .with_context(|| format!("failed to parse AzureCluster from {}", manifest_path))?;

    let api_versions = config.api_versions();
    let endpoint = config.resource_manager_endpoint.clone();
    let scope = Arc::new(ClusterScope::new(&cluster, config)?);

    info!("Starting load balancer {:?}", action);
    info!("  Cluster: {}", scope.cluster_name());
    info!("  Resource group: {}", scope.resource_group());
    info!("  Endpoint: {}", endpoint);

    let client = ArmClient::new(endpoint, scope.subscription_id().to_string(), token)?
        .with_api_versions(api_versions);
    let clients = ClientSet::from_client(Arc::new(client));

    let specs = scope.load_balancer_specs().to_vec();
    if specs.is_empty() {
        warn!("AzureCluster {} declares no load balancers", scope.cluster_name());
        return Ok(());
    }

    let service = loadbalancers::Service::new(scope, clients);
    let ctx = Context::background();
    match action {
        Action::Reconcile => service.reconcile(&ctx, &specs).await?,
        Action::Delete => service.delete(&ctx, &specs).await?,
    }

    info!("Load balancer {:?} complete ({} specs)", action, specs.len());
    Ok(())
}
