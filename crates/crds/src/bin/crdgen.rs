//! Print the CRD manifests as a multi-document YAML stream

use crds::{AzureCluster, AzureMachine};
use kube::CustomResourceExt;

fn main() -> Result<(), serde_yaml::Error> {
    print!("{}", serde_yaml::to_string(&AzureCluster::crd())?);
    println!("---");
    print!("{}", serde_yaml::to_string(&AzureMachine::crd())?);
    Ok(())
}
