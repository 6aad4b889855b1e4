//! Print CustomResourceDefinitions for the Kyma kinds as a multi-document YAML stream
//!
//! Used to prepare a plain cluster for running the CLI against it:
//! `cargo run -p crds --bin crdgen | kubectl apply -f -`

use crds::{Api, Application, ApplicationMapping, Function, ServiceClass, ServiceInstance, TokenRequest};
use kube::CustomResourceExt;

fn main() -> Result<(), serde_yaml::Error> {
    let crds = [
        Application::crd(),
        ApplicationMapping::crd(),
        TokenRequest::crd(),
        Function::crd(),
        Api::crd(),
        ServiceClass::crd(),
        ServiceInstance::crd(),
    ];
    for crd in &crds {
        print!("---\n{}", serde_yaml::to_string(crd)?);
    }
    Ok(())
}
