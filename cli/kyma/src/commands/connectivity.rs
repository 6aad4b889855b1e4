//! Application connectivity commands

use crate::cli::{BindNamespaceArgs, CreateApplicationArgs, CreateTokenArgs};
use anyhow::{Context, Result};
use crds::ApplicationSpec;
use reconcile::{BindingIntent, BindingReport, Reconciled, Reconciler};

pub async fn create_application(reconciler: &Reconciler, args: &CreateApplicationArgs) -> Result<Reconciled> {
    let spec = ApplicationSpec {
        description: args.description.clone(),
        ..ApplicationSpec::default()
    };
    reconciler
        .create_application(&args.name, spec, args.ignore_if_existing)
        .await
        .with_context(|| format!("Failed to create application {}", args.name))
}

pub async fn bind_namespace(reconciler: &Reconciler, args: &BindNamespaceArgs) -> Result<BindingReport> {
    let intent = BindingIntent {
        application: args.name.clone(),
        namespace: args.namespace.clone(),
        create_namespace_if_missing: args.create_namespace,
        ignore_if_mapping_exists: args.ignore_if_existing,
    };
    reconciler
        .bind(&intent)
        .await
        .with_context(|| format!("Failed to bind namespace {} to application {}", args.namespace, args.name))
}

pub async fn create_token(reconciler: &Reconciler, args: &CreateTokenArgs) -> Result<String> {
    reconciler
        .create_token(&args.name)
        .await
        .with_context(|| format!("Failed to create a token for application {}", args.name))
}
