//! Function development commands

use crate::cli::{DeployArgs, NewLambdaArgs};
use crate::descriptor::ProjectDescriptor;
use crate::kubeconfig;
use crate::scaffold::{self, ScaffoldReport, TemplateParameters};
use anyhow::{Context, Result};
use reconcile::{DeployReport, Reconciler};
use std::path::Path;
use tracing::info;

pub async fn deploy(reconciler: &Reconciler, args: &DeployArgs) -> Result<DeployReport> {
    let descriptor = ProjectDescriptor::load(&args.workdir)?;
    let deployment = descriptor.deployment(&args.workdir)?;
    reconciler
        .deploy_function(&deployment)
        .await
        .with_context(|| format!("Failed to deploy function {}/{}", descriptor.namespace, descriptor.name))
}

pub fn new_lambda(args: &NewLambdaArgs, kubeconfig: Option<&Path>) -> Result<ScaffoldReport> {
    let cluster_domain = match &args.cluster_domain {
        Some(domain) => domain.clone(),
        None => {
            let domain = kubeconfig::cluster_domain(kubeconfig)
                .context("Could not determine default value for cluster domain")?;
            info!("Using cluster domain {} from kubeconfig", domain);
            domain
        }
    };
    let params = TemplateParameters {
        name: args.name.clone(),
        namespace: args.namespace.clone(),
        expose: args.expose,
        cluster_domain,
    };
    scaffold::scaffold(&args.template_root, &args.output_root, &params)
        .with_context(|| format!("Could not generate lambda {}", args.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crds::kinds::{API, FUNCTION};
    use reconcile::ReconciliationOutcome;
    use resource_store::{MockResourceStore, ResourceRef, StoreOp};
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn write_project(dir: &Path, source: &str) {
        fs::write(
            dir.join("kyma.json"),
            r#"{"name": "orders", "namespace": "sales", "file": "handler.js", "expose": true, "clusterDomain": "foo.example.com"}"#,
        )
        .unwrap();
        fs::write(dir.join("handler.js"), source).unwrap();
    }

    #[tokio::test]
    async fn test_deploy_project_twice() {
        let project = TempDir::new().unwrap();
        write_project(project.path(), "module.exports = { main: () => 'v1' };");
        let store = MockResourceStore::new();
        let reconciler = Reconciler::new(Arc::new(store.clone()));
        let args = DeployArgs {
            workdir: project.path().to_path_buf(),
        };

        let first = deploy(&reconciler, &args).await.unwrap();
        assert_eq!(first.function, ReconciliationOutcome::Created);
        assert_eq!(first.api, Some(ReconciliationOutcome::Created));
        let api = store
            .object(&ResourceRef::namespaced(API, "sales", "orders").unwrap())
            .unwrap();
        assert_eq!(api["spec"]["hostname"], "orders.foo.example.com");

        let second = deploy(&reconciler, &args).await.unwrap();
        assert_eq!(second.function, ReconciliationOutcome::Unchanged);
        assert_eq!(second.api, Some(ReconciliationOutcome::Unchanged));
        assert_eq!(store.count(StoreOp::Update, &FUNCTION), 0);
    }

    #[tokio::test]
    async fn test_deploy_without_descriptor_touches_nothing() {
        let project = TempDir::new().unwrap();
        let store = MockResourceStore::new();
        let reconciler = Reconciler::new(Arc::new(store.clone()));

        let err = deploy(&reconciler, &DeployArgs { workdir: project.path().to_path_buf() })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("kyma.json"));
        assert!(store.calls().is_empty());
    }

    #[test]
    fn test_new_lambda_with_explicit_domain() {
        let templates = TempDir::new().unwrap();
        fs::write(templates.path().join("kyma.json.tmpl"), "{{.Name}} {{.ClusterDomain}}").unwrap();
        let out = TempDir::new().unwrap();
        let args = NewLambdaArgs {
            name: "orders".to_string(),
            namespace: "default".to_string(),
            expose: false,
            cluster_domain: Some("foo.example.com".to_string()),
            template_root: templates.path().to_path_buf(),
            output_root: out.path().to_path_buf(),
        };

        new_lambda(&args, Some(Path::new("/nonexistent/kubeconfig"))).unwrap();
        assert_eq!(
            fs::read_to_string(out.path().join("orders").join("kyma.json")).unwrap(),
            "orders foo.example.com"
        );
    }

    #[test]
    fn test_new_lambda_domain_from_kubeconfig() {
        let templates = TempDir::new().unwrap();
        fs::write(templates.path().join("domain.tmpl"), "{{.ClusterDomain}}").unwrap();
        let config_dir = TempDir::new().unwrap();
        let kubeconfig = config_dir.path().join("config");
        fs::write(
            &kubeconfig,
            "apiVersion: v1\nkind: Config\ncurrent-context: c\ncontexts:\n- name: c\n  context:\n    cluster: k\n    user: u\nclusters:\n- name: k\n  cluster:\n    server: https://api.bar.example.org\nusers:\n- name: u\n  user: {}\n",
        )
        .unwrap();
        let out = TempDir::new().unwrap();
        let args = NewLambdaArgs {
            name: "orders".to_string(),
            namespace: "default".to_string(),
            expose: true,
            cluster_domain: None,
            template_root: templates.path().to_path_buf(),
            output_root: out.path().to_path_buf(),
        };

        new_lambda(&args, Some(kubeconfig.as_path())).unwrap();
        assert_eq!(
            fs::read_to_string(out.path().join("orders").join("domain")).unwrap(),
            "bar.example.org"
        );
    }
}
