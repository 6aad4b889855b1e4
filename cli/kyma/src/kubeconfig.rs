//! Cluster domain discovery from the kubeconfig

use anyhow::{anyhow, Context, Result};
use kube::config::Kubeconfig;
use std::path::Path;

/// Domain of the current context's cluster: its API server host minus the first label
///
/// `https://api.foo.example.com:443` yields `foo.example.com`.
pub fn cluster_domain(path: Option<&Path>) -> Result<String> {
    let kubeconfig = match path {
        Some(path) => Kubeconfig::read_from(path)
            .with_context(|| format!("Cannot read kubeconfig {}", path.display()))?,
        None => Kubeconfig::read().context("Cannot read kubeconfig")?,
    };
    let server = current_server(&kubeconfig)?;
    domain_of(server)
}

fn current_server(kubeconfig: &Kubeconfig) -> Result<&str> {
    let current = kubeconfig
        .current_context
        .as_deref()
        .ok_or_else(|| anyhow!("kubeconfig has no current context"))?;
    let cluster = kubeconfig
        .contexts
        .iter()
        .find(|c| c.name == current)
        .and_then(|c| c.context.as_ref())
        .map(|c| c.cluster.as_str())
        .ok_or_else(|| anyhow!("context {current} not found in kubeconfig"))?;
    kubeconfig
        .clusters
        .iter()
        .find(|c| c.name == cluster)
        .and_then(|c| c.cluster.as_ref())
        .and_then(|c| c.server.as_deref())
        .ok_or_else(|| anyhow!("cluster {cluster} has no server in kubeconfig"))
}

fn domain_of(server: &str) -> Result<String> {
    let without_scheme = server.split_once("://").map_or(server, |(_, rest)| rest);
    let authority = without_scheme.split('/').next().unwrap_or_default();
    let host = authority.rsplit_once(':').map_or(authority, |(host, _port)| host);
    match host.split_once('.') {
        Some((_, domain)) if !domain.is_empty() => Ok(domain.to_string()),
        _ => Err(anyhow!("cannot derive a cluster domain from server {server}")),
    }
}
