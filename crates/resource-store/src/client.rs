//! Kubernetes-backed resource store
//!
//! Talks to the API server through `Api<DynamicObject>`, so any kind can be
//! addressed without compiled-in types.

use crate::error::StoreError;
use crate::models::{ListSelector, ResourceKind, ResourceRef};
use crate::store_trait::ResourceStore;
use kube::api::{Api, DeleteParams, DynamicObject, ListParams, PostParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::discovery::ApiResource;
use kube::{Client, Config};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Resource store backed by a live cluster
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl std::fmt::Debug for KubeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeStore").finish_non_exhaustive()
    }
}

impl KubeStore {
    /// Wrap an existing client
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect using the default kubeconfig / in-cluster resolution
    pub async fn try_default() -> Result<Self, StoreError> {
        let client = Client::try_default().await?;
        Ok(Self::new(client))
    }

    /// Connect using the current context of an explicit kubeconfig file
    pub async fn from_kubeconfig(path: &Path) -> Result<Self, StoreError> {
        debug!("Loading kubeconfig from {}", path.display());
        let kubeconfig = Kubeconfig::read_from(path)?;
        let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?;
        let client = Client::try_from(config)?;
        Ok(Self::new(client))
    }

    fn api(&self, kind: &ResourceKind, namespace: Option<&str>) -> Api<DynamicObject> {
        let ar = api_resource(kind);
        match namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &ar),
            None => Api::all_with(self.client.clone(), &ar),
        }
    }

    fn api_for(&self, target: &ResourceRef) -> Api<DynamicObject> {
        self.api(target.kind(), target.namespace())
    }
}

fn api_resource(kind: &ResourceKind) -> ApiResource {
    ApiResource {
        group: kind.group.to_string(),
        version: kind.version.to_string(),
        api_version: kind.api_version(),
        kind: kind.kind.to_string(),
        plural: kind.plural.to_string(),
    }
}

/// Map API status codes onto the store's error taxonomy
fn classify(err: kube::Error, target: &ResourceRef) -> StoreError {
    match err {
        kube::Error::Api(ref ae) if ae.code == 404 => StoreError::NotFound(target.to_string()),
        kube::Error::Api(ref ae) if ae.code == 409 && ae.reason == "AlreadyExists" => {
            StoreError::AlreadyExists(target.to_string())
        }
        kube::Error::Api(ref ae) if ae.code == 409 => {
            StoreError::Conflict(format!("{target}: {}", ae.message))
        }
        other => StoreError::Kube(other),
    }
}

fn to_object(target: &ResourceRef, body: &Value) -> Result<DynamicObject, StoreError> {
    Ok(serde_json::from_value(target.stamp(body))?)
}

#[async_trait::async_trait]
impl ResourceStore for KubeStore {
    async fn get(&self, target: &ResourceRef) -> Result<Value, StoreError> {
        debug!("GET {}", target);
        let obj = self
            .api_for(target)
            .get(target.name())
            .await
            .map_err(|e| classify(e, target))?;
        Ok(serde_json::to_value(obj)?)
    }

    async fn list(
        &self,
        kind: &ResourceKind,
        namespace: Option<&str>,
        selector: &ListSelector,
    ) -> Result<Vec<Value>, StoreError> {
        debug!("LIST {} in {}", kind, namespace.unwrap_or("<cluster>"));
        let mut params = ListParams::default();
        if let Some(labels) = &selector.label_selector {
            params = params.labels(labels);
        }
        if let Some(fields) = &selector.field_selector {
            params = params.fields(fields);
        }
        let list = self.api(kind, namespace).list(&params).await?;
        list.items
            .into_iter()
            .map(|obj| serde_json::to_value(obj).map_err(StoreError::from))
            .collect()
    }

    async fn create(&self, target: &ResourceRef, body: &Value) -> Result<Value, StoreError> {
        debug!("CREATE {}", target);
        let obj = to_object(target, body)?;
        let created = self
            .api_for(target)
            .create(&PostParams::default(), &obj)
            .await
            .map_err(|e| classify(e, target))?;
        Ok(serde_json::to_value(created)?)
    }

    async fn update(&self, target: &ResourceRef, body: &Value) -> Result<Value, StoreError> {
        debug!("UPDATE {}", target);
        let obj = to_object(target, body)?;
        let updated = self
            .api_for(target)
            .replace(target.name(), &PostParams::default(), &obj)
            .await
            .map_err(|e| classify(e, target))?;
        Ok(serde_json::to_value(updated)?)
    }

    async fn delete(&self, target: &ResourceRef) -> Result<(), StoreError> {
        debug!("DELETE {}", target);
        self.api_for(target)
            .delete(target.name(), &DeleteParams::default())
            .await
            .map_err(|e| classify(e, target))?;
        Ok(())
    }
}
