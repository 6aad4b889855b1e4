//! Integration tests for KubeStore
//!
//! These tests require a reachable cluster.
//! Set KUBECONFIG (or run in-cluster) to run them.

use resource_store::{KubeStore, ListSelector, ResourceKind, ResourceRef, ResourceStore};
use serde_json::json;

const NAMESPACES: ResourceKind = ResourceKind::cluster("", "v1", "Namespace", "namespaces");
const CONFIG_MAPS: ResourceKind = ResourceKind::namespaced("", "v1", "ConfigMap", "configmaps");

#[tokio::test]
#[ignore] // Requires running cluster
async fn test_get_default_namespace() {
    let store = KubeStore::try_default().await.expect("Failed to create store");

    let ns = store
        .get(&ResourceRef::cluster(NAMESPACES, "default").unwrap())
        .await
        .expect("Failed to get namespace");
    assert_eq!(ns["metadata"]["name"], "default");
}

#[tokio::test]
#[ignore]
async fn test_missing_resource_is_not_found() {
    let store = KubeStore::try_default().await.expect("Failed to create store");

    let err = store
        .get(&ResourceRef::cluster(NAMESPACES, "resource-store-does-not-exist").unwrap())
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");
}

#[tokio::test]
#[ignore]
async fn test_create_update_delete_config_map() {
    let store = KubeStore::try_default().await.expect("Failed to create store");
    let target = ResourceRef::namespaced(CONFIG_MAPS, "default", "resource-store-it").unwrap();

    let created = store
        .create(&target, &json!({"data": {"k": "v1"}}))
        .await
        .expect("Failed to create config map");

    let again = store.create(&target, &json!({"data": {"k": "v1"}})).await;
    assert!(again.unwrap_err().is_already_exists());

    let mut body = created.clone();
    body["data"]["k"] = json!("v2");
    let updated = store.update(&target, &body).await.expect("Failed to update");
    assert_eq!(updated["data"]["k"], "v2");

    // The first body now carries a stale resourceVersion
    let stale = store.update(&target, &created).await;
    assert!(matches!(stale, Err(resource_store::StoreError::Conflict(_))));

    let listed = store
        .list(&CONFIG_MAPS, Some("default"), &ListSelector::default())
        .await
        .expect("Failed to list config maps");
    assert!(listed.iter().any(|cm| cm["metadata"]["name"] == "resource-store-it"));

    store.delete(&target).await.expect("Failed to delete");
    assert!(store.get(&target).await.unwrap_err().is_not_found());
}
