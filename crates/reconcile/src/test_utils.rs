//! Test utilities for unit testing the reconciler
//!
//! This module provides helpers for wiring a `Reconciler` to the mock store
//! and seeding the resources most scenarios start from.

#[cfg(test)]
use crate::clock::ManualClock;
#[cfg(test)]
use crate::reconciler::Reconciler;
#[cfg(test)]
use resource_store::{MockResourceStore, ResourceRef};
#[cfg(test)]
use serde_json::json;
#[cfg(test)]
use std::sync::Arc;

/// Reconciler over a fresh mock store, sleeping on the tokio clock
#[cfg(test)]
pub fn mock_reconciler() -> (MockResourceStore, Reconciler) {
    let store = MockResourceStore::new();
    let reconciler = Reconciler::new(Arc::new(store.clone()));
    (store, reconciler)
}

/// Reconciler over a fresh mock store with a manual clock
#[cfg(test)]
pub fn mock_reconciler_with_clock() -> (MockResourceStore, Reconciler, ManualClock) {
    let store = MockResourceStore::new();
    let clock = ManualClock::new();
    let reconciler = Reconciler::new(Arc::new(store.clone())).with_clock(Arc::new(clock.clone()));
    (store, reconciler, clock)
}

/// Seed an Application whose gateway is already installed
#[cfg(test)]
pub fn seed_deployed_application(store: &MockResourceStore, name: &str) -> ResourceRef {
    let app = ResourceRef::cluster(crds::kinds::APPLICATION, name).unwrap();
    store.insert(
        &app,
        json!({"spec": {}, "status": {"installationStatus": {"status": "DEPLOYED"}}}),
    );
    app
}

/// Seed a namespace
#[cfg(test)]
pub fn seed_namespace(store: &MockResourceStore, name: &str) -> ResourceRef {
    let ns = ResourceRef::cluster(crds::kinds::NAMESPACE, name).unwrap();
    store.insert(&ns, json!({}));
    ns
}

/// Seed a namespaced service class published by `broker` for `application`
#[cfg(test)]
pub fn seed_service_class(
    store: &MockResourceStore,
    namespace: &str,
    name: &str,
    application: &str,
    broker: &str,
    external_name: Option<&str>,
) -> ResourceRef {
    let class = ResourceRef::namespaced(crds::kinds::SERVICE_CLASS, namespace, name).unwrap();
    let mut spec = json!({"serviceBrokerName": broker});
    if let Some(external) = external_name {
        spec["externalName"] = json!(external);
    }
    let mut body = json!({"metadata": {"labels": {}}, "spec": spec});
    body["metadata"]["labels"][crds::APPLICATION_LABEL] = json!(application);
    store.insert(&class, body);
    class
}
