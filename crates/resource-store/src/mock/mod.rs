//! Mock ResourceStore for unit testing
//!
//! This module provides an in-memory implementation of `ResourceStore` that can
//! be used in unit tests without a running cluster. Besides storing objects it
//! records every call, and can be scripted to:
//! - return a sequence of bodies (or absences) from `get` for one reference
//! - fail the next call of a given operation and kind
//! - lose a create race against a concurrent writer

use crate::error::StoreError;
use crate::models::{resource_version, ListSelector, ResourceKind, ResourceRef};
use crate::store_trait::ResourceStore;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Store operation, as recorded in the call log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Get,
    List,
    Create,
    Update,
    Delete,
}

/// One recorded call against the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCall {
    pub op: StoreOp,
    pub kind: ResourceKind,
    /// `ns/name`, `name`, or for list calls the namespace (`*` for all)
    pub target: String,
}

type Key = (ResourceKind, Option<String>, String);

fn key_of(target: &ResourceRef) -> Key {
    (
        *target.kind(),
        target.namespace().map(str::to_string),
        target.name().to_string(),
    )
}

fn label_of(target: &ResourceRef) -> String {
    match target.namespace() {
        Some(ns) => format!("{ns}/{}", target.name()),
        None => target.name().to_string(),
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Failure {
    op: StoreOp,
    kind: ResourceKind,
    make: fn(String) -> StoreError,
}

/// In-memory resource store for tests
///
/// Clones share state, so a test can hand one clone to the code under test and
/// inspect the other.
#[derive(Clone, Default)]
pub struct MockResourceStore {
    objects: Arc<Mutex<HashMap<Key, Value>>>,
    calls: Arc<Mutex<Vec<StoreCall>>>,
    scripted_gets: Arc<Mutex<HashMap<Key, VecDeque<Option<Value>>>>>,
    failures: Arc<Mutex<Vec<Failure>>>,
    preempted: Arc<Mutex<HashMap<Key, Value>>>,
    next_version: Arc<Mutex<u64>>,
}

impl MockResourceStore {
    /// Create an empty mock store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn bump_version(&self) -> String {
        let mut n = lock(&self.next_version);
        *n += 1;
        n.to_string()
    }

    fn versioned(&self, target: &ResourceRef, body: &Value) -> Value {
        let mut body = target.stamp(body);
        let version = self.bump_version();
        if let Some(meta) = body.get_mut("metadata").and_then(Value::as_object_mut) {
            meta.insert("resourceVersion".to_string(), Value::String(version.clone()));
            meta.entry("uid")
                .or_insert_with(|| Value::String(format!("uid-{version}")));
        }
        body
    }

    fn record(&self, op: StoreOp, kind: ResourceKind, target: String) {
        lock(&self.calls).push(StoreCall { op, kind, target });
    }

    fn injected_failure(&self, op: StoreOp, kind: &ResourceKind, label: &str) -> Option<StoreError> {
        let mut failures = lock(&self.failures);
        let idx = failures.iter().position(|f| f.op == op && f.kind == *kind)?;
        let failure = failures.remove(idx);
        Some((failure.make)(format!("{kind} {label}")))
    }

    /// Seed an object directly, bypassing the call log
    ///
    /// Returns the stored body (identity stamped, resourceVersion assigned).
    pub fn insert(&self, target: &ResourceRef, body: Value) -> Value {
        let stored = self.versioned(target, &body);
        lock(&self.objects).insert(key_of(target), stored.clone());
        stored
    }

    /// Current stored body, bypassing the call log
    #[must_use]
    pub fn object(&self, target: &ResourceRef) -> Option<Value> {
        lock(&self.objects).get(&key_of(target)).cloned()
    }

    /// Replace the `status` of a stored object, as a controller would
    pub fn set_status(&self, target: &ResourceRef, status: Value) {
        let version = self.bump_version();
        if let Some(obj) = lock(&self.objects).get_mut(&key_of(target)) {
            if let Some(map) = obj.as_object_mut() {
                map.insert("status".to_string(), status);
            }
            if let Some(meta) = obj.get_mut("metadata").and_then(Value::as_object_mut) {
                meta.insert("resourceVersion".to_string(), Value::String(version));
            }
        }
    }

    /// Answer the next `get` calls for `target` from `responses`, in order
    ///
    /// `None` entries are reported as not found. Once the script is drained,
    /// gets fall back to the stored objects.
    pub fn script_gets(&self, target: &ResourceRef, responses: Vec<Option<Value>>) {
        lock(&self.scripted_gets).insert(key_of(target), responses.into());
    }

    /// Fail the next `op` on `kind` with the error built by `make`
    pub fn fail_next(&self, op: StoreOp, kind: ResourceKind, make: fn(String) -> StoreError) {
        lock(&self.failures).push(Failure { op, kind, make });
    }

    /// Let another writer create `target` with `body` right before our next create
    pub fn preempt_create(&self, target: &ResourceRef, body: Value) {
        lock(&self.preempted).insert(key_of(target), body);
    }

    /// All recorded calls, in order
    #[must_use]
    pub fn calls(&self) -> Vec<StoreCall> {
        lock(&self.calls).clone()
    }

    /// Number of recorded calls of `op` on `kind`
    #[must_use]
    pub fn count(&self, op: StoreOp, kind: &ResourceKind) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|c| c.op == op && c.kind == *kind)
            .count()
    }

    /// Number of recorded mutating calls (create, update, delete) on any kind
    #[must_use]
    pub fn writes(&self) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|c| matches!(c.op, StoreOp::Create | StoreOp::Update | StoreOp::Delete))
            .count()
    }

    /// Forget the call log, keeping stored objects
    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }
}

#[async_trait::async_trait]
impl ResourceStore for MockResourceStore {
    async fn get(&self, target: &ResourceRef) -> Result<Value, StoreError> {
        let label = label_of(target);
        self.record(StoreOp::Get, *target.kind(), label.clone());
        if let Some(err) = self.injected_failure(StoreOp::Get, target.kind(), &label) {
            return Err(err);
        }

        let key = key_of(target);
        let scripted = lock(&self.scripted_gets)
            .get_mut(&key)
            .and_then(VecDeque::pop_front);
        if let Some(response) = scripted {
            return response
                .map(|body| target.stamp(&body))
                .ok_or_else(|| StoreError::NotFound(target.to_string()));
        }

        lock(&self.objects)
            .get(&key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(target.to_string()))
    }

    async fn list(
        &self,
        kind: &ResourceKind,
        namespace: Option<&str>,
        selector: &ListSelector,
    ) -> Result<Vec<Value>, StoreError> {
        let label = namespace.unwrap_or("*").to_string();
        self.record(StoreOp::List, *kind, label.clone());
        if let Some(err) = self.injected_failure(StoreOp::List, kind, &label) {
            return Err(err);
        }

        let objects = lock(&self.objects);
        let mut found: Vec<(&String, &Value)> = objects
            .iter()
            .filter(|((k, ns, _), _)| {
                k == kind && namespace.is_none_or(|want| ns.as_deref() == Some(want))
            })
            .filter(|(_, body)| selector.matches_labels(body))
            .map(|((_, _, name), body)| (name, body))
            .collect();
        found.sort_by(|a, b| a.0.cmp(b.0));
        Ok(found.into_iter().map(|(_, body)| body.clone()).collect())
    }

    async fn create(&self, target: &ResourceRef, body: &Value) -> Result<Value, StoreError> {
        let label = label_of(target);
        self.record(StoreOp::Create, *target.kind(), label.clone());
        if let Some(err) = self.injected_failure(StoreOp::Create, target.kind(), &label) {
            return Err(err);
        }

        let key = key_of(target);
        let racer = lock(&self.preempted).remove(&key);
        if let Some(racer) = racer {
            let stored = self.versioned(target, &racer);
            lock(&self.objects).insert(key.clone(), stored);
        }

        if lock(&self.objects).contains_key(&key) {
            return Err(StoreError::AlreadyExists(target.to_string()));
        }
        let stored = self.versioned(target, body);
        lock(&self.objects).insert(key, stored.clone());
        Ok(stored)
    }

    async fn update(&self, target: &ResourceRef, body: &Value) -> Result<Value, StoreError> {
        let label = label_of(target);
        self.record(StoreOp::Update, *target.kind(), label.clone());
        if let Some(err) = self.injected_failure(StoreOp::Update, target.kind(), &label) {
            return Err(err);
        }

        let key = key_of(target);
        let current_version = {
            let objects = lock(&self.objects);
            let current = objects
                .get(&key)
                .ok_or_else(|| StoreError::NotFound(target.to_string()))?;
            resource_version(current).map(str::to_string)
        };
        if let Some(submitted) = resource_version(body) {
            if current_version.as_deref() != Some(submitted) {
                return Err(StoreError::Conflict(format!(
                    "{target}: resourceVersion {submitted} is stale"
                )));
            }
        }
        let stored = self.versioned(target, body);
        lock(&self.objects).insert(key, stored.clone());
        Ok(stored)
    }

    async fn delete(&self, target: &ResourceRef) -> Result<(), StoreError> {
        let label = label_of(target);
        self.record(StoreOp::Delete, *target.kind(), label.clone());
        if let Some(err) = self.injected_failure(StoreOp::Delete, target.kind(), &label) {
            return Err(err);
        }
        lock(&self.objects)
            .remove(&key_of(target))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(target.to_string()))
    }
}
