//! Resource identity and body helpers
//!
//! A resource is addressed by its kind (group, version, plural, scope) plus an
//! optional namespace and a name. Bodies travel as untyped JSON; callers that
//! need typed access decode them into the CRD structs of the `crds` crate.

use crate::error::StoreError;
use serde_json::Value;
use std::fmt;

/// Whether a kind lives inside a namespace or at cluster scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Namespaced,
    Cluster,
}

/// Group/version/kind of a resource plus the plural used in API paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceKind {
    /// API group, empty for the core group
    pub group: &'static str,
    pub version: &'static str,
    pub kind: &'static str,
    pub plural: &'static str,
    pub scope: Scope,
}

impl ResourceKind {
    /// A kind whose resources live inside a namespace
    #[must_use]
    pub const fn namespaced(
        group: &'static str,
        version: &'static str,
        kind: &'static str,
        plural: &'static str,
    ) -> Self {
        Self { group, version, kind, plural, scope: Scope::Namespaced }
    }

    /// A kind whose resources live at cluster scope
    #[must_use]
    pub const fn cluster(
        group: &'static str,
        version: &'static str,
        kind: &'static str,
        plural: &'static str,
    ) -> Self {
        Self { group, version, kind, plural, scope: Scope::Cluster }
    }

    /// `apiVersion` as written in resource bodies (`group/version`, or just `version` for core)
    #[must_use]
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.to_string()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}/{}", self.plural, self.version)
        } else {
            write!(f, "{}.{}/{}", self.plural, self.group, self.version)
        }
    }
}

/// Identifies exactly one resource in the store
///
/// Invariants enforced at construction: the name is non-empty, and a namespace
/// is present if and only if the kind is namespace-scoped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRef {
    kind: ResourceKind,
    namespace: Option<String>,
    name: String,
}

impl ResourceRef {
    /// Build a reference, validating name and scope
    pub fn new(
        kind: ResourceKind,
        namespace: Option<&str>,
        name: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(StoreError::InvalidRef(format!("{kind}: name must not be empty")));
        }
        let namespace = match (kind.scope, namespace) {
            (Scope::Namespaced, Some(ns)) if !ns.trim().is_empty() => Some(ns.to_string()),
            (Scope::Namespaced, _) => {
                return Err(StoreError::InvalidRef(format!(
                    "{kind} {name}: namespace is required for a namespaced kind"
                )));
            }
            (Scope::Cluster, Some(ns)) => {
                return Err(StoreError::InvalidRef(format!(
                    "{kind} {name}: cluster-scoped kind cannot be addressed in namespace {ns}"
                )));
            }
            (Scope::Cluster, None) => None,
        };
        Ok(Self { kind, namespace, name })
    }

    /// Reference to a namespaced resource
    pub fn namespaced(
        kind: ResourceKind,
        namespace: &str,
        name: impl Into<String>,
    ) -> Result<Self, StoreError> {
        Self::new(kind, Some(namespace), name)
    }

    /// Reference to a cluster-scoped resource
    pub fn cluster(kind: ResourceKind, name: impl Into<String>) -> Result<Self, StoreError> {
        Self::new(kind, None, name)
    }

    #[must_use]
    pub fn kind(&self) -> &ResourceKind {
        &self.kind
    }

    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Copy of `body` with apiVersion, kind, name and namespace set to this reference
    ///
    /// Stores use this so a body can never address a different resource than
    /// the reference it was submitted under.
    #[must_use]
    pub fn stamp(&self, body: &Value) -> Value {
        let mut body = match body {
            Value::Object(_) => body.clone(),
            _ => Value::Object(serde_json::Map::new()),
        };
        if let Value::Object(obj) = &mut body {
            obj.insert("apiVersion".to_string(), Value::String(self.kind.api_version()));
            obj.insert("kind".to_string(), Value::String(self.kind.kind.to_string()));
            let metadata = obj
                .entry("metadata")
                .or_insert_with(|| Value::Object(serde_json::Map::new()));
            if !metadata.is_object() {
                *metadata = Value::Object(serde_json::Map::new());
            }
            if let Value::Object(meta) = metadata {
                meta.insert("name".to_string(), Value::String(self.name.clone()));
                match &self.namespace {
                    Some(ns) => {
                        meta.insert("namespace".to_string(), Value::String(ns.clone()));
                    }
                    None => {
                        meta.remove("namespace");
                    }
                }
            }
        }
        body
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{} {}/{}", self.kind, ns, self.name),
            None => write!(f, "{} {}", self.kind, self.name),
        }
    }
}

/// Optional label/field filters for list calls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListSelector {
    pub label_selector: Option<String>,
    pub field_selector: Option<String>,
}

impl ListSelector {
    /// Select by a label selector such as `app=erp,tier=backend`
    #[must_use]
    pub fn labels(selector: impl Into<String>) -> Self {
        Self { label_selector: Some(selector.into()), field_selector: None }
    }

    /// Equality-only evaluation of the label selector against a body
    ///
    /// Only `key=value` terms joined by commas are understood; the mock store
    /// uses this, the real API server evaluates the full grammar itself.
    #[must_use]
    pub fn matches_labels(&self, body: &Value) -> bool {
        let Some(selector) = self.label_selector.as_deref() else {
            return true;
        };
        let labels = body.pointer("/metadata/labels");
        selector
            .split(',')
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .all(|term| match term.split_once('=') {
                Some((key, value)) => labels
                    .and_then(|l| l.get(key.trim()))
                    .and_then(Value::as_str)
                    == Some(value.trim()),
                None => labels.and_then(|l| l.get(term)).is_some(),
            })
    }
}

/// `metadata.resourceVersion` of a body, if set
#[must_use]
pub fn resource_version(body: &Value) -> Option<&str> {
    body.pointer("/metadata/resourceVersion").and_then(Value::as_str)
}
