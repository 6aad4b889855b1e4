//! Desired/existing resource model and reconciliation policies

use crate::error::ReconcileError;
use resource_store::{resource_version, ResourceRef};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;

/// Dotted path into a resource body, e.g. `status.installationStatus.status`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Parse a dotted path; empty segments are ignored
    #[must_use]
    pub fn parse(path: &str) -> Self {
        Self(
            path.split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Value at this path, if every segment resolves
    #[must_use]
    pub fn get<'a>(&self, body: &'a Value) -> Option<&'a Value> {
        self.0.iter().try_fold(body, |node, key| node.get(key))
    }

    /// Set the value at this path, creating intermediate objects as needed
    ///
    /// Non-object intermediate nodes are replaced by objects.
    pub fn set(&self, body: &mut Value, value: Value) {
        let Some((last, parents)) = self.0.split_last() else {
            *body = value;
            return;
        };
        let mut node = body;
        for key in parents {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            let Value::Object(map) = node else { return };
            node = map.entry(key.clone()).or_insert_with(|| Value::Object(Map::new()));
        }
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        if let Value::Object(map) = node {
            map.insert(last.clone(), value);
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

/// What to do when the resource to create already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Compare managed fields and update on drift; a lost create race re-fetches and converges
    #[default]
    Converge,
    /// Pre-existing resource is an `AlreadyExists` error
    Fail,
    /// Pre-existing resource is left alone and reported `Unchanged`
    IgnoreExisting,
}

/// Resource the caller wants to exist
#[derive(Debug, Clone)]
pub struct DesiredResource {
    pub target: ResourceRef,
    /// Full body used on create
    pub body: Value,
    /// Fields copied from `body` onto the existing resource on update.
    /// Empty means create-only: an existing resource is left `Unchanged`.
    pub managed_fields: Vec<FieldPath>,
    /// Fields compared to detect drift; defaults to `managed_fields`
    pub drift_keys: Vec<FieldPath>,
    pub conflict_policy: ConflictPolicy,
}

impl DesiredResource {
    /// Create-only desired resource with the default conflict policy
    #[must_use]
    pub fn new(target: ResourceRef, body: Value) -> Self {
        Self {
            target,
            body,
            managed_fields: Vec::new(),
            drift_keys: Vec::new(),
            conflict_policy: ConflictPolicy::default(),
        }
    }

    /// Desired resource from a typed object (CRD or core type)
    pub fn from_typed<K: Serialize>(target: ResourceRef, object: &K) -> Result<Self, ReconcileError> {
        let body = serde_json::to_value(object).map_err(|e| ReconcileError::Validation {
            resource: target.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::new(target, body))
    }

    /// Fields to overwrite on update
    #[must_use]
    pub fn managing<I, P>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<FieldPath>,
    {
        self.managed_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Fields compared to decide whether an update is needed
    #[must_use]
    pub fn drift_keys<I, P>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<FieldPath>,
    {
        self.drift_keys = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    /// True when an existing resource is never updated
    #[must_use]
    pub fn is_create_only(&self) -> bool {
        self.managed_fields.is_empty()
    }

    pub(crate) fn effective_drift_keys(&self) -> &[FieldPath] {
        if self.drift_keys.is_empty() {
            &self.managed_fields
        } else {
            &self.drift_keys
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ReconcileError> {
        if !self.body.is_object() {
            return Err(ReconcileError::Validation {
                resource: self.target.to_string(),
                message: "body must be a JSON object".to_string(),
            });
        }
        if let Some(missing) = self
            .managed_fields
            .iter()
            .chain(&self.drift_keys)
            .find(|path| path.get(&self.body).is_none())
        {
            return Err(ReconcileError::Validation {
                resource: self.target.to_string(),
                message: format!("managed field {missing} is not set in the desired body"),
            });
        }
        Ok(())
    }
}

/// Resource as last read from the store
#[derive(Debug, Clone, PartialEq)]
pub struct ExistingResource {
    pub target: ResourceRef,
    pub body: Value,
}

impl ExistingResource {
    #[must_use]
    pub fn new(target: ResourceRef, body: Value) -> Self {
        Self { target, body }
    }

    #[must_use]
    pub fn field(&self, path: &FieldPath) -> Option<&Value> {
        path.get(&self.body)
    }

    #[must_use]
    pub fn resource_version(&self) -> Option<&str> {
        resource_version(&self.body)
    }

    /// Decode into a typed object
    pub fn decode<K: DeserializeOwned>(&self) -> Result<K, ReconcileError> {
        serde_json::from_value(self.body.clone()).map_err(|e| ReconcileError::Validation {
            resource: self.target.to_string(),
            message: format!("unexpected body: {e}"),
        })
    }
}

/// Result of reconciling one resource; failures are the `Err` side
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationOutcome {
    Created,
    Updated,
    Unchanged,
    Skipped(String),
}

impl fmt::Display for ReconciliationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Updated => write!(f, "updated"),
            Self::Unchanged => write!(f, "unchanged"),
            Self::Skipped(reason) => write!(f, "skipped ({reason})"),
        }
    }
}

/// Outcome plus the resource state it left behind
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub outcome: ReconciliationOutcome,
    pub resource: ExistingResource,
}

/// What a ready status looks like
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadyMatch {
    /// The status value equals this string
    Equals(String),
    /// The status value is set and non-empty
    Present,
}

impl ReadyMatch {
    #[must_use]
    pub fn matches(&self, observed: Option<&Value>) -> bool {
        match (self, observed) {
            (_, None | Some(Value::Null)) => false,
            (Self::Equals(want), Some(Value::String(got))) => got == want,
            (Self::Equals(want), Some(other)) => other.to_string() == *want,
            (Self::Present, Some(Value::String(s))) => !s.is_empty(),
            (Self::Present, Some(_)) => true,
        }
    }
}

/// Spacing of readiness polls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollSchedule {
    /// Sleep `interval` between every poll
    #[default]
    Fixed,
    /// Fibonacci growth from `first`, capped at `interval`
    Fibonacci { first: Duration },
}

/// Definition of "ready" for one kind, and how long to wait for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub status_path: FieldPath,
    pub ready: ReadyMatch,
    /// Polls after the first one; worst-case wait is `max_attempts × interval`
    pub max_attempts: u32,
    pub interval: Duration,
    pub schedule: PollSchedule,
}

impl ReadinessPolicy {
    /// Application gateway installed: `status.installationStatus.status == DEPLOYED`, 15 × 5s
    #[must_use]
    pub fn application() -> Self {
        Self {
            status_path: FieldPath::parse("status.installationStatus.status"),
            ready: ReadyMatch::Equals(crds::INSTALLATION_DEPLOYED.to_string()),
            max_attempts: 15,
            interval: Duration::from_secs(5),
            schedule: PollSchedule::Fixed,
        }
    }

    /// Connector URL issued: `status.url` present, 30 × 2s
    #[must_use]
    pub fn token_request() -> Self {
        Self {
            status_path: FieldPath::parse("status.url"),
            ready: ReadyMatch::Present,
            max_attempts: 30,
            interval: Duration::from_secs(2),
            schedule: PollSchedule::Fixed,
        }
    }

    /// Upper bound on time spent sleeping between polls
    #[must_use]
    pub fn worst_case_wait(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts)
    }
}

/// Readiness policies used by the composite flows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessPolicies {
    pub application: ReadinessPolicy,
    pub token_request: ReadinessPolicy,
}

impl Default for ReadinessPolicies {
    fn default() -> Self {
        Self {
            application: ReadinessPolicy::application(),
            token_request: ReadinessPolicy::token_request(),
        }
    }
}

/// Request to bind a namespace to an application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingIntent {
    pub application: String,
    pub namespace: String,
    pub create_namespace_if_missing: bool,
    pub ignore_if_mapping_exists: bool,
}

/// Function to deploy, with its optional gateway exposure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDeployment {
    pub name: String,
    pub namespace: String,
    /// Function source code
    pub source: String,
    /// package.json-style dependency document, if the project has dependencies
    pub dependencies: Option<String>,
    /// Also expose the function through an Api
    pub expose: bool,
    /// Required when `expose` is set
    pub cluster_domain: Option<String>,
}
