//! Domain types for appwatch.
//!
//! `Pod` and `ApplicationRecord` are owned by the watch source and the
//! application directory respectively; this workspace only reads them.
//! `ReconcileKey` is the work-queue token that ties the two together.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{StateError, StateResult};

/// Label carrying the name of the application that owns a pod.
pub const APP_NAME_LABEL: &str = "sparkoperator.k8s.io/app-name";

/// Label carrying the submission attempt a pod was launched for.
pub const SUBMISSION_ID_LABEL: &str = "sparkoperator.k8s.io/submission-id";

// ── Pod ───────────────────────────────────────────────────────────

/// The subset of a driver/executor pod the router looks at.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pod {
    pub name: String,
    pub namespace: String,
    /// Opaque token that changes on every mutation of the pod.
    #[serde(default)]
    pub resource_version: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

impl Pod {
    pub fn new(namespace: &str, name: &str, resource_version: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            resource_version: resource_version.to_string(),
            labels: HashMap::new(),
        }
    }

    /// Builder-style label insertion.
    pub fn with_label(mut self, key: &str, value: &str) -> Self {
        self.labels.insert(key.to_string(), value.to_string());
        self
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// Name of the owning application. An empty label value does not
    /// name an application.
    pub fn app_name(&self) -> Option<&str> {
        self.label(APP_NAME_LABEL).filter(|name| !name.is_empty())
    }

    /// Submission attempt the pod belongs to, if labeled.
    pub fn submission_id(&self) -> Option<&str> {
        self.label(SUBMISSION_ID_LABEL)
    }
}

// ── Application ───────────────────────────────────────────────────

/// Authoritative record of a tracked application.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApplicationRecord {
    pub namespace: String,
    pub name: String,
    /// Identifier of the current submission attempt. Empty until the
    /// application has been submitted at least once.
    #[serde(default)]
    pub submission_id: String,
    /// Unix timestamp (seconds) when this record was created.
    #[serde(default)]
    pub created_at: u64,
    /// Unix timestamp (seconds) of the last update.
    #[serde(default)]
    pub updated_at: u64,
}

impl ApplicationRecord {
    pub fn new(namespace: &str, name: &str, submission_id: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            submission_id: submission_id.to_string(),
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn key(&self) -> ReconcileKey {
        ReconcileKey::new(&self.namespace, &self.name)
    }

    /// Build the composite key for the applications table.
    pub fn table_key(&self) -> String {
        self.key().to_string()
    }
}

// ── Reconcile key ─────────────────────────────────────────────────

/// `namespace/name` token identifying one application on the work queue.
///
/// The string form is the same key the application store uses, so a
/// reconciler can `parse` a dequeued token and look the record up
/// directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReconcileKey {
    pub namespace: String,
    pub name: String,
}

impl ReconcileKey {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    /// Split a key back into namespace and name.
    ///
    /// A key without a separator is a cluster-scoped name with an empty
    /// namespace.
    pub fn parse(key: &str) -> StateResult<Self> {
        let (namespace, name) = match key.split_once('/') {
            Some((ns, name)) => (ns, name),
            None => ("", key),
        };
        if name.is_empty() || name.contains('/') {
            return Err(StateError::InvalidKey(key.to_string()));
        }
        Ok(Self::new(namespace, name))
    }
}

impl fmt::Display for ReconcileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}/{}", self.namespace, self.name)
        }
    }
}

impl FromStr for ReconcileKey {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
