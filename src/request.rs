//! Authorization requests and their metadata

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

use crate::subject::Subject;

/// Request-scoped key/value data consulted by policy conditions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestMetadata(HashMap<String, Value>);

impl RequestMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a value by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for RequestMetadata {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<(String, Value)> for RequestMetadata {
    fn extend<I: IntoIterator<Item = (String, Value)>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl From<HashMap<String, Value>> for RequestMetadata {
    fn from(map: HashMap<String, Value>) -> Self {
        Self(map)
    }
}

fn new_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// A request to be matched against the policy set.
///
/// Built once per call and never mutated during evaluation.
///
/// # Examples
///
/// ```rust
/// use policy_gate::{Request, Subject};
/// use serde_json::json;
///
/// let request = Request::new("invoices", "read", Subject::new("user-42"))
///     .with_scope("tenant.acme")
///     .with_metadata("mfa", json!(true));
///
/// assert_eq!(request.metadata().get("mfa"), Some(&json!(true)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Correlation id reported with denials
    #[serde(default = "new_request_id")]
    pub id: String,

    pub resource: String,

    pub action: String,

    pub subject: Subject,

    #[serde(default)]
    pub scope: String,

    #[serde(default)]
    pub metadata: RequestMetadata,
}

impl Request {
    /// Creates a request with an empty scope, no metadata and a fresh id
    pub fn new(resource: impl Into<String>, action: impl Into<String>, subject: Subject) -> Self {
        Self {
            id: new_request_id(),
            resource: resource.into(),
            action: action.into(),
            subject,
            scope: String::new(),
            metadata: RequestMetadata::new(),
        }
    }

    /// Replaces the generated id with a caller-supplied one
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Adds a single metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key, value);
        self
    }

    /// Merges a metadata map, later keys replacing earlier ones
    pub fn with_metadata_map(mut self, meta: impl IntoIterator<Item = (String, Value)>) -> Self {
        self.metadata.extend(meta);
        self
    }

    pub fn metadata(&self) -> &RequestMetadata {
        &self.metadata
    }
}
