//! Condition contract, condition specs and condition sets

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use super::registry::ConditionRegistry;
use crate::error::Result;
use crate::request::Request;

/// A predicate over one request metadata value.
///
/// `value` is the metadata entry stored under the name the condition was
/// given in its [`Conditions`] set, or `None` when the request has no such
/// entry.
pub trait Condition: Send + Sync + fmt::Debug {
    /// Registry type name of the condition
    fn name(&self) -> &'static str;

    fn meets(&self, value: Option<&Value>, request: &Request) -> bool;
}

/// Serialized form of a condition: `{"name", "type", "options"}`.
///
/// Policies keep their specs so that serialization reproduces the input
/// rather than the state of live condition instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSpec {
    /// Metadata key the condition reads
    pub name: String,

    /// Registry type name
    #[serde(rename = "type")]
    pub condition_type: String,

    #[serde(default, deserialize_with = "nullable_options")]
    pub options: Map<String, Value>,
}

fn nullable_options<'de, D>(deserializer: D) -> std::result::Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ConditionSpec {
    pub fn new(name: impl Into<String>, condition_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            condition_type: condition_type.into(),
            options: Map::new(),
        }
    }

    /// Sets a single option
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

/// Named conditions that must all meet for a policy to apply.
///
/// Iteration follows insertion order. A later spec with a name already in
/// the set replaces the earlier condition.
///
/// # Examples
///
/// ```rust
/// use policy_gate::condition::{ConditionRegistry, ConditionSpec, Conditions};
/// use policy_gate::{Request, Subject};
///
/// let specs = vec![ConditionSpec::new("mfa", "bool").with_option("value", true)];
/// let conditions = Conditions::from_specs(&specs, &ConditionRegistry::default()).unwrap();
///
/// let request = Request::new("doc", "read", Subject::new("alice"));
/// assert!(!conditions.meets(&request));
/// assert!(conditions.meets(&request.with_metadata("mfa", true)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Conditions {
    entries: IndexMap<String, Arc<dyn Condition>>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds every spec through `registry`.
    ///
    /// # Errors
    ///
    /// Returns the first build error. Specs with an unregistered type are
    /// dropped when the registry is permissive and fail when it is strict.
    pub fn from_specs(specs: &[ConditionSpec], registry: &ConditionRegistry) -> Result<Self> {
        let mut conditions = Self::new();
        for spec in specs {
            if let Some(condition) = registry.build(spec)? {
                conditions.insert(spec.name.clone(), condition);
            }
        }
        Ok(conditions)
    }

    pub fn insert(&mut self, name: impl Into<String>, condition: Arc<dyn Condition>) {
        self.entries.insert(name.into(), condition);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Condition>> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// True when every condition meets its metadata value. An empty set
    /// always meets.
    pub fn meets(&self, request: &Request) -> bool {
        self.entries
            .iter()
            .all(|(name, condition)| condition.meets(request.metadata().get(name), request))
    }
}
