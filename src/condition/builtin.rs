//! Conditions registered by default

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::Condition;
use crate::request::Request;

/// Meets when the metadata value is a boolean equal to `value`.
///
/// Options: `{"value": bool}` (defaults to `false`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoolCondition {
    #[serde(default)]
    pub value: bool,
}

impl BoolCondition {
    pub fn new(value: bool) -> Self {
        Self { value }
    }
}

impl Condition for BoolCondition {
    fn name(&self) -> &'static str {
        "bool"
    }

    fn meets(&self, value: Option<&Value>, _request: &Request) -> bool {
        value.and_then(Value::as_bool) == Some(self.value)
    }
}

/// Meets when the metadata value names the requesting subject.
///
/// The value may be a string or an array of strings; it matches when any of
/// them equals the subject id or one of the subject's direct role ids.
/// Takes no options. Also registered as `role_equals`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubjectEqualsCondition {}

impl Condition for SubjectEqualsCondition {
    fn name(&self) -> &'static str {
        "subject_equals"
    }

    fn meets(&self, value: Option<&Value>, request: &Request) -> bool {
        let identities = request.subject.identities();
        let names = |candidate: &str| identities.iter().any(|id| *id == candidate);

        match value {
            Some(Value::String(s)) => names(s),
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).any(names),
            _ => false,
        }
    }
}
