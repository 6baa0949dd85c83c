use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::options::PolicyOptions;
use crate::condition::{ConditionRegistry, ConditionSpec, Conditions};
use crate::error::Result;
use crate::role::RoleRef;

/// Outcome a policy prescribes when it matches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PolicyEffect {
    Allow,
    /// Also the effect of any unrecognized value
    #[default]
    Deny,
}

impl PolicyEffect {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyEffect::Allow => "allow",
            PolicyEffect::Deny => "deny",
        }
    }

    pub fn is_allow(&self) -> bool {
        matches!(self, PolicyEffect::Allow)
    }
}

impl From<&str> for PolicyEffect {
    fn from(s: &str) -> Self {
        match s {
            "allow" => PolicyEffect::Allow,
            _ => PolicyEffect::Deny,
        }
    }
}

impl fmt::Display for PolicyEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PolicyEffect {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PolicyEffect {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(PolicyEffect::from).unwrap_or_default())
    }
}

/// An immutable access rule.
///
/// Holds the draft it was built from, so serializing a policy reproduces its
/// input, and the conditions resolved from that draft.
#[derive(Debug, Clone)]
pub struct Policy {
    options: PolicyOptions,
    conditions: Conditions,
}

impl Policy {
    /// Builds a policy, resolving conditions through the default registry
    pub fn new(options: PolicyOptions) -> Result<Self> {
        Self::with_registry(options, &ConditionRegistry::default())
    }

    /// Builds a policy, resolving conditions through `registry`.
    ///
    /// # Errors
    ///
    /// Propagates condition build errors; see
    /// [`Conditions::from_specs`](crate::condition::Conditions::from_specs).
    pub fn with_registry(options: PolicyOptions, registry: &ConditionRegistry) -> Result<Self> {
        let conditions = Conditions::from_specs(&options.conditions, registry)?;
        Ok(Self {
            options,
            conditions,
        })
    }

    pub fn id(&self) -> &str {
        &self.options.name
    }

    pub fn description(&self) -> &str {
        &self.options.description
    }

    pub fn roles(&self) -> &[RoleRef] {
        &self.options.roles
    }

    pub fn resources(&self) -> Option<&[String]> {
        self.options.resources.as_deref()
    }

    pub fn actions(&self) -> Option<&[String]> {
        self.options.actions.as_deref()
    }

    pub fn scopes(&self) -> Option<&[String]> {
        self.options.scopes.as_deref()
    }

    /// Resolved conditions
    pub fn conditions(&self) -> &Conditions {
        &self.conditions
    }

    /// Condition specs as supplied, including any a permissive registry
    /// dropped
    pub fn condition_specs(&self) -> &[ConditionSpec] {
        &self.options.conditions
    }

    pub fn effect(&self) -> PolicyEffect {
        self.options.effect
    }

    pub fn options(&self) -> &PolicyOptions {
        &self.options
    }

    pub fn into_options(self) -> PolicyOptions {
        self.options
    }
}

impl PartialEq for Policy {
    fn eq(&self, other: &Self) -> bool {
        self.options == other.options
    }
}

impl Serialize for Policy {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.options.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Policy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let options = PolicyOptions::deserialize(deserializer)?;
        Policy::new(options).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id(), self.effect())
    }
}
