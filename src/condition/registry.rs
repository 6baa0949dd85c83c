//! Condition type registry
//!
//! Maps a condition `type` name to the builder that decodes its options.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

use super::builtin::{BoolCondition, SubjectEqualsCondition};
use super::network::{IpAllowCondition, IpDenyCondition};
use super::types::{Condition, ConditionSpec};
use crate::error::{AuthzError, Result};

/// Builds a condition instance from its spec
pub type ConditionBuilder = Arc<dyn Fn(&ConditionSpec) -> Result<Arc<dyn Condition>> + Send + Sync>;

/// How the registry treats specs naming an unregistered type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionMode {
    /// Drop the spec with a warning
    #[default]
    Permissive,
    /// Fail with [`AuthzError::UnknownConditionType`]
    Strict,
}

/// Condition type names mapped to their builders.
///
/// The default registry knows `bool`, `subject_equals` and its alias
/// `role_equals`.
///
/// # Examples
///
/// ```rust
/// use policy_gate::condition::{ConditionMode, ConditionRegistry, ConditionSpec};
///
/// let registry = ConditionRegistry::default()
///     .with_network_conditions()
///     .with_mode(ConditionMode::Strict);
///
/// assert!(registry.contains("ip_allow"));
/// assert!(registry.build(&ConditionSpec::new("x", "time_window")).is_err());
/// ```
#[derive(Clone)]
pub struct ConditionRegistry {
    builders: HashMap<String, ConditionBuilder>,
    mode: ConditionMode,
}

impl Default for ConditionRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register_typed::<BoolCondition>("bool");
        registry.register_typed::<SubjectEqualsCondition>("subject_equals");
        registry.register_typed::<SubjectEqualsCondition>("role_equals");
        registry
    }
}

impl ConditionRegistry {
    /// A registry with no condition types
    pub fn empty() -> Self {
        Self {
            builders: HashMap::new(),
            mode: ConditionMode::Permissive,
        }
    }

    pub fn with_mode(mut self, mode: ConditionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Adds the `ip_allow` and `ip_deny` types
    pub fn with_network_conditions(mut self) -> Self {
        self.register_typed::<IpAllowCondition>("ip_allow");
        self.register_typed::<IpDenyCondition>("ip_deny");
        self
    }

    pub fn mode(&self) -> ConditionMode {
        self.mode
    }

    /// Registers a builder, replacing any builder already under `type_name`
    pub fn register<F>(&mut self, type_name: impl Into<String>, builder: F) -> &mut Self
    where
        F: Fn(&ConditionSpec) -> Result<Arc<dyn Condition>> + Send + Sync + 'static,
    {
        self.builders.insert(type_name.into(), Arc::new(builder));
        self
    }

    /// Registers a condition whose options decode directly into `C`.
    ///
    /// Empty options produce `C::default()`; anything else is deserialized
    /// and rejected if it does not fit `C`.
    pub fn register_typed<C>(&mut self, type_name: impl Into<String>) -> &mut Self
    where
        C: Condition + DeserializeOwned + Default + 'static,
    {
        self.register(type_name, |spec| {
            let condition: C = decode_options(spec)?;
            Ok(Arc::new(condition) as Arc<dyn Condition>)
        })
    }

    /// Adds every builder from `other`; its entries win on conflict. The
    /// mode of `self` is kept.
    pub fn merge(mut self, other: ConditionRegistry) -> Self {
        self.builders.extend(other.builders);
        self
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.builders.contains_key(type_name)
    }

    /// Registered type names in sorted order
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.builders.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Builds the condition described by `spec`.
    ///
    /// Returns `Ok(None)` when the type is unknown and the registry is
    /// permissive.
    pub fn build(&self, spec: &ConditionSpec) -> Result<Option<Arc<dyn Condition>>> {
        match self.builders.get(&spec.condition_type) {
            Some(builder) => builder(spec).map(Some),
            None => match self.mode {
                ConditionMode::Permissive => {
                    warn!(
                        condition = %spec.name,
                        condition_type = %spec.condition_type,
                        "dropping condition with unregistered type"
                    );
                    Ok(None)
                }
                ConditionMode::Strict => Err(AuthzError::UnknownConditionType {
                    name: spec.name.clone(),
                    condition_type: spec.condition_type.clone(),
                }),
            },
        }
    }
}

impl fmt::Debug for ConditionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionRegistry")
            .field("types", &self.type_names())
            .field("mode", &self.mode)
            .finish()
    }
}

fn decode_options<C>(spec: &ConditionSpec) -> Result<C>
where
    C: DeserializeOwned + Default,
{
    if spec.options.is_empty() {
        return Ok(C::default());
    }

    serde_json::from_value(Value::Object(spec.options.clone())).map_err(|e| {
        AuthzError::InvalidConditionOptions {
            name: spec.name.clone(),
            condition_type: spec.condition_type.clone(),
            reason: e.to_string(),
        }
    })
}
