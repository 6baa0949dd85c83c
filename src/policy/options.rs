//! Policy drafts
//!
//! [`PolicyOptions`] is both the builder for a [`Policy`](super::Policy) and
//! its wire format. Field order here fixes the JSON field order.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::types::{Policy, PolicyEffect};
use crate::condition::ConditionSpec;
use crate::error::Result;
use crate::role::RoleRef;

/// Mutable draft of a policy.
///
/// # Examples
///
/// ```rust
/// use policy_gate::condition::ConditionSpec;
/// use policy_gate::policy::{PolicyEffect, PolicyOptions};
/// use policy_gate::role::Role;
///
/// let policy = PolicyOptions::new()
///     .with_name("editors_write")
///     .with_description("editors may write documents")
///     .with_role(Role::new("editor").into_ref())
///     .set_resources(["documents.*"])
///     .set_actions(["write"])
///     .with_condition(ConditionSpec::new("mfa", "bool").with_option("value", true))
///     .allow()
///     .build()
///     .unwrap();
///
/// assert_eq!(policy.id(), "editors_write");
/// assert_eq!(policy.effect(), PolicyEffect::Allow);
/// assert!(policy.scopes().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyOptions {
    /// Policy id, unique within a store
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(
        default,
        serialize_with = "empty_as_null",
        deserialize_with = "null_as_empty"
    )]
    pub roles: Vec<RoleRef>,

    /// `None` matches every resource
    #[serde(default)]
    pub resources: Option<Vec<String>>,

    /// `None` matches every action
    #[serde(default)]
    pub actions: Option<Vec<String>>,

    /// `None` matches every scope
    #[serde(default)]
    pub scopes: Option<Vec<String>>,

    #[serde(
        default,
        serialize_with = "empty_as_null",
        deserialize_with = "null_as_empty"
    )]
    pub conditions: Vec<ConditionSpec>,

    #[serde(default)]
    pub effect: PolicyEffect,
}

impl PolicyOptions {
    /// An empty draft with a deny effect
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn allow(mut self) -> Self {
        self.effect = PolicyEffect::Allow;
        self
    }

    pub fn deny(mut self) -> Self {
        self.effect = PolicyEffect::Deny;
        self
    }

    /// Replaces the resource patterns
    pub fn set_resources<I, S>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resources = Some(resources.into_iter().map(Into::into).collect());
        self
    }

    /// Replaces the action patterns
    pub fn set_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions = Some(actions.into_iter().map(Into::into).collect());
        self
    }

    /// Replaces the scope patterns
    pub fn set_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = Some(scopes.into_iter().map(Into::into).collect());
        self
    }

    /// Appends a role
    pub fn with_role(mut self, role: RoleRef) -> Self {
        self.roles.push(role);
        self
    }

    /// Appends a condition spec
    pub fn with_condition(mut self, spec: ConditionSpec) -> Self {
        self.conditions.push(spec);
        self
    }

    /// Shorthand for [`Policy::new`]
    pub fn build(self) -> Result<Policy> {
        Policy::new(self)
    }
}

fn empty_as_null<S, T>(items: &[T], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
{
    if items.is_empty() {
        serializer.serialize_none()
    } else {
        serializer.collect_seq(items)
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
