//! Requester identity and role memberships

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use crate::role::{effective_roles, RoleRef};

/// The identity making a request.
///
/// # Examples
///
/// ```rust
/// use policy_gate::{role::Role, Subject};
///
/// let subject = Subject::new("user-42")
///     .with_name("Alice")
///     .with_role(Role::new("editor").into_ref());
///
/// assert_eq!(subject.identities(), vec!["user-42", "editor"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub roles: Vec<RoleRef>,

    #[serde(default)]
    pub meta: HashMap<String, Value>,
}

impl Subject {
    /// Creates a subject with no roles or metadata
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            roles: Vec::new(),
            meta: HashMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a role membership; a role id already held is ignored
    pub fn with_role(mut self, role: RoleRef) -> Self {
        if !self.roles.iter().any(|held| held.id() == role.id()) {
            self.roles.push(role);
        }
        self
    }

    /// Merges metadata, later keys replacing earlier ones
    pub fn with_meta(mut self, meta: impl IntoIterator<Item = (String, Value)>) -> Self {
        self.meta.extend(meta);
        self
    }

    /// Strings the subject is known by when matched against policy roles:
    /// its own id followed by the ids of its direct roles
    pub fn identities(&self) -> Vec<&str> {
        std::iter::once(self.id.as_str())
            .chain(self.roles.iter().map(|role| role.id()))
            .collect()
    }

    /// All roles reachable from the subject's memberships, deduplicated by id
    pub fn effective_roles(&self) -> Vec<RoleRef> {
        let mut seen = std::collections::HashSet::new();
        let mut roles = Vec::new();
        for held in &self.roles {
            for role in effective_roles(held) {
                if seen.insert(role.id().to_string()) {
                    roles.push(role);
                }
            }
        }
        roles
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}
