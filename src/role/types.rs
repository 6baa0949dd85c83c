//! Role entity with shared, mutable sub-role lists
//!
//! Roles are handed around as [`RoleRef`] so that the same role can be
//! attached to several policies, subjects, or parent roles. Because sub-role
//! lists can be extended after a role is shared, the graph formed by
//! `children` may contain cycles; see [`super::graph`] for the traversal that
//! copes with them.

use parking_lot::RwLock;
use serde::de::Error as _;
use serde::ser::{SerializeSeq, SerializeStruct};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

use crate::error::{AuthzError, Result};

/// Shared handle to a role
pub type RoleRef = Arc<Role>;

/// A named association to a set of permissionable capabilities.
///
/// # Examples
///
/// ```rust
/// use policy_gate::role::Role;
///
/// let editor = Role::new("editor").into_ref();
/// let admin = Role::new("admin").with_name("Administrator");
/// admin.add_role(editor).unwrap();
///
/// assert_eq!(admin.effective_role_ids(), vec!["admin", "editor"]);
/// ```
pub struct Role {
    id: String,
    name: String,
    description: String,
    children: RwLock<Vec<RoleRef>>,
}

impl Role {
    /// Creates a role with no sub-roles
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            description: String::new(),
            children: RwLock::new(Vec::new()),
        }
    }

    /// Sets the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Adds each sub-role in order, stopping at the first invalid one
    pub fn with_roles(self, roles: impl IntoIterator<Item = RoleRef>) -> Result<Self> {
        for role in roles {
            self.add_role(role)?;
        }
        Ok(self)
    }

    /// Wraps the role in a shared handle
    pub fn into_ref(self) -> RoleRef {
        Arc::new(self)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Snapshot of the direct sub-roles
    pub fn children(&self) -> Vec<RoleRef> {
        self.children.read().clone()
    }

    /// Appends a direct sub-role.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::DuplicateRole`] when the sub-role has this
    /// role's id, or when a direct sub-role with the same id already exists.
    /// Indirect cycles are not rejected.
    pub fn add_role(&self, role: RoleRef) -> Result<()> {
        if role.id == self.id {
            return Err(AuthzError::DuplicateRole {
                parent: self.id.clone(),
                child: role.id.clone(),
            });
        }

        let mut children = self.children.write();
        if children.iter().any(|existing| existing.id == role.id) {
            return Err(AuthzError::DuplicateRole {
                parent: self.id.clone(),
                child: role.id.clone(),
            });
        }

        children.push(role);
        Ok(())
    }

    /// Ids of this role and every role reachable through sub-roles,
    /// depth-first, each id reported once
    pub fn effective_role_ids(&self) -> Vec<String> {
        let mut ids = vec![self.id.clone()];
        super::graph::walk_descendants(self, |role| ids.push(role.id.clone()));
        ids
    }
}

impl Clone for Role {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            children: RwLock::new(self.children()),
        }
    }
}

// Compares direct child ids only; a deep comparison could loop on cycles.
impl PartialEq for Role {
    fn eq(&self, other: &Self) -> bool {
        if self.id != other.id || self.name != other.name || self.description != other.description {
            return false;
        }

        let ours = self.children.read();
        let theirs = other.children.read();
        ours.len() == theirs.len() && ours.iter().zip(theirs.iter()).all(|(a, b)| a.id == b.id)
    }
}

impl Eq for Role {}

impl fmt::Debug for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let children: Vec<String> = self.children.read().iter().map(|r| r.id.clone()).collect();
        f.debug_struct("Role")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("description", &self.description)
            .field("roles", &children)
            .finish()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Serialization view that tracks the ids on the current path so a cyclic
/// role graph is written as a finite tree.
struct RoleNode<'a> {
    role: &'a Role,
    ancestors: &'a [String],
}

struct RoleChildren<'a> {
    children: &'a [RoleRef],
    ancestors: &'a [String],
}

impl Serialize for RoleNode<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut path = self.ancestors.to_vec();
        path.push(self.role.id.clone());

        let children: Vec<RoleRef> = self
            .role
            .children()
            .into_iter()
            .filter(|child| !path.contains(&child.id))
            .collect();

        let mut state = serializer.serialize_struct("Role", 4)?;
        state.serialize_field("id", &self.role.id)?;
        state.serialize_field("name", &self.role.name)?;
        state.serialize_field("description", &self.role.description)?;
        if children.is_empty() {
            state.serialize_field("roles", &None::<()>)?;
        } else {
            state.serialize_field(
                "roles",
                &RoleChildren {
                    children: &children,
                    ancestors: &path,
                },
            )?;
        }
        state.end()
    }
}

impl Serialize for RoleChildren<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.children.len()))?;
        for child in self.children {
            seq.serialize_element(&RoleNode {
                role: child,
                ancestors: self.ancestors,
            })?;
        }
        seq.end()
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        RoleNode {
            role: self,
            ancestors: &[],
        }
        .serialize(serializer)
    }
}

#[derive(Deserialize)]
struct RoleDocument {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    roles: Option<Vec<Role>>,
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let doc = RoleDocument::deserialize(deserializer)?;
        Role::new(doc.id)
            .with_name(doc.name)
            .with_description(doc.description)
            .with_roles(doc.roles.unwrap_or_default().into_iter().map(Arc::new))
            .map_err(D::Error::custom)
    }
}
