//! Cycle-safe expansion of role hierarchies
//!
//! Sub-role lists are shared and mutable, so a hierarchy can loop back on
//! itself through roles that were linked after the fact. Traversal therefore
//! keeps an explicit visited-id set instead of relying on depth limits or on
//! the graph being acyclic.

use std::collections::HashSet;
use std::sync::Arc;

use super::types::{Role, RoleRef};

/// Visits every role reachable from `root` through sub-roles, excluding
/// `root` itself and any role sharing its id.
///
/// Order is depth-first pre-order following each role's sub-role order. A
/// role id is visited at most once, whichever path reaches it first.
pub fn walk_descendants<F>(root: &Role, mut visit: F)
where
    F: FnMut(&RoleRef),
{
    let mut visited: HashSet<String> = HashSet::new();
    visited.insert(root.id().to_string());

    let mut stack: Vec<RoleRef> = root.children().into_iter().rev().collect();

    while let Some(current) = stack.pop() {
        if !visited.insert(current.id().to_string()) {
            continue;
        }

        visit(&current);

        for child in current.children().into_iter().rev() {
            if !visited.contains(child.id()) {
                stack.push(child);
            }
        }
    }
}

/// Returns `role` followed by every transitively reachable sub-role,
/// deduplicated by id.
///
/// # Examples
///
/// ```rust
/// use policy_gate::role::{effective_roles, Role};
///
/// let viewer = Role::new("viewer").into_ref();
/// let editor = Role::new("editor").into_ref();
/// editor.add_role(viewer.clone()).unwrap();
///
/// // Close the loop: viewer -> editor -> viewer
/// viewer.add_role(editor.clone()).unwrap();
///
/// let ids: Vec<String> = effective_roles(&editor)
///     .iter()
///     .map(|r| r.id().to_string())
///     .collect();
/// assert_eq!(ids, vec!["editor", "viewer"]);
/// ```
pub fn effective_roles(role: &RoleRef) -> Vec<RoleRef> {
    let mut roles = vec![Arc::clone(role)];
    walk_descendants(role, |descendant| roles.push(Arc::clone(descendant)));
    roles
}
