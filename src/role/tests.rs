//! Tests for role hierarchies
//!
//! Tests cover:
//! - Insertion invariants (self reference, duplicate children)
//! - Effective role expansion (order, deduplication)
//! - Cyclic graphs formed through shared references
//! - Serialization of trees and cycles

use super::*;
use crate::error::AuthzError;
use proptest::prelude::*;
use std::collections::HashSet;

fn ids(roles: &[RoleRef]) -> Vec<String> {
    roles.iter().map(|r| r.id().to_string()).collect()
}

#[test]
fn test_add_sub_role() {
    let role = Role::new("test_role").into_ref();
    role.add_role(Role::new("sub_role").into_ref()).unwrap();

    let effective = effective_roles(&role);
    assert_eq!(ids(&effective), vec!["test_role", "sub_role"]);
}

#[test]
fn test_add_self_rejected() {
    let role = Role::new("test_role").into_ref();
    let result = role.add_role(role.clone());
    assert!(matches!(result, Err(AuthzError::DuplicateRole { .. })));
    assert!(role.children().is_empty());
}

#[test]
fn test_add_same_id_rejected() {
    let role = Role::new("test_role").into_ref();
    let result = role.add_role(Role::new("test_role").into_ref());
    assert!(matches!(result, Err(AuthzError::DuplicateRole { .. })));
}

#[test]
fn test_add_duplicate_child_rejected() {
    let role = Role::new("test_role");
    let sub = Role::new("sub_role").into_ref();

    role.add_role(sub.clone()).unwrap();
    let result = role.add_role(sub);
    assert!(matches!(
        result,
        Err(AuthzError::DuplicateRole { ref parent, ref child })
            if parent == "test_role" && child == "sub_role"
    ));

    // A distinct role object with the same id is still a duplicate
    let result = role.add_role(Role::new("sub_role").into_ref());
    assert!(result.is_err());
    assert_eq!(role.children().len(), 1);
}

#[test]
fn test_effective_roles_depth_first_order() {
    let root = Role::new("root").into_ref();
    let a = Role::new("a").into_ref();
    let a1 = Role::new("a1").into_ref();
    let b = Role::new("b").into_ref();

    a.add_role(a1).unwrap();
    root.add_role(a).unwrap();
    root.add_role(b).unwrap();

    assert_eq!(ids(&effective_roles(&root)), vec!["root", "a", "a1", "b"]);
    assert_eq!(root.effective_role_ids(), vec!["root", "a", "a1", "b"]);
}

#[test]
fn test_effective_roles_shared_descendant_reported_once() {
    // Diamond: root -> left -> shared, root -> right -> shared
    let root = Role::new("root").into_ref();
    let left = Role::new("left").into_ref();
    let right = Role::new("right").into_ref();
    let shared = Role::new("shared").into_ref();

    left.add_role(shared.clone()).unwrap();
    right.add_role(shared).unwrap();
    root.add_role(left).unwrap();
    root.add_role(right).unwrap();

    assert_eq!(root.effective_role_ids(), vec!["root", "left", "shared", "right"]);
}

#[test]
fn test_effective_roles_two_node_cycle() {
    let parent = Role::new("parent").into_ref();
    let child = Role::new("child").into_ref();

    parent.add_role(child.clone()).unwrap();
    child.add_role(parent.clone()).unwrap();

    assert_eq!(parent.effective_role_ids(), vec!["parent", "child"]);
    assert_eq!(child.effective_role_ids(), vec!["child", "parent"]);
}

#[test]
fn test_effective_roles_indirect_cycle() {
    let a = Role::new("a").into_ref();
    let b = Role::new("b").into_ref();
    let c = Role::new("c").into_ref();

    a.add_role(b.clone()).unwrap();
    b.add_role(c.clone()).unwrap();
    c.add_role(a.clone()).unwrap();

    for role in [&a, &b, &c] {
        let effective = role.effective_role_ids();
        assert_eq!(effective.len(), 3);
        assert_eq!(effective[0], role.id());
    }
}

#[test]
fn test_effective_roles_deep_chain() {
    // Deeper than any fixed recursion cap
    let root = Role::new("level_0").into_ref();
    let mut current = root.clone();
    for level in 1..=50 {
        let next = Role::new(format!("level_{}", level)).into_ref();
        current.add_role(next.clone()).unwrap();
        current = next;
    }

    let effective = root.effective_role_ids();
    assert_eq!(effective.len(), 51);
    assert_eq!(effective.last().map(String::as_str), Some("level_50"));
}

#[test]
fn test_serialize_leaf_role() {
    let role = Role::new("test_role");
    let json = serde_json::to_string(&role).unwrap();
    assert_eq!(json, r#"{"id":"test_role","name":"","description":"","roles":null}"#);
}

#[test]
fn test_serialize_nested_role() {
    let role = Role::new("admin").with_name("Administrator");
    role.add_role(Role::new("editor").into_ref()).unwrap();

    let json = serde_json::to_string(&role).unwrap();
    assert_eq!(
        json,
        r#"{"id":"admin","name":"Administrator","description":"","roles":[{"id":"editor","name":"","description":"","roles":null}]}"#
    );
}

#[test]
fn test_serialize_cycle_terminates() {
    let a = Role::new("a").into_ref();
    let b = Role::new("b").into_ref();
    a.add_role(b.clone()).unwrap();
    b.add_role(a.clone()).unwrap();

    let json = serde_json::to_string(&*a).unwrap();
    assert_eq!(
        json,
        r#"{"id":"a","name":"","description":"","roles":[{"id":"b","name":"","description":"","roles":null}]}"#
    );
}

#[test]
fn test_deserialize_role_tree() {
    let json = r#"{"id":"admin","name":"Administrator","description":"all access","roles":[{"id":"editor","name":"","description":"","roles":null}]}"#;
    let role: Role = serde_json::from_str(json).unwrap();

    assert_eq!(role.id(), "admin");
    assert_eq!(role.name(), "Administrator");
    assert_eq!(role.description(), "all access");
    assert_eq!(role.effective_role_ids(), vec!["admin", "editor"]);
    assert_eq!(serde_json::to_string(&role).unwrap(), json);
}

#[test]
fn test_deserialize_minimal_role() {
    let role: Role = serde_json::from_str(r#"{"id":"viewer"}"#).unwrap();
    assert_eq!(role.id(), "viewer");
    assert!(role.children().is_empty());
}

#[test]
fn test_deserialize_rejects_duplicate_children() {
    let json = r#"{"id":"admin","roles":[{"id":"editor"},{"id":"editor"}]}"#;
    let result = serde_json::from_str::<Role>(json);
    assert!(result.is_err());
}

#[test]
fn test_debug_on_cycle_terminates() {
    let a = Role::new("a").into_ref();
    let b = Role::new("b").into_ref();
    a.add_role(b.clone()).unwrap();
    b.add_role(a.clone()).unwrap();

    let rendered = format!("{:?}", a);
    assert!(rendered.contains("\"b\""));
}

proptest! {
    #[test]
    fn prop_effective_roles_unique_and_complete(
        edges in prop::collection::vec((0usize..8, 0usize..8), 0..40)
    ) {
        let roles: Vec<RoleRef> = (0..8).map(|i| Role::new(format!("r{}", i)).into_ref()).collect();
        for (from, to) in edges {
            // Self links and repeats are rejected; everything else, cycles included, is kept
            let _ = roles[from].add_role(roles[to].clone());
        }

        for role in &roles {
            let effective = role.effective_role_ids();
            let unique: HashSet<&String> = effective.iter().collect();
            prop_assert_eq!(unique.len(), effective.len());
            prop_assert_eq!(&effective[0], &role.id().to_string());
            for child in role.children() {
                prop_assert!(effective.contains(&child.id().to_string()));
            }
        }
    }
}
