//! # Role Hierarchy Module
//!
//! Roles form a graph through shared sub-role references:
//! - Insertion rejects self references and repeated direct children
//! - Effective role expansion is depth-first and deduplicated by id
//! - Traversal terminates on cyclic graphs
//!
//! ## Example
//!
//! ```rust
//! use policy_gate::role::{effective_roles, Role};
//!
//! let reader = Role::new("reader").into_ref();
//! let writer = Role::new("writer").into_ref();
//! writer.add_role(reader).unwrap();
//!
//! assert_eq!(effective_roles(&writer).len(), 2);
//! ```

pub mod graph;
pub mod types;

pub use graph::{effective_roles, walk_descendants};
pub use types::{Role, RoleRef};

#[cfg(test)]
mod tests;
