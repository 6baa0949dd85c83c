//! # Policy and Role Stores
//!
//! Storage contracts consumed by the [`Enforcer`](crate::Enforcer) and by
//! administrative code.
//!
//! ## Implementations
//!
//! - [`MemoryPolicyManager`] / [`MemoryRoleManager`]: maps behind a
//!   reader-writer lock
//! - [`FileStore`]: JSON files on disk, one for policies and one for roles
//! - [`CachedPolicyManager`]: TTL snapshot of another manager's candidate set
//!
//! ## Ordering
//!
//! Listing and lookup methods return entries in ascending id order so that
//! evaluation order is stable across calls.

pub mod cache;
pub mod file;
pub mod memory;

pub use cache::{CacheConfig, CachedPolicyManager};
pub use file::FileStore;
pub use memory::{MemoryPolicyManager, MemoryRoleManager};

use std::sync::Arc;

use crate::error::{AuthzError, Result};
use crate::policy::Policy;
use crate::request::Request;
use crate::role::RoleRef;

/// Storage and lookup of policies
pub trait PolicyManager: Send + Sync {
    /// Stores a new policy.
    ///
    /// # Errors
    ///
    /// [`AuthzError::DuplicatePolicy`] if the id is taken.
    fn create(&self, policy: Policy) -> Result<()>;

    /// Stores a policy, replacing any policy with the same id
    fn update(&self, policy: Policy) -> Result<()>;

    /// # Errors
    ///
    /// [`AuthzError::PolicyNotFound`] if no policy has the id.
    fn get(&self, id: &str) -> Result<Arc<Policy>>;

    /// Removes a policy. Removing a missing id succeeds.
    fn delete(&self, id: &str) -> Result<()>;

    /// A page of policies in ascending id order.
    ///
    /// See [`limit_indices`] for how out-of-range values are clamped.
    fn all(&self, limit: usize, offset: usize) -> Result<Vec<Arc<Policy>>>;

    /// Candidate policies for a request
    fn find_by_request(&self, request: &Request) -> Result<Vec<Arc<Policy>>>;

    fn find_by_role(&self, role: &str) -> Result<Vec<Arc<Policy>>>;

    fn find_by_resource(&self, resource: &str) -> Result<Vec<Arc<Policy>>>;

    fn find_by_scope(&self, scope: &str) -> Result<Vec<Arc<Policy>>>;
}

/// Storage and lookup of roles
pub trait RoleManager: Send + Sync {
    /// # Errors
    ///
    /// [`AuthzError::DuplicateRoleId`] if the id is taken.
    fn create(&self, role: RoleRef) -> Result<()>;

    fn update(&self, role: RoleRef) -> Result<()>;

    fn get(&self, id: &str) -> Result<RoleRef>;

    /// First role, in id order, whose display name is `name`
    fn get_by_name(&self, name: &str) -> Result<RoleRef>;

    fn delete(&self, id: &str) -> Result<()>;

    fn all(&self, limit: usize, offset: usize) -> Result<Vec<RoleRef>>;

    /// Roles whose id matches a wildcard pattern
    fn get_matching(&self, pattern: &str) -> Result<Vec<RoleRef>> {
        let _ = pattern;
        Err(AuthzError::Unsupported("role lookup by pattern".to_string()))
    }
}

/// Slice bounds `(start, end)` for a page of `limit` entries starting at
/// `offset` out of `len`.
///
/// An offset past the end yields an empty page; a page running past the end
/// is truncated.
///
/// ```rust
/// use policy_gate::manager::limit_indices;
///
/// assert_eq!(limit_indices(10, 0, 3), (0, 3));
/// assert_eq!(limit_indices(2, 1, 5), (1, 3));
/// assert_eq!(limit_indices(2, 9, 5), (5, 5));
/// ```
pub fn limit_indices(limit: usize, offset: usize, len: usize) -> (usize, usize) {
    if offset > len {
        return (len, len);
    }

    let end = offset.saturating_add(limit);
    if end > len {
        return (offset, len);
    }

    (offset, end)
}

/// Applies [`limit_indices`] to an already sorted list
pub(crate) fn page<T: Clone>(items: &[T], limit: usize, offset: usize) -> Vec<T> {
    let (start, end) = limit_indices(limit, offset, items.len());
    items[start..end].to_vec()
}
