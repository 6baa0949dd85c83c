use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use super::{limit_indices, PolicyManager, RoleManager};
use crate::error::{AuthzError, Result};
use crate::pattern::match_wildcard;
use crate::policy::Policy;
use crate::request::Request;
use crate::role::RoleRef;

/// Policies held in memory, keyed by id
#[derive(Debug, Default)]
pub struct MemoryPolicyManager {
    policies: RwLock<BTreeMap<String, Arc<Policy>>>,
}

impl MemoryPolicyManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a manager holding `policies`, later ids replacing earlier ones
    pub fn with_policies(policies: impl IntoIterator<Item = Policy>) -> Self {
        let map = policies
            .into_iter()
            .map(|p| (p.id().to_string(), Arc::new(p)))
            .collect();
        Self {
            policies: RwLock::new(map),
        }
    }

    pub fn len(&self) -> usize {
        self.policies.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.read().is_empty()
    }

    fn find_all(&self) -> Vec<Arc<Policy>> {
        self.policies.read().values().cloned().collect()
    }
}

impl PolicyManager for MemoryPolicyManager {
    fn create(&self, policy: Policy) -> Result<()> {
        let mut policies = self.policies.write();
        if policies.contains_key(policy.id()) {
            return Err(AuthzError::DuplicatePolicy(policy.id().to_string()));
        }

        info!(policy = policy.id(), "policy created");
        policies.insert(policy.id().to_string(), Arc::new(policy));
        Ok(())
    }

    fn update(&self, policy: Policy) -> Result<()> {
        info!(policy = policy.id(), "policy updated");
        self.policies
            .write()
            .insert(policy.id().to_string(), Arc::new(policy));
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Arc<Policy>> {
        self.policies
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| AuthzError::PolicyNotFound(id.to_string()))
    }

    fn delete(&self, id: &str) -> Result<()> {
        if self.policies.write().remove(id).is_some() {
            info!(policy = id, "policy deleted");
        }
        Ok(())
    }

    fn all(&self, limit: usize, offset: usize) -> Result<Vec<Arc<Policy>>> {
        let policies = self.policies.read();
        let (start, end) = limit_indices(limit, offset, policies.len());
        Ok(policies
            .values()
            .skip(start)
            .take(end - start)
            .cloned()
            .collect())
    }

    fn find_by_request(&self, _request: &Request) -> Result<Vec<Arc<Policy>>> {
        Ok(self.find_all())
    }

    fn find_by_role(&self, _role: &str) -> Result<Vec<Arc<Policy>>> {
        Ok(self.find_all())
    }

    fn find_by_resource(&self, _resource: &str) -> Result<Vec<Arc<Policy>>> {
        Ok(self.find_all())
    }

    fn find_by_scope(&self, _scope: &str) -> Result<Vec<Arc<Policy>>> {
        Ok(self.find_all())
    }
}

/// Roles held in memory, keyed by id
#[derive(Debug, Default)]
pub struct MemoryRoleManager {
    roles: RwLock<BTreeMap<String, RoleRef>>,
}

impl MemoryRoleManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.roles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.read().is_empty()
    }
}

impl RoleManager for MemoryRoleManager {
    fn create(&self, role: RoleRef) -> Result<()> {
        let mut roles = self.roles.write();
        if roles.contains_key(role.id()) {
            return Err(AuthzError::DuplicateRoleId(role.id().to_string()));
        }

        info!(role = role.id(), "role created");
        roles.insert(role.id().to_string(), role);
        Ok(())
    }

    fn update(&self, role: RoleRef) -> Result<()> {
        info!(role = role.id(), "role updated");
        self.roles.write().insert(role.id().to_string(), role);
        Ok(())
    }

    fn get(&self, id: &str) -> Result<RoleRef> {
        self.roles
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| AuthzError::RoleNotFound(id.to_string()))
    }

    fn get_by_name(&self, name: &str) -> Result<RoleRef> {
        self.roles
            .read()
            .values()
            .find(|role| role.name() == name)
            .cloned()
            .ok_or_else(|| AuthzError::RoleNotFound(name.to_string()))
    }

    fn delete(&self, id: &str) -> Result<()> {
        if self.roles.write().remove(id).is_some() {
            info!(role = id, "role deleted");
        }
        Ok(())
    }

    fn all(&self, limit: usize, offset: usize) -> Result<Vec<RoleRef>> {
        let roles = self.roles.read();
        let (start, end) = limit_indices(limit, offset, roles.len());
        Ok(roles.values().skip(start).take(end - start).cloned().collect())
    }

    fn get_matching(&self, pattern: &str) -> Result<Vec<RoleRef>> {
        Ok(self
            .roles
            .read()
            .values()
            .filter(|role| match_wildcard(pattern, role.id()))
            .cloned()
            .collect())
    }
}
