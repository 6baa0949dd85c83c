//! File-backed policy and role storage
//!
//! Policies live in `<dir>/<name>.policy` and roles in `<dir>/<name>.roles`,
//! each a JSON object keyed by id. Every operation reads the file, and every
//! mutation rewrites it through a temporary file and a rename.

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use super::{page, PolicyManager, RoleManager};
use crate::condition::ConditionRegistry;
use crate::error::{AuthzError, Result};
use crate::pattern::match_wildcard;
use crate::policy::{Policy, PolicyOptions};
use crate::request::Request;
use crate::role::{Role, RoleRef};

/// Default base name for the store files
pub const DEFAULT_STORE_NAME: &str = "policy-gate";

/// JSON files holding policies and roles.
///
/// Implements both [`PolicyManager`] and [`RoleManager`]; call through the
/// trait (`PolicyManager::create(&store, policy)`) or through a trait object
/// when both are in scope. Mutations are serialized within the process only.
///
/// # Examples
///
/// ```rust,no_run
/// use policy_gate::manager::{FileStore, RoleManager};
/// use policy_gate::role::Role;
///
/// let store = FileStore::open("/var/lib/gate").unwrap();
/// RoleManager::create(&store, Role::new("editor").into_ref()).unwrap();
/// ```
#[derive(Debug)]
pub struct FileStore {
    directory: PathBuf,
    name: String,
    registry: ConditionRegistry,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Creates a store rooted at `directory` without touching the disk.
    /// Files are created by the first write.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            name: DEFAULT_STORE_NAME.to_string(),
            registry: ConditionRegistry::default(),
            write_lock: Mutex::new(()),
        }
    }

    /// Creates the directory and both files if they do not exist yet
    pub fn open(directory: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(directory);
        store.initialize()?;
        Ok(store)
    }

    /// Changes the base file name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Resolves conditions of loaded policies through `registry`
    pub fn with_registry(mut self, registry: ConditionRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Creates the directory and any missing store file
    pub fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.directory)?;
        for path in [self.policy_path(), self.role_path()] {
            if !path.is_file() {
                fs::write(&path, b"{}")?;
                debug!(path = %path.display(), "created store file");
            }
        }
        Ok(())
    }

    pub fn policy_path(&self) -> PathBuf {
        self.directory.join(format!("{}.policy", self.name))
    }

    pub fn role_path(&self) -> PathBuf {
        self.directory.join(format!("{}.roles", self.name))
    }

    fn load_policies(&self) -> Result<BTreeMap<String, Arc<Policy>>> {
        let drafts: BTreeMap<String, PolicyOptions> = read_map(&self.policy_path())?;
        drafts
            .into_iter()
            .map(|(id, options)| Ok((id, Arc::new(Policy::with_registry(options, &self.registry)?))))
            .collect()
    }

    fn save_policies(&self, policies: &BTreeMap<String, Arc<Policy>>) -> Result<()> {
        write_map(&self.directory, &self.policy_path(), policies)
    }

    fn load_roles(&self) -> Result<BTreeMap<String, RoleRef>> {
        let roles: BTreeMap<String, Role> = read_map(&self.role_path())?;
        Ok(roles.into_iter().map(|(id, role)| (id, role.into_ref())).collect())
    }

    fn save_roles(&self, roles: &BTreeMap<String, RoleRef>) -> Result<()> {
        write_map(&self.directory, &self.role_path(), roles)
    }

    fn write_policy(&self, policy: Policy, overwrite: bool) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut policies = self.load_policies()?;
        if !overwrite && policies.contains_key(policy.id()) {
            return Err(AuthzError::DuplicatePolicy(policy.id().to_string()));
        }

        info!(policy = policy.id(), path = %self.policy_path().display(), "policy written");
        policies.insert(policy.id().to_string(), Arc::new(policy));
        self.save_policies(&policies)
    }

    fn write_role(&self, role: RoleRef, overwrite: bool) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut roles = self.load_roles()?;
        if !overwrite && roles.contains_key(role.id()) {
            return Err(AuthzError::DuplicateRoleId(role.id().to_string()));
        }

        info!(role = role.id(), path = %self.role_path().display(), "role written");
        roles.insert(role.id().to_string(), role);
        self.save_roles(&roles)
    }

    fn all_policies(&self) -> Result<Vec<Arc<Policy>>> {
        Ok(self.load_policies()?.into_values().collect())
    }
}

/// Reads a JSON map; a missing file reads as empty
fn read_map<T: DeserializeOwned>(path: &Path) -> Result<BTreeMap<String, T>> {
    match fs::read(path) {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(e) => Err(e.into()),
    }
}

fn write_map<T: Serialize>(directory: &Path, path: &Path, map: &BTreeMap<String, T>) -> Result<()> {
    fs::create_dir_all(directory)?;
    let bytes = serde_json::to_vec(map)?;
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    let staging = PathBuf::from(staging);
    fs::write(&staging, bytes)?;
    fs::rename(&staging, path)?;
    Ok(())
}

impl PolicyManager for FileStore {
    fn create(&self, policy: Policy) -> Result<()> {
        self.write_policy(policy, false)
    }

    fn update(&self, policy: Policy) -> Result<()> {
        self.write_policy(policy, true)
    }

    fn get(&self, id: &str) -> Result<Arc<Policy>> {
        self.load_policies()?
            .remove(id)
            .ok_or_else(|| AuthzError::PolicyNotFound(id.to_string()))
    }

    fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut policies = self.load_policies()?;
        if policies.remove(id).is_some() {
            info!(policy = id, "policy deleted");
            self.save_policies(&policies)?;
        }
        Ok(())
    }

    fn all(&self, limit: usize, offset: usize) -> Result<Vec<Arc<Policy>>> {
        Ok(page(&self.all_policies()?, limit, offset))
    }

    fn find_by_request(&self, _request: &Request) -> Result<Vec<Arc<Policy>>> {
        self.all_policies()
    }

    fn find_by_role(&self, _role: &str) -> Result<Vec<Arc<Policy>>> {
        self.all_policies()
    }

    fn find_by_resource(&self, _resource: &str) -> Result<Vec<Arc<Policy>>> {
        self.all_policies()
    }

    fn find_by_scope(&self, _scope: &str) -> Result<Vec<Arc<Policy>>> {
        self.all_policies()
    }
}

impl RoleManager for FileStore {
    fn create(&self, role: RoleRef) -> Result<()> {
        self.write_role(role, false)
    }

    fn update(&self, role: RoleRef) -> Result<()> {
        self.write_role(role, true)
    }

    fn get(&self, id: &str) -> Result<RoleRef> {
        self.load_roles()?
            .remove(id)
            .ok_or_else(|| AuthzError::RoleNotFound(id.to_string()))
    }

    fn get_by_name(&self, name: &str) -> Result<RoleRef> {
        self.load_roles()?
            .into_values()
            .find(|role| role.name() == name)
            .ok_or_else(|| AuthzError::RoleNotFound(name.to_string()))
    }

    fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut roles = self.load_roles()?;
        if roles.remove(id).is_some() {
            info!(role = id, "role deleted");
            self.save_roles(&roles)?;
        }
        Ok(())
    }

    fn all(&self, limit: usize, offset: usize) -> Result<Vec<RoleRef>> {
        let roles: Vec<RoleRef> = self.load_roles()?.into_values().collect();
        Ok(page(&roles, limit, offset))
    }

    fn get_matching(&self, pattern: &str) -> Result<Vec<RoleRef>> {
        Ok(self
            .load_roles()?
            .into_values()
            .filter(|role| match_wildcard(pattern, role.id()))
            .collect())
    }
}
