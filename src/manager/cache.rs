//! TTL snapshot over another policy manager
//!
//! Lookups used during enforcement (`find_by_*`) are served from a snapshot
//! of the wrapped manager's policies, refreshed once it is older than the
//! configured TTL. Writes go straight to the wrapped manager and discard the
//! snapshot.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use super::PolicyManager;
use crate::error::Result;
use crate::pattern::CacheStats;
use crate::policy::Policy;
use crate::request::Request;

/// Configuration for [`CachedPolicyManager`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// How long a snapshot is served before it is reloaded
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
        }
    }
}

#[derive(Debug)]
struct Snapshot {
    policies: Vec<Arc<Policy>>,
    loaded_at: Instant,
}

/// Caching wrapper around any [`PolicyManager`].
///
/// Snapshots hold the wrapped manager's full policy list, so `find_by_*`
/// returns every policy in ascending id order regardless of the argument.
///
/// # Examples
///
/// ```rust
/// use policy_gate::manager::{CacheConfig, CachedPolicyManager, MemoryPolicyManager, PolicyManager};
/// use policy_gate::policy::PolicyOptions;
///
/// let cached = CachedPolicyManager::new(MemoryPolicyManager::new(), CacheConfig::default());
/// cached.create(PolicyOptions::new().with_name("p1").allow().build().unwrap()).unwrap();
///
/// assert_eq!(cached.find_by_role("anyone").unwrap().len(), 1);
/// assert_eq!(cached.find_by_role("anyone").unwrap().len(), 1);
/// assert_eq!(cached.stats().hit_count, 1);
/// ```
#[derive(Debug)]
pub struct CachedPolicyManager<M> {
    inner: M,
    config: CacheConfig,
    snapshot: RwLock<Option<Snapshot>>,
    // Bumped by every invalidation; a reload started under an older value
    // is returned to its caller but not stored
    generation: AtomicU64,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
}

impl<M: PolicyManager> CachedPolicyManager<M> {
    pub fn new(inner: M, config: CacheConfig) -> Self {
        Self {
            inner,
            config,
            snapshot: RwLock::new(None),
            generation: AtomicU64::new(0),
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
        }
    }

    /// The wrapped manager
    pub fn inner(&self) -> &M {
        &self.inner
    }

    /// Discards the current snapshot
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.snapshot.write() = None;
    }

    pub fn stats(&self) -> CacheStats {
        let size = self
            .snapshot
            .read()
            .as_ref()
            .map_or(0, |snapshot| snapshot.policies.len());
        CacheStats::from_counts(
            size,
            self.hit_count.load(Ordering::Relaxed),
            self.miss_count.load(Ordering::Relaxed),
        )
    }

    fn cached(&self) -> Result<Vec<Arc<Policy>>> {
        if let Some(snapshot) = self.snapshot.read().as_ref() {
            if snapshot.loaded_at.elapsed() < self.config.ttl {
                self.hit_count.fetch_add(1, Ordering::Relaxed);
                return Ok(snapshot.policies.clone());
            }
        }

        self.miss_count.fetch_add(1, Ordering::Relaxed);
        let generation = self.generation.load(Ordering::SeqCst);
        let policies = self.inner.all(usize::MAX, 0)?;

        let mut slot = self.snapshot.write();
        if self.generation.load(Ordering::SeqCst) == generation {
            debug!(policies = policies.len(), "policy snapshot reloaded");
            *slot = Some(Snapshot {
                policies: policies.clone(),
                loaded_at: Instant::now(),
            });
        } else {
            debug!("policy snapshot discarded after concurrent write");
        }
        Ok(policies)
    }
}

impl<M: PolicyManager> PolicyManager for CachedPolicyManager<M> {
    fn create(&self, policy: Policy) -> Result<()> {
        self.inner.create(policy)?;
        self.invalidate();
        Ok(())
    }

    fn update(&self, policy: Policy) -> Result<()> {
        self.inner.update(policy)?;
        self.invalidate();
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Arc<Policy>> {
        self.inner.get(id)
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.inner.delete(id)?;
        self.invalidate();
        Ok(())
    }

    fn all(&self, limit: usize, offset: usize) -> Result<Vec<Arc<Policy>>> {
        self.inner.all(limit, offset)
    }

    fn find_by_request(&self, _request: &Request) -> Result<Vec<Arc<Policy>>> {
        self.cached()
    }

    fn find_by_role(&self, _role: &str) -> Result<Vec<Arc<Policy>>> {
        self.cached()
    }

    fn find_by_resource(&self, _resource: &str) -> Result<Vec<Arc<Policy>>> {
        self.cached()
    }

    fn find_by_scope(&self, _scope: &str) -> Result<Vec<Arc<Policy>>> {
        self.cached()
    }
}
