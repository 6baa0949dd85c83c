//! Compiled-pattern cache keyed by the raw policy definition
//!
//! Entries are inserted on first use and never evicted.

use dashmap::DashMap;
use regex::Regex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;

/// Hit/miss counters for a cache
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheStats {
    pub size: usize,
    pub hit_count: u64,
    pub miss_count: u64,
    pub hit_rate: f64,
}

impl CacheStats {
    pub(crate) fn from_counts(size: usize, hits: u64, misses: u64) -> Self {
        let total = hits + misses;
        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };

        Self {
            size,
            hit_count: hits,
            miss_count: misses,
            hit_rate,
        }
    }
}

/// Compiled expressions keyed by their raw definition.
///
/// Safe to share between threads. Entries are never evicted; two threads
/// compiling the same definition at once both succeed and one result wins.
#[derive(Debug, Default)]
pub struct PatternCache {
    entries: DashMap<String, Regex>,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached expression for `definition`, compiling and storing
    /// it on a miss. Compile errors are returned and nothing is stored.
    pub fn get_or_compile<F>(&self, definition: &str, compile: F) -> Result<Regex>
    where
        F: FnOnce(&str) -> Result<Regex>,
    {
        if let Some(entry) = self.entries.get(definition) {
            self.hit_count.fetch_add(1, Ordering::Relaxed);
            return Ok(entry.value().clone());
        }

        self.miss_count.fetch_add(1, Ordering::Relaxed);
        let compiled = compile(definition)?;
        let stored = self
            .entries
            .entry(definition.to_string())
            .or_insert(compiled)
            .value()
            .clone();
        Ok(stored)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops all entries and resets the counters
    pub fn clear(&self) {
        self.entries.clear();
        self.hit_count.store(0, Ordering::Relaxed);
        self.miss_count.store(0, Ordering::Relaxed);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats::from_counts(
            self.entries.len(),
            self.hit_count.load(Ordering::Relaxed),
            self.miss_count.load(Ordering::Relaxed),
        )
    }
}
