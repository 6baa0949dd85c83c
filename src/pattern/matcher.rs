//! Matching strategies used by the enforcer
//!
//! [`SimpleMatcher`] understands wildcards only. [`RegexMatcher`] adds
//! delimited regular expressions and caches compiled policy definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

use super::cache::{CacheStats, PatternCache};
use super::delimited::{
    compile_delimited_regex, has_delimiters, DEFAULT_START_DELIMITER, DEFAULT_STOP_DELIMITER,
};
use super::wildcard::{match_wildcard_mode, WildcardMode};
use crate::error::Result;
use crate::role::Role;

/// Strategy deciding whether policy definitions match request strings.
///
/// Implementations must be safe to call from many threads at once.
pub trait Matcher: Send + Sync + fmt::Debug {
    /// Whether any definition matches `value`.
    ///
    /// `None` means the policy places no constraint on this field and
    /// matches every value. An empty list matches nothing.
    fn match_policy(&self, definitions: Option<&[String]>, value: &str) -> Result<bool>;

    /// Whether `value`, used as a pattern, matches the id of `role` or of
    /// any role reachable from it
    fn match_role(&self, role: &Role, value: &str) -> Result<bool>;
}

/// Names of the built-in matching strategies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatcherKind {
    /// Wildcards only
    Simple,
    /// Delimited regular expressions with wildcard fallback
    #[default]
    Regex,
}

impl MatcherKind {
    /// Builds the named strategy from `config`
    pub fn build(self, config: &MatcherConfig) -> Arc<dyn Matcher> {
        match self {
            MatcherKind::Simple => Arc::new(SimpleMatcher::with_mode(config.wildcard_mode)),
            MatcherKind::Regex => Arc::new(RegexMatcher::with_config(config.clone())),
        }
    }
}

/// Configuration for the built-in matchers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Opens a regex fragment
    pub start_delimiter: char,
    /// Closes a regex fragment
    pub stop_delimiter: char,
    /// `?` semantics for wildcard matching
    pub wildcard_mode: WildcardMode,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            start_delimiter: DEFAULT_START_DELIMITER,
            stop_delimiter: DEFAULT_STOP_DELIMITER,
            wildcard_mode: WildcardMode::Strict,
        }
    }
}

/// Wildcard-only matching
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleMatcher {
    mode: WildcardMode,
}

impl SimpleMatcher {
    /// Creates a matcher with strict `?` semantics
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: WildcardMode) -> Self {
        Self { mode }
    }
}

impl Matcher for SimpleMatcher {
    fn match_policy(&self, definitions: Option<&[String]>, value: &str) -> Result<bool> {
        let Some(definitions) = definitions else {
            return Ok(true);
        };
        Ok(definitions
            .iter()
            .any(|definition| match_wildcard_mode(definition, value, self.mode)))
    }

    fn match_role(&self, role: &Role, value: &str) -> Result<bool> {
        Ok(role
            .effective_role_ids()
            .iter()
            .any(|id| match_wildcard_mode(value, id, self.mode)))
    }
}

/// Delimited regular expression matching.
///
/// Policy definitions containing a delimiter are compiled once and cached;
/// definitions without one fall back to wildcard matching. Clones share the
/// same cache. Role matching compiles request values per call.
///
/// # Examples
///
/// ```rust
/// use policy_gate::pattern::{Matcher, RegexMatcher};
///
/// let matcher = RegexMatcher::new();
/// let definitions = vec!["files.<[a-z]+>.read".to_string()];
///
/// assert!(matcher.match_policy(Some(&definitions), "files.report.read").unwrap());
/// assert!(!matcher.match_policy(Some(&definitions), "files.42.read").unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RegexMatcher {
    config: MatcherConfig,
    cache: Arc<PatternCache>,
}

impl RegexMatcher {
    /// Creates a matcher using `<` and `>` as delimiters
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MatcherConfig) -> Self {
        Self {
            config,
            cache: Arc::new(PatternCache::new()),
        }
    }

    /// Uses a cache shared with other matchers
    pub fn with_cache(mut self, cache: Arc<PatternCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn matches(&self, definition: &str, value: &str) -> Result<bool> {
        let MatcherConfig {
            start_delimiter,
            stop_delimiter,
            wildcard_mode,
        } = self.config;

        if !has_delimiters(definition, start_delimiter, stop_delimiter) {
            return Ok(match_wildcard_mode(definition, value, wildcard_mode));
        }

        let regex = self.cache.get_or_compile(definition, |raw| {
            trace!(definition = raw, "compiling delimited pattern");
            compile_delimited_regex(raw, start_delimiter, stop_delimiter)
        })?;
        Ok(regex.is_match(value))
    }
}

impl Matcher for RegexMatcher {
    fn match_policy(&self, definitions: Option<&[String]>, value: &str) -> Result<bool> {
        let Some(definitions) = definitions else {
            return Ok(true);
        };
        for definition in definitions {
            if self.matches(definition, value)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// `value` comes from the request, so a delimited value is compiled
    /// for this call only and never enters the definition cache. A value
    /// with unbalanced delimiters is an error.
    fn match_role(&self, role: &Role, value: &str) -> Result<bool> {
        let MatcherConfig {
            start_delimiter,
            stop_delimiter,
            wildcard_mode,
        } = self.config;

        let ids = role.effective_role_ids();
        if !has_delimiters(value, start_delimiter, stop_delimiter) {
            return Ok(ids
                .iter()
                .any(|id| match_wildcard_mode(value, id, wildcard_mode)));
        }

        let regex = compile_delimited_regex(value, start_delimiter, stop_delimiter)?;
        Ok(ids.iter().any(|id| regex.is_match(id)))
    }
}
