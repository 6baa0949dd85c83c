//! # Pattern Matching
//!
//! Matches policy definitions (resources, actions, scopes, role ids) against
//! request strings.
//!
//! ## Strategies
//!
//! - [`SimpleMatcher`]: glob-style wildcards (`*` and `?`)
//! - [`RegexMatcher`]: delimited regular expressions such as
//!   `files.<[a-z]+>.read`, falling back to wildcards when a definition has
//!   no delimiters
//!
//! Both implement [`Matcher`]; [`MatcherKind`] selects one by name so the
//! enforcer can be configured from data.
//!
//! ## Example
//!
//! ```rust
//! use policy_gate::pattern::{Matcher, MatcherConfig, MatcherKind};
//!
//! let matcher = MatcherKind::Regex.build(&MatcherConfig::default());
//! let actions = vec!["read".to_string(), "list*".to_string()];
//!
//! assert!(matcher.match_policy(Some(&actions), "list_all").unwrap());
//! assert!(matcher.match_policy(None, "anything").unwrap());
//! ```

pub mod cache;
pub mod delimited;
pub mod matcher;
pub mod wildcard;

pub use cache::{CacheStats, PatternCache};
pub use delimited::{
    compile_delimited_regex, extract_delimited, has_delimiters, DEFAULT_START_DELIMITER,
    DEFAULT_STOP_DELIMITER,
};
pub use matcher::{Matcher, MatcherConfig, MatcherKind, RegexMatcher, SimpleMatcher};
pub use wildcard::{match_simple_wildcard, match_wildcard, match_wildcard_mode, WildcardMode};
