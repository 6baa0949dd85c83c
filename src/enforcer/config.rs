use serde::{Deserialize, Serialize};

use crate::pattern::{MatcherConfig, MatcherKind};
use crate::policy::PolicyEffect;

/// Configuration for the enforcer
///
/// # Examples
///
/// ```rust
/// use policy_gate::enforcer::EnforcerConfig;
/// use policy_gate::pattern::MatcherKind;
/// use policy_gate::PolicyEffect;
///
/// let config: EnforcerConfig = serde_json::from_str(r#"{"matcher":"simple"}"#).unwrap();
/// assert_eq!(config.matcher, MatcherKind::Simple);
/// assert_eq!(config.default_effect, PolicyEffect::Deny);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnforcerConfig {
    /// Effect applied when no policy allowed the request
    pub default_effect: PolicyEffect,

    /// Matching strategy used by [`Enforcer::from_config`](super::Enforcer::from_config)
    pub matcher: MatcherKind,

    pub matcher_config: MatcherConfig,
}

impl Default for EnforcerConfig {
    fn default() -> Self {
        Self {
            default_effect: PolicyEffect::Deny,
            matcher: MatcherKind::Regex,
            matcher_config: MatcherConfig::default(),
        }
    }
}
