//! # Enforcement
//!
//! The [`Enforcer`] evaluates a [`Request`] against the candidate policies of
//! a [`PolicyManager`] and returns a [`Decision`].
//!
//! ## Pipeline
//!
//! For each candidate, in the manager's order, these checks run in sequence
//! and the first failure moves on to the next policy:
//!
//! 1. action
//! 2. role: some policy role matches the subject id or one of its role ids
//! 3. resource
//! 4. scope
//! 5. conditions
//!
//! A matching deny policy ends evaluation with an explicit denial. Otherwise
//! the request is allowed if any allow policy matched, and falls back to the
//! configured default effect if none did.
//!
//! ## Example
//!
//! ```rust
//! use policy_gate::manager::{MemoryPolicyManager, PolicyManager};
//! use policy_gate::policy::PolicyOptions;
//! use policy_gate::role::Role;
//! use policy_gate::{Enforcer, EnforcerConfig, Request, Subject};
//! use std::sync::Arc;
//!
//! let manager = Arc::new(MemoryPolicyManager::new());
//! manager
//!     .create(
//!         PolicyOptions::new()
//!             .with_name("readers")
//!             .with_role(Role::new("reader").into_ref())
//!             .set_actions(["read"])
//!             .allow()
//!             .build()
//!             .unwrap(),
//!     )
//!     .unwrap();
//!
//! let enforcer = Enforcer::from_config(manager, EnforcerConfig::default());
//! let subject = Subject::new("alice").with_role(Role::new("reader").into_ref());
//!
//! assert!(enforcer.enforce(&Request::new("doc", "read", subject.clone())).unwrap().is_allowed());
//! assert!(!enforcer.enforce(&Request::new("doc", "write", subject)).unwrap().is_allowed());
//! ```

pub mod config;
pub mod decision;

pub use config::EnforcerConfig;
pub use decision::{Decision, Denial, FORBIDDEN_STATUS_CODE};

use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use crate::audit::Auditor;
use crate::error::Result;
use crate::manager::PolicyManager;
use crate::pattern::Matcher;
use crate::policy::{Policy, PolicyEffect};
use crate::request::Request;

/// Evaluates requests against stored policies.
///
/// Holds no per-request state; one instance can serve concurrent calls.
#[derive(Clone)]
pub struct Enforcer {
    manager: Arc<dyn PolicyManager>,
    matcher: Arc<dyn Matcher>,
    auditor: Option<Arc<dyn Auditor>>,
    config: EnforcerConfig,
}

impl Enforcer {
    /// Creates an enforcer with the default configuration and no auditor
    pub fn new(manager: Arc<dyn PolicyManager>, matcher: Arc<dyn Matcher>) -> Self {
        Self {
            manager,
            matcher,
            auditor: None,
            config: EnforcerConfig::default(),
        }
    }

    /// Creates an enforcer using the matcher named in `config`
    pub fn from_config(manager: Arc<dyn PolicyManager>, config: EnforcerConfig) -> Self {
        let matcher = config.matcher.build(&config.matcher_config);
        Self {
            manager,
            matcher,
            auditor: None,
            config,
        }
    }

    pub fn with_auditor(mut self, auditor: Arc<dyn Auditor>) -> Self {
        self.auditor = Some(auditor);
        self
    }

    /// Replaces the configuration. The matcher passed at construction is kept.
    pub fn with_config(mut self, config: EnforcerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EnforcerConfig {
        &self.config
    }

    pub fn manager(&self) -> &Arc<dyn PolicyManager> {
        &self.manager
    }

    /// Decides whether `request` is allowed.
    ///
    /// # Errors
    ///
    /// Manager and matcher failures abort evaluation and are returned as is;
    /// denials are reported through [`Decision::Denied`], not as errors.
    pub fn enforce(&self, request: &Request) -> Result<Decision> {
        if let Some(auditor) = &self.auditor {
            auditor.log_request(request);
        }

        let candidates = self.manager.find_by_request(request)?;
        debug!(
            request_id = %request.id,
            candidates = candidates.len(),
            "evaluating request"
        );

        let identities = request.subject.identities();
        let mut allowed = Vec::new();

        for policy in &candidates {
            if !self.policy_matches(policy, request, &identities)? {
                continue;
            }

            if policy.effect() == PolicyEffect::Deny {
                info!(
                    request_id = %request.id,
                    policy = policy.id(),
                    "request denied by policy"
                );
                return Ok(self.finish(
                    request,
                    Decision::Denied(Denial::Explicit {
                        policy_id: policy.id().to_string(),
                        request_id: request.id.clone(),
                    }),
                ));
            }

            allowed.push(policy.id().to_string());
        }

        let decision = if !allowed.is_empty() || self.config.default_effect.is_allow() {
            Decision::Allowed { policies: allowed }
        } else {
            Decision::Denied(Denial::Implicit {
                request_id: request.id.clone(),
            })
        };

        info!(
            request_id = %request.id,
            effect = %decision.effect(),
            "request evaluated"
        );
        Ok(self.finish(request, decision))
    }

    fn finish(&self, request: &Request, decision: Decision) -> Decision {
        if let Some(auditor) = &self.auditor {
            auditor.log_policy_effect(request, decision.effect());
        }
        decision
    }

    fn policy_matches(&self, policy: &Policy, request: &Request, identities: &[&str]) -> Result<bool> {
        let id = policy.id();

        if !self.matcher.match_policy(policy.actions(), &request.action)? {
            debug!(policy = id, stage = "action", "policy skipped");
            return Ok(false);
        }

        if !self.roles_match(policy, identities)? {
            debug!(policy = id, stage = "role", "policy skipped");
            return Ok(false);
        }

        if !self.matcher.match_policy(policy.resources(), &request.resource)? {
            debug!(policy = id, stage = "resource", "policy skipped");
            return Ok(false);
        }

        if !self.matcher.match_policy(policy.scopes(), &request.scope)? {
            debug!(policy = id, stage = "scope", "policy skipped");
            return Ok(false);
        }

        if !policy.conditions().meets(request) {
            debug!(policy = id, stage = "conditions", "policy skipped");
            return Ok(false);
        }

        debug!(policy = id, effect = %policy.effect(), "policy matched");
        Ok(true)
    }

    /// A policy without roles matches no subject
    fn roles_match(&self, policy: &Policy, identities: &[&str]) -> Result<bool> {
        for role in policy.roles() {
            for identity in identities {
                if self.matcher.match_role(role, identity)? {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

impl fmt::Debug for Enforcer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Enforcer")
            .field("matcher", &self.matcher)
            .field("auditor", &self.auditor.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
