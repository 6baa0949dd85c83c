//! Audit sinks for enforcement events
//!
//! The enforcer reports each request before evaluation and the resulting
//! effect afterwards. An [`AuditLevel`] decides which of those events a sink
//! records; each level includes everything below it.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};
use tracing::{info, warn};

use crate::policy::PolicyEffect;
use crate::request::Request;

const TAG_REQUEST: &str = "[AUDIT_REQ]:";
const TAG_ALLOW: &str = "[AUDIT_ALLOW]:";
const TAG_DENY: &str = "[AUDIT_DENY]:";

/// Which events an auditor records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditLevel {
    /// Nothing
    None,
    /// Deny effects
    #[default]
    Deny,
    /// Allow and deny effects
    Allow,
    /// Requests and all effects
    Request,
    /// Everything
    All,
}

impl AuditLevel {
    fn records_request(self) -> bool {
        self >= AuditLevel::Request
    }

    fn records_effect(self, effect: PolicyEffect) -> bool {
        match effect {
            PolicyEffect::Deny => self >= AuditLevel::Deny,
            PolicyEffect::Allow => self >= AuditLevel::Allow,
        }
    }
}

/// Receives enforcement events. Must never block or fail the decision path.
pub trait Auditor: Send + Sync {
    fn log_request(&self, request: &Request);

    fn log_policy_effect(&self, request: &Request, effect: PolicyEffect);
}

fn effect_tag(effect: PolicyEffect) -> &'static str {
    match effect {
        PolicyEffect::Allow => TAG_ALLOW,
        PolicyEffect::Deny => TAG_DENY,
    }
}

/// Writes one line per event:
/// `<TAG> action=<a> resource=<r> role=<subject> scope=<s>`.
///
/// # Examples
///
/// ```rust
/// use policy_gate::audit::{AuditLevel, Auditor, ConsoleAuditor};
/// use policy_gate::{PolicyEffect, Request, Subject};
///
/// let auditor = ConsoleAuditor::new(AuditLevel::All);
/// let request = Request::new("doc", "read", Subject::new("alice"));
/// auditor.log_policy_effect(&request, PolicyEffect::Allow);
/// // [AUDIT_ALLOW]: action=read resource=doc role=alice scope=
/// ```
pub struct ConsoleAuditor {
    level: AuditLevel,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleAuditor {
    /// Writes to standard output
    pub fn new(level: AuditLevel) -> Self {
        Self::with_writer(level, io::stdout())
    }

    pub fn with_writer(level: AuditLevel, writer: impl Write + Send + 'static) -> Self {
        Self {
            level,
            writer: Mutex::new(Box::new(writer)),
        }
    }

    pub fn level(&self) -> AuditLevel {
        self.level
    }

    fn write_line(&self, tag: &str, request: &Request) {
        let mut writer = self.writer.lock();
        let result = writeln!(
            writer,
            "{} action={} resource={} role={} scope={}",
            tag, request.action, request.resource, request.subject.id, request.scope
        )
        .and_then(|_| writer.flush());

        if let Err(e) = result {
            warn!(error = %e, request_id = %request.id, "failed to write audit line");
        }
    }
}

impl Auditor for ConsoleAuditor {
    fn log_request(&self, request: &Request) {
        if self.level.records_request() {
            self.write_line(TAG_REQUEST, request);
        }
    }

    fn log_policy_effect(&self, request: &Request, effect: PolicyEffect) {
        if self.level.records_effect(effect) {
            self.write_line(effect_tag(effect), request);
        }
    }
}

impl fmt::Debug for ConsoleAuditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleAuditor")
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}

/// Emits events as `tracing` events on the `audit` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditor {
    level: AuditLevel,
}

impl TracingAuditor {
    pub fn new(level: AuditLevel) -> Self {
        Self { level }
    }
}

impl Auditor for TracingAuditor {
    fn log_request(&self, request: &Request) {
        if self.level.records_request() {
            info!(
                target: "audit",
                tag = TAG_REQUEST,
                request_id = %request.id,
                action = %request.action,
                resource = %request.resource,
                role = %request.subject.id,
                scope = %request.scope,
                "request"
            );
        }
    }

    fn log_policy_effect(&self, request: &Request, effect: PolicyEffect) {
        if self.level.records_effect(effect) {
            info!(
                target: "audit",
                tag = effect_tag(effect),
                request_id = %request.id,
                action = %request.action,
                resource = %request.resource,
                role = %request.subject.id,
                scope = %request.scope,
                effect = %effect,
                "policy effect"
            );
        }
    }
}
