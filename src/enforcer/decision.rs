use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::policy::PolicyEffect;

/// HTTP-style status attached to every denial
pub const FORBIDDEN_STATUS_CODE: u16 = 403;

const EXPLICIT_REASON: &str = "request denied because a policy explicitly forbids it";
const IMPLICIT_REASON: &str = "request denied because no matching policy was found";

/// Why a request was refused
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Denial {
    /// A matching policy has a deny effect
    #[error("access denied by policy {policy_id}")]
    Explicit { policy_id: String, request_id: String },

    /// No policy allowed the request and the default effect is deny
    #[error("access denied because no policy allowed access")]
    Implicit { request_id: String },
}

impl Denial {
    pub fn status_code(&self) -> u16 {
        FORBIDDEN_STATUS_CODE
    }

    pub fn status(&self) -> &'static str {
        "Forbidden"
    }

    /// Human-readable explanation of the decision
    pub fn reason(&self) -> &'static str {
        match self {
            Denial::Explicit { .. } => EXPLICIT_REASON,
            Denial::Implicit { .. } => IMPLICIT_REASON,
        }
    }

    pub fn request_id(&self) -> &str {
        match self {
            Denial::Explicit { request_id, .. } | Denial::Implicit { request_id } => request_id,
        }
    }

    /// The denying policy, for explicit denials
    pub fn policy_id(&self) -> Option<&str> {
        match self {
            Denial::Explicit { policy_id, .. } => Some(policy_id),
            Denial::Implicit { .. } => None,
        }
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self, Denial::Explicit { .. })
    }
}

/// Outcome of enforcing one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "lowercase")]
pub enum Decision {
    /// Ids of the allow policies that matched, in evaluation order. Empty
    /// when the request was allowed by the default effect alone.
    Allowed { policies: Vec<String> },

    Denied(Denial),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed { .. })
    }

    pub fn effect(&self) -> PolicyEffect {
        match self {
            Decision::Allowed { .. } => PolicyEffect::Allow,
            Decision::Denied(_) => PolicyEffect::Deny,
        }
    }

    pub fn denial(&self) -> Option<&Denial> {
        match self {
            Decision::Allowed { .. } => None,
            Decision::Denied(denial) => Some(denial),
        }
    }

    /// Converts a denial into an error for `?` propagation
    pub fn into_result(self) -> Result<(), Denial> {
        match self {
            Decision::Allowed { .. } => Ok(()),
            Decision::Denied(denial) => Err(denial),
        }
    }
}
