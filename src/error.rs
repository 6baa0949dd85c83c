//! Error types for the policy enforcement engine

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, AuthzError>;

/// Errors raised while building, storing, or evaluating policies.
///
/// Access decisions are not errors: a denied request is reported through
/// [`Decision`](crate::enforcer::Decision). These variants cover everything
/// that prevents a decision from being reached at all.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// A sub-role would reference its parent or repeat a sibling id
    #[error("role '{parent}' cannot contain sub role '{child}'")]
    DuplicateRole { parent: String, child: String },

    /// Role id already registered in a store
    #[error("role {0} already registered")]
    DuplicateRoleId(String),

    /// Role not found
    #[error("role {0} does not exist")]
    RoleNotFound(String),

    /// Policy id already registered in a store
    #[error("policy {0} already registered")]
    DuplicatePolicy(String),

    /// Policy not found
    #[error("policy {0} does not exist")]
    PolicyNotFound(String),

    /// Start and stop delimiters do not balance
    #[error("unbalanced delimiter sequence in {pattern:?}")]
    UnbalancedDelimiter { pattern: String },

    /// Delimited pattern produced an invalid regular expression
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Condition spec names a type the registry does not know
    #[error("unknown condition type '{condition_type}' for condition '{name}', is it registered?")]
    UnknownConditionType { name: String, condition_type: String },

    /// Condition options do not fit the condition's schema
    #[error("invalid options for condition '{name}' of type '{condition_type}': {reason}")]
    InvalidConditionOptions {
        name: String,
        condition_type: String,
        reason: String,
    },

    /// Operation not offered by this store
    #[error("operation not supported: {0}")]
    Unsupported(String),

    /// JSON encoding or decoding failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backing file could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
