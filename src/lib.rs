//! # Policy Gate
//!
//! Access-control decision engine with support for:
//! - Role hierarchies, including cyclic ones
//! - Wildcard and delimited-regex matching of resources, actions and scopes
//! - Pluggable conditions over request metadata
//! - Deny-overrides evaluation with a fail-closed default
//! - In-memory, file-backed and caching policy stores
//! - Console and `tracing` audit sinks
//!
//! ## Example
//!
//! ```rust
//! use policy_gate::condition::ConditionSpec;
//! use policy_gate::manager::{MemoryPolicyManager, PolicyManager};
//! use policy_gate::pattern::RegexMatcher;
//! use policy_gate::policy::PolicyOptions;
//! use policy_gate::role::Role;
//! use policy_gate::{Decision, Enforcer, Request, Subject};
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let editor = Role::new("editor").into_ref();
//!
//! let manager = Arc::new(MemoryPolicyManager::new());
//! manager.create(
//!     PolicyOptions::new()
//!         .with_name("editors_write")
//!         .with_role(editor.clone())
//!         .set_resources(["docs.<[a-z]+>"])
//!         .set_actions(["write"])
//!         .with_condition(ConditionSpec::new("mfa", "bool").with_option("value", true))
//!         .allow()
//!         .build()?,
//! )?;
//!
//! let enforcer = Enforcer::new(manager, Arc::new(RegexMatcher::new()));
//!
//! let request = Request::new("docs.report", "write", Subject::new("alice").with_role(editor))
//!     .with_metadata("mfa", true);
//!
//! match enforcer.enforce(&request)? {
//!     Decision::Allowed { policies } => assert_eq!(policies, vec!["editors_write"]),
//!     Decision::Denied(denial) => return Err(denial.into()),
//! }
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod audit;
pub mod condition;
pub mod enforcer;
pub mod error;
pub mod manager;
pub mod pattern;
pub mod policy;
pub mod request;
pub mod role;
pub mod subject;

pub use audit::{AuditLevel, Auditor, ConsoleAuditor, TracingAuditor};
pub use enforcer::{Decision, Denial, Enforcer, EnforcerConfig};
pub use error::{AuthzError, Result};
pub use pattern::CacheStats;
pub use policy::{Policy, PolicyEffect, PolicyOptions};
pub use request::{Request, RequestMetadata};
pub use role::{Role, RoleRef};
pub use subject::Subject;
