//! # Conditions
//!
//! Named predicates over request metadata that a policy requires to hold.
//!
//! A policy carries [`ConditionSpec`]s (`{"name", "type", "options"}`). The
//! [`ConditionRegistry`] turns each spec into a [`Condition`] by its type
//! name, and the resulting [`Conditions`] set meets a request when every
//! condition meets the metadata value stored under its name.
//!
//! ## Built-in types
//!
//! | Type | Options | Meets when |
//! |------|---------|------------|
//! | `bool` | `value: bool` | metadata is the same boolean |
//! | `subject_equals`, `role_equals` | none | metadata names the subject or one of its roles |
//! | `ip_allow` (opt-in) | `networks: [cidr]` | metadata address is inside a network |
//! | `ip_deny` (opt-in) | `networks: [cidr]` | metadata address is outside every network |
//!
//! ## Custom conditions
//!
//! ```rust
//! use policy_gate::condition::{Condition, ConditionRegistry, ConditionSpec, Conditions};
//! use policy_gate::{Request, Subject};
//! use serde::Deserialize;
//! use serde_json::Value;
//!
//! #[derive(Debug, Default, Deserialize)]
//! struct MinLevel {
//!     level: u64,
//! }
//!
//! impl Condition for MinLevel {
//!     fn name(&self) -> &'static str {
//!         "min_level"
//!     }
//!
//!     fn meets(&self, value: Option<&Value>, _request: &Request) -> bool {
//!         value.and_then(Value::as_u64).map_or(false, |v| v >= self.level)
//!     }
//! }
//!
//! let mut registry = ConditionRegistry::default();
//! registry.register_typed::<MinLevel>("min_level");
//!
//! let specs = vec![ConditionSpec::new("clearance", "min_level").with_option("level", 3)];
//! let conditions = Conditions::from_specs(&specs, &registry).unwrap();
//!
//! let request = Request::new("vault", "open", Subject::new("bob")).with_metadata("clearance", 4);
//! assert!(conditions.meets(&request));
//! ```

pub mod builtin;
pub mod network;
pub mod registry;
pub mod types;

pub use builtin::{BoolCondition, SubjectEqualsCondition};
pub use network::{IpAllowCondition, IpDenyCondition, IpNetwork};
pub use registry::{ConditionBuilder, ConditionMode, ConditionRegistry};
pub use types::{Condition, ConditionSpec, Conditions};

#[cfg(test)]
mod tests;
