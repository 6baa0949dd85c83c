//! # Policies
//!
//! A [`Policy`] names the roles, resources, actions and scopes it applies
//! to, the conditions request metadata must meet, and the
//! [`PolicyEffect`] it prescribes when all of those match.
//!
//! Pattern lists are optional: an absent list matches any value, while an
//! explicitly empty list matches none.
//!
//! ## JSON
//!
//! ```json
//! {
//!   "name": "test_policy",
//!   "description": "testing policy",
//!   "roles": [{"id": "test_role", "name": "", "description": "", "roles": null}],
//!   "resources": ["test_res"],
//!   "actions": ["test_action"],
//!   "scopes": null,
//!   "conditions": [{"name": "let-me-in", "type": "bool", "options": {"value": true}}],
//!   "effect": "allow"
//! }
//! ```
//!
//! Unknown or missing `effect` values read as `deny`.

pub mod options;
pub mod types;

pub use options::PolicyOptions;
pub use types::{Policy, PolicyEffect};
