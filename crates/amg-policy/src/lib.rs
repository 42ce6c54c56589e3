//! Retention and access policy evaluation for the Agent Memory Governor.
//! Pure decision functions over a frozen configuration snapshot: no I/O, no
//! state beyond the snapshot itself.

pub mod config;
pub mod engine;

pub use config::PolicyConfig;
pub use engine::{PolicyDecision, PolicyEngine};
