//! Governed context retrieval pipeline: the read-only path agent callers use
//! to pull memories into a prompt, subject to kill-switch and adapter-level
//! governance.

pub mod builder;
pub mod error;
pub mod request;

pub use builder::GovernedContextBuilder;
pub use error::ContextError;
pub use request::{whitespace_token_count, ContextRequest, GovernedContext};
