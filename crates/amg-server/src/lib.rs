//! Standalone HTTP server exposing the Agent Memory Governor over a thin
//! REST mapping: write/query/context handlers delegate straight to the
//! `amg-context`/`amg-storage`/`amg-killswitch`/`amg-policy` crates, which
//! hold all of the governance logic.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod state;

pub use config::ServerConfig;
pub use error::ServerError;
pub use state::AppState;
