//! `StorageAdapter` trait abstraction and conformance suite for the Agent
//! Memory Governor.
//!
//! This crate defines the *contract* every backend must satisfy; backend
//! internals live in sibling `amg-storage-*` crates.

pub mod adapter;
pub mod error;
pub mod filters;
pub mod ranking;
pub mod testing;

pub use adapter::{QueryOutcome, StorageAdapter};
pub use error::StorageError;
pub use filters::QueryFilters;
pub use ranking::{cosine_similarity, rank_by_embedding, sort_deterministic};
