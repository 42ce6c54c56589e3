//! Postgres-backed [`amg_storage::StorageAdapter`], for deployments that need
//! durable memory storage instead of the in-memory reference adapter.

pub mod config;
pub mod migrations;
pub mod store;

pub use config::PostgresStorageConfig;
pub use store::PostgresStorageAdapter;
