use amg_core::AuditRecord;
use async_trait::async_trait;

use crate::error::AuditError;
use crate::record::{AuditPage, AuditQuery};

/// Durable storage for audit records. Implementations must be `Send + Sync`
/// to be shared across async tasks, and must never mutate a record after
/// `write_audit_record` returns (append-only).
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Persist an audit record produced outside the storage layer — the
    /// kill-switch's injection point.
    async fn write_audit_record(&self, record: AuditRecord) -> Result<(), AuditError>;

    /// Retrieve a single record by its `audit_id`.
    async fn get_by_id(&self, audit_id: &str) -> Result<Option<AuditRecord>, AuditError>;

    /// Query records with filters, returned in descending-timestamp order.
    async fn query(&self, query: &AuditQuery) -> Result<AuditPage, AuditError>;

    /// Check whether the backing store is reachable.
    async fn health_check(&self) -> Result<bool, AuditError>;
}
