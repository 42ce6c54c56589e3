use amg_audit::{AuditPage, AuditQuery};
use amg_core::{AgentId, AuditRecord, Memory, MemoryId, RequestId};
use async_trait::async_trait;

use crate::error::StorageError;
use crate::filters::QueryFilters;

/// Result of [`StorageAdapter::query`]: the already-guarded memories plus the
/// single audit record covering the query, and the diagnostic counters the
/// context builder surfaces in `GovernedContext` metadata.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub memories: Vec<Memory>,
    pub audit_record: AuditRecord,
    /// Count of rows considered before any guard predicate was applied.
    pub total_examined: u64,
    /// Count of rows removed by the retrieval guard (expiry, scope,
    /// sensitivity, `allow_read`).
    pub filtered_count: u64,
}

/// The abstract interface every backend (in-memory, relational, vector,
/// graph) must satisfy. Only this capability set is specified; a
/// backend's internals are not.
///
/// Every method here is the enforcement *floor*: implementations must apply
/// scope isolation, TTL expiry, and `allow_read` in-process before returning
/// a memory, even when the underlying store could return more. Pushing these
/// predicates down into the backend's query language (SQL `WHERE`, vector
/// payload filters) is allowed as an optimization, never as a substitute,
/// because the backend's query language is advisory, not trusted.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Persist `memory` and emit an `operation=write, decision=allowed`
    /// audit record in the same logical step.
    ///
    /// # Errors
    /// Returns [`StorageError::PolicyEnforcement`] if `agent_id` is empty or
    /// `ttl_seconds <= 0` — invariants, not policy choices, so they are
    /// rejected here rather than audited as a denial.
    async fn write(
        &self,
        memory: Memory,
        request_id: Option<RequestId>,
    ) -> Result<(Memory, AuditRecord), StorageError>;

    /// Look up `memory_id` on behalf of `caller_agent_id`, applying the
    /// retrieval guard. Returns `(None, denied-record)` when the memory does
    /// not exist, has expired, violates scope isolation, or has
    /// `allow_read=false`; otherwise `(Some(memory), allowed-record)`.
    async fn read(
        &self,
        memory_id: &MemoryId,
        caller_agent_id: &AgentId,
        request_id: Option<RequestId>,
    ) -> Result<(Option<Memory>, AuditRecord), StorageError>;

    /// Hard-delete a memory: physical removal, no tombstone visible through
    /// the public contract.
    ///
    /// # Errors
    /// Returns [`StorageError::NotFound`] if `memory_id` is already absent.
    async fn delete(
        &self,
        memory_id: &MemoryId,
        actor_id: &str,
        reason: &str,
    ) -> Result<AuditRecord, StorageError>;

    /// The retrieval guard: apply `filters`, TTL expiry, scope isolation and
    /// `allow_read` (in that order), then — if `filters.embedding` is set —
    /// rank survivors by cosine similarity descending, breaking ties by
    /// `created_at` descending then `memory_id` lexicographically.
    async fn query(
        &self,
        filters: &QueryFilters,
        caller_agent_id: &AgentId,
        request_id: Option<RequestId>,
    ) -> Result<QueryOutcome, StorageError>;

    /// Chronologically descending, append-only read of the audit log.
    async fn get_audit_log(&self, query: AuditQuery) -> Result<AuditPage, StorageError>;

    /// Injection point for audit records produced outside the storage
    /// layer — the kill-switch's transition evidence.
    async fn write_audit_record(&self, record: AuditRecord) -> Result<(), StorageError>;

    async fn health_check(&self) -> Result<bool, StorageError>;
}
