use thiserror::Error;

/// Errors raised by a [`crate::adapter::StorageAdapter`].
///
/// These are structural/backend faults, never policy decisions: a denied
/// read or write is represented as an [`amg_core::AuditRecord`] with
/// `decision=denied`, not as an `Err` here.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("memory {0} not found")]
    NotFound(String),

    #[error("audit error: {0}")]
    Audit(#[from] amg_audit::AuditError),

    #[error("invariant violation: {0}")]
    PolicyEnforcement(#[from] amg_core::AmgError),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("operation exceeded its deadline")]
    DeadlineExceeded,
}
