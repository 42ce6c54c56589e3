use thiserror::Error;

/// Errors from audit record construction and storage.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("failed to sign audit record: {0}")]
    Signing(#[from] amg_crypto::CryptoError),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("audit record {0} not found")]
    NotFound(String),
}
