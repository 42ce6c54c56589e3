use thiserror::Error;

/// Errors from canonical encoding or signing.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("failed to canonicalize value for signing: {0}")]
    Encoding(String),
}
