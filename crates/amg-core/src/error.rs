use thiserror::Error;

/// Construction-time validation failures for the type model.
///
/// These are invariant violations, not policy decisions: a non-positive
/// TTL or an empty `agent_id` can never be a valid memory regardless of which
/// policy configuration is active, so they fail before a `Memory` or
/// `MemoryPolicy` value ever exists.
#[derive(Debug, Error)]
pub enum AmgError {
    #[error("ttl_seconds must be greater than zero, got {0}")]
    InvalidTtl(i64),

    #[error("agent_id must not be empty")]
    EmptyAgentId,

    #[error("{0}")]
    Validation(String),
}
