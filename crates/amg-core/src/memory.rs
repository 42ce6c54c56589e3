use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AmgError;
use crate::types::{AgentId, MemoryId, MemoryType, Scope, Sensitivity};

/// Governance contract bound to a memory item. Created with the memory and
/// never mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MemoryPolicy {
    pub memory_type: MemoryType,
    pub sensitivity: Sensitivity,
    pub scope: Scope,
    /// Retention duration in seconds. Always positive; the *ceiling* for a
    /// given `(sensitivity, scope)` pair is enforced by the policy engine,
    /// not here.
    pub ttl_seconds: i64,
    pub allow_read: bool,
    pub allow_write: bool,
    /// Source event or request that produced this memory, if known.
    pub provenance: Option<String>,
}

impl MemoryPolicy {
    /// Construct a policy, rejecting a non-positive `ttl_seconds`. `allow_read`
    /// and `allow_write` default to `true`; use the `with_*` setters to
    /// restrict them.
    pub fn new(
        memory_type: MemoryType,
        sensitivity: Sensitivity,
        scope: Scope,
        ttl_seconds: i64,
    ) -> Result<Self, AmgError> {
        if ttl_seconds <= 0 {
            return Err(AmgError::InvalidTtl(ttl_seconds));
        }
        Ok(Self {
            memory_type,
            sensitivity,
            scope,
            ttl_seconds,
            allow_read: true,
            allow_write: true,
            provenance: None,
        })
    }

    #[must_use]
    pub fn with_allow_read(mut self, allow_read: bool) -> Self {
        self.allow_read = allow_read;
        self
    }

    #[must_use]
    pub fn with_allow_write(mut self, allow_write: bool) -> Self {
        self.allow_write = allow_write;
        self
    }

    #[must_use]
    pub fn with_provenance(mut self, provenance: impl Into<String>) -> Self {
        self.provenance = Some(provenance.into());
        self
    }
}

/// A single stored, governed memory item. Created at write time; never
/// mutated. Removed only via explicit delete or expiry-triggered purge — no
/// tombstones are visible through the public contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Memory {
    pub memory_id: MemoryId,
    pub agent_id: AgentId,
    pub content: String,
    /// Optional embedding used for cosine-similarity ranking in queries.
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
    pub policy: MemoryPolicy,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Actor that created this memory (usually equal to `agent_id`).
    pub created_by: AgentId,
}

impl Memory {
    /// Construct a memory with a freshly generated `memory_id`, rejecting an
    /// empty `agent_id`. `expires_at` is derived from `created_at +
    /// policy.ttl_seconds`.
    pub fn new(
        agent_id: impl Into<AgentId>,
        content: impl Into<String>,
        embedding: Option<Vec<f32>>,
        policy: MemoryPolicy,
        created_by: impl Into<AgentId>,
    ) -> Result<Self, AmgError> {
        let agent_id = agent_id.into();
        if agent_id.is_empty() {
            return Err(AmgError::EmptyAgentId);
        }
        let created_at = Utc::now();
        let expires_at = created_at + Duration::seconds(policy.ttl_seconds);
        Ok(Self {
            memory_id: MemoryId::new(Uuid::new_v4().to_string()),
            agent_id,
            content: content.into(),
            embedding,
            policy,
            created_at,
            expires_at,
            created_by: created_by.into(),
        })
    }

    /// Whether this memory has expired as of `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> MemoryPolicy {
        MemoryPolicy::new(MemoryType::LongTerm, Sensitivity::NonPii, Scope::Agent, 3600).unwrap()
    }

    #[test]
    fn policy_rejects_nonpositive_ttl() {
        let err = MemoryPolicy::new(MemoryType::LongTerm, Sensitivity::Pii, Scope::Agent, 0)
            .unwrap_err();
        assert!(matches!(err, AmgError::InvalidTtl(0)));
    }

    #[test]
    fn memory_rejects_empty_agent_id() {
        let err = Memory::new("", "hello", None, policy(), "agent-1").unwrap_err();
        assert!(matches!(err, AmgError::EmptyAgentId));
    }

    #[test]
    fn memory_computes_expires_at() {
        let mem = Memory::new("agent-1", "hello", None, policy(), "agent-1").unwrap();
        assert_eq!(mem.expires_at, mem.created_at + Duration::seconds(3600));
        assert!(!mem.is_expired(mem.created_at));
        assert!(mem.is_expired(mem.expires_at));
    }
}
