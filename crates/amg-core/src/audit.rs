use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AgentId, AuditId, Decision, MemoryId, Operation, RequestId};

/// Immutable evidence of a single governance decision. Append-only: once
/// constructed (by [`amg_audit`]'s builder, which computes `signature`) a
/// record is never mutated again.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AuditRecord {
    pub audit_id: AuditId,
    pub timestamp: DateTime<Utc>,
    pub agent_id: AgentId,
    pub request_id: Option<RequestId>,
    pub operation: Operation,
    pub memory_id: Option<MemoryId>,
    pub policy_version: String,
    pub decision: Decision,
    /// Machine-readable reason code, e.g. `scope_isolation_violation`.
    pub reason: String,
    /// Who triggered the operation: the caller's `agent_id`, or an admin
    /// identity for kill-switch transitions.
    pub actor_id: String,
    /// Closed per-operation diagnostic keys. Never load-bearing for a
    /// governance decision.
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
    /// `SHA-256(canonical_json(core_fields))`, computed once at construction.
    pub signature: String,
}

/// The subset of [`AuditRecord`] fields covered by the signature:
/// `{audit_id, timestamp, agent_id, operation, memory_id, decision, reason}`.
#[derive(Debug, Clone, Serialize)]
pub struct SignedFields<'a> {
    pub audit_id: &'a str,
    pub timestamp: DateTime<Utc>,
    pub agent_id: &'a str,
    pub operation: Operation,
    pub memory_id: Option<&'a str>,
    pub decision: Decision,
    pub reason: &'a str,
}

impl AuditRecord {
    /// The fields a signer must hash to (re)produce `signature`.
    #[must_use]
    pub fn signed_fields(&self) -> SignedFields<'_> {
        SignedFields {
            audit_id: self.audit_id.as_str(),
            timestamp: self.timestamp,
            agent_id: self.agent_id.as_str(),
            operation: self.operation,
            memory_id: self.memory_id.as_ref().map(MemoryId::as_str),
            decision: self.decision,
            reason: &self.reason,
        }
    }
}
