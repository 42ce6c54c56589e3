use std::collections::BTreeMap;

use amg_core::{AgentId, AuditRecord, Decision, MemoryId, Operation, RequestId};
use amg_crypto::AuditSigner;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuditError;

/// Builds an [`AuditRecord`], computing its signature during `build()` so
/// the returned record is genuinely immutable from the moment it exists —
/// no post-construction mutation of a "frozen" record.
pub struct AuditRecordBuilder {
    agent_id: AgentId,
    operation: Operation,
    decision: Decision,
    reason: String,
    actor_id: String,
    request_id: Option<RequestId>,
    memory_id: Option<MemoryId>,
    policy_version: String,
    metadata: BTreeMap<String, serde_json::Value>,
}

impl AuditRecordBuilder {
    #[must_use]
    pub fn new(
        agent_id: impl Into<AgentId>,
        operation: Operation,
        decision: Decision,
        reason: impl Into<String>,
        actor_id: impl Into<String>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            operation,
            decision,
            reason: reason.into(),
            actor_id: actor_id.into(),
            request_id: None,
            memory_id: None,
            policy_version: "1.0.0".to_owned(),
            metadata: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<RequestId>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    #[must_use]
    pub fn with_memory_id(mut self, memory_id: impl Into<MemoryId>) -> Self {
        self.memory_id = Some(memory_id.into());
        self
    }

    #[must_use]
    pub fn with_policy_version(mut self, policy_version: impl Into<String>) -> Self {
        self.policy_version = policy_version.into();
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Finalize the record: generate `audit_id`/`timestamp`, compute the
    /// signature over the canonical JSON of the core fields, and return the
    /// immutable record.
    ///
    /// # Errors
    /// Returns [`AuditError::Signing`] if the signature cannot be computed.
    pub fn build(self) -> Result<AuditRecord, AuditError> {
        let audit_id = Uuid::new_v4().to_string();
        let timestamp = Utc::now();

        let payload = SignaturePayload {
            audit_id: &audit_id,
            timestamp: amg_crypto::format_timestamp(timestamp),
            agent_id: self.agent_id.as_str(),
            operation: self.operation,
            memory_id: self.memory_id.as_ref().map(MemoryId::as_str),
            decision: self.decision,
            reason: &self.reason,
        };
        let signature = AuditSigner::new().sign(&payload)?;

        Ok(AuditRecord {
            audit_id: audit_id.into(),
            timestamp,
            agent_id: self.agent_id,
            request_id: self.request_id,
            operation: self.operation,
            memory_id: self.memory_id,
            policy_version: self.policy_version,
            decision: self.decision,
            reason: self.reason,
            actor_id: self.actor_id,
            metadata: self.metadata,
            signature,
        })
    }
}

#[derive(Serialize)]
struct SignaturePayload<'a> {
    audit_id: &'a str,
    timestamp: String,
    agent_id: &'a str,
    operation: Operation,
    memory_id: Option<&'a str>,
    decision: Decision,
    reason: &'a str,
}

/// Filters for [`crate::store::AuditStore::query`].
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AuditQuery {
    pub agent_id: Option<String>,
    pub operation: Option<Operation>,
    /// Sparsely populated; prefer `audit_id` for correlation (DESIGN.md).
    pub request_id: Option<String>,
    pub start: Option<chrono::DateTime<Utc>>,
    pub end: Option<chrono::DateTime<Utc>>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl AuditQuery {
    /// Effective limit, clamped to `1..=1000`, defaulting to 100 per
    /// `kill_switch.py`'s `get_audit_log`.
    #[must_use]
    pub fn effective_limit(&self) -> u32 {
        self.limit.unwrap_or(100).clamp(1, 1000)
    }

    #[must_use]
    pub fn effective_offset(&self) -> u32 {
        self.offset.unwrap_or(0)
    }
}

/// A page of audit records in descending-timestamp order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AuditPage {
    pub records: Vec<AuditRecord>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_computes_signature() {
        let record = AuditRecordBuilder::new(
            "agent-1",
            Operation::Write,
            Decision::Allowed,
            "all_policy_checks_passed",
            "agent-1",
        )
        .build()
        .unwrap();
        assert_eq!(record.signature.len(), 64);
        assert_eq!(record.agent_id.as_str(), "agent-1");
    }

    #[test]
    fn same_inputs_produce_different_signatures_due_to_fresh_id_and_timestamp() {
        let a = AuditRecordBuilder::new("agent-1", Operation::Read, Decision::Denied, "x", "y")
            .build()
            .unwrap();
        let b = AuditRecordBuilder::new("agent-1", Operation::Read, Decision::Denied, "x", "y")
            .build()
            .unwrap();
        assert_ne!(a.audit_id, b.audit_id);
        assert_ne!(a.signature, b.signature);
    }

    #[test]
    fn query_defaults() {
        let query = AuditQuery::default();
        assert_eq!(query.effective_limit(), 100);
        assert_eq!(query.effective_offset(), 0);
    }
}
