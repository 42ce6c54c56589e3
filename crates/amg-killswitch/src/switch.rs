use std::sync::Arc;

use amg_audit::{AuditPage, AuditQuery, AuditRecordBuilder, AuditStore};
use amg_core::{AgentId, AgentState, AgentStatus, AuditRecord, Decision, MemoryWriteCapability, Operation};
use chrono::Utc;
use dashmap::DashMap;

use crate::error::KillSwitchError;

/// Per-agent kill-switch state machine: `enabled -> {frozen,
/// disabled}`, `frozen -> disabled`, either -> `enabled`. Backed by a
/// `DashMap` so transitions are atomic per agent without a process-wide
/// lock; every entry point here is consulted before any I/O that could
/// reveal or mutate memory, per spec.
///
/// Audit records for kill-switch transitions are emitted by this component
/// and injected into the active [`AuditStore`] via `write_audit_record` —
/// the kill-switch holds its own state in process memory for latency (it
/// sits on every hot path) but its evidence belongs in the same log as
/// data-mutation evidence.
pub struct KillSwitch {
    statuses: DashMap<AgentId, AgentStatus>,
    audit: Arc<dyn AuditStore>,
}

impl KillSwitch {
    #[must_use]
    pub fn new(audit: Arc<dyn AuditStore>) -> Self {
        Self {
            statuses: DashMap::new(),
            audit,
        }
    }

    /// Current status for `agent_id`. Agents never observed by a transition
    /// default to `enabled` — `global_shutdown` is known-agents-only, not
    /// retroactive.
    #[must_use]
    pub fn get_status(&self, agent_id: &AgentId) -> AgentStatus {
        self.statuses
            .get(agent_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_else(|| AgentStatus::default_for(agent_id.clone()))
    }

    /// `check_allowed`: consult the agent's current state against the
    /// requested operation. Unknown agents behave as `enabled`. `Delete` is
    /// gated the same as `Write`, since hard-delete is a mutation (see
    /// DESIGN.md).
    #[must_use]
    pub fn check_allowed(&self, agent_id: &AgentId, operation: Operation) -> (bool, &'static str) {
        let state = self
            .statuses
            .get(agent_id)
            .map_or(AgentState::Enabled, |entry| entry.state);

        match state {
            AgentState::Enabled => (true, "all_policy_checks_passed"),
            AgentState::Frozen => match operation {
                Operation::Write | Operation::Delete => (false, "agent_frozen_write_denied"),
                _ => (true, "all_policy_checks_passed"),
            },
            AgentState::Disabled => (false, "agent_disabled"),
        }
    }

    /// Transition `agent_id` to `disabled`. Idempotent: calling this on an
    /// already-disabled agent still emits a fresh audit record.
    ///
    /// # Errors
    /// Returns [`KillSwitchError::Audit`] if the transition's audit record
    /// cannot be persisted.
    pub async fn disable(
        &self,
        agent_id: &AgentId,
        actor_id: &str,
        reason: &str,
    ) -> Result<AuditRecord, KillSwitchError> {
        self.transition(agent_id, AgentState::Disabled, actor_id, reason, Operation::Disable)
            .await
    }

    /// Transition `agent_id` to `frozen`: reads and queries continue; writes
    /// and deletes are denied.
    ///
    /// # Errors
    /// Returns [`KillSwitchError::Audit`] if the transition's audit record
    /// cannot be persisted.
    pub async fn freeze_writes(
        &self,
        agent_id: &AgentId,
        actor_id: &str,
        reason: &str,
    ) -> Result<AuditRecord, KillSwitchError> {
        self.transition(agent_id, AgentState::Frozen, actor_id, reason, Operation::Freeze)
            .await
    }

    /// Transition `agent_id` back to `enabled`.
    ///
    /// # Errors
    /// Returns [`KillSwitchError::Audit`] if the transition's audit record
    /// cannot be persisted.
    pub async fn enable(
        &self,
        agent_id: &AgentId,
        actor_id: &str,
        reason: &str,
    ) -> Result<AuditRecord, KillSwitchError> {
        self.transition(agent_id, AgentState::Enabled, actor_id, reason, Operation::Enable)
            .await
    }

    /// Disable every agent this kill-switch has ever observed, in one
    /// logical step, producing one audit record per transitioned agent.
    /// Agents never touched are left untouched: known-agents-only, not a
    /// retroactive ban on agents the process has never seen.
    ///
    /// # Errors
    /// Returns the first [`KillSwitchError::Audit`] encountered; agents
    /// processed before the failing one remain disabled.
    pub async fn global_shutdown(
        &self,
        actor_id: &str,
        reason: &str,
    ) -> Result<Vec<AuditRecord>, KillSwitchError> {
        let known_agents: Vec<AgentId> =
            self.statuses.iter().map(|entry| entry.key().clone()).collect();
        let mut records = Vec::with_capacity(known_agents.len());
        for agent_id in known_agents {
            records.push(self.disable(&agent_id, actor_id, reason).await?);
        }
        Ok(records)
    }

    /// Convenience read path distinct from the full adapter-backed audit
    /// export: filter the audit log to kill-switch-relevant operations for
    /// one agent.
    ///
    /// # Errors
    /// Returns [`KillSwitchError::Audit`] if the underlying store query
    /// fails.
    pub async fn get_audit_log(
        &self,
        agent_id: Option<&AgentId>,
        limit: Option<u32>,
    ) -> Result<AuditPage, KillSwitchError> {
        let query = AuditQuery {
            agent_id: agent_id.map(|a| a.to_string()),
            limit,
            ..Default::default()
        };
        Ok(self.audit.query(&query).await?)
    }

    async fn transition(
        &self,
        agent_id: &AgentId,
        new_state: AgentState,
        actor_id: &str,
        reason: &str,
        operation: Operation,
    ) -> Result<AuditRecord, KillSwitchError> {
        let now = Utc::now();
        self.statuses
            .entry(agent_id.clone())
            .and_modify(|status| {
                status.state = new_state;
                status.memory_write = MemoryWriteCapability::from(new_state);
                status.transitioned_at = Some(now);
                status.actor_id = Some(actor_id.to_owned());
                status.reason = Some(reason.to_owned());
            })
            .or_insert_with(|| AgentStatus {
                agent_id: agent_id.clone(),
                state: new_state,
                memory_write: MemoryWriteCapability::from(new_state),
                transitioned_at: Some(now),
                actor_id: Some(actor_id.to_owned()),
                reason: Some(reason.to_owned()),
            });

        let record = AuditRecordBuilder::new(
            agent_id.as_str(),
            operation,
            Decision::Allowed,
            reason.to_owned(),
            actor_id,
        )
        .build()?;

        self.audit.write_audit_record(record.clone()).await?;
        tracing::info!(agent_id = %agent_id, ?new_state, actor = actor_id, "kill-switch transition");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amg_audit_memory::MemoryAuditStore;

    fn switch() -> KillSwitch {
        KillSwitch::new(Arc::new(MemoryAuditStore::new()))
    }

    #[tokio::test]
    async fn unknown_agent_defaults_to_enabled() {
        let ks = switch();
        let (allowed, _) = ks.check_allowed(&AgentId::from("ghost"), Operation::Write);
        assert!(allowed);
    }

    #[tokio::test]
    async fn disable_blocks_all_operations() {
        let ks = switch();
        let agent = AgentId::from("agent-1");
        ks.disable(&agent, "admin", "incident").await.unwrap();

        for op in [Operation::Read, Operation::Write, Operation::Query] {
            let (allowed, reason) = ks.check_allowed(&agent, op);
            assert!(!allowed);
            assert_eq!(reason, "agent_disabled");
        }
    }

    #[tokio::test]
    async fn frozen_blocks_writes_but_allows_reads() {
        let ks = switch();
        let agent = AgentId::from("agent-2");
        ks.freeze_writes(&agent, "admin", "review").await.unwrap();

        let (write_allowed, write_reason) = ks.check_allowed(&agent, Operation::Write);
        assert!(!write_allowed);
        assert_eq!(write_reason, "agent_frozen_write_denied");

        let (read_allowed, _) = ks.check_allowed(&agent, Operation::Read);
        assert!(read_allowed);
    }

    #[tokio::test]
    async fn enable_after_disable_restores_access() {
        let ks = switch();
        let agent = AgentId::from("agent-3");
        ks.disable(&agent, "admin", "x").await.unwrap();
        ks.enable(&agent, "admin", "resolved").await.unwrap();

        let (allowed, _) = ks.check_allowed(&agent, Operation::Write);
        assert!(allowed);
    }

    #[tokio::test]
    async fn global_shutdown_only_affects_known_agents() {
        let ks = switch();
        let known = AgentId::from("known");
        let unknown = AgentId::from("unknown");
        ks.enable(&known, "admin", "bootstrap").await.unwrap();

        let records = ks.global_shutdown("admin", "incident").await.unwrap();
        assert_eq!(records.len(), 1);

        let (known_allowed, _) = ks.check_allowed(&known, Operation::Read);
        assert!(!known_allowed);
        let (unknown_allowed, _) = ks.check_allowed(&unknown, Operation::Read);
        assert!(unknown_allowed, "untouched agents are not retroactively disabled");
    }

    #[tokio::test]
    async fn each_transition_emits_a_fresh_audit_record() {
        let ks = switch();
        let agent = AgentId::from("agent-4");
        let first = ks.disable(&agent, "admin", "x").await.unwrap();
        let second = ks.disable(&agent, "admin", "x").await.unwrap();
        assert_ne!(first.audit_id, second.audit_id);
    }
}
