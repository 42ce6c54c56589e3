//! In-memory reference [`StorageAdapter`], used for tests and local
//! development. Backed by a `DashMap` for lock-free per-key concurrency,
//! plus a per-agent `tokio::sync::Mutex` to serialize writes from a single
//! agent.
//!
//! Expired memories are purged lazily: any access that observes an expired
//! entry removes it from the map before applying the retrieval guard,
//! rather than leaving expired rows to be filtered out forever.

use std::sync::Arc;

use amg_audit::AuditStore;
use amg_audit::{AuditPage, AuditQuery};
use amg_core::{
    AgentId, AmgError, AuditRecord, Decision, Memory, MemoryId, Operation, RequestId,
};
use amg_storage::{QueryFilters, QueryOutcome, StorageAdapter, StorageError};
use amg_storage::ranking::{rank_by_embedding, sort_deterministic};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;

fn audit(
    agent_id: impl Into<String>,
    operation: Operation,
    decision: Decision,
    reason: impl Into<String>,
    actor_id: impl Into<String>,
    memory_id: Option<MemoryId>,
    request_id: Option<RequestId>,
) -> amg_audit::AuditRecordBuilder {
    let mut builder =
        amg_audit::AuditRecordBuilder::new(agent_id.into(), operation, decision, reason, actor_id);
    if let Some(id) = memory_id {
        builder = builder.with_memory_id(id);
    }
    if let Some(rid) = request_id {
        builder = builder.with_request_id(rid);
    }
    builder
}

/// `DashMap`-backed `StorageAdapter`, delegating audit persistence to an
/// injected [`AuditStore`] so the audit log can be swapped independently of
/// the memory backend (e.g. memory store + Postgres audit store in tests).
pub struct MemoryStorageAdapter {
    memories: DashMap<String, Memory>,
    write_locks: DashMap<AgentId, Arc<Mutex<()>>>,
    audit: Arc<dyn AuditStore>,
}

impl MemoryStorageAdapter {
    #[must_use]
    pub fn new(audit: Arc<dyn AuditStore>) -> Self {
        Self {
            memories: DashMap::new(),
            write_locks: DashMap::new(),
            audit,
        }
    }

    fn agent_lock(&self, agent_id: &AgentId) -> Arc<Mutex<()>> {
        Arc::clone(
            self.write_locks
                .entry(agent_id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    /// Remove `memory_id` from the map if it has expired as of now, returning
    /// `true` when a purge happened.
    fn purge_if_expired(&self, memory_id: &str) -> bool {
        let now = Utc::now();
        let expired = self
            .memories
            .get(memory_id)
            .is_some_and(|entry| entry.is_expired(now));
        if expired {
            self.memories.remove(memory_id);
        }
        expired
    }
}

#[async_trait]
impl StorageAdapter for MemoryStorageAdapter {
    async fn write(
        &self,
        memory: Memory,
        request_id: Option<RequestId>,
    ) -> Result<(Memory, AuditRecord), StorageError> {
        if memory.agent_id.is_empty() {
            return Err(StorageError::PolicyEnforcement(AmgError::EmptyAgentId));
        }
        if memory.policy.ttl_seconds <= 0 {
            return Err(StorageError::PolicyEnforcement(AmgError::InvalidTtl(
                memory.policy.ttl_seconds,
            )));
        }

        let lock = self.agent_lock(&memory.agent_id);
        let _guard = lock.lock().await;

        self.memories
            .insert(memory.memory_id.to_string(), memory.clone());

        let record = audit(
            memory.agent_id.as_str(),
            Operation::Write,
            Decision::Allowed,
            "all_policy_checks_passed",
            memory.agent_id.as_str(),
            Some(memory.memory_id.clone()),
            request_id,
        )
        .with_metadata(
            "memory_type",
            serde_json::Value::String(memory.policy.memory_type.to_string()),
        )
        .with_metadata(
            "sensitivity",
            serde_json::Value::String(memory.policy.sensitivity.to_string()),
        )
        .with_metadata(
            "scope",
            serde_json::Value::String(memory.policy.scope.to_string()),
        )
        .with_metadata(
            "ttl_seconds",
            serde_json::Value::from(memory.policy.ttl_seconds),
        )
        .build()?;

        self.audit.write_audit_record(record.clone()).await?;
        tracing::debug!(memory_id = %memory.memory_id, agent_id = %memory.agent_id, "memory written");
        Ok((memory, record))
    }

    async fn read(
        &self,
        memory_id: &MemoryId,
        caller_agent_id: &AgentId,
        request_id: Option<RequestId>,
    ) -> Result<(Option<Memory>, AuditRecord), StorageError> {
        self.purge_if_expired(memory_id.as_str());

        let found = self.memories.get(memory_id.as_str()).map(|e| e.value().clone());

        let (result, reason) = match &found {
            None => (None, "memory_not_found"),
            Some(memory) if memory.is_expired(Utc::now()) => (None, "ttl_expired"),
            Some(memory)
                if memory.policy.scope == amg_core::Scope::Agent
                    && memory.agent_id != *caller_agent_id =>
            {
                (None, "scope_isolation_violation")
            }
            Some(memory) if !memory.policy.allow_read => (None, "read_not_allowed"),
            Some(memory) => (Some(memory.clone()), "all_policy_checks_passed"),
        };

        let decision = if result.is_some() {
            Decision::Allowed
        } else {
            Decision::Denied
        };

        let record = audit(
            caller_agent_id.as_str(),
            Operation::Read,
            decision,
            reason,
            caller_agent_id.as_str(),
            Some(memory_id.clone()),
            request_id,
        )
        .build()?;

        self.audit.write_audit_record(record.clone()).await?;
        if decision == Decision::Denied {
            tracing::warn!(memory_id = %memory_id, caller = %caller_agent_id, %reason, "read denied");
        }
        Ok((result, record))
    }

    async fn delete(
        &self,
        memory_id: &MemoryId,
        actor_id: &str,
        reason: &str,
    ) -> Result<AuditRecord, StorageError> {
        let removed = self.memories.remove(memory_id.as_str());
        let Some((_, memory)) = removed else {
            return Err(StorageError::NotFound(memory_id.to_string()));
        };

        let record = audit(
            memory.agent_id.as_str(),
            Operation::Delete,
            Decision::Allowed,
            reason.to_owned(),
            actor_id,
            Some(memory_id.clone()),
            None,
        )
        .build()?;
        self.audit.write_audit_record(record.clone()).await?;
        Ok(record)
    }

    async fn query(
        &self,
        filters: &QueryFilters,
        caller_agent_id: &AgentId,
        request_id: Option<RequestId>,
    ) -> Result<QueryOutcome, StorageError> {
        let now = Utc::now();
        let all: Vec<Memory> = self.memories.iter().map(|e| e.value().clone()).collect();
        let total_examined = all.len() as u64;

        for memory in &all {
            if memory.is_expired(now) {
                self.memories.remove(memory.memory_id.as_str());
            }
        }

        let mut survivors: Vec<Memory> = all
            .into_iter()
            .filter(|m| !m.is_expired(now))
            .filter(|m| filters.matches_type_and_sensitivity(m.policy.memory_type, m.policy.sensitivity))
            .filter(|m| {
                m.policy.scope != amg_core::Scope::Agent || m.agent_id == *caller_agent_id
            })
            .filter(|m| filters.scope.is_none_or(|s| m.policy.scope == s))
            .filter(|m| m.policy.allow_read)
            .collect();

        sort_deterministic(&mut survivors);

        if let Some(query_vec) = &filters.embedding {
            rank_by_embedding(&mut survivors, query_vec);
        }

        if let Some(limit) = filters.limit {
            survivors.truncate(limit as usize);
        }

        let filtered_count = total_examined - survivors.len() as u64;

        let record = audit(
            caller_agent_id.as_str(),
            Operation::Query,
            Decision::Allowed,
            "all_policy_checks_passed",
            caller_agent_id.as_str(),
            None,
            request_id,
        )
        .with_metadata(
            "total_examined",
            serde_json::Value::from(total_examined),
        )
        .with_metadata("filtered_count", serde_json::Value::from(filtered_count))
        .with_metadata(
            "returned_count",
            serde_json::Value::from(survivors.len() as u64),
        )
        .build()?;
        self.audit.write_audit_record(record.clone()).await?;

        Ok(QueryOutcome {
            memories: survivors,
            audit_record: record,
            total_examined,
            filtered_count,
        })
    }

    async fn get_audit_log(&self, query: AuditQuery) -> Result<AuditPage, StorageError> {
        Ok(self.audit.query(&query).await?)
    }

    async fn write_audit_record(&self, record: AuditRecord) -> Result<(), StorageError> {
        Ok(self.audit.write_audit_record(record).await?)
    }

    async fn health_check(&self) -> Result<bool, StorageError> {
        Ok(self.audit.health_check().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amg_audit_memory::MemoryAuditStore;
    use amg_storage::testing::run_storage_conformance_tests;

    #[tokio::test(start_paused = true)]
    async fn passes_storage_conformance_suite() {
        let audit = Arc::new(MemoryAuditStore::new());
        let adapter = MemoryStorageAdapter::new(audit);
        run_storage_conformance_tests(&adapter).await.unwrap();
    }

    #[tokio::test]
    async fn vector_ranking_orders_by_cosine_similarity_descending() {
        use amg_core::{MemoryPolicy, MemoryType, Scope, Sensitivity};

        let audit = Arc::new(MemoryAuditStore::new());
        let adapter = MemoryStorageAdapter::new(audit);

        for (content, vec) in [("a", vec![1.0, 0.0]), ("b", vec![0.0, 1.0]), ("c", vec![0.7, 0.7])] {
            let memory = Memory::new(
                "agent-v",
                content,
                Some(vec),
                MemoryPolicy::new(MemoryType::LongTerm, Sensitivity::NonPii, Scope::Agent, 3600)
                    .unwrap(),
                "agent-v",
            )
            .unwrap();
            adapter.write(memory, None).await.unwrap();
        }

        let filters = QueryFilters {
            embedding: Some(vec![1.0, 0.0]),
            ..Default::default()
        };
        let outcome = adapter
            .query(&filters, &AgentId::from("agent-v"), None)
            .await
            .unwrap();

        let order: Vec<&str> = outcome.memories.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(order, vec!["a", "c", "b"]);
    }
}
