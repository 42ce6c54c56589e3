//! In-memory reference [`AuditStore`] backend, used for tests and as the
//! default backend for local development.

use amg_audit::{AuditError, AuditPage, AuditQuery, AuditStore};
use amg_core::AuditRecord;
use async_trait::async_trait;
use dashmap::DashMap;

/// DashMap-backed audit store. Lock-free per-key concurrency, matching the
/// teacher's in-memory state store.
#[derive(Debug, Default)]
pub struct MemoryAuditStore {
    records: DashMap<String, AuditRecord>,
}

impl MemoryAuditStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn write_audit_record(&self, record: AuditRecord) -> Result<(), AuditError> {
        self.records.insert(record.audit_id.to_string(), record);
        Ok(())
    }

    async fn get_by_id(&self, audit_id: &str) -> Result<Option<AuditRecord>, AuditError> {
        Ok(self.records.get(audit_id).map(|r| r.value().clone()))
    }

    async fn query(&self, query: &AuditQuery) -> Result<AuditPage, AuditError> {
        let mut matching: Vec<AuditRecord> = self
            .records
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|r| {
                query
                    .agent_id
                    .as_deref()
                    .is_none_or(|agent_id| r.agent_id.as_str() == agent_id)
            })
            .filter(|r| query.operation.is_none_or(|op| r.operation == op))
            .filter(|r| query.start.is_none_or(|start| r.timestamp >= start))
            .filter(|r| query.end.is_none_or(|end| r.timestamp <= end))
            .collect();

        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        let total = matching.len() as u64;

        let limit = query.effective_limit();
        let offset = query.effective_offset();
        let records = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();

        Ok(AuditPage {
            records,
            total,
            limit,
            offset,
        })
    }

    async fn health_check(&self) -> Result<bool, AuditError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amg_audit::AuditRecordBuilder;
    use amg_core::{Decision, Operation};

    fn record(agent_id: &str, op: Operation) -> AuditRecord {
        AuditRecordBuilder::new(agent_id, op, Decision::Allowed, "all_policy_checks_passed", agent_id)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn write_then_get_by_id() {
        let store = MemoryAuditStore::new();
        let record = record("agent-1", Operation::Write);
        let audit_id = record.audit_id.to_string();
        store.write_audit_record(record).await.unwrap();

        let fetched = store.get_by_id(&audit_id).await.unwrap();
        assert!(fetched.is_some());
    }

    #[tokio::test]
    async fn query_filters_by_agent_and_paginates() {
        let store = MemoryAuditStore::new();
        for _ in 0..3 {
            store
                .write_audit_record(record("agent-1", Operation::Write))
                .await
                .unwrap();
        }
        store
            .write_audit_record(record("agent-2", Operation::Write))
            .await
            .unwrap();

        let query = AuditQuery {
            agent_id: Some("agent-1".to_owned()),
            limit: Some(2),
            ..Default::default()
        };
        let page = store.query(&query).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.records.len(), 2);
    }

    #[tokio::test]
    async fn health_check_is_always_true() {
        let store = MemoryAuditStore::new();
        assert!(store.health_check().await.unwrap());
    }
}
