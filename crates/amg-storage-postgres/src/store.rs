use std::sync::Arc;

use amg_audit::{AuditPage, AuditQuery, AuditRecordBuilder, AuditStore};
use amg_core::{
    AgentId, AmgError, AuditRecord, Decision, Memory, MemoryId, MemoryPolicy, Operation,
    RequestId, Scope,
};
use amg_storage::ranking::{rank_by_embedding, sort_deterministic};
use amg_storage::{QueryFilters, QueryOutcome, StorageAdapter, StorageError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::config::PostgresStorageConfig;
use crate::migrations;

/// Postgres-backed reference [`StorageAdapter`]. Connection-pool concurrency
/// is handled by `sqlx::PgPool`; per-agent write serialization falls out
/// naturally since each write targets a fresh `memory_id` and rows are never
/// mutated after insertion.
pub struct PostgresStorageAdapter {
    pool: PgPool,
    table: String,
    audit: Arc<dyn AuditStore>,
}

impl PostgresStorageAdapter {
    /// Connect and run migrations.
    ///
    /// # Errors
    /// Returns [`StorageError::Backend`] if the connection or migration fails.
    pub async fn new(
        config: &PostgresStorageConfig,
        audit: Arc<dyn AuditStore>,
    ) -> Result<Self, StorageError> {
        let pool = PgPool::connect(&config.url)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Self::from_pool(pool, config, audit).await
    }

    /// Build from an already-connected pool, useful for tests against a
    /// throwaway database.
    ///
    /// # Errors
    /// Returns [`StorageError::Backend`] if migrations fail.
    pub async fn from_pool(
        pool: PgPool,
        config: &PostgresStorageConfig,
        audit: Arc<dyn AuditStore>,
    ) -> Result<Self, StorageError> {
        migrations::run_migrations(&pool, config)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(Self {
            pool,
            table: config.memory_table(),
            audit,
        })
    }

    /// Periodic maintenance sweep: hard-delete rows past `expires_at`.
    /// Complements the on-read re-exclusion so expired memories don't
    /// accumulate forever between sweeps.
    ///
    /// # Errors
    /// Returns [`StorageError::Backend`] on a SQL failure.
    pub async fn purge_expired(&self) -> Result<u64, StorageError> {
        let sql = format!("DELETE FROM {} WHERE expires_at <= now()", self.table);
        let result = sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(result.rows_affected())
    }

    fn row_to_memory(row: &sqlx::postgres::PgRow) -> Result<Memory, StorageError> {
        let memory_type: String = row.try_get("memory_type").map_err(db_err)?;
        let sensitivity: String = row.try_get("sensitivity").map_err(db_err)?;
        let scope: String = row.try_get("scope").map_err(db_err)?;
        let embedding_json: Option<serde_json::Value> = row.try_get("embedding").map_err(db_err)?;

        let memory_type = parse_enum(&memory_type)?;
        let sensitivity = parse_enum(&sensitivity)?;
        let scope = parse_enum(&scope)?;
        let embedding = embedding_json
            .map(serde_json::from_value::<Vec<f32>>)
            .transpose()
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let ttl_seconds: i64 = row.try_get("ttl_seconds").map_err(db_err)?;
        let mut policy = MemoryPolicy::new(memory_type, sensitivity, scope, ttl_seconds)?;
        policy.allow_read = row.try_get("allow_read").map_err(db_err)?;
        policy.allow_write = row.try_get("allow_write").map_err(db_err)?;
        policy.provenance = row.try_get("provenance").map_err(db_err)?;

        let agent_id: String = row.try_get("agent_id").map_err(db_err)?;
        let created_by: String = row.try_get("created_by").map_err(db_err)?;
        let created_at: DateTime<Utc> = row.try_get("created_at").map_err(db_err)?;
        let expires_at: DateTime<Utc> = row.try_get("expires_at").map_err(db_err)?;
        let memory_id: String = row.try_get("memory_id").map_err(db_err)?;
        let content: String = row.try_get("content").map_err(db_err)?;

        Ok(Memory {
            memory_id: MemoryId::new(memory_id),
            agent_id: AgentId::new(agent_id),
            content,
            embedding,
            policy,
            created_at,
            expires_at,
            created_by: AgentId::new(created_by),
        })
    }
}

fn db_err(e: sqlx::Error) -> StorageError {
    StorageError::Backend(e.to_string())
}

fn parse_enum<T: serde::de::DeserializeOwned>(wire_value: &str) -> Result<T, StorageError> {
    serde_json::from_value(serde_json::Value::String(wire_value.to_owned()))
        .map_err(|e| StorageError::Backend(format!("invalid enum value {wire_value:?}: {e}")))
}

#[async_trait]
impl StorageAdapter for PostgresStorageAdapter {
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

        let embedding_json = memory
            .embedding
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let sql = format!(
            "INSERT INTO {} (
                memory_id, agent_id, content, embedding, memory_type, sensitivity, scope,
                ttl_seconds, allow_read, allow_write, provenance, created_at, expires_at, created_by
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14)",
            self.table
        );
        sqlx::query(&sql)
            .bind(memory.memory_id.as_str())
            .bind(memory.agent_id.as_str())
            .bind(&memory.content)
            .bind(embedding_json)
            .bind(memory.policy.memory_type.to_string())
            .bind(memory.policy.sensitivity.to_string())
            .bind(memory.policy.scope.to_string())
            .bind(memory.policy.ttl_seconds)
            .bind(memory.policy.allow_read)
            .bind(memory.policy.allow_write)
            .bind(&memory.policy.provenance)
            .bind(memory.created_at)
            .bind(memory.expires_at)
            .bind(memory.created_by.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        let mut builder = AuditRecordBuilder::new(
            memory.agent_id.as_str(),
            Operation::Write,
            Decision::Allowed,
            "all_policy_checks_passed",
            memory.agent_id.as_str(),
        )
        .with_memory_id(memory.memory_id.clone());
        if let Some(rid) = request_id {
            builder = builder.with_request_id(rid);
        }
        let record = builder.build()?;
        self.audit.write_audit_record(record.clone()).await?;
        Ok((memory, record))
    }

    async fn read(
        &self,
        memory_id: &MemoryId,
        caller_agent_id: &AgentId,
        request_id: Option<RequestId>,
    ) -> Result<(Option<Memory>, AuditRecord), StorageError> {
        let sql = format!(
            "SELECT * FROM {} WHERE memory_id = $1 AND NOT is_deleted",
            self.table
        );
        let row = sqlx::query(&sql)
            .bind(memory_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        let (result, reason) = match row {
            None => (None, "memory_not_found"),
            Some(row) => {
                let memory = Self::row_to_memory(&row)?;
                if memory.is_expired(Utc::now()) {
                    let _ = self
                        .delete(&memory.memory_id, "system", "ttl_expired_on_read")
                        .await;
                    (None, "ttl_expired")
                } else if memory.policy.scope == Scope::Agent
                    && memory.agent_id != *caller_agent_id
                {
                    (None, "scope_isolation_violation")
                } else if !memory.policy.allow_read {
                    (None, "read_not_allowed")
                } else {
                    (Some(memory), "all_policy_checks_passed")
                }
            }
        };

        let decision = if result.is_some() {
            Decision::Allowed
        } else {
            Decision::Denied
        };
        let mut builder = AuditRecordBuilder::new(
            caller_agent_id.as_str(),
            Operation::Read,
            decision,
            reason,
            caller_agent_id.as_str(),
        )
        .with_memory_id(memory_id.clone());
        if let Some(rid) = request_id {
            builder = builder.with_request_id(rid);
        }
        let record = builder.build()?;
        self.audit.write_audit_record(record.clone()).await?;
        Ok((result, record))
    }

    async fn delete(
        &self,
        memory_id: &MemoryId,
        actor_id: &str,
        reason: &str,
    ) -> Result<AuditRecord, StorageError> {
        let sql = format!("SELECT agent_id FROM {} WHERE memory_id = $1", self.table);
        let owner: Option<String> = sqlx::query_scalar(&sql)
            .bind(memory_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        let Some(owner) = owner else {
            return Err(StorageError::NotFound(memory_id.to_string()));
        };

        let delete_sql = format!("DELETE FROM {} WHERE memory_id = $1", self.table);
        sqlx::query(&delete_sql)
            .bind(memory_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        let record = AuditRecordBuilder::new(
            owner,
            Operation::Delete,
            Decision::Allowed,
            reason.to_owned(),
            actor_id,
        )
        .with_memory_id(memory_id.clone())
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
        // Push down the visibility predicate as an optimization; every
        // remaining predicate (expiry, sensitivity/type filters, allow_read)
        // is re-verified in-process below — the backend's WHERE clause is
        // advisory, never authoritative.
        let sql = format!(
            "SELECT * FROM {} WHERE NOT is_deleted AND (agent_id = $1 OR scope = 'tenant')",
            self.table
        );
        let rows = sqlx::query(&sql)
            .bind(caller_agent_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let total_examined = rows.len() as u64;
        let now = Utc::now();
        let mut survivors = Vec::with_capacity(rows.len());
        for row in &rows {
            let memory = Self::row_to_memory(row)?;
            if memory.is_expired(now) {
                continue;
            }
            if memory.policy.scope == Scope::Agent && memory.agent_id != *caller_agent_id {
                continue;
            }
            if !memory.policy.allow_read {
                continue;
            }
            if !filters
                .matches_type_and_sensitivity(memory.policy.memory_type, memory.policy.sensitivity)
            {
                continue;
            }
            if !filters.scope.is_none_or(|s| memory.policy.scope == s) {
                continue;
            }
            survivors.push(memory);
        }

        sort_deterministic(&mut survivors);
        if let Some(query_vec) = &filters.embedding {
            rank_by_embedding(&mut survivors, query_vec);
        }
        if let Some(limit) = filters.limit {
            survivors.truncate(limit as usize);
        }

        let filtered_count = total_examined - survivors.len() as u64;
        let mut builder = AuditRecordBuilder::new(
            caller_agent_id.as_str(),
            Operation::Query,
            Decision::Allowed,
            "all_policy_checks_passed",
            caller_agent_id.as_str(),
        )
        .with_metadata("total_examined", serde_json::Value::from(total_examined))
        .with_metadata("filtered_count", serde_json::Value::from(filtered_count))
        .with_metadata(
            "returned_count",
            serde_json::Value::from(survivors.len() as u64),
        );
        if let Some(rid) = request_id {
            builder = builder.with_request_id(rid);
        }
        let record = builder.build()?;
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
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| true)
            .map_err(db_err)
    }
}

#[cfg(all(test, feature = "integration"))]
mod integration_tests {
    //! Run with `cargo test --features integration` against a reachable
    //! Postgres instance configured via `AMG_TEST_DATABASE_URL`.
    use super::*;
    use amg_audit_memory::MemoryAuditStore;
    use amg_storage::testing::run_storage_conformance_tests;

    #[tokio::test]
    async fn passes_storage_conformance_suite() {
        let Ok(url) = std::env::var("AMG_TEST_DATABASE_URL") else {
            eprintln!("skipping: AMG_TEST_DATABASE_URL not set");
            return;
        };
        let config = PostgresStorageConfig {
            url,
            table_prefix: "conformance_test_".to_owned(),
            ..Default::default()
        };
        let audit = Arc::new(MemoryAuditStore::new());
        let pool = PgPool::connect(&config.url).await.unwrap();
        let adapter = PostgresStorageAdapter::from_pool(pool, &config, audit)
            .await
            .unwrap();
        run_storage_conformance_tests(&adapter).await.unwrap();
    }
}
