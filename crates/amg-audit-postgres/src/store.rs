use async_trait::async_trait;
use sqlx::PgPool;

use amg_audit::{AuditError, AuditPage, AuditQuery, AuditStore};
use amg_core::{AgentId, AuditId, AuditRecord, Decision, MemoryId, Operation, RequestId};

use crate::config::PostgresAuditConfig;
use crate::migrations;

enum Condition {
    Agent(String),
    Operation(String),
    Start(chrono::DateTime<chrono::Utc>),
    End(chrono::DateTime<chrono::Utc>),
}

/// Bind each [`Condition`] onto a query builder in declaration order, so the
/// bind sequence always matches the `$n` placeholders `build_where_clause`
/// assigned. A macro rather than a generic function because `sqlx`'s
/// `Query`/`QueryAs`/`QueryScalar` builders are distinct types with their
/// own inherent `bind`, not a shared trait.
macro_rules! bind_conditions {
    ($query:expr, $conditions:expr) => {{
        let mut q = $query;
        for cond in $conditions {
            q = match cond {
                Condition::Agent(v) | Condition::Operation(v) => q.bind(v.as_str()),
                Condition::Start(v) | Condition::End(v) => q.bind(*v),
            };
        }
        q
    }};
}

/// Postgres-backed audit store using `sqlx`.
pub struct PostgresAuditStore {
    pool: PgPool,
    table: String,
}

impl PostgresAuditStore {
    /// Create a new store, connecting to Postgres and running migrations.
    ///
    /// # Errors
    /// Returns [`AuditError::Storage`] if the connection or migration fails.
    pub async fn new(config: &PostgresAuditConfig) -> Result<Self, AuditError> {
        let pool = PgPool::connect(&config.url)
            .await
            .map_err(|e| AuditError::Storage(e.to_string()))?;

        migrations::run_migrations(&pool, &config.prefix)
            .await
            .map_err(|e| AuditError::Storage(e.to_string()))?;

        Ok(Self {
            pool,
            table: format!("{}audit_log", config.prefix),
        })
    }

    /// Create from an existing pool (useful for testing).
    ///
    /// # Errors
    /// Returns [`AuditError::Storage`] if the migration fails.
    pub async fn from_pool(pool: PgPool, prefix: &str) -> Result<Self, AuditError> {
        migrations::run_migrations(&pool, prefix)
            .await
            .map_err(|e| AuditError::Storage(e.to_string()))?;

        Ok(Self {
            pool,
            table: format!("{prefix}audit_log"),
        })
    }
}

#[async_trait]
impl AuditStore for PostgresAuditStore {
    async fn write_audit_record(&self, record: AuditRecord) -> Result<(), AuditError> {
        let sql = format!(
            r"
            INSERT INTO {} (
                audit_id, timestamp, agent_id, request_id, operation, memory_id,
                policy_version, decision, reason, actor_id, metadata, signature
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12
            )
            ",
            self.table
        );

        let metadata = serde_json::to_value(&record.metadata)
            .map_err(|e| AuditError::Storage(e.to_string()))?;

        sqlx::query(&sql)
            .bind(record.audit_id.as_str())
            .bind(record.timestamp)
            .bind(record.agent_id.as_str())
            .bind(record.request_id.as_ref().map(RequestId::as_str))
            .bind(record.operation.to_string())
            .bind(record.memory_id.as_ref().map(MemoryId::as_str))
            .bind(&record.policy_version)
            .bind(record.decision.to_string())
            .bind(&record.reason)
            .bind(&record.actor_id)
            .bind(metadata)
            .bind(&record.signature)
            .execute(&self.pool)
            .await
            .map_err(|e| AuditError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn get_by_id(&self, audit_id: &str) -> Result<Option<AuditRecord>, AuditError> {
        let sql = format!("SELECT * FROM {} WHERE audit_id = $1", self.table);

        let row = sqlx::query_as::<_, AuditRow>(&sql)
            .bind(audit_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AuditError::Storage(e.to_string()))?;

        row.map(TryInto::try_into).transpose()
    }

    async fn query(&self, query: &AuditQuery) -> Result<AuditPage, AuditError> {
        let limit = query.effective_limit();
        let offset = query.effective_offset();
        let (where_clause, conditions) = build_where_clause(query);

        let count_sql = format!("SELECT COUNT(*) FROM {} {where_clause}", self.table);
        let count_q = bind_conditions!(sqlx::query_scalar::<_, i64>(&count_sql), &conditions);

        let total = count_q
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AuditError::Storage(e.to_string()))?;

        let limit_idx = conditions.len() as u32 + 1;
        let offset_idx = limit_idx + 1;
        let data_sql = format!(
            "SELECT * FROM {} {where_clause} ORDER BY timestamp DESC LIMIT ${limit_idx} OFFSET ${offset_idx}",
            self.table
        );

        let data_q = bind_conditions!(sqlx::query_as::<_, AuditRow>(&data_sql), &conditions);
        let data_q = data_q.bind(i64::from(limit)).bind(i64::from(offset));

        let rows: Vec<AuditRow> = data_q
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AuditError::Storage(e.to_string()))?;

        let records = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;

        #[allow(clippy::cast_sign_loss)]
        let total = total as u64;

        Ok(AuditPage {
            records,
            total,
            limit,
            offset,
        })
    }

    async fn health_check(&self) -> Result<bool, AuditError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(|e| AuditError::Storage(e.to_string()))
    }
}

/// Build the WHERE clause; returns the clause text and the ordered list of
/// conditions so the caller can bind them in the same order as `$n`
/// placeholders.
fn build_where_clause(query: &AuditQuery) -> (String, Vec<Condition>) {
    let mut conditions = Vec::new();

    if let Some(agent_id) = &query.agent_id {
        conditions.push(Condition::Agent(agent_id.clone()));
    }
    if let Some(operation) = query.operation {
        conditions.push(Condition::Operation(operation.to_string()));
    }
    if let Some(start) = query.start {
        conditions.push(Condition::Start(start));
    }
    if let Some(end) = query.end {
        conditions.push(Condition::End(end));
    }

    let columns: Vec<String> = conditions
        .iter()
        .enumerate()
        .map(|(i, cond)| {
            let idx = i + 1;
            match cond {
                Condition::Agent(_) => format!("agent_id = ${idx}"),
                Condition::Operation(_) => format!("operation = ${idx}"),
                Condition::Start(_) => format!("timestamp >= ${idx}"),
                Condition::End(_) => format!("timestamp <= ${idx}"),
            }
        })
        .collect();

    let where_clause = if columns.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", columns.join(" AND "))
    };

    (where_clause, conditions)
}

/// Internal row type for mapping database rows to [`AuditRecord`].
#[derive(sqlx::FromRow)]
struct AuditRow {
    audit_id: String,
    timestamp: chrono::DateTime<chrono::Utc>,
    agent_id: String,
    request_id: Option<String>,
    operation: String,
    memory_id: Option<String>,
    policy_version: String,
    decision: String,
    reason: String,
    actor_id: String,
    metadata: serde_json::Value,
    signature: String,
}

impl TryFrom<AuditRow> for AuditRecord {
    type Error = AuditError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        let operation: Operation = serde_json::from_value(serde_json::Value::String(row.operation))
            .map_err(|e| AuditError::Storage(e.to_string()))?;
        let decision: Decision = serde_json::from_value(serde_json::Value::String(row.decision))
            .map_err(|e| AuditError::Storage(e.to_string()))?;
        let metadata = match row.metadata {
            serde_json::Value::Object(map) => map.into_iter().collect(),
            _ => std::collections::BTreeMap::new(),
        };

        Ok(Self {
            audit_id: AuditId::from(row.audit_id),
            timestamp: row.timestamp,
            agent_id: AgentId::from(row.agent_id),
            request_id: row.request_id.map(RequestId::from),
            operation,
            memory_id: row.memory_id.map(MemoryId::from),
            policy_version: row.policy_version,
            decision,
            reason: row.reason,
            actor_id: row.actor_id,
            metadata,
            signature: row.signature,
        })
    }
}
