use sqlx::PgPool;

use crate::config::PostgresStorageConfig;

/// Create the `memory` table and its indices if they do not already exist.
/// `embedding` is carried as `JSONB` so a concrete backend can round-trip
/// whatever [`amg_core::Memory`] declares (see DESIGN.md). `is_deleted`/
/// `deleted_at` are kept for schema fidelity but are never written:
/// deletion is always a physical `DELETE`, never a tombstone.
///
/// # Errors
/// Returns a [`sqlx::Error`] if any DDL statement fails.
pub async fn run_migrations(pool: &PgPool, config: &PostgresStorageConfig) -> Result<(), sqlx::Error> {
    let table = config.memory_table();
    let prefix = &config.table_prefix;

    let create_table = format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            memory_id TEXT PRIMARY KEY,
            agent_id TEXT NOT NULL,
            content TEXT NOT NULL,
            embedding JSONB,
            memory_type TEXT NOT NULL,
            sensitivity TEXT NOT NULL,
            scope TEXT NOT NULL,
            ttl_seconds BIGINT NOT NULL,
            allow_read BOOLEAN NOT NULL DEFAULT TRUE,
            allow_write BOOLEAN NOT NULL DEFAULT TRUE,
            provenance TEXT,
            created_at TIMESTAMPTZ NOT NULL,
            expires_at TIMESTAMPTZ NOT NULL,
            created_by TEXT NOT NULL,
            is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
            deleted_at TIMESTAMPTZ
        )"
    );

    let agent_idx = format!(
        "CREATE INDEX IF NOT EXISTS {prefix}memory_agent_id_idx ON {table} (agent_id)"
    );
    let expires_idx = format!(
        "CREATE INDEX IF NOT EXISTS {prefix}memory_expires_at_idx ON {table} (expires_at)"
    );

    sqlx::query(&create_table).execute(pool).await?;
    sqlx::query(&agent_idx).execute(pool).await?;
    sqlx::query(&expires_idx).execute(pool).await?;

    Ok(())
}
