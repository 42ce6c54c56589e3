use sqlx::PgPool;

/// Run the audit table migration, creating the table and indexes if they do
/// not already exist.
pub async fn run_migrations(pool: &PgPool, prefix: &str) -> Result<(), sqlx::Error> {
    let table = format!("{prefix}audit_log");

    let create_table = format!(
        "
        CREATE TABLE IF NOT EXISTS {table} (
            audit_id        TEXT PRIMARY KEY,
            timestamp       TIMESTAMPTZ NOT NULL,
            agent_id        TEXT NOT NULL,
            request_id      TEXT,
            operation       TEXT NOT NULL,
            memory_id       TEXT,
            policy_version  TEXT NOT NULL,
            decision        TEXT NOT NULL,
            reason          TEXT NOT NULL,
            actor_id        TEXT NOT NULL,
            metadata        JSONB NOT NULL DEFAULT '{{}}'::jsonb,
            signature       TEXT NOT NULL
        )
        "
    );

    sqlx::query(&create_table).execute(pool).await?;

    let indexes = [
        format!("CREATE INDEX IF NOT EXISTS idx_{prefix}audit_log_agent ON {table} (agent_id)"),
        format!(
            "CREATE INDEX IF NOT EXISTS idx_{prefix}audit_log_time ON {table} (timestamp DESC)"
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS idx_{prefix}audit_log_operation ON {table} (operation)"
        ),
    ];

    for idx in &indexes {
        sqlx::query(idx).execute(pool).await?;
    }

    Ok(())
}
