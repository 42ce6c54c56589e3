use std::sync::Arc;

use amg_context::GovernedContextBuilder;
use amg_killswitch::KillSwitch;
use amg_policy::{PolicyConfig, PolicyEngine};
use amg_server::{AppState, ServerConfig};
use amg_storage::StorageAdapter;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env()?;

    let (audit, adapter) = build_backends().await?;
    let kill_switch = Arc::new(KillSwitch::new(audit));
    let policy = Arc::new(PolicyEngine::new(PolicyConfig::default(), "1.0.0"));
    let context_builder = Arc::new(GovernedContextBuilder::new(
        Arc::clone(&adapter),
        Arc::clone(&kill_switch),
        (*policy).clone(),
    ));

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState {
        adapter,
        kill_switch,
        policy,
        context_builder,
        config: Arc::new(config),
    };

    tracing::info!(%addr, "starting amg-server");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, amg_server::api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[cfg(feature = "postgres")]
async fn build_backends() -> Result<(Arc<dyn amg_audit::AuditStore>, Arc<dyn StorageAdapter>), BoxError> {
    let database_url = std::env::var("AMG_DATABASE_URL")
        .map_err(|_| "AMG_DATABASE_URL is required when built with the postgres feature")?;

    let audit_config = amg_audit_postgres::PostgresAuditConfig::new(&database_url);
    let audit: Arc<dyn amg_audit::AuditStore> =
        Arc::new(amg_audit_postgres::PostgresAuditStore::new(&audit_config).await?);

    let storage_config = amg_storage_postgres::PostgresStorageConfig {
        url: database_url,
        ..amg_storage_postgres::PostgresStorageConfig::default()
    };
    let adapter: Arc<dyn StorageAdapter> = Arc::new(
        amg_storage_postgres::PostgresStorageAdapter::new(&storage_config, Arc::clone(&audit)).await?,
    );

    Ok((audit, adapter))
}

#[cfg(not(feature = "postgres"))]
async fn build_backends() -> Result<(Arc<dyn amg_audit::AuditStore>, Arc<dyn StorageAdapter>), BoxError> {
    let audit: Arc<dyn amg_audit::AuditStore> = Arc::new(amg_audit_memory::MemoryAuditStore::new());
    let adapter: Arc<dyn StorageAdapter> =
        Arc::new(amg_storage_memory::MemoryStorageAdapter::new(Arc::clone(&audit)));
    Ok((audit, adapter))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
