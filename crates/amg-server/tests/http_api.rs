//! HTTP-level scenarios against the in-memory adapter stack, driven through
//! the full axum router.

use std::sync::Arc;

use amg_context::GovernedContextBuilder;
use amg_killswitch::KillSwitch;
use amg_policy::PolicyEngine;
use amg_server::{AppState, ServerConfig};
use amg_storage_memory::MemoryStorageAdapter;
use axum_test::TestServer;
use serde_json::json;

const API_KEY: &str = "test-key";
const AGENT: &str = "agent-http";

fn server() -> TestServer {
    let audit = Arc::new(amg_audit_memory::MemoryAuditStore::new());
    let adapter = Arc::new(MemoryStorageAdapter::new(Arc::clone(&audit) as Arc<dyn amg_audit::AuditStore>));
    let adapter: Arc<dyn amg_storage::StorageAdapter> = adapter;
    let kill_switch = Arc::new(KillSwitch::new(audit));
    let policy = Arc::new(PolicyEngine::default());
    let context_builder = Arc::new(GovernedContextBuilder::new(
        Arc::clone(&adapter),
        Arc::clone(&kill_switch),
        (*policy).clone(),
    ));

    let mut api_keys = std::collections::HashMap::new();
    api_keys.insert(API_KEY.to_owned(), amg_core::AgentId::from(AGENT));

    let state = AppState {
        adapter,
        kill_switch,
        policy,
        context_builder,
        config: Arc::new(ServerConfig {
            api_keys,
            auth_disabled: false,
            host: "127.0.0.1".to_owned(),
            port: 0,
        }),
    };

    TestServer::new(amg_server::api::router(state)).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let server = server();
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn missing_api_key_is_unauthorized() {
    let server = server();
    let response = server
        .post("/memory/write")
        .json(&json!({
            "agent_id": AGENT,
            "content": "hello",
            "memory_type": "long_term",
            "sensitivity": "non_pii",
        }))
        .await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn write_then_query_round_trip() {
    let server = server();

    let write = server
        .post("/memory/write")
        .add_header("X-API-Key", API_KEY)
        .json(&json!({
            "agent_id": AGENT,
            "content": "remember this",
            "memory_type": "long_term",
            "sensitivity": "non_pii",
        }))
        .await;
    write.assert_status_ok();

    let query = server
        .post("/memory/query")
        .add_header("X-API-Key", API_KEY)
        .json(&json!({ "agent_id": AGENT }))
        .await;
    query.assert_status_ok();
    let body: serde_json::Value = query.json();
    assert_eq!(body["memories"].as_array().unwrap().len(), 1);
    assert_eq!(body["memories"][0]["content"], "remember this");
}

#[tokio::test]
async fn write_above_ttl_ceiling_is_forbidden() {
    let server = server();

    let response = server
        .post("/memory/write")
        .add_header("X-API-Key", API_KEY)
        .json(&json!({
            "agent_id": AGENT,
            "content": "too durable",
            "memory_type": "long_term",
            "sensitivity": "non_pii",
            "scope": "agent",
            "ttl_seconds": 999_999_999_i64,
        }))
        .await;
    response.assert_status_forbidden();
}

#[tokio::test]
async fn disabled_agent_cannot_write() {
    let server = server();

    let disable = server
        .post(&format!("/agent/{AGENT}/disable"))
        .add_header("X-API-Key", API_KEY)
        .json(&json!({ "actor_id": "admin", "reason": "incident" }))
        .await;
    disable.assert_status_ok();

    let write = server
        .post("/memory/write")
        .add_header("X-API-Key", API_KEY)
        .json(&json!({
            "agent_id": AGENT,
            "content": "should not land",
            "memory_type": "long_term",
            "sensitivity": "non_pii",
        }))
        .await;
    assert_eq!(write.status_code(), axum::http::StatusCode::LOCKED);
}

#[tokio::test]
async fn context_build_returns_written_memory() {
    let server = server();

    server
        .post("/memory/write")
        .add_header("X-API-Key", API_KEY)
        .json(&json!({
            "agent_id": AGENT,
            "content": "context fodder",
            "memory_type": "episodic",
            "sensitivity": "non_pii",
        }))
        .await
        .assert_status_ok();

    let context = server
        .post("/context/build")
        .add_header("X-API-Key", API_KEY)
        .json(&json!({
            "agent_id": AGENT,
            "max_tokens": 1000,
            "max_items": 10,
        }))
        .await;
    context.assert_status_ok();
    let body: serde_json::Value = context.json();
    assert_eq!(body["metadata"]["returned_count"], 1);
}

#[tokio::test]
async fn audit_export_lists_recorded_operations() {
    let server = server();

    server
        .post("/memory/write")
        .add_header("X-API-Key", API_KEY)
        .json(&json!({
            "agent_id": AGENT,
            "content": "audited",
            "memory_type": "long_term",
            "sensitivity": "non_pii",
        }))
        .await
        .assert_status_ok();

    let export = server
        .get("/audit/export")
        .add_header("X-API-Key", API_KEY)
        .add_query_param("agent_id", AGENT)
        .await;
    export.assert_status_ok();
    let body: serde_json::Value = export.json();
    assert!(body["count"].as_u64().unwrap() >= 1);
}
