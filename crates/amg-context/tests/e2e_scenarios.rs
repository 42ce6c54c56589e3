//! End-to-end scenarios against the in-memory adapter stack.

use std::sync::Arc;

use amg_context::{ContextRequest, GovernedContextBuilder};
use amg_core::{AgentId, Memory, MemoryPolicy, MemoryType, Scope, Sensitivity};
use amg_killswitch::KillSwitch;
use amg_policy::PolicyEngine;
use amg_storage::{QueryFilters, StorageAdapter};
use amg_storage_memory::MemoryStorageAdapter;

fn stack() -> (Arc<MemoryStorageAdapter>, Arc<KillSwitch>, GovernedContextBuilder) {
    let audit = Arc::new(amg_audit_memory::MemoryAuditStore::new());
    let adapter = Arc::new(MemoryStorageAdapter::new(audit.clone()));
    let kill_switch = Arc::new(KillSwitch::new(audit));
    let builder = GovernedContextBuilder::new(
        adapter.clone(),
        kill_switch.clone(),
        PolicyEngine::default(),
    );
    (adapter, kill_switch, builder)
}

fn request(agent_id: &str) -> ContextRequest {
    ContextRequest {
        agent_id: AgentId::from(agent_id),
        filters: QueryFilters::default(),
        max_items: 100,
        max_tokens: 10_000,
        request_id: None,
    }
}

#[tokio::test]
async fn scenario_1_write_then_read() {
    let (adapter, _ks, builder) = stack();
    let policy = MemoryPolicy::new(MemoryType::LongTerm, Sensitivity::NonPii, Scope::Agent, 3600).unwrap();
    let memory = Memory::new("a", "hello", None, policy, "a").unwrap();
    adapter.write(memory, None).await.unwrap();

    let context = builder.build(request("a")).await.unwrap();
    assert_eq!(context.memories.len(), 1);
    assert_eq!(context.memories[0].content, "hello");
    assert_eq!(context.memories[0].policy.memory_type, MemoryType::LongTerm);
}

#[tokio::test]
async fn scenario_2_cross_agent_isolation() {
    let (adapter, _ks, builder) = stack();
    let policy = MemoryPolicy::new(MemoryType::LongTerm, Sensitivity::NonPii, Scope::Agent, 3600).unwrap();
    let memory = Memory::new("a", "secret", None, policy, "a").unwrap();
    adapter.write(memory, None).await.unwrap();

    let context = builder.build(request("b")).await.unwrap();
    assert!(context.memories.is_empty());
    assert!(context.filtered_count >= 1);
}

#[tokio::test]
async fn scenario_3_freeze_blocks_writes_permits_reads() {
    let (adapter, ks, builder) = stack();
    let policy = MemoryPolicy::new(MemoryType::LongTerm, Sensitivity::NonPii, Scope::Agent, 3600).unwrap();
    let memory = Memory::new("a", "before freeze", None, policy, "a").unwrap();
    adapter.write(memory, None).await.unwrap();

    ks.freeze_writes(&AgentId::from("a"), "admin", "review").await.unwrap();

    let (write_allowed, _) = ks.check_allowed(&AgentId::from("a"), amg_core::Operation::Write);
    assert!(!write_allowed);

    let context = builder.build(request("a")).await.unwrap();
    assert_eq!(context.memories.len(), 1);
    assert_eq!(context.memories[0].content, "before freeze");
}

#[tokio::test]
async fn scenario_5_vector_ranking_orders_by_similarity() {
    let (adapter, _ks, builder) = stack();
    for (content, vector) in [("a", vec![1.0, 0.0]), ("b", vec![0.0, 1.0]), ("c", vec![0.7, 0.7])] {
        let policy = MemoryPolicy::new(MemoryType::LongTerm, Sensitivity::NonPii, Scope::Agent, 3600).unwrap();
        let memory = Memory::new("a", content, Some(vector), policy, "a").unwrap();
        adapter.write(memory, None).await.unwrap();
    }

    let mut req = request("a");
    req.filters.embedding = Some(vec![1.0, 0.0]);
    let context = builder.build(req).await.unwrap();

    let order: Vec<&str> = context.memories.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(order, vec!["a", "c", "b"]);
}

#[tokio::test]
async fn scenario_6_token_budget_truncation() {
    let (adapter, _ks, builder) = stack();
    let long_content = vec!["word"; 1000].join(" ");
    let policy = MemoryPolicy::new(MemoryType::LongTerm, Sensitivity::NonPii, Scope::Agent, 3600).unwrap();
    let memory = Memory::new("a", long_content, None, policy, "a").unwrap();
    adapter.write(memory, None).await.unwrap();

    let mut req = request("a");
    req.max_tokens = 100;
    let context = builder.build(req).await.unwrap();

    assert!(context.memories.len() <= 1);
    assert!(context.truncated_by_token_budget);
}

#[tokio::test]
async fn p6_determinism_same_state_same_request_same_order() {
    let (adapter, _ks, builder) = stack();
    for content in ["one", "two", "three"] {
        let policy = MemoryPolicy::new(MemoryType::LongTerm, Sensitivity::NonPii, Scope::Agent, 3600).unwrap();
        let memory = Memory::new("a", content, None, policy, "a").unwrap();
        adapter.write(memory, None).await.unwrap();
    }

    let first = builder.build(request("a")).await.unwrap();
    let second = builder.build(request("a")).await.unwrap();

    let first_ids: Vec<_> = first.memories.iter().map(|m| m.memory_id.clone()).collect();
    let second_ids: Vec<_> = second.memories.iter().map(|m| m.memory_id.clone()).collect();
    assert_eq!(first_ids, second_ids);
    assert_eq!(first.returned_count, second.returned_count);
    assert_eq!(first.filtered_count, second.filtered_count);
    assert_eq!(first.total_examined, second.total_examined);
}

#[tokio::test]
async fn disabled_agent_is_denied_context() {
    let (_adapter, ks, builder) = stack();
    ks.disable(&AgentId::from("a"), "admin", "incident").await.unwrap();

    let err = builder.build(request("a")).await.unwrap_err();
    assert!(matches!(err, amg_context::ContextError::AgentDisabled(_)));
}

#[tokio::test]
async fn empty_agent_id_is_rejected() {
    let (_adapter, _ks, builder) = stack();
    let err = builder.build(request("")).await.unwrap_err();
    assert!(matches!(err, amg_context::ContextError::PolicyEnforcement(_)));
}
