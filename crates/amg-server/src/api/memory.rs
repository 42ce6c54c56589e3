use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;

use amg_audit::AuditRecordBuilder;
use amg_core::{AgentId, Decision, Memory, MemoryPolicy, Operation};
use amg_storage::{QueryFilters, StorageAdapter};

use crate::auth::CallerIdentity;
use crate::error::ServerError;
use crate::state::AppState;

use super::schemas::{
    MemoryView, QueryMemoryRequest, QueryMemoryResponse, QueryMetadata, WriteMemoryRequest,
    WriteMemoryResponse,
};

/// `POST /memory/write`.
#[utoipa::path(
    post,
    path = "/memory/write",
    tag = "Memory",
    request_body = WriteMemoryRequest,
    responses(
        (status = 200, description = "Memory written", body = WriteMemoryResponse),
        (status = 423, description = "Agent disabled"),
        (status = 403, description = "Policy violation"),
        (status = 400, description = "Bad field"),
    )
)]
pub async fn write_memory(
    State(state): State<AppState>,
    _caller: CallerIdentity,
    Json(body): Json<WriteMemoryRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let agent_id = AgentId::from(body.agent_id.as_str());

    let (allowed, reason) = state.kill_switch.check_allowed(&agent_id, Operation::Write);
    if !allowed {
        return Err(ServerError::AgentDisabled(reason.to_owned()));
    }

    let scope = body.scope.unwrap_or(amg_core::Scope::Agent);
    let ttl_seconds = body
        .ttl_seconds
        .unwrap_or_else(|| state.policy.calculate_ttl(body.sensitivity, scope));

    let policy = MemoryPolicy::new(body.memory_type, body.sensitivity, scope, ttl_seconds)
        .map_err(|e| ServerError::InvalidArgument(e.to_string()))?;
    let memory = Memory::new(agent_id.clone(), body.content, body.embedding, policy, agent_id.clone())
        .map_err(|e| ServerError::InvalidArgument(e.to_string()))?;

    let decision = state.policy.evaluate_write(&memory, &agent_id);
    if !decision.is_allowed() {
        let denied_record = AuditRecordBuilder::new(
            agent_id.as_str(),
            Operation::Write,
            Decision::Denied,
            decision.reason,
            agent_id.as_str(),
        )
        .with_memory_id(memory.memory_id.clone())
        .build()
        .map_err(|e| ServerError::Storage(amg_storage::StorageError::Audit(e)))?;
        state.adapter.write_audit_record(denied_record).await?;
        return Err(ServerError::PolicyViolation(decision.reason.to_owned()));
    }

    let (memory, record) = state.adapter.write(memory, None).await?;

    Ok(Json(WriteMemoryResponse {
        memory_id: memory.memory_id.to_string(),
        audit_id: record.audit_id.to_string(),
        decision: record.decision.to_string(),
    }))
}

/// `POST /memory/query`.
#[utoipa::path(
    post,
    path = "/memory/query",
    tag = "Memory",
    request_body = QueryMemoryRequest,
    responses(
        (status = 200, description = "Query results", body = QueryMemoryResponse),
        (status = 403, description = "Policy violation"),
        (status = 400, description = "Bad field"),
    )
)]
pub async fn query_memory(
    State(state): State<AppState>,
    _caller: CallerIdentity,
    Json(body): Json<QueryMemoryRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let agent_id = AgentId::from(body.agent_id.as_str());

    let (allowed, reason) = state.kill_switch.check_allowed(&agent_id, Operation::Query);
    if !allowed {
        return Err(ServerError::AgentDisabled(reason.to_owned()));
    }

    let filters = QueryFilters {
        memory_types: body.memory_types,
        sensitivity: body.sensitivity,
        scope: body.scope,
        embedding: None,
        limit: body.limit,
    };

    let outcome = state.adapter.query(&filters, &agent_id, None).await?;

    Ok(Json(QueryMemoryResponse {
        memories: outcome.memories.iter().map(MemoryView::from).collect(),
        metadata: QueryMetadata {
            total: outcome.total_examined,
            filtered: outcome.filtered_count,
            audit_id: outcome.audit_record.audit_id.to_string(),
        },
    }))
}
