use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;

use amg_context::ContextRequest;
use amg_core::AgentId;
use amg_storage::QueryFilters;

use crate::auth::CallerIdentity;
use crate::error::ServerError;
use crate::state::AppState;

use super::schemas::{ContextBuildRequest, ContextBuildResponse, ContextMetadata, MemoryView};

/// `POST /context/build`: the governed read path callers use to assemble an
/// agent's working context.
#[utoipa::path(
    post,
    path = "/context/build",
    tag = "Context",
    request_body = ContextBuildRequest,
    responses(
        (status = 200, description = "Built context", body = ContextBuildResponse),
        (status = 423, description = "Agent disabled"),
        (status = 400, description = "Bad field"),
    )
)]
pub async fn build_context(
    State(state): State<AppState>,
    _caller: CallerIdentity,
    Json(body): Json<ContextBuildRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let request = ContextRequest {
        agent_id: AgentId::from(body.agent_id.as_str()),
        filters: QueryFilters {
            memory_types: body.memory_types,
            sensitivity: None,
            scope: None,
            embedding: None,
            limit: None,
        },
        max_items: body.max_items,
        max_tokens: body.max_tokens,
        request_id: None,
    };

    let context = state.context_builder.build(request).await?;

    Ok(Json(ContextBuildResponse {
        memories: context.memories.iter().map(MemoryView::from).collect(),
        metadata: ContextMetadata {
            returned_count: context.returned_count,
            filtered_count: context.filtered_count,
            total_examined: context.total_examined,
            token_count: context.token_count,
            policy_version: context.policy_version,
            truncated_by_token_budget: context.truncated_by_token_budget,
            audit_id: context.audit_id.to_string(),
        },
    }))
}
