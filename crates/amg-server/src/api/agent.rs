use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;

use amg_core::AgentId;

use crate::auth::CallerIdentity;
use crate::error::ServerError;
use crate::state::AppState;

use super::schemas::{AgentActionRequest, AgentActionResponse, AgentStatusResponse};

/// `POST /agent/{id}/disable`.
#[utoipa::path(
    post,
    path = "/agent/{id}/disable",
    tag = "Agent",
    params(("id" = String, Path)),
    request_body = AgentActionRequest,
    responses((status = 200, description = "Agent disabled", body = AgentActionResponse))
)]
pub async fn disable(
    State(state): State<AppState>,
    Path(id): Path<String>,
    _caller: CallerIdentity,
    Json(body): Json<AgentActionRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let agent_id = AgentId::from(id.as_str());
    let record = state
        .kill_switch
        .disable(&agent_id, &body.actor_id, &body.reason)
        .await?;
    Ok(Json(AgentActionResponse {
        state: amg_core::AgentState::Disabled,
        audit_id: record.audit_id.to_string(),
    }))
}

/// `POST /agent/{id}/freeze`.
#[utoipa::path(
    post,
    path = "/agent/{id}/freeze",
    tag = "Agent",
    params(("id" = String, Path)),
    request_body = AgentActionRequest,
    responses((status = 200, description = "Agent frozen", body = AgentActionResponse))
)]
pub async fn freeze(
    State(state): State<AppState>,
    Path(id): Path<String>,
    _caller: CallerIdentity,
    Json(body): Json<AgentActionRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let agent_id = AgentId::from(id.as_str());
    let record = state
        .kill_switch
        .freeze_writes(&agent_id, &body.actor_id, &body.reason)
        .await?;
    Ok(Json(AgentActionResponse {
        state: amg_core::AgentState::Frozen,
        audit_id: record.audit_id.to_string(),
    }))
}

/// `POST /agent/{id}/enable`.
#[utoipa::path(
    post,
    path = "/agent/{id}/enable",
    tag = "Agent",
    params(("id" = String, Path)),
    request_body = AgentActionRequest,
    responses((status = 200, description = "Agent enabled", body = AgentActionResponse))
)]
pub async fn enable(
    State(state): State<AppState>,
    Path(id): Path<String>,
    _caller: CallerIdentity,
    Json(body): Json<AgentActionRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let agent_id = AgentId::from(id.as_str());
    let record = state
        .kill_switch
        .enable(&agent_id, &body.actor_id, &body.reason)
        .await?;
    Ok(Json(AgentActionResponse {
        state: amg_core::AgentState::Enabled,
        audit_id: record.audit_id.to_string(),
    }))
}

/// `GET /agent/{id}/status`.
#[utoipa::path(
    get,
    path = "/agent/{id}/status",
    tag = "Agent",
    params(("id" = String, Path)),
    responses((status = 200, description = "Agent status", body = AgentStatusResponse))
)]
pub async fn status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    _caller: CallerIdentity,
) -> impl IntoResponse {
    let agent_id = AgentId::from(id.as_str());
    let status = state.kill_switch.get_status(&agent_id);
    let disabled_at = if status.state == amg_core::AgentState::Disabled {
        status.transitioned_at
    } else {
        None
    };
    Json(AgentStatusResponse {
        state: status.state,
        memory_write: status.memory_write,
        disabled_at,
    })
}
