use axum::Json;
use axum::extract::{Query, State};
use axum::response::IntoResponse;

use amg_audit::AuditQuery;

use crate::auth::CallerIdentity;
use crate::error::ServerError;
use crate::state::AppState;

use super::schemas::{AuditExportParams, AuditExportResponse};

/// `GET /audit/export`: chronologically descending, append-only export of
/// the audit log.
#[utoipa::path(
    get,
    path = "/audit/export",
    tag = "Audit",
    params(AuditExportParams),
    responses((status = 200, description = "Audit export", body = AuditExportResponse))
)]
pub async fn export(
    State(state): State<AppState>,
    _caller: CallerIdentity,
    Query(params): Query<AuditExportParams>,
) -> Result<impl IntoResponse, ServerError> {
    let query = AuditQuery {
        agent_id: params.agent_id,
        operation: params.operation,
        request_id: None,
        start: params.start_date,
        end: params.end_date,
        limit: params.limit,
        offset: None,
    };

    let page = state.adapter.get_audit_log(query).await?;

    Ok(Json(AuditExportResponse {
        count: page.records.len() as u64,
        records: page.records,
    }))
}
