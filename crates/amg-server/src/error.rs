use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors surfaced over HTTP: 403 policy violation, 423 agent disabled, 400
/// invalid argument, 404 not found, 5xx storage fault.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("policy violation: {0}")]
    PolicyViolation(String),

    #[error("agent disabled: {0}")]
    AgentDisabled(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("context error: {0}")]
    Context(#[from] amg_context::ContextError),

    #[error("storage error: {0}")]
    Storage(#[from] amg_storage::StorageError),

    #[error("kill-switch error: {0}")]
    KillSwitch(#[from] amg_killswitch::KillSwitchError),
}

impl From<amg_context::ContextError> for (StatusCode, String) {
    fn from(err: amg_context::ContextError) -> Self {
        match err {
            amg_context::ContextError::PolicyEnforcement(msg) => (StatusCode::BAD_REQUEST, msg),
            amg_context::ContextError::AgentDisabled(reason) => (StatusCode::LOCKED, reason),
            amg_context::ContextError::Storage(_) | amg_context::ContextError::KillSwitch(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            Self::PolicyViolation(msg) => (StatusCode::FORBIDDEN, msg),
            Self::AgentDisabled(msg) => (StatusCode::LOCKED, msg),
            Self::InvalidArgument(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Context(err) => err.into(),
            Self::Storage(err) => match err {
                amg_storage::StorageError::NotFound(id) => (StatusCode::NOT_FOUND, id),
                amg_storage::StorageError::PolicyEnforcement(e) => {
                    (StatusCode::BAD_REQUEST, e.to_string())
                }
                amg_storage::StorageError::Audit(_)
                | amg_storage::StorageError::Backend(_)
                | amg_storage::StorageError::DeadlineExceeded => {
                    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
                }
            },
            Self::KillSwitch(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
