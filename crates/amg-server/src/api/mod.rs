pub mod agent;
pub mod audit;
pub mod context;
pub mod health;
pub mod memory;
pub mod openapi;
pub mod schemas;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;
use openapi::ApiDoc;

/// Assemble the full HTTP router: the nine endpoints the governor exposes,
/// Swagger UI for the derived OpenAPI document, and the ambient
/// tracing/CORS layers every request passes through.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/memory/write", post(memory::write_memory))
        .route("/memory/query", post(memory::query_memory))
        .route("/context/build", post(context::build_context))
        .route("/agent/{id}/disable", post(agent::disable))
        .route("/agent/{id}/freeze", post(agent::freeze))
        .route("/agent/{id}/enable", post(agent::enable))
        .route("/agent/{id}/status", get(agent::status))
        .route("/audit/export", get(audit::export))
        .route("/health", get(health::health))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
