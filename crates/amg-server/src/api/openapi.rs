use utoipa::OpenApi;

use super::schemas::{
    AgentActionRequest, AgentActionResponse, AgentStatusResponse, AuditExportParams,
    AuditExportResponse, ContextBuildRequest, ContextBuildResponse, ContextMetadata,
    HealthResponse, MemoryView, QueryMemoryRequest, QueryMemoryResponse, QueryMetadata,
    WriteMemoryRequest, WriteMemoryResponse,
};
use super::{agent, audit, context, health, memory};

#[derive(OpenApi)]
#[openapi(
    paths(
        memory::write_memory,
        memory::query_memory,
        context::build_context,
        agent::disable,
        agent::freeze,
        agent::enable,
        agent::status,
        audit::export,
        health::health,
    ),
    components(schemas(
        WriteMemoryRequest,
        WriteMemoryResponse,
        QueryMemoryRequest,
        QueryMemoryResponse,
        QueryMetadata,
        MemoryView,
        ContextBuildRequest,
        ContextBuildResponse,
        ContextMetadata,
        AgentActionRequest,
        AgentActionResponse,
        AgentStatusResponse,
        AuditExportParams,
        AuditExportResponse,
        HealthResponse,
    )),
    tags(
        (name = "Memory", description = "Write and query governed memories"),
        (name = "Context", description = "Assemble a governed retrieval context"),
        (name = "Agent", description = "Kill-switch transitions and status"),
        (name = "Audit", description = "Audit log export"),
        (name = "Health", description = "Process and backend liveness"),
    )
)]
pub struct ApiDoc;
