use amg_core::{AgentState, MemoryType, Scope, Sensitivity};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct WriteMemoryRequest {
    pub agent_id: String,
    pub content: String,
    pub memory_type: MemoryType,
    pub sensitivity: Sensitivity,
    pub scope: Option<Scope>,
    pub ttl_seconds: Option<i64>,
    pub embedding: Option<Vec<f32>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WriteMemoryResponse {
    pub memory_id: String,
    pub audit_id: String,
    pub decision: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct QueryMemoryRequest {
    pub agent_id: String,
    pub memory_types: Option<Vec<MemoryType>>,
    pub sensitivity: Option<Vec<Sensitivity>>,
    pub scope: Option<Scope>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MemoryView {
    pub memory_id: String,
    pub agent_id: String,
    pub content: String,
    pub memory_type: MemoryType,
    pub sensitivity: Sensitivity,
    pub scope: Scope,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

impl From<&amg_core::Memory> for MemoryView {
    fn from(memory: &amg_core::Memory) -> Self {
        Self {
            memory_id: memory.memory_id.to_string(),
            agent_id: memory.agent_id.to_string(),
            content: memory.content.clone(),
            memory_type: memory.policy.memory_type,
            sensitivity: memory.policy.sensitivity,
            scope: memory.policy.scope,
            created_at: memory.created_at,
            expires_at: memory.expires_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QueryMetadata {
    pub total: u64,
    pub filtered: u64,
    pub audit_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QueryMemoryResponse {
    pub memories: Vec<MemoryView>,
    pub metadata: QueryMetadata,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ContextBuildRequest {
    pub agent_id: String,
    pub memory_types: Option<Vec<MemoryType>>,
    pub max_tokens: u32,
    pub max_items: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContextMetadata {
    pub returned_count: u64,
    pub filtered_count: u64,
    pub total_examined: u64,
    pub token_count: u32,
    pub policy_version: String,
    pub truncated_by_token_budget: bool,
    pub audit_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContextBuildResponse {
    pub memories: Vec<MemoryView>,
    pub metadata: ContextMetadata,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AgentActionRequest {
    pub reason: String,
    pub actor_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AgentActionResponse {
    pub state: AgentState,
    pub audit_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AgentStatusResponse {
    pub state: AgentState,
    pub memory_write: amg_core::MemoryWriteCapability,
    pub disabled_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuditExportParams {
    pub agent_id: Option<String>,
    pub start_date: Option<chrono::DateTime<chrono::Utc>>,
    pub end_date: Option<chrono::DateTime<chrono::Utc>>,
    pub operation: Option<amg_core::Operation>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuditExportResponse {
    pub records: Vec<amg_core::AuditRecord>,
    pub count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
