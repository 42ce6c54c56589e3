use amg_core::{AgentId, AuditId, RequestId};
use amg_storage::QueryFilters;

/// Input to [`crate::builder::GovernedContextBuilder::build`].
#[derive(Debug, Clone)]
pub struct ContextRequest {
    pub agent_id: AgentId,
    pub filters: QueryFilters,
    pub max_items: u32,
    pub max_tokens: u32,
    pub request_id: Option<RequestId>,
}

/// Diagnostic-complete result of a context build: the memories a caller may
/// actually use, plus enough counters to explain why anything was left out.
#[derive(Debug, Clone)]
pub struct GovernedContext {
    pub memories: Vec<amg_core::Memory>,
    pub audit_id: AuditId,
    pub returned_count: u64,
    pub filtered_count: u64,
    pub total_examined: u64,
    pub token_count: u32,
    pub policy_version: String,
    pub truncated_by_token_budget: bool,
}

/// Approximate token count: whitespace-separated words plus a fixed
/// per-item overhead, matching the builder's budget accounting.
#[must_use]
pub fn whitespace_token_count(content: &str) -> u32 {
    content.split_whitespace().count() as u32
}
