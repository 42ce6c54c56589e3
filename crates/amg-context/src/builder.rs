use std::sync::Arc;

use amg_core::Operation;
use amg_killswitch::KillSwitch;
use amg_policy::PolicyEngine;
use amg_storage::StorageAdapter;

use crate::error::ContextError;
use crate::request::{whitespace_token_count, ContextRequest, GovernedContext};

/// The single sanctioned read entry point for agent callers. Wraps a
/// concrete [`StorageAdapter`] and [`KillSwitch`] behind a read-only
/// retrieval pipeline; never imports a concrete adapter, only the trait, so
/// the layering in the workspace stays acyclic: storage and kill-switch
/// never depend back on this crate.
pub struct GovernedContextBuilder {
    adapter: Arc<dyn StorageAdapter>,
    kill_switch: Arc<KillSwitch>,
    policy: PolicyEngine,
}

impl GovernedContextBuilder {
    #[must_use]
    pub fn new(
        adapter: Arc<dyn StorageAdapter>,
        kill_switch: Arc<KillSwitch>,
        policy: PolicyEngine,
    ) -> Self {
        Self {
            adapter,
            kill_switch,
            policy,
        }
    }

    /// Run the seven-step retrieval guard and return a [`GovernedContext`].
    ///
    /// # Errors
    /// Returns [`ContextError::PolicyEnforcement`] for an empty `agent_id`,
    /// [`ContextError::AgentDisabled`] when the kill-switch denies the read,
    /// or [`ContextError::Storage`] on an adapter I/O fault.
    pub async fn build(&self, request: ContextRequest) -> Result<GovernedContext, ContextError> {
        if request.agent_id.is_empty() {
            return Err(ContextError::PolicyEnforcement("agent_id required".to_owned()));
        }

        let (allowed, reason) = self
            .kill_switch
            .check_allowed(&request.agent_id, Operation::Read);
        if !allowed {
            return Err(ContextError::AgentDisabled(reason.to_owned()));
        }

        let outcome = self
            .adapter
            .query(&request.filters, &request.agent_id, request.request_id.clone())
            .await?;

        // Ranking by embedding (step 4) and the deterministic default order
        // are both applied inside the adapter's retrieval guard, so the
        // memories here already arrive in their final candidate order.
        let mut token_count = 0u32;
        let mut truncated_by_token_budget = false;
        let mut selected = Vec::new();
        for memory in outcome.memories {
            let item_tokens = whitespace_token_count(&memory.content) + 10;
            if token_count + item_tokens > request.max_tokens {
                truncated_by_token_budget = true;
                break;
            }
            token_count += item_tokens;
            selected.push(memory);
        }

        selected.truncate(request.max_items as usize);

        tracing::debug!(
            agent_id = %request.agent_id,
            returned_count = selected.len(),
            total_examined = outcome.total_examined,
            truncated_by_token_budget,
            "context built"
        );

        Ok(GovernedContext {
            returned_count: selected.len() as u64,
            memories: selected,
            audit_id: outcome.audit_record.audit_id,
            filtered_count: outcome.filtered_count,
            total_examined: outcome.total_examined,
            token_count,
            policy_version: self.policy.policy_version().to_owned(),
            truncated_by_token_budget,
        })
    }
}
