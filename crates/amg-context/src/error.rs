use thiserror::Error;

/// Errors surfaced by [`crate::builder::GovernedContextBuilder::build`].
/// Structural faults (`Storage`, `KillSwitch`) propagate from the layers
/// beneath; `PolicyEnforcement`/`AgentDisabled` are the builder's own
/// decisions.
#[derive(Debug, Error)]
pub enum ContextError {
    /// Step 1: `agent_id` was empty.
    #[error("policy enforcement: {0}")]
    PolicyEnforcement(String),

    /// Step 2: the kill-switch denied the read.
    #[error("agent disabled: {0}")]
    AgentDisabled(String),

    #[error("storage error: {0}")]
    Storage(#[from] amg_storage::StorageError),

    #[error("kill-switch error: {0}")]
    KillSwitch(#[from] amg_killswitch::KillSwitchError),
}
