use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AgentId, AgentState};

/// Current kill-switch state for an agent, as surfaced by
/// `GET /agent/{id}/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AgentStatus {
    pub agent_id: AgentId,
    pub state: AgentState,
    /// Derived write-capability label matching `kill_switch.py`'s
    /// `get_status`: `"allowed"` when enabled, `"frozen"` when frozen,
    /// `"blocked"` when disabled.
    pub memory_write: MemoryWriteCapability,
    pub transitioned_at: Option<DateTime<Utc>>,
    pub actor_id: Option<String>,
    pub reason: Option<String>,
}

/// Write capability implied by an agent's current kill-switch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum MemoryWriteCapability {
    Allowed,
    Frozen,
    Blocked,
}

impl From<AgentState> for MemoryWriteCapability {
    fn from(state: AgentState) -> Self {
        match state {
            AgentState::Enabled => Self::Allowed,
            AgentState::Frozen => Self::Frozen,
            AgentState::Disabled => Self::Blocked,
        }
    }
}

impl AgentStatus {
    /// Build the default status for an agent never observed by the
    /// kill-switch: `enabled`, no transition history.
    #[must_use]
    pub fn default_for(agent_id: impl Into<AgentId>) -> Self {
        Self {
            agent_id: agent_id.into(),
            state: AgentState::Enabled,
            memory_write: MemoryWriteCapability::Allowed,
            transitioned_at: None,
            actor_id: None,
            reason: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_is_enabled_and_allowed() {
        let status = AgentStatus::default_for("agent-1");
        assert_eq!(status.state, AgentState::Enabled);
        assert_eq!(status.memory_write, MemoryWriteCapability::Allowed);
    }

    #[test]
    fn write_capability_maps_from_state() {
        assert_eq!(
            MemoryWriteCapability::from(AgentState::Frozen),
            MemoryWriteCapability::Frozen
        );
        assert_eq!(
            MemoryWriteCapability::from(AgentState::Disabled),
            MemoryWriteCapability::Blocked
        );
    }
}
