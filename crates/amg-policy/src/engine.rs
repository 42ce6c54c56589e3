use amg_core::{AgentId, Decision, Memory};

use crate::config::PolicyConfig;

/// Result of a pure policy decision: `(decision, reason)`, not a thrown
/// error — hot-path denials are lock-free and audit-complete because
/// nothing unwinds the stack to produce them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyDecision {
    pub decision: Decision,
    pub reason: &'static str,
}

impl PolicyDecision {
    const fn allowed(reason: &'static str) -> Self {
        Self {
            decision: Decision::Allowed,
            reason,
        }
    }

    const fn denied(reason: &'static str) -> Self {
        Self {
            decision: Decision::Denied,
            reason,
        }
    }

    #[must_use]
    pub fn is_allowed(self) -> bool {
        self.decision == Decision::Allowed
    }
}

/// Pure, stateless decision function over a frozen [`PolicyConfig`] snapshot.
/// No I/O, no mutable state: evaluating the same inputs against the same
/// engine always yields the same decision.
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    config: PolicyConfig,
    policy_version: String,
}

impl PolicyEngine {
    #[must_use]
    pub fn new(config: PolicyConfig, policy_version: impl Into<String>) -> Self {
        Self {
            config,
            policy_version: policy_version.into(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    #[must_use]
    pub fn policy_version(&self) -> &str {
        &self.policy_version
    }

    /// The maximum TTL (also the nominal calculated TTL) for a
    /// `(sensitivity, scope)` pair, per the retention matrix.
    #[must_use]
    pub fn calculate_ttl(&self, sensitivity: amg_core::Sensitivity, scope: amg_core::Scope) -> i64 {
        self.config.max_ttl(sensitivity, scope)
    }

    /// `evaluate_write`: ownership, TTL validity, TTL ceiling, `allow_write`,
    /// in that order.
    #[must_use]
    pub fn evaluate_write(&self, memory: &Memory, caller_agent_id: &AgentId) -> PolicyDecision {
        if memory.agent_id != *caller_agent_id {
            return PolicyDecision::denied("agent_ownership_violation");
        }
        if memory.policy.ttl_seconds <= 0 {
            return PolicyDecision::denied("invalid_ttl");
        }
        let ceiling = self
            .config
            .max_ttl(memory.policy.sensitivity, memory.policy.scope);
        if memory.policy.ttl_seconds > ceiling {
            return PolicyDecision::denied("ttl_exceeds_policy");
        }
        if !memory.policy.allow_write {
            return PolicyDecision::denied("write_not_allowed");
        }
        PolicyDecision::allowed("all_policy_checks_passed")
    }

    /// `evaluate_read`: scope isolation, then `allow_read`.
    #[must_use]
    pub fn evaluate_read(&self, memory: &Memory, caller_agent_id: &AgentId) -> PolicyDecision {
        if memory.policy.scope == amg_core::Scope::Agent && memory.agent_id != *caller_agent_id {
            return PolicyDecision::denied("scope_isolation_violation");
        }
        if !memory.policy.allow_read {
            return PolicyDecision::denied("read_not_allowed");
        }
        PolicyDecision::allowed("all_policy_checks_passed")
    }
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self::new(PolicyConfig::default(), "1.0.0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amg_core::{MemoryPolicy, MemoryType, Scope, Sensitivity};

    fn memory(agent_id: &str, scope: Scope, sensitivity: Sensitivity, ttl: i64) -> Memory {
        let policy = MemoryPolicy::new(MemoryType::LongTerm, sensitivity, scope, ttl).unwrap();
        Memory::new(agent_id, "content", None, policy, agent_id).unwrap()
    }

    #[test]
    fn write_denies_agent_ownership_violation() {
        let engine = PolicyEngine::default();
        let mem = memory("agent-a", Scope::Agent, Sensitivity::NonPii, 3600);
        let decision = engine.evaluate_write(&mem, &AgentId::from("agent-b"));
        assert_eq!(decision.reason, "agent_ownership_violation");
        assert!(!decision.is_allowed());
    }

    #[test]
    fn write_denies_ttl_exceeding_ceiling() {
        let engine = PolicyEngine::default();
        let mem = memory("agent-a", Scope::Agent, Sensitivity::Pii, 999_999);
        let decision = engine.evaluate_write(&mem, &AgentId::from("agent-a"));
        assert_eq!(decision.reason, "ttl_exceeds_policy");
    }

    #[test]
    fn write_denies_write_not_allowed() {
        let engine = PolicyEngine::default();
        let mut mem = memory("agent-a", Scope::Agent, Sensitivity::NonPii, 3600);
        mem.policy.allow_write = false;
        let decision = engine.evaluate_write(&mem, &AgentId::from("agent-a"));
        assert_eq!(decision.reason, "write_not_allowed");
    }

    #[test]
    fn write_allows_within_ceiling() {
        let engine = PolicyEngine::default();
        let mem = memory("agent-a", Scope::Tenant, Sensitivity::NonPii, 86_400);
        let decision = engine.evaluate_write(&mem, &AgentId::from("agent-a"));
        assert!(decision.is_allowed());
    }

    #[test]
    fn read_denies_scope_isolation_violation() {
        let engine = PolicyEngine::default();
        let mem = memory("agent-a", Scope::Agent, Sensitivity::NonPii, 3600);
        let decision = engine.evaluate_read(&mem, &AgentId::from("agent-b"));
        assert_eq!(decision.reason, "scope_isolation_violation");
    }

    #[test]
    fn read_allows_tenant_scope_across_agents() {
        let engine = PolicyEngine::default();
        let mem = memory("agent-a", Scope::Tenant, Sensitivity::NonPii, 3600);
        let decision = engine.evaluate_read(&mem, &AgentId::from("agent-b"));
        assert!(decision.is_allowed());
    }

    #[test]
    fn calculate_ttl_matches_retention_matrix() {
        let engine = PolicyEngine::default();
        assert_eq!(
            engine.calculate_ttl(Sensitivity::Pii, Scope::Agent),
            86_400
        );
    }
}
