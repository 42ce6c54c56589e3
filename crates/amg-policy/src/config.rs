use std::collections::HashMap;

use amg_core::{Scope, Sensitivity};

/// Frozen retention-and-defaults configuration the [`crate::engine::PolicyEngine`]
/// decides against. Replacing the configuration means constructing a new
/// engine with a bumped `policy_version`; a `PolicyConfig` value itself is
/// never mutated.
#[derive(Debug, Clone)]
pub struct PolicyConfig {
    /// `(sensitivity, scope) -> max ttl_seconds`, the retention matrix.
    /// Also the value `calculate_ttl` returns.
    retention_matrix: HashMap<(Sensitivity, Scope), i64>,
    /// Default token budget for `/context/build` when the caller omits one.
    pub default_max_tokens: u32,
    /// Default item cap for `/context/build` when the caller omits one.
    pub default_max_items: u32,
    /// PII-keyword table reserved for a future automatic sensitivity-tagging
    /// pass. Never consulted by `evaluate_write`/`evaluate_read`/
    /// `calculate_ttl` — automatic sensitivity inference is out of scope.
    pub sensitivity_tags: Vec<String>,
}

impl PolicyConfig {
    #[must_use]
    pub fn max_ttl(&self, sensitivity: Sensitivity, scope: Scope) -> i64 {
        self.retention_matrix[&(sensitivity, scope)]
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        let mut retention_matrix = HashMap::new();
        retention_matrix.insert((Sensitivity::Pii, Scope::Agent), 86_400); // 1 day
        retention_matrix.insert((Sensitivity::Pii, Scope::Tenant), 604_800); // 7 days
        retention_matrix.insert((Sensitivity::NonPii, Scope::Agent), 2_592_000); // 30 days
        retention_matrix.insert((Sensitivity::NonPii, Scope::Tenant), 7_776_000); // 90 days

        Self {
            retention_matrix,
            default_max_tokens: 4_000,
            default_max_items: 50,
            sensitivity_tags: vec![
                "ssn".to_owned(),
                "email".to_owned(),
                "phone".to_owned(),
                "credit_card".to_owned(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retention_matrix_matches_spec_table() {
        let config = PolicyConfig::default();
        assert_eq!(config.max_ttl(Sensitivity::Pii, Scope::Agent), 86_400);
        assert_eq!(config.max_ttl(Sensitivity::Pii, Scope::Tenant), 604_800);
        assert_eq!(config.max_ttl(Sensitivity::NonPii, Scope::Agent), 2_592_000);
        assert_eq!(config.max_ttl(Sensitivity::NonPii, Scope::Tenant), 7_776_000);
    }
}
