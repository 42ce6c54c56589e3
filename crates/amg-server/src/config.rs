use std::collections::HashMap;

use amg_core::AgentId;

/// Server configuration, loaded entirely from the environment: no TOML
/// file, matching this control plane's thin HTTP mapping over the
/// governance crates.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `sha-less` raw-key lookup: `AMG_API_KEYS="key1:agent1,key2:agent2"`.
    /// Keys are compared verbatim; this is a reference deployment, not a
    /// secrets-management system.
    pub api_keys: HashMap<String, AgentId>,
    /// `AMG_AUTH_DISABLED=true` accepts any `X-API-Key` value as the
    /// caller's identity, for local development and tests.
    pub auth_disabled: bool,
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Build a [`ServerConfig`] from the process environment.
    ///
    /// # Errors
    /// Returns an error string if `AMG_PORT` is present but not a valid
    /// `u16`.
    pub fn from_env() -> Result<Self, String> {
        let api_keys = std::env::var("AMG_API_KEYS")
            .ok()
            .map(|raw| parse_api_keys(&raw))
            .unwrap_or_default();
        let auth_disabled = std::env::var("AMG_AUTH_DISABLED")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let host = std::env::var("AMG_HOST").unwrap_or_else(|_| "0.0.0.0".to_owned());
        let port = std::env::var("AMG_PORT")
            .ok()
            .map(|p| p.parse::<u16>().map_err(|e| format!("invalid AMG_PORT: {e}")))
            .transpose()?
            .unwrap_or(8080);

        Ok(Self {
            api_keys,
            auth_disabled,
            host,
            port,
        })
    }
}

fn parse_api_keys(raw: &str) -> HashMap<String, AgentId> {
    raw.split(',')
        .filter_map(|entry| entry.split_once(':'))
        .map(|(key, agent)| (key.trim().to_owned(), AgentId::from(agent.trim())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multiple_key_agent_pairs() {
        let keys = parse_api_keys("key1:agent1,key2:agent2");
        assert_eq!(keys.get("key1").unwrap().as_str(), "agent1");
        assert_eq!(keys.get("key2").unwrap().as_str(), "agent2");
    }

    #[test]
    fn ignores_malformed_entries() {
        let keys = parse_api_keys("bad-entry,key1:agent1");
        assert_eq!(keys.len(), 1);
    }
}
