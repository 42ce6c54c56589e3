use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! newtype_string {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
        #[cfg_attr(feature = "openapi", schema(value_type = String))]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new instance from a string value.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Return the inner string as a str slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Return true when the underlying string is empty.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

newtype_string!(MemoryId, "Unique identifier for a governed memory item.");
newtype_string!(AgentId, "Identifies the agent a memory or audit event belongs to.");
newtype_string!(AuditId, "Unique identifier for an audit record.");
newtype_string!(RequestId, "Correlates a single caller request across components; sparsely populated, see DESIGN.md.");

/// Retention classification of a memory item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum MemoryType {
    /// Request-scoped only; never expected to survive past the call that created it.
    ShortTerm,
    /// Requires an explicit, policy-bounded TTL.
    LongTerm,
    /// TTL-bound and eligible for relevance decay by callers.
    Episodic,
}

/// Declared data sensitivity of a memory item. Never inferred by the governor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Sensitivity {
    /// Personally identifiable information.
    Pii,
    /// Not personally identifiable.
    NonPii,
}

/// Visibility boundary of a memory item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Visible only to the owning agent.
    Agent,
    /// Shared across every agent in the owning tenant.
    Tenant,
}

/// Outcome of a governance decision recorded in an [`crate::audit::AuditRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Allowed,
    Denied,
}

/// The operation an [`crate::audit::AuditRecord`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Write,
    Read,
    Query,
    Delete,
    Disable,
    Freeze,
    Enable,
}

/// Per-agent kill-switch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    Enabled,
    Frozen,
    Disabled,
}

impl Default for AgentState {
    fn default() -> Self {
        Self::Enabled
    }
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ShortTerm => "short_term",
            Self::LongTerm => "long_term",
            Self::Episodic => "episodic",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pii => "pii",
            Self::NonPii => "non_pii",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Agent => "agent",
            Self::Tenant => "tenant",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Allowed => "allowed",
            Self::Denied => "denied",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Write => "write",
            Self::Read => "read",
            Self::Query => "query",
            Self::Delete => "delete",
            Self::Disable => "disable",
            Self::Freeze => "freeze",
            Self::Enable => "enable",
        };
        f.write_str(s)
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Enabled => "enabled",
            Self::Frozen => "frozen",
            Self::Disabled => "disabled",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_from_str() {
        let id = AgentId::from("agent-1");
        assert_eq!(id.as_str(), "agent-1");
        assert_eq!(&*id, "agent-1");
    }

    #[test]
    fn newtype_serde_roundtrip() {
        let id = MemoryId::new("mem-123");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"mem-123\"");
        let back: MemoryId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn memory_type_wire_values() {
        assert_eq!(
            serde_json::to_string(&MemoryType::ShortTerm).unwrap(),
            "\"short_term\""
        );
        assert_eq!(
            serde_json::to_string(&MemoryType::Episodic).unwrap(),
            "\"episodic\""
        );
    }

    #[test]
    fn agent_state_default_is_enabled() {
        assert_eq!(AgentState::default(), AgentState::Enabled);
    }
}
