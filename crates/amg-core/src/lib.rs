pub mod agent;
pub mod audit;
pub mod error;
pub mod memory;
pub mod types;

pub use agent::{AgentStatus, MemoryWriteCapability};
pub use audit::{AuditRecord, SignedFields};
pub use error::AmgError;
pub use memory::{Memory, MemoryPolicy};
pub use types::{
    AgentId, AgentState, AuditId, Decision, MemoryId, MemoryType, Operation, RequestId, Scope,
    Sensitivity,
};
