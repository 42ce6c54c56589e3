pub mod error;
pub mod record;
pub mod store;

pub use error::AuditError;
pub use record::{AuditPage, AuditQuery, AuditRecordBuilder};
pub use store::AuditStore;
