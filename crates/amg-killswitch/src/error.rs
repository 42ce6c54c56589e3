use thiserror::Error;

#[derive(Debug, Error)]
pub enum KillSwitchError {
    #[error("audit error: {0}")]
    Audit(#[from] amg_audit::AuditError),
}
