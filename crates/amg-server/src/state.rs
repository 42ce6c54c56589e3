use std::sync::Arc;

use amg_context::GovernedContextBuilder;
use amg_killswitch::KillSwitch;
use amg_policy::PolicyEngine;
use amg_storage::StorageAdapter;

use crate::config::ServerConfig;

/// Shared application state passed to every handler. Constructed once per
/// process: no module-level mutable singletons.
#[derive(Clone)]
pub struct AppState {
    pub adapter: Arc<dyn StorageAdapter>,
    pub kill_switch: Arc<KillSwitch>,
    pub policy: Arc<PolicyEngine>,
    pub context_builder: Arc<GovernedContextBuilder>,
    pub config: Arc<ServerConfig>,
}
