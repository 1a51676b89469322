use std::sync::Arc;

use crate::analysis::orchestrator::NarrativeGenerator;
use crate::config::Config;
use crate::session::registry::SessionRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Live sessions. Each session owns its own history and learning state.
    pub sessions: SessionRegistry,
    /// Pluggable narrative backend. Default: the Anthropic `LlmClient`.
    pub generator: Arc<dyn NarrativeGenerator>,
    pub config: Config,
}
