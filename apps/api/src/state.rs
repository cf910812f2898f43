use std::sync::Arc;

use crate::config::Config;
use crate::gateway::AiGateway;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    /// Generative-AI backend. Default: GeminiGateway. Tests swap in a scripted mock.
    pub gateway: Arc<dyn AiGateway>,
    pub config: Config,
}
