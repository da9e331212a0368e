use std::sync::Arc;

use crate::agents::AgentRunner;
use crate::chat::confirm::WriteConfirmer;
use crate::chat::session::SessionStore;
use crate::store::CareerStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// `None` when no database is configured or reachable.
    pub store: Option<Arc<dyn CareerStore>>,
    /// `None` when AI is disabled; `/chat` then answers 503.
    pub agents: Option<Arc<dyn AgentRunner>>,
    pub confirmer: Arc<WriteConfirmer>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn ai_enabled(&self) -> bool {
        self.agents.is_some()
    }
}
