//! Career agents: the hosted-model side of chat.
//!
//! A root coordinator and four specialists (jobs, coding, projects,
//! networking). The chat handler only sees the `AgentRunner` trait, so tests
//! swap in a scripted runner and production uses `LlmAgentRunner`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::chat::session::Turn;
use crate::llm_client::LlmError;

pub mod llm;
pub mod prompts;
pub mod routing;

pub use llm::LlmAgentRunner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Root,
    Jobs,
    Coding,
    Projects,
    Networking,
}

impl AgentKind {
    /// Parses the `agent` field of a chat request ("jobs", "coding", ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "root" => Some(AgentKind::Root),
            "jobs" => Some(AgentKind::Jobs),
            "coding" => Some(AgentKind::Coding),
            "projects" => Some(AgentKind::Projects),
            "networking" => Some(AgentKind::Networking),
            _ => None,
        }
    }

    pub fn agent_name(&self) -> &'static str {
        match self {
            AgentKind::Root => "root_agent",
            AgentKind::Jobs => "job_applications_agent",
            AgentKind::Coding => "coding_agent",
            AgentKind::Projects => "projects_agent",
            AgentKind::Networking => "networking_agent",
        }
    }
}

/// Runs one conversational turn and returns the agent's reply fragments in order.
#[async_trait]
pub trait AgentRunner: Send + Sync {
    async fn run(
        &self,
        agent: AgentKind,
        history: &[Turn],
        message: &str,
    ) -> Result<Vec<String>, LlmError>;
}
