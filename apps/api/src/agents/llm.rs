use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use crate::agents::{prompts, AgentKind, AgentRunner};
use crate::chat::session::{Role, Turn};
use crate::llm_client::prompts::NO_DATA_NOTICE;
use crate::llm_client::{ChatMessage, LlmClient, LlmError};
use crate::store::{CareerStore, StoreError};

/// Rows shown to a specialist per call.
pub const CONTEXT_ROW_LIMIT: i64 = 10;

/// `AgentRunner` backed by the hosted model. Specialists see the user's
/// recent rows for their area appended to the system prompt.
pub struct LlmAgentRunner {
    llm: LlmClient,
    store: Option<Arc<dyn CareerStore>>,
}

impl LlmAgentRunner {
    pub fn new(llm: LlmClient, store: Option<Arc<dyn CareerStore>>) -> Self {
        Self { llm, store }
    }

    async fn system_prompt(&self, agent: AgentKind) -> String {
        let mut prompt = prompts::instructions(agent);
        if let Some(context) = self.recent_context(agent).await {
            prompt.push_str("\n\n");
            prompt.push_str(&context);
        }
        prompt
    }

    async fn recent_context(&self, agent: AgentKind) -> Option<String> {
        if agent == AgentKind::Root {
            return None;
        }
        let Some(store) = &self.store else {
            return Some(NO_DATA_NOTICE.to_string());
        };

        let rendered: Result<String, StoreError> = match agent {
            AgentKind::Jobs => store
                .recent_jobs(CONTEXT_ROW_LIMIT)
                .await
                .map(|rows| render_rows("job applications", &rows)),
            AgentKind::Coding => store
                .recent_coding(CONTEXT_ROW_LIMIT)
                .await
                .map(|rows| render_rows("coding problems", &rows)),
            AgentKind::Projects => store
                .recent_projects(CONTEXT_ROW_LIMIT)
                .await
                .map(|rows| render_rows("projects", &rows)),
            AgentKind::Networking => store
                .recent_contacts(CONTEXT_ROW_LIMIT)
                .await
                .map(|rows| render_rows("networking contacts", &rows)),
            AgentKind::Root => return None,
        };

        match rendered {
            Ok(context) => Some(context),
            Err(e) => {
                warn!("Failed to load context for {}: {e}", agent.agent_name());
                Some(NO_DATA_NOTICE.to_string())
            }
        }
    }
}

#[async_trait]
impl AgentRunner for LlmAgentRunner {
    async fn run(
        &self,
        agent: AgentKind,
        history: &[Turn],
        message: &str,
    ) -> Result<Vec<String>, LlmError> {
        let system = self.system_prompt(agent).await;
        let messages = build_messages(history, message);
        debug!(
            agent = agent.agent_name(),
            messages = messages.len(),
            "Dispatching chat turn"
        );

        let response = self.llm.call(&system, &messages).await?;
        let texts = response.texts();
        if texts.is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(texts)
    }
}

fn render_rows<T: Serialize>(label: &str, rows: &[T]) -> String {
    if rows.is_empty() {
        return format!("The user has no {label} recorded yet.");
    }
    let body = serde_json::to_string_pretty(rows).unwrap_or_default();
    format!("The user's recent {label} (most recent first):\n{body}")
}

/// Converts stored turns plus the new message into the alternating
/// user/assistant sequence the messages API expects. Consecutive turns with
/// the same role are merged and leading assistant turns are dropped.
pub fn build_messages(history: &[Turn], message: &str) -> Vec<ChatMessage> {
    let turns = history
        .iter()
        .map(|turn| (turn.role, turn.text.as_str()))
        .chain(std::iter::once((Role::User, message)));

    let mut messages: Vec<ChatMessage> = Vec::new();
    for (role, text) in turns {
        let role = match role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        if messages.is_empty() && role == "assistant" {
            continue;
        }
        match messages.last_mut() {
            Some(last) if last.role == role => {
                last.content.push_str("\n\n");
                last.content.push_str(text);
            }
            _ => messages.push(ChatMessage {
                role,
                content: text.to_string(),
            }),
        }
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tracker::{NewRecord, Project};
    use crate::store::memory::MemoryStore;

    fn turn(role: Role, text: &str) -> Turn {
        Turn {
            role,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_build_messages_alternates_roles() {
        let history = vec![
            turn(Role::Assistant, "Welcome back"),
            turn(Role::User, "hi"),
            turn(Role::Assistant, "Hello!"),
            turn(Role::Assistant, "Anything to log?"),
        ];
        let messages = build_messages(&history, "Log a job");

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[0].content, "hi");
        assert_eq!(messages[1].role, "assistant");
        assert_eq!(messages[1].content, "Hello!\n\nAnything to log?");
        assert_eq!(messages[2].role, "user");
        assert_eq!(messages[2].content, "Log a job");
    }

    #[test]
    fn test_build_messages_merges_trailing_user_turn() {
        let history = vec![turn(Role::User, "first")];
        let messages = build_messages(&history, "second");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "first\n\nsecond");
    }

    #[test]
    fn test_render_rows_empty_and_filled() {
        let empty: Vec<i64> = Vec::new();
        assert_eq!(
            render_rows("projects", &empty),
            "The user has no projects recorded yet."
        );
        let filled = render_rows("projects", &[1, 2]);
        assert!(filled.starts_with("The user's recent projects (most recent first):\n"));
    }

    #[tokio::test]
    async fn test_recent_context_lists_specialist_rows() {
        let store = Arc::new(MemoryStore::new());
        store
            .insert(&NewRecord::Project(Project {
                name: "Compiler".into(),
                ..Default::default()
            }))
            .await
            .unwrap();

        let llm = LlmClient::new("test-key".into()).unwrap();
        let runner = LlmAgentRunner::new(llm, Some(store));

        let context = runner.recent_context(AgentKind::Projects).await.unwrap();
        assert!(context.contains("\"name\": \"Compiler\""));
        assert!(runner.recent_context(AgentKind::Root).await.is_none());

        let coding = runner.recent_context(AgentKind::Coding).await.unwrap();
        assert_eq!(coding, "The user has no coding problems recorded yet.");
    }

    #[tokio::test]
    async fn test_missing_store_uses_notice() {
        let llm = LlmClient::new("test-key".into()).unwrap();
        let runner = LlmAgentRunner::new(llm, None);
        assert_eq!(
            runner.recent_context(AgentKind::Jobs).await.as_deref(),
            Some(NO_DATA_NOTICE)
        );
    }
}
