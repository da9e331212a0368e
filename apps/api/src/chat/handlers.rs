use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::agents::routing::select_agent;
use crate::chat::pending::ConversationKey;
use crate::chat::session::resolve_session_id;
use crate::errors::AppError;
use crate::routes::{with_deadline, CHAT_TIMEOUT};
use crate::state::AppState;

pub const DEFAULT_USER_ID: &str = "demo_user";
pub const AI_DISABLED_MESSAGE: &str = "ai disabled: set ENABLE_AI=true to enable chat";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChatRequest {
    pub user_id: String,
    pub session_id: String,
    pub message: String,
    /// `jobs`, `coding`, `projects`, `networking`, or empty/`auto` for routing.
    pub agent: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub replies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// POST /chat
pub async fn handle_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ChatResponse>), AppError> {
    let Some(agents) = state.agents.clone() else {
        return Ok((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ChatResponse {
                session_id: String::new(),
                replies: Vec::new(),
                error: Some(AI_DISABLED_MESSAGE.to_string()),
            }),
        ));
    };

    let Json(req) = payload?;
    if req.message.trim().is_empty() {
        return Err(AppError::Validation("message is required".to_string()));
    }

    let user_id = match req.user_id.trim() {
        "" => DEFAULT_USER_ID.to_string(),
        id => id.to_string(),
    };
    let session_id = resolve_session_id(&req.session_id);
    let key = ConversationKey::new(user_id, session_id.clone());
    let routed = select_agent(&req.agent, &req.message);
    info!(
        user = %key.user_id,
        session = %key.session_id,
        agent = routed.agent.agent_name(),
        "Chat request"
    );

    let respond = |replies: Vec<String>| -> Result<(StatusCode, Json<ChatResponse>), AppError> {
        Ok((
            StatusCode::OK,
            Json(ChatResponse {
                session_id: session_id.clone(),
                replies,
                error: None,
            }),
        ))
    };

    if let Some(reply) = state
        .confirmer
        .try_handle_as_confirmation(&key, &req.message, state.store.as_deref())
        .await
    {
        return respond(vec![reply]);
    }

    let history = state.sessions.history(&key);
    let replies = with_deadline(CHAT_TIMEOUT, async {
        agents
            .run(routed.agent, &history, &routed.message)
            .await
            .map_err(AppError::from)
    })
    .await?;
    state.sessions.record(&key, &routed.message, &replies);

    match state.confirmer.capture_write(&key, &replies) {
        Some(prompt) => respond(vec![prompt]),
        None => respond(replies),
    }
}
