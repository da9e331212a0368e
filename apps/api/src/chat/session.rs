use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use uuid::Uuid;

use crate::chat::pending::ConversationKey;

/// Messages kept per conversation; older ones are dropped first.
pub const MAX_HISTORY_MESSAGES: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

/// In-process chat history. Lost on restart, like pending writes.
#[derive(Debug, Default)]
pub struct SessionStore {
    histories: Mutex<HashMap<ConversationKey, Vec<Turn>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self, key: &ConversationKey) -> Vec<Turn> {
        self.lock().get(key).cloned().unwrap_or_default()
    }

    /// Appends the user's message and the agent's replies.
    pub fn record(&self, key: &ConversationKey, message: &str, replies: &[String]) {
        let mut histories = self.lock();
        let turns = histories.entry(key.clone()).or_default();
        turns.push(Turn {
            role: Role::User,
            text: message.to_string(),
        });
        turns.extend(replies.iter().map(|r| Turn {
            role: Role::Assistant,
            text: r.clone(),
        }));
        if turns.len() > MAX_HISTORY_MESSAGES {
            let excess = turns.len() - MAX_HISTORY_MESSAGES;
            turns.drain(..excess);
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ConversationKey, Vec<Turn>>> {
        self.histories.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Returns the caller's session id, or a fresh one when it is blank.
pub fn resolve_session_id(requested: &str) -> String {
    let requested = requested.trim();
    if requested.is_empty() {
        Uuid::new_v4().to_string()
    } else {
        requested.to_string()
    }
}
