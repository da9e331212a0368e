use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::writes::WritePayload;

/// Identifies one conversation: the pending-write slot and the chat history are keyed by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversationKey {
    pub user_id: String,
    pub session_id: String,
}

impl ConversationKey {
    pub fn new(user_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            session_id: session_id.into(),
        }
    }
}

/// A write suggestion awaiting the user's yes/no.
#[derive(Debug, Clone)]
pub struct PendingWrite {
    pub payload: WritePayload,
    pub raw_json: String,
    pub summary: String,
    pub created_at: Instant,
}

impl PendingWrite {
    pub fn new(payload: WritePayload, raw_json: String, summary: String) -> Self {
        Self {
            payload,
            raw_json,
            summary,
            created_at: Instant::now(),
        }
    }
}

/// One pending write per conversation, shared by all request handlers.
///
/// The lock is held only for the map operation itself, never across an await.
/// With a `ttl`, entries older than it read as absent and are dropped on lookup.
#[derive(Debug, Default)]
pub struct PendingWrites {
    items: Mutex<HashMap<ConversationKey, PendingWrite>>,
    ttl: Option<Duration>,
}

impl PendingWrites {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            items: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Stores `entry`, replacing whatever was pending for `key`.
    pub fn put(&self, key: ConversationKey, entry: PendingWrite) {
        self.lock().insert(key, entry);
    }

    pub fn get(&self, key: &ConversationKey) -> Option<PendingWrite> {
        let mut items = self.lock();
        self.drop_if_expired(&mut items, key);
        items.get(key).cloned()
    }

    /// Removes and returns the entry for `key` in one critical section, so
    /// only one caller can ever resolve a given pending write.
    pub fn take(&self, key: &ConversationKey) -> Option<PendingWrite> {
        let mut items = self.lock();
        self.drop_if_expired(&mut items, key);
        items.remove(key)
    }

    /// Removes the entry for `key`; returns whether there was one.
    pub fn delete(&self, key: &ConversationKey) -> bool {
        self.lock().remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn drop_if_expired(
        &self,
        items: &mut HashMap<ConversationKey, PendingWrite>,
        key: &ConversationKey,
    ) {
        let Some(ttl) = self.ttl else {
            return;
        };
        if items
            .get(key)
            .is_some_and(|entry| entry.created_at.elapsed() > ttl)
        {
            items.remove(key);
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ConversationKey, PendingWrite>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
