//! Write confirmation: the yes/no exchange between an agent suggesting a
//! write and the rows landing in the tracker.
//!
//! ```text
//!   no pending ──(agent reply holds a valid payload)──▶ awaiting confirmation
//!   awaiting ──("yes")──▶ apply, clear ──▶ no pending
//!   awaiting ──("no")───▶ clear ────────▶ no pending
//!   awaiting ──(other)──▶ re-prompt, keep entry
//! ```

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::chat::pending::{ConversationKey, PendingWrite, PendingWrites};
use crate::store::CareerStore;
use crate::writes::apply::{apply_with_timeout, APPLY_TIMEOUT};
use crate::writes::{extract_write_payload, ApplyError};

pub const DECLINE_MESSAGE: &str = "Okay, skipping the write. Let me know how else I can help.";

const AFFIRMATIVE: &[&str] = &["yes", "y", "yeah", "yep", "sure", "confirm", "ok", "okay"];
const NEGATIVE: &[&str] = &["no", "n", "nope", "nah", "cancel"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyIntent {
    Affirm,
    Decline,
    Unclear,
}

/// Classifies a reply to a confirmation prompt. Any affirmative token wins,
/// even when a negative token appears elsewhere in the message.
pub fn classify_reply(message: &str) -> ReplyIntent {
    let lowered = message.trim().to_lowercase();
    let tokens: Vec<&str> = lowered
        .split_whitespace()
        .map(|t| t.trim_end_matches(['.', ',', '!', '?', ';', ':']))
        .collect();

    if tokens.iter().any(|t| AFFIRMATIVE.contains(t)) {
        ReplyIntent::Affirm
    } else if tokens.iter().any(|t| NEGATIVE.contains(t)) {
        ReplyIntent::Decline
    } else {
        ReplyIntent::Unclear
    }
}

pub fn confirmation_prompt(summary: &str, raw_json: &str) -> String {
    format!(
        "I can apply the following write request(s): {summary}\n\nReply \"yes\" to insert, or \"no\" to skip.\n\n```json\n{raw_json}\n```"
    )
}

pub fn reprompt(raw_json: &str) -> String {
    format!("Pending write request detected. Reply \"yes\" to apply or \"no\" to skip.\n\n{raw_json}")
}

/// Owns the pending-write registry and drives the confirmation exchange.
///
/// Created once at startup and shared through `AppState`.
#[derive(Debug)]
pub struct WriteConfirmer {
    pending: PendingWrites,
    apply_timeout: Duration,
}

impl WriteConfirmer {
    pub fn new(pending: PendingWrites) -> Self {
        Self {
            pending,
            apply_timeout: APPLY_TIMEOUT,
        }
    }

    pub fn with_apply_timeout(mut self, apply_timeout: Duration) -> Self {
        self.apply_timeout = apply_timeout;
        self
    }

    pub fn pending(&self) -> &PendingWrites {
        &self.pending
    }

    /// Scans agent reply fragments in order and parks the first valid write
    /// payload for `key`. Returns the confirmation prompt to show instead of
    /// the agent's replies.
    pub fn capture_write(&self, key: &ConversationKey, replies: &[String]) -> Option<String> {
        for reply in replies {
            let found = match extract_write_payload(reply) {
                Ok(Some(found)) => found,
                Ok(None) => continue,
                Err(e) => {
                    debug!("Ignoring malformed write payload: {e}");
                    continue;
                }
            };

            let prompt = confirmation_prompt(&found.summary, &found.raw_json);
            info!(
                "Pending write for user={} session={}: {}",
                key.user_id, key.session_id, found.summary
            );
            self.pending.put(
                key.clone(),
                PendingWrite::new(found.payload, found.raw_json, found.summary),
            );
            return Some(prompt);
        }
        None
    }

    /// Treats `message` as the answer to a pending write, if there is one.
    ///
    /// `None` means nothing is pending and the caller should dispatch to the
    /// agent as usual. `Some(reply)` is the whole response for this turn.
    ///
    /// A yes or no removes the entry before anything is applied, so concurrent
    /// replies resolve it at most once and a write captured during the apply
    /// stays pending.
    pub async fn try_handle_as_confirmation(
        &self,
        key: &ConversationKey,
        message: &str,
        store: Option<&dyn CareerStore>,
    ) -> Option<String> {
        let reply = match classify_reply(message) {
            ReplyIntent::Affirm => {
                let pending = self.pending.take(key)?;
                let result = match store {
                    Some(store) => {
                        apply_with_timeout(store, &pending.payload, self.apply_timeout).await
                    }
                    None => Err(ApplyError::StoreUnavailable),
                };
                match result {
                    Ok(summary) => format!("Applied writes: {summary}"),
                    Err(e) => {
                        warn!(
                            "Chat write failed for user={} session={}: {e}",
                            key.user_id, key.session_id
                        );
                        format!("Failed to apply writes: {e}")
                    }
                }
            }
            ReplyIntent::Decline => {
                self.pending.take(key)?;
                info!(
                    "Pending write declined for user={} session={}",
                    key.user_id, key.session_id
                );
                DECLINE_MESSAGE.to_string()
            }
            ReplyIntent::Unclear => reprompt(&self.pending.get(key)?.raw_json),
        };
        Some(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    const PROJECT_REPLY: &str = "```json\n{\"write_requests\":[{\"action\":\"insert\",\"table\":\"projects\",\"records\":[{\"name\":\"Compiler\"}]}]}\n```";

    const JOB_REPLY: &str = "```json\n{\"write_requests\":[{\"action\":\"insert\",\"table\":\"job_applications\",\"records\":[{\"job_title\":\"Engineer\"}]}]}\n```";
    const JOB_JSON: &str = "{\"write_requests\":[{\"action\":\"insert\",\"table\":\"job_applications\",\"records\":[{\"job_title\":\"Engineer\"}]}]}";

    fn confirmer() -> WriteConfirmer {
        WriteConfirmer::new(PendingWrites::default())
    }

    fn replies(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_classify_reply() {
        assert_eq!(classify_reply("yes"), ReplyIntent::Affirm);
        assert_eq!(classify_reply("  YES!  "), ReplyIntent::Affirm);
        assert_eq!(classify_reply("sure, go ahead"), ReplyIntent::Affirm);
        assert_eq!(classify_reply("Nope."), ReplyIntent::Decline);
        assert_eq!(classify_reply("cancel that"), ReplyIntent::Decline);
        assert_eq!(classify_reply("yes but no"), ReplyIntent::Affirm);
        assert_eq!(classify_reply("no, ok fine"), ReplyIntent::Affirm);
        assert_eq!(classify_reply("maybe"), ReplyIntent::Unclear);
        assert_eq!(classify_reply("yesterday"), ReplyIntent::Unclear);
        assert_eq!(classify_reply("know"), ReplyIntent::Unclear);
        assert_eq!(classify_reply(""), ReplyIntent::Unclear);
    }

    #[test]
    fn test_capture_returns_exact_prompt() {
        let c = confirmer();
        let key = ConversationKey::new("u1", "s1");
        let prompt = c.capture_write(&key, &replies(&[JOB_REPLY])).unwrap();
        assert_eq!(
            prompt,
            format!(
                "I can apply the following write request(s): insert 1 -> job_applications\n\nReply \"yes\" to insert, or \"no\" to skip.\n\n```json\n{JOB_JSON}\n```"
            )
        );
        assert_eq!(c.pending().len(), 1);
    }

    #[test]
    fn test_capture_uses_first_valid_fragment() {
        let c = confirmer();
        let key = ConversationKey::new("u1", "s1");
        let second = JOB_REPLY.replace("Engineer", "Designer");
        let feed = vec![
            "Let me think about that.".to_string(),
            "{\"write_requests\":[{\"action\":\"update\",\"table\":\"projects\",\"records\":[{}]}]}"
                .to_string(),
            JOB_REPLY.to_string(),
            second,
        ];
        c.capture_write(&key, &feed).unwrap();
        assert!(c.pending().get(&key).unwrap().raw_json.contains("Engineer"));
    }

    #[test]
    fn test_capture_ignores_plain_replies() {
        let c = confirmer();
        let key = ConversationKey::new("u1", "s1");
        assert!(c
            .capture_write(&key, &replies(&["Try two problems today.", "{\"foo\":1}"]))
            .is_none());
        assert!(c.pending().is_empty());
    }

    #[tokio::test]
    async fn test_nothing_pending_is_not_handled() {
        let c = confirmer();
        let key = ConversationKey::new("u1", "s1");
        assert!(c.try_handle_as_confirmation(&key, "yes", None).await.is_none());
    }

    #[tokio::test]
    async fn test_unclear_reply_reprompts_and_keeps_entry() {
        let c = confirmer();
        let key = ConversationKey::new("u3", "s3");
        c.capture_write(&key, &replies(&[JOB_REPLY])).unwrap();

        let reply = c
            .try_handle_as_confirmation(&key, "maybe", None)
            .await
            .unwrap();
        assert_eq!(
            reply,
            format!("Pending write request detected. Reply \"yes\" to apply or \"no\" to skip.\n\n{JOB_JSON}")
        );
        assert!(c.pending().get(&key).is_some());
    }

    #[tokio::test]
    async fn test_decline_clears_and_second_decline_is_unhandled() {
        let c = confirmer();
        let key = ConversationKey::new("u2", "s2");
        c.capture_write(&key, &replies(&[JOB_REPLY])).unwrap();

        let reply = c.try_handle_as_confirmation(&key, "no", None).await.unwrap();
        assert_eq!(reply, DECLINE_MESSAGE);
        assert!(c.try_handle_as_confirmation(&key, "no", None).await.is_none());
    }

    #[tokio::test]
    async fn test_affirm_without_store_reports_unavailable_and_clears() {
        let c = confirmer();
        let key = ConversationKey::new("u4", "s4");
        c.capture_write(&key, &replies(&[JOB_REPLY])).unwrap();

        let reply = c.try_handle_as_confirmation(&key, "yes", None).await.unwrap();
        assert_eq!(reply, "Failed to apply writes: database unavailable");
        assert!(c.try_handle_as_confirmation(&key, "yes", None).await.is_none());
    }

    #[tokio::test]
    async fn test_affirm_applies_and_clears() {
        let c = confirmer();
        let store = MemoryStore::new();
        let key = ConversationKey::new("u5", "s5");
        c.capture_write(&key, &replies(&[JOB_REPLY])).unwrap();

        let reply = c
            .try_handle_as_confirmation(&key, "Yep!", Some(&store))
            .await
            .unwrap();
        assert_eq!(reply, "Applied writes: 1 records (1 job_applications)");
        assert_eq!(store.contents().job_applications[0].job_title, "Engineer");
        assert!(c.pending().is_empty());
    }

    #[tokio::test]
    async fn test_apply_error_still_clears() {
        let c = confirmer();
        let store = MemoryStore::new();
        let key = ConversationKey::new("u6", "s6");
        let widgets = "{\"write_requests\":[{\"action\":\"insert\",\"table\":\"widgets\",\"records\":[{\"x\":1}]}]}";
        c.capture_write(&key, &replies(&[widgets])).unwrap();

        let reply = c
            .try_handle_as_confirmation(&key, "confirm", Some(&store))
            .await
            .unwrap();
        assert_eq!(reply, "Failed to apply writes: unsupported table: widgets");
        assert!(c.pending().is_empty());
        assert_eq!(store.row_count(), 0);

        c.capture_write(&key, &replies(&[JOB_REPLY])).unwrap();
        let failing = MemoryStore::failing();
        let reply = c
            .try_handle_as_confirmation(&key, "ok", Some(&failing))
            .await
            .unwrap();
        assert!(reply.starts_with("Failed to apply writes: database error"));
        assert!(c.pending().is_empty());
    }

    #[tokio::test]
    async fn test_missing_goal_date_reports_failure() {
        let c = confirmer();
        let store = MemoryStore::new();
        let key = ConversationKey::new("u7", "s7");
        let goal = "{\"write_requests\":[{\"action\":\"insert\",\"table\":\"daily_goals\",\"records\":[{\"description\":\"apply\"}]}]}";
        c.capture_write(&key, &replies(&[goal])).unwrap();

        let reply = c
            .try_handle_as_confirmation(&key, "yes", Some(&store))
            .await
            .unwrap();
        assert_eq!(reply, "Failed to apply writes: daily_goals requires target_date");
        assert_eq!(store.row_count(), 0);
    }

    #[tokio::test]
    async fn test_conversations_are_independent() {
        let c = confirmer();
        let store = MemoryStore::new();
        let first = ConversationKey::new("u8", "a");
        let second = ConversationKey::new("u8", "b");
        c.capture_write(&first, &replies(&[JOB_REPLY])).unwrap();
        c.capture_write(&second, &replies(&[JOB_REPLY])).unwrap();

        c.try_handle_as_confirmation(&first, "yes", Some(&store))
            .await
            .unwrap();
        assert!(c.pending().get(&first).is_none());
        assert!(c.pending().get(&second).is_some());

        let reply = c
            .try_handle_as_confirmation(&second, "nah", Some(&store))
            .await
            .unwrap();
        assert_eq!(reply, DECLINE_MESSAGE);
        assert_eq!(store.row_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_confirmations_apply_once() {
        let c = confirmer();
        let store = MemoryStore::slow(Duration::from_millis(100));
        let key = ConversationKey::new("u9", "s9");
        c.capture_write(&key, &replies(&[PROJECT_REPLY])).unwrap();

        let (first, second) = tokio::join!(
            c.try_handle_as_confirmation(&key, "yes", Some(&store)),
            c.try_handle_as_confirmation(&key, "yes", Some(&store)),
        );

        let handled: Vec<String> = [first, second].into_iter().flatten().collect();
        assert_eq!(handled, vec!["Applied writes: 1 records (1 projects)".to_string()]);
        assert_eq!(store.row_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_captured_during_apply_stays_pending() {
        let c = confirmer();
        let store = MemoryStore::slow(Duration::from_millis(100));
        let key = ConversationKey::new("u10", "s10");
        c.capture_write(&key, &replies(&[PROJECT_REPLY])).unwrap();

        let capture_later = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            c.capture_write(&key, &replies(&[JOB_REPLY]))
        };
        let (reply, prompt) = tokio::join!(
            c.try_handle_as_confirmation(&key, "yes", Some(&store)),
            capture_later,
        );

        assert_eq!(reply.unwrap(), "Applied writes: 1 records (1 projects)");
        assert!(prompt.is_some());
        assert_eq!(c.pending().get(&key).unwrap().raw_json, JOB_JSON);
    }

    #[tokio::test(start_paused = true)]
    async fn test_apply_timeout_reports_failure_and_clears() {
        let c = confirmer();
        let store = MemoryStore::slow(Duration::from_secs(20));
        let key = ConversationKey::new("u11", "s11");
        c.capture_write(&key, &replies(&[JOB_REPLY])).unwrap();

        let reply = c
            .try_handle_as_confirmation(&key, "yes", Some(&store))
            .await
            .unwrap();
        assert_eq!(reply, "Failed to apply writes: timed out after 15s");
        assert!(c.pending().is_empty());
        assert_eq!(store.row_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_apply_timeout() {
        let c = WriteConfirmer::new(PendingWrites::default())
            .with_apply_timeout(Duration::from_secs(2));
        let store = MemoryStore::slow(Duration::from_secs(3));
        let key = ConversationKey::new("u12", "s12");
        c.capture_write(&key, &replies(&[JOB_REPLY])).unwrap();

        let reply = c
            .try_handle_as_confirmation(&key, "ok", Some(&store))
            .await
            .unwrap();
        assert_eq!(reply, "Failed to apply writes: timed out after 2s");
        assert!(c.pending().is_empty());
    }
}
