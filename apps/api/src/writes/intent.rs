use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// A loosely-typed record as the model wrote it.
pub type Record = Map<String, Value>;

/// A ```json fenced block (tag optional) holding one object. Non-greedy, spans newlines.
static FENCED_OBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("fenced object pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteRequest {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub table: String,
    #[serde(default)]
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WritePayload {
    pub write_requests: Vec<WriteRequest>,
}

#[derive(Debug, Deserialize)]
struct RawPayload {
    #[serde(default)]
    write_requests: Option<Vec<WriteRequest>>,
}

/// A validated payload together with the JSON text it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedWrite {
    pub payload: WritePayload,
    /// The matched JSON exactly as it appeared in the text.
    pub raw_json: String,
    /// `"<action> <count> -> <table>"` per request, joined with `", "`.
    pub summary: String,
}

#[derive(Debug, Error)]
pub enum IntentError {
    #[error("invalid write payload json: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid write request #{index}: {reason}")]
    InvalidRequest { index: usize, reason: &'static str },
}

/// Looks for a write suggestion in agent output.
///
/// `Ok(None)` means there is nothing that looks like a write payload (no JSON
/// object, or an object without any `write_requests`). `Err` means a payload
/// was found but cannot be used; one bad request rejects the whole payload.
pub fn extract_write_payload(text: &str) -> Result<Option<ExtractedWrite>, IntentError> {
    let Some(raw) = locate_candidate(text) else {
        return Ok(None);
    };

    // Only the first JSON value counts; anything after it is ignored.
    let Some(decoded) = serde_json::Deserializer::from_str(raw)
        .into_iter::<RawPayload>()
        .next()
        .transpose()?
    else {
        return Ok(None);
    };
    let requests = match decoded.write_requests {
        Some(requests) if !requests.is_empty() => requests,
        _ => return Ok(None),
    };

    let mut summary_parts = Vec::with_capacity(requests.len());
    for (index, request) in requests.iter().enumerate() {
        let action = request.action.trim().to_lowercase();
        let table = request.table.trim();
        let reason = if action != "insert" {
            Some("action must be insert")
        } else if table.is_empty() {
            Some("table is required")
        } else if request.records.is_empty() {
            Some("records must not be empty")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(IntentError::InvalidRequest { index, reason });
        }
        summary_parts.push(format!("{action} {} -> {table}", request.records.len()));
    }

    Ok(Some(ExtractedWrite {
        payload: WritePayload {
            write_requests: requests,
        },
        raw_json: raw.to_string(),
        summary: summary_parts.join(", "),
    }))
}

fn locate_candidate(text: &str) -> Option<&str> {
    if let Some(found) = FENCED_OBJECT.captures(text).and_then(|c| c.get(1)) {
        return Some(found.as_str());
    }
    let trimmed = text.trim();
    (trimmed.starts_with('{') && trimmed.ends_with('}')).then_some(trimmed)
}
