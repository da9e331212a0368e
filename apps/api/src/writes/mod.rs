//! Chat writes: turning a model's JSON write suggestion into tracker rows.
//!
//! `intent` finds and validates the `write_requests` payload in free text,
//! `coerce` reads loosely-typed record fields, and `apply` maps a validated
//! payload onto `CareerStore` inserts.

pub mod apply;
pub mod coerce;
pub mod intent;

pub use apply::{apply_write_requests, ApplyError};
pub use intent::{extract_write_payload, ExtractedWrite, IntentError, WritePayload, WriteRequest};
