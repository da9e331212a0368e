//! Plain CRUD endpoints over the tracker tables, used by the UI.

pub mod handlers;
