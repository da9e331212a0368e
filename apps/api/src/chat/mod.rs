//! `POST /chat`: agent dispatch wrapped in the write-confirmation protocol.

pub mod confirm;
pub mod handlers;
pub mod pending;
pub mod session;
