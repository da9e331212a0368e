pub mod agents;
pub mod chat;
pub mod config;
pub mod db;
pub mod errors;
pub mod llm_client;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod tracker;
pub mod writes;
