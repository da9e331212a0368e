pub mod health;

use std::future::Future;
use std::time::Duration;

use axum::{
    http::Method,
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::chat::handlers::handle_chat;
use crate::errors::AppError;
use crate::state::AppState;
use crate::tracker::handlers;

/// Deadline for plain CRUD handlers.
pub const CRUD_TIMEOUT: Duration = Duration::from_secs(10);
/// Deadline for one agent turn.
pub const CHAT_TIMEOUT: Duration = Duration::from_secs(60);

/// Runs `fut`, failing with `AppError::Timeout` once `limit` has passed.
pub async fn with_deadline<T, F>(limit: Duration, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Timeout(format!(
            "request timed out after {}s",
            limit.as_secs()
        ))),
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/meta", get(health::meta_handler))
        // Tracker CRUD
        .route("/data", get(handlers::handle_snapshot))
        .route("/jobs", post(handlers::handle_create_job))
        .route("/jobs/status", patch(handlers::handle_update_job_status))
        .route("/coding", post(handlers::handle_create_coding))
        .route("/projects", post(handlers::handle_create_project))
        .route("/networking", post(handlers::handle_create_contact))
        .route("/goals", patch(handlers::handle_update_goal))
        // Chat
        .route("/chat", post(handle_chat))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
