//! The tracker data store.
//!
//! `CareerStore` is the handle the rest of the service talks to. `AppState`
//! carries it as `Option<Arc<dyn CareerStore>>`; `None` means no database is
//! configured and every write path reports "database unavailable".

use async_trait::async_trait;
use thiserror::Error;

use crate::models::tracker::{
    CodingProblem, GoalKind, JobApplication, NetworkingContact, NewRecord, Project, Snapshot,
};

pub mod postgres;

#[cfg(test)]
pub mod memory;

/// Rows returned by the "recent" listings when the caller passes a non-positive limit.
pub const DEFAULT_RECENT_LIMIT: i64 = 20;

#[derive(Debug, Error)]
pub enum StoreError {
    /// An update matched zero rows.
    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait CareerStore: Send + Sync {
    /// Inserts one row and returns its generated id.
    async fn insert(&self, record: &NewRecord) -> Result<i64, StoreError>;

    /// Inserts rows in order. Either every row is stored or none is.
    async fn insert_batch(&self, records: &[NewRecord]) -> Result<Vec<i64>, StoreError>;

    async fn snapshot(&self) -> Result<Snapshot, StoreError>;

    async fn recent_jobs(&self, limit: i64) -> Result<Vec<JobApplication>, StoreError>;
    async fn recent_coding(&self, limit: i64) -> Result<Vec<CodingProblem>, StoreError>;
    async fn recent_projects(&self, limit: i64) -> Result<Vec<Project>, StoreError>;
    async fn recent_contacts(&self, limit: i64) -> Result<Vec<NetworkingContact>, StoreError>;

    /// Sets `completed` on one goal, and its description when `description` is non-blank.
    async fn update_goal(
        &self,
        kind: GoalKind,
        id: i64,
        completed: bool,
        description: &str,
    ) -> Result<(), StoreError>;

    /// Sets `completed` on every goal whose description matches case-insensitively.
    /// Returns the number of rows touched.
    async fn update_goal_completed_by_description(
        &self,
        kind: GoalKind,
        description: &str,
        completed: bool,
    ) -> Result<u64, StoreError>;

    /// Updates a job's status. A status mentioning "reject" also stamps `result_date` with today.
    async fn update_job_status(&self, id: i64, status: &str) -> Result<(), StoreError>;
}

pub(crate) fn recent_limit(limit: i64) -> i64 {
    if limit <= 0 {
        DEFAULT_RECENT_LIMIT
    } else {
        limit
    }
}

pub(crate) fn required_description(description: &str) -> Result<&str, StoreError> {
    let desc = description.trim();
    if desc.is_empty() {
        return Err(StoreError::Validation("description is required".to_string()));
    }
    Ok(desc)
}

pub(crate) fn required_status(status: &str) -> Result<&str, StoreError> {
    let status = status.trim();
    if status.is_empty() {
        return Err(StoreError::Validation("status is required".to_string()));
    }
    Ok(status)
}

pub(crate) fn is_rejection(status: &str) -> bool {
    status.to_lowercase().contains("reject")
}

pub(crate) fn affected(rows: u64) -> Result<u64, StoreError> {
    if rows == 0 {
        Err(StoreError::NotFound)
    } else {
        Ok(rows)
    }
}
