use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppError;
use crate::models::tracker::{
    CodingProblem, GoalKind, JobApplication, NetworkingContact, NewRecord, Project, Snapshot,
};
use crate::routes::{with_deadline, CRUD_TIMEOUT};
use crate::state::AppState;
use crate::store::{CareerStore, StoreError};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct JobCreateRequest {
    pub job_title: String,
    pub company: String,
    pub job_link: String,
    pub applied_date: Option<String>,
    pub result_date: Option<String>,
    pub status: String,
    pub notes: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct JobStatusUpdateRequest {
    pub id: i64,
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CodingCreateRequest {
    pub leetcode_number: i64,
    pub title: String,
    pub pattern: String,
    pub problem_link: String,
    pub difficulty: String,
    pub already_solved: bool,
    pub notes: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProjectCreateRequest {
    pub name: String,
    pub repo_url: String,
    pub active: bool,
    pub tech_stack: Vec<String>,
    pub summary: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NetworkingCreateRequest {
    pub person_name: String,
    pub how_met: String,
    pub linkedin_connected: bool,
    pub company: String,
    pub position: String,
    pub notes: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GoalUpdateRequest {
    #[serde(rename = "type")]
    pub goal_type: String,
    pub id: i64,
    pub description: String,
    pub completed: bool,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

fn store(state: &AppState) -> Result<Arc<dyn CareerStore>, AppError> {
    state.store.clone().ok_or_else(AppError::database_unavailable)
}

fn optional_date(raw: Option<&str>, field: &str) -> Result<Option<NaiveDate>, AppError> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| AppError::Validation(format!("invalid {field}")))
}

/// Maps a zero-row update to `404 {what} not found`.
fn not_found_as(what: &'static str) -> impl Fn(StoreError) -> AppError {
    move |e| match e {
        StoreError::NotFound => AppError::NotFound(format!("{what} not found")),
        other => other.into(),
    }
}

/// GET /data
pub async fn handle_snapshot(State(state): State<AppState>) -> Result<Json<Snapshot>, AppError> {
    let store = store(&state)?;
    let snapshot = with_deadline(CRUD_TIMEOUT, async { store.snapshot().await.map_err(AppError::from) }).await?;
    Ok(Json(snapshot))
}

/// POST /jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    payload: Result<Json<JobCreateRequest>, JsonRejection>,
) -> Result<Json<CreatedResponse>, AppError> {
    let Json(req) = payload?;
    if req.job_title.trim().is_empty() {
        return Err(AppError::Validation("job_title is required".to_string()));
    }
    let record = NewRecord::JobApplication(JobApplication {
        id: 0,
        applied_date: optional_date(req.applied_date.as_deref(), "applied_date")?,
        result_date: optional_date(req.result_date.as_deref(), "result_date")?,
        job_title: req.job_title,
        company: req.company,
        job_link: req.job_link,
        status: req.status,
        notes: req.notes,
    });
    create(&state, record).await
}

/// PATCH /jobs/status
pub async fn handle_update_job_status(
    State(state): State<AppState>,
    payload: Result<Json<JobStatusUpdateRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(req) = payload?;
    if req.id <= 0 {
        return Err(AppError::Validation("id is required".to_string()));
    }
    if req.status.trim().is_empty() {
        return Err(AppError::Validation("status is required".to_string()));
    }
    let store = store(&state)?;
    with_deadline(CRUD_TIMEOUT, async {
        store
            .update_job_status(req.id, &req.status)
            .await
            .map_err(not_found_as("job"))
    })
    .await?;
    info!("Job {} status set to {:?}", req.id, req.status.trim());
    Ok(Json(json!({ "status": "updated" })))
}

/// POST /coding
pub async fn handle_create_coding(
    State(state): State<AppState>,
    payload: Result<Json<CodingCreateRequest>, JsonRejection>,
) -> Result<Json<CreatedResponse>, AppError> {
    let Json(req) = payload?;
    if req.leetcode_number == 0 && req.title.trim().is_empty() {
        return Err(AppError::Validation(
            "leetcode_number or title is required".to_string(),
        ));
    }
    let record = NewRecord::CodingProblem(CodingProblem {
        id: 0,
        leetcode_number: req.leetcode_number,
        title: req.title,
        pattern: req.pattern,
        problem_link: req.problem_link,
        difficulty: req.difficulty,
        already_solved: req.already_solved,
        notes: req.notes,
    });
    create(&state, record).await
}

/// POST /projects
pub async fn handle_create_project(
    State(state): State<AppState>,
    payload: Result<Json<ProjectCreateRequest>, JsonRejection>,
) -> Result<Json<CreatedResponse>, AppError> {
    let Json(req) = payload?;
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    let record = NewRecord::Project(Project {
        id: 0,
        name: req.name,
        repo_url: req.repo_url,
        active: req.active,
        tech_stack: req.tech_stack,
        summary: req.summary,
    });
    create(&state, record).await
}

/// POST /networking
pub async fn handle_create_contact(
    State(state): State<AppState>,
    payload: Result<Json<NetworkingCreateRequest>, JsonRejection>,
) -> Result<Json<CreatedResponse>, AppError> {
    let Json(req) = payload?;
    if req.person_name.trim().is_empty() {
        return Err(AppError::Validation("person_name is required".to_string()));
    }
    let record = NewRecord::NetworkingContact(NetworkingContact {
        id: 0,
        person_name: req.person_name,
        how_met: req.how_met,
        linkedin_connected: req.linkedin_connected,
        company: req.company,
        position: req.position,
        notes: req.notes,
    });
    create(&state, record).await
}

/// PATCH /goals
///
/// With `id > 0` the goal is updated by id; otherwise every goal whose
/// description matches (case-insensitively) gets the new `completed` flag.
pub async fn handle_update_goal(
    State(state): State<AppState>,
    payload: Result<Json<GoalUpdateRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(req) = payload?;
    if req.goal_type.trim().is_empty() {
        return Err(AppError::Validation("type is required".to_string()));
    }
    let kind = GoalKind::parse(&req.goal_type)
        .ok_or_else(|| AppError::Validation("invalid goal type".to_string()))?;

    if req.id <= 0 && req.description.trim().is_empty() {
        return Err(AppError::Validation("description is required".to_string()));
    }

    let store = store(&state)?;
    if req.id > 0 {
        with_deadline(CRUD_TIMEOUT, async {
            store
                .update_goal(kind, req.id, req.completed, &req.description)
                .await
                .map_err(not_found_as("goal"))
        })
        .await?;
        return Ok(Json(json!({ "status": "updated" })));
    }

    let updated = with_deadline(CRUD_TIMEOUT, async {
        store
            .update_goal_completed_by_description(kind, &req.description, req.completed)
            .await
            .map_err(not_found_as("goal"))
    })
    .await?;
    Ok(Json(json!({ "status": "updated", "updated": updated })))
}

async fn create(state: &AppState, record: NewRecord) -> Result<Json<CreatedResponse>, AppError> {
    let store = store(state)?;
    let id = with_deadline(CRUD_TIMEOUT, async { store.insert(&record).await.map_err(AppError::from) }).await?;
    info!("Created {} row {id}", record.table().name());
    Ok(Json(CreatedResponse { id }))
}
