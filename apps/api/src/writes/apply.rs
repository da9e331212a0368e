use std::time::Duration;

use thiserror::Error;
use tracing::info;

use crate::models::tracker::{
    CodingProblem, Goal, GoalKind, JobApplication, NetworkingContact, NewRecord, Project,
    TrackerTable,
};
use crate::store::{CareerStore, StoreError};
use crate::writes::coerce::{
    bool_field, date_field, id_field, int_field, string_field, string_list_field,
};
use crate::writes::intent::{Record, WritePayload};

/// Upper bound for applying one confirmed payload.
pub const APPLY_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("unsupported action: {0}")]
    UnsupportedAction(String),

    #[error("unsupported table: {0}")]
    UnsupportedTable(String),

    #[error("{table} requires {field}")]
    MissingField {
        table: &'static str,
        field: &'static str,
    },

    #[error("database unavailable")]
    StoreUnavailable,

    #[error("timed out after {}s", .0.as_secs())]
    TimedOut(Duration),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Typed rows for a payload, plus one `"<n> <table>"` fragment per request.
#[derive(Debug, Clone, PartialEq)]
pub struct WritePlan {
    pub rows: Vec<NewRecord>,
    pub fragments: Vec<String>,
}

/// Converts every request of `payload` into typed rows, in request order and
/// record order.
///
/// Action and table are checked again here even though the parser already
/// accepted the payload: the parser lets any table name through, the closed
/// set of writable tables is enforced only at this point.
pub fn plan_writes(payload: &WritePayload) -> Result<WritePlan, ApplyError> {
    let mut rows = Vec::new();
    let mut fragments = Vec::with_capacity(payload.write_requests.len());

    for request in &payload.write_requests {
        if !request.action.trim().eq_ignore_ascii_case("insert") {
            return Err(ApplyError::UnsupportedAction(request.action.clone()));
        }
        let table = TrackerTable::from_name(&request.table)
            .ok_or_else(|| ApplyError::UnsupportedTable(request.table.clone()))?;

        for record in &request.records {
            rows.push(typed_row(table, record)?);
        }
        fragments.push(format!("{} {}", request.records.len(), table.name()));
    }

    Ok(WritePlan { rows, fragments })
}

fn typed_row(table: TrackerTable, record: &Record) -> Result<NewRecord, ApplyError> {
    let row = match table {
        TrackerTable::JobApplications => NewRecord::JobApplication(JobApplication {
            id: 0,
            job_title: string_field(record, "job_title"),
            company: string_field(record, "company"),
            job_link: string_field(record, "job_link"),
            applied_date: date_field(record, "applied_date"),
            result_date: date_field(record, "result_date"),
            status: string_field(record, "status"),
            notes: string_field(record, "notes"),
        }),
        TrackerTable::CodingProblems => NewRecord::CodingProblem(CodingProblem {
            id: 0,
            leetcode_number: int_field(record, "leetcode_number"),
            title: string_field(record, "title"),
            pattern: string_field(record, "pattern"),
            problem_link: string_field(record, "problem_link"),
            difficulty: string_field(record, "difficulty"),
            already_solved: bool_field(record, "already_solved"),
            notes: string_field(record, "notes"),
        }),
        TrackerTable::Projects => NewRecord::Project(Project {
            id: 0,
            name: string_field(record, "name"),
            repo_url: string_field(record, "repo_url"),
            active: bool_field(record, "active"),
            tech_stack: string_list_field(record, "tech_stack"),
            summary: string_field(record, "summary"),
        }),
        TrackerTable::NetworkingContacts => NewRecord::NetworkingContact(NetworkingContact {
            id: 0,
            person_name: string_field(record, "person_name"),
            how_met: string_field(record, "how_met"),
            linkedin_connected: bool_field(record, "linkedin_connected"),
            company: string_field(record, "company"),
            position: string_field(record, "position"),
            notes: string_field(record, "notes"),
        }),
        TrackerTable::Goals(kind) => NewRecord::Goal(kind, goal_row(kind, record)?),
    };
    Ok(row)
}

fn goal_row(kind: GoalKind, record: &Record) -> Result<Goal, ApplyError> {
    let target_date =
        date_field(record, kind.date_column()).ok_or(ApplyError::MissingField {
            table: kind.table(),
            field: kind.date_column(),
        })?;
    Ok(Goal {
        id: 0,
        description: string_field(record, "description"),
        target_date,
        completed: bool_field(record, "completed"),
        job_application_id: id_field(record, "job_application_id"),
        coding_problem_id: id_field(record, "coding_problem_id"),
        project_id: id_field(record, "project_id"),
        contact_id: id_field(record, "contact_id"),
    })
}

/// Applies a validated payload and returns `"<total> records (<fragments>)"`.
///
/// The whole payload is converted before anything is written, so a bad table
/// or a goal without its date column leaves the store untouched.
pub async fn apply_write_requests(
    store: &dyn CareerStore,
    payload: &WritePayload,
) -> Result<String, ApplyError> {
    let plan = plan_writes(payload)?;
    let ids = store.insert_batch(&plan.rows).await?;
    info!("Applied chat write: {} rows", ids.len());
    Ok(format!(
        "{} records ({})",
        ids.len(),
        plan.fragments.join(", ")
    ))
}

/// `apply_write_requests` bounded by `limit`.
pub async fn apply_with_timeout(
    store: &dyn CareerStore,
    payload: &WritePayload,
    limit: Duration,
) -> Result<String, ApplyError> {
    tokio::time::timeout(limit, apply_write_requests(store, payload))
        .await
        .map_err(|_| ApplyError::TimedOut(limit))?
}
