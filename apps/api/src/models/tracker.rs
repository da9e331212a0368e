use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct JobApplication {
    pub id: i64,
    pub job_title: String,
    pub company: String,
    pub job_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_date: Option<NaiveDate>,
    pub status: String,
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CodingProblem {
    pub id: i64,
    pub leetcode_number: i64,
    pub title: String,
    pub pattern: String,
    pub problem_link: String,
    pub difficulty: String,
    pub already_solved: bool,
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub repo_url: String,
    pub active: bool,
    pub tech_stack: Vec<String>,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct NetworkingContact {
    pub id: i64,
    pub person_name: String,
    pub how_met: String,
    pub linkedin_connected: bool,
    pub company: String,
    pub position: String,
    pub notes: String,
}

/// A row of `daily_goals`, `weekly_goals` or `monthly_goals`.
///
/// The date column differs per table (`target_date`, `week_of`, `month_of`);
/// queries alias it to `target_date` so one row type covers all three.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Goal {
    pub id: i64,
    pub description: String,
    pub target_date: NaiveDate,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_application_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coding_problem_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Meeting {
    pub id: i64,
    pub session_name: String,
    pub session_type: String,
    pub session_time: DateTime<Utc>,
    pub location: String,
    pub organizer: String,
    pub company: String,
    pub notes: String,
}

/// Everything the tracker holds, as returned by `GET /data`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub job_applications: Vec<JobApplication>,
    pub coding_problems: Vec<CodingProblem>,
    pub projects: Vec<Project>,
    pub networking_contacts: Vec<NetworkingContact>,
    pub daily_goals: Vec<Goal>,
    pub weekly_goals: Vec<Goal>,
    pub monthly_goals: Vec<Goal>,
    pub meetings: Vec<Meeting>,
}

/// A typed row ready to be inserted. The `id` of the wrapped value is ignored.
#[derive(Debug, Clone, PartialEq)]
pub enum NewRecord {
    JobApplication(JobApplication),
    CodingProblem(CodingProblem),
    Project(Project),
    NetworkingContact(NetworkingContact),
    Goal(GoalKind, Goal),
}

impl NewRecord {
    pub fn table(&self) -> TrackerTable {
        match self {
            NewRecord::JobApplication(_) => TrackerTable::JobApplications,
            NewRecord::CodingProblem(_) => TrackerTable::CodingProblems,
            NewRecord::Project(_) => TrackerTable::Projects,
            NewRecord::NetworkingContact(_) => TrackerTable::NetworkingContacts,
            NewRecord::Goal(kind, _) => TrackerTable::Goals(*kind),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalKind {
    Daily,
    Weekly,
    Monthly,
}

impl GoalKind {
    /// Normalizes a user-supplied goal type ("Daily ", "weekly", ...).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "daily" => Some(GoalKind::Daily),
            "weekly" => Some(GoalKind::Weekly),
            "monthly" => Some(GoalKind::Monthly),
            _ => None,
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            GoalKind::Daily => "daily_goals",
            GoalKind::Weekly => "weekly_goals",
            GoalKind::Monthly => "monthly_goals",
        }
    }

    /// The mandatory date column of this goal table.
    pub fn date_column(&self) -> &'static str {
        match self {
            GoalKind::Daily => "target_date",
            GoalKind::Weekly => "week_of",
            GoalKind::Monthly => "month_of",
        }
    }
}

/// The closed set of tables a chat write may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackerTable {
    JobApplications,
    CodingProblems,
    Projects,
    NetworkingContacts,
    Goals(GoalKind),
}

impl TrackerTable {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "job_applications" => Some(TrackerTable::JobApplications),
            "coding_problems" => Some(TrackerTable::CodingProblems),
            "projects" => Some(TrackerTable::Projects),
            "networking_contacts" => Some(TrackerTable::NetworkingContacts),
            "daily_goals" => Some(TrackerTable::Goals(GoalKind::Daily)),
            "weekly_goals" => Some(TrackerTable::Goals(GoalKind::Weekly)),
            "monthly_goals" => Some(TrackerTable::Goals(GoalKind::Monthly)),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TrackerTable::JobApplications => "job_applications",
            TrackerTable::CodingProblems => "coding_problems",
            TrackerTable::Projects => "projects",
            TrackerTable::NetworkingContacts => "networking_contacts",
            TrackerTable::Goals(kind) => kind.table(),
        }
    }
}
