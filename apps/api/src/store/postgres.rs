use async_trait::async_trait;
use sqlx::{PgExecutor, PgPool};
use tracing::debug;

use crate::models::tracker::{
    CodingProblem, Goal, GoalKind, JobApplication, Meeting, NetworkingContact, NewRecord,
    Project, Snapshot,
};
use crate::store::{
    affected, is_rejection, recent_limit, required_description, required_status, CareerStore,
    StoreError,
};

const JOB_COLUMNS: &str = "id, job_title, company, job_link, applied_date, result_date, status, notes";
const CODING_COLUMNS: &str =
    "id, leetcode_number, title, pattern, problem_link, difficulty, already_solved, notes";
const PROJECT_COLUMNS: &str =
    "id, name, repo_url, active, COALESCE(tech_stack, '{}') AS tech_stack, summary";
const CONTACT_COLUMNS: &str =
    "id, person_name, how_met, linkedin_connected, company, position, notes";

/// `CareerStore` backed by the Postgres schema in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn list_goals(&self, kind: GoalKind) -> Result<Vec<Goal>, StoreError> {
        let sql = format!(
            "SELECT id, description, {} AS target_date, completed, job_application_id, \
             coding_problem_id, project_id, contact_id FROM {} ORDER BY id",
            kind.date_column(),
            kind.table()
        );
        Ok(sqlx::query_as::<_, Goal>(&sql).fetch_all(&self.pool).await?)
    }
}

async fn insert_record<'e, E>(executor: E, record: &NewRecord) -> Result<i64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    match record {
        NewRecord::JobApplication(job) => {
            sqlx::query_scalar(
                "INSERT INTO job_applications \
                 (job_title, company, job_link, applied_date, result_date, status, notes) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
            )
            .bind(&job.job_title)
            .bind(&job.company)
            .bind(&job.job_link)
            .bind(job.applied_date)
            .bind(job.result_date)
            .bind(&job.status)
            .bind(&job.notes)
            .fetch_one(executor)
            .await
        }
        NewRecord::CodingProblem(problem) => {
            sqlx::query_scalar(
                "INSERT INTO coding_problems \
                 (leetcode_number, title, pattern, problem_link, difficulty, already_solved, notes) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
            )
            .bind(problem.leetcode_number)
            .bind(&problem.title)
            .bind(&problem.pattern)
            .bind(&problem.problem_link)
            .bind(&problem.difficulty)
            .bind(problem.already_solved)
            .bind(&problem.notes)
            .fetch_one(executor)
            .await
        }
        NewRecord::Project(project) => {
            sqlx::query_scalar(
                "INSERT INTO projects (name, repo_url, active, tech_stack, summary) \
                 VALUES ($1, $2, $3, $4, $5) RETURNING id",
            )
            .bind(&project.name)
            .bind(&project.repo_url)
            .bind(project.active)
            .bind(&project.tech_stack)
            .bind(&project.summary)
            .fetch_one(executor)
            .await
        }
        NewRecord::NetworkingContact(contact) => {
            sqlx::query_scalar(
                "INSERT INTO networking_contacts \
                 (person_name, how_met, linkedin_connected, company, position, notes) \
                 VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
            )
            .bind(&contact.person_name)
            .bind(&contact.how_met)
            .bind(contact.linkedin_connected)
            .bind(&contact.company)
            .bind(&contact.position)
            .bind(&contact.notes)
            .fetch_one(executor)
            .await
        }
        NewRecord::Goal(kind, goal) => {
            let sql = format!(
                "INSERT INTO {} (description, {}, completed, job_application_id, \
                 coding_problem_id, project_id, contact_id) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
                kind.table(),
                kind.date_column()
            );
            sqlx::query_scalar(&sql)
                .bind(&goal.description)
                .bind(goal.target_date)
                .bind(goal.completed)
                .bind(goal.job_application_id)
                .bind(goal.coding_problem_id)
                .bind(goal.project_id)
                .bind(goal.contact_id)
                .fetch_one(executor)
                .await
        }
    }
}

#[async_trait]
impl CareerStore for PgStore {
    async fn insert(&self, record: &NewRecord) -> Result<i64, StoreError> {
        let id = insert_record(&self.pool, record).await?;
        debug!("Inserted {} row {id}", record.table().name());
        Ok(id)
    }

    async fn insert_batch(&self, records: &[NewRecord]) -> Result<Vec<i64>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut ids = Vec::with_capacity(records.len());
        for record in records {
            ids.push(insert_record(&mut *tx, record).await?);
        }
        tx.commit().await?;
        debug!("Inserted batch of {} rows", ids.len());
        Ok(ids)
    }

    async fn snapshot(&self) -> Result<Snapshot, StoreError> {
        let job_applications = sqlx::query_as::<_, JobApplication>(&format!(
            "SELECT {JOB_COLUMNS} FROM job_applications ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        let coding_problems = sqlx::query_as::<_, CodingProblem>(&format!(
            "SELECT {CODING_COLUMNS} FROM coding_problems ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        let projects = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        let networking_contacts = sqlx::query_as::<_, NetworkingContact>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM networking_contacts ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        let meetings = sqlx::query_as::<_, Meeting>(
            "SELECT id, session_name, session_type, session_time, location, organizer, company, notes \
             FROM meetings ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(Snapshot {
            job_applications,
            coding_problems,
            projects,
            networking_contacts,
            daily_goals: self.list_goals(GoalKind::Daily).await?,
            weekly_goals: self.list_goals(GoalKind::Weekly).await?,
            monthly_goals: self.list_goals(GoalKind::Monthly).await?,
            meetings,
        })
    }

    async fn recent_jobs(&self, limit: i64) -> Result<Vec<JobApplication>, StoreError> {
        Ok(sqlx::query_as::<_, JobApplication>(&format!(
            "SELECT {JOB_COLUMNS} FROM job_applications \
             ORDER BY COALESCE(applied_date, result_date) DESC NULLS LAST, id DESC LIMIT $1"
        ))
        .bind(recent_limit(limit))
        .fetch_all(&self.pool)
        .await?)
    }

    async fn recent_coding(&self, limit: i64) -> Result<Vec<CodingProblem>, StoreError> {
        Ok(sqlx::query_as::<_, CodingProblem>(&format!(
            "SELECT {CODING_COLUMNS} FROM coding_problems ORDER BY id DESC LIMIT $1"
        ))
        .bind(recent_limit(limit))
        .fetch_all(&self.pool)
        .await?)
    }

    async fn recent_projects(&self, limit: i64) -> Result<Vec<Project>, StoreError> {
        Ok(sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY id DESC LIMIT $1"
        ))
        .bind(recent_limit(limit))
        .fetch_all(&self.pool)
        .await?)
    }

    async fn recent_contacts(&self, limit: i64) -> Result<Vec<NetworkingContact>, StoreError> {
        Ok(sqlx::query_as::<_, NetworkingContact>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM networking_contacts ORDER BY id DESC LIMIT $1"
        ))
        .bind(recent_limit(limit))
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_goal(
        &self,
        kind: GoalKind,
        id: i64,
        completed: bool,
        description: &str,
    ) -> Result<(), StoreError> {
        let desc = description.trim();
        let result = if desc.is_empty() {
            sqlx::query(&format!("UPDATE {} SET completed = $1 WHERE id = $2", kind.table()))
                .bind(completed)
                .bind(id)
                .execute(&self.pool)
                .await?
        } else {
            sqlx::query(&format!(
                "UPDATE {} SET completed = $1, description = $2 WHERE id = $3",
                kind.table()
            ))
            .bind(completed)
            .bind(desc)
            .bind(id)
            .execute(&self.pool)
            .await?
        };
        affected(result.rows_affected()).map(|_| ())
    }

    async fn update_goal_completed_by_description(
        &self,
        kind: GoalKind,
        description: &str,
        completed: bool,
    ) -> Result<u64, StoreError> {
        let desc = required_description(description)?;
        let result = sqlx::query(&format!(
            "UPDATE {} SET completed = $1 WHERE lower(description) = lower($2)",
            kind.table()
        ))
        .bind(completed)
        .bind(desc)
        .execute(&self.pool)
        .await?;
        affected(result.rows_affected())
    }

    async fn update_job_status(&self, id: i64, status: &str) -> Result<(), StoreError> {
        let status = required_status(status)?;
        let result = sqlx::query(
            "UPDATE job_applications \
             SET status = $1, result_date = CASE WHEN $2 THEN CURRENT_DATE ELSE result_date END \
             WHERE id = $3",
        )
        .bind(status)
        .bind(is_rejection(status))
        .bind(id)
        .execute(&self.pool)
        .await?;
        affected(result.rows_affected()).map(|_| ())
    }
}
