//! In-process `CareerStore` used by tests.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::models::tracker::{
    CodingProblem, Goal, GoalKind, JobApplication, NetworkingContact, NewRecord, Project, Snapshot,
};
use crate::store::{
    affected, is_rejection, recent_limit, required_description, required_status, CareerStore,
    StoreError,
};

#[derive(Default)]
struct Tables {
    last_id: i64,
    data: Snapshot,
}

impl Tables {
    fn push(&mut self, record: &NewRecord) -> i64 {
        self.last_id += 1;
        let id = self.last_id;
        match record.clone() {
            NewRecord::JobApplication(row) => self.data.job_applications.push(JobApplication { id, ..row }),
            NewRecord::CodingProblem(row) => self.data.coding_problems.push(CodingProblem { id, ..row }),
            NewRecord::Project(row) => self.data.projects.push(Project { id, ..row }),
            NewRecord::NetworkingContact(row) => {
                self.data.networking_contacts.push(NetworkingContact { id, ..row })
            }
            NewRecord::Goal(kind, row) => self.goals_mut(kind).push(Goal { id, ..row }),
        }
        id
    }

    fn goals_mut(&mut self, kind: GoalKind) -> &mut Vec<Goal> {
        match kind {
            GoalKind::Daily => &mut self.data.daily_goals,
            GoalKind::Weekly => &mut self.data.weekly_goals,
            GoalKind::Monthly => &mut self.data.monthly_goals,
        }
    }
}

/// Keeps rows in a `Snapshot` behind a mutex. `failing()` builds a store whose
/// inserts always error; `slow(delay)` one whose batch inserts wait first.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_inserts: bool,
    batch_delay: Option<Duration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_inserts: true,
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            batch_delay: Some(delay),
            ..Self::default()
        }
    }

    /// Current contents, for assertions.
    pub fn contents(&self) -> Snapshot {
        self.tables().data.clone()
    }

    pub fn row_count(&self) -> usize {
        let t = self.tables();
        t.data.job_applications.len()
            + t.data.coding_problems.len()
            + t.data.projects.len()
            + t.data.networking_contacts.len()
            + t.data.daily_goals.len()
            + t.data.weekly_goals.len()
            + t.data.monthly_goals.len()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_inserts {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

fn newest_first<T: Clone>(rows: &[T], limit: i64) -> Vec<T> {
    rows.iter()
        .rev()
        .take(recent_limit(limit) as usize)
        .cloned()
        .collect()
}

#[async_trait]
impl CareerStore for MemoryStore {
    async fn insert(&self, record: &NewRecord) -> Result<i64, StoreError> {
        self.check_writable()?;
        Ok(self.tables().push(record))
    }

    async fn insert_batch(&self, records: &[NewRecord]) -> Result<Vec<i64>, StoreError> {
        self.check_writable()?;
        if let Some(delay) = self.batch_delay {
            tokio::time::sleep(delay).await;
        }
        let mut tables = self.tables();
        Ok(records.iter().map(|r| tables.push(r)).collect())
    }

    async fn snapshot(&self) -> Result<Snapshot, StoreError> {
        Ok(self.contents())
    }

    async fn recent_jobs(&self, limit: i64) -> Result<Vec<JobApplication>, StoreError> {
        Ok(newest_first(&self.tables().data.job_applications, limit))
    }

    async fn recent_coding(&self, limit: i64) -> Result<Vec<CodingProblem>, StoreError> {
        Ok(newest_first(&self.tables().data.coding_problems, limit))
    }

    async fn recent_projects(&self, limit: i64) -> Result<Vec<Project>, StoreError> {
        Ok(newest_first(&self.tables().data.projects, limit))
    }

    async fn recent_contacts(&self, limit: i64) -> Result<Vec<NetworkingContact>, StoreError> {
        Ok(newest_first(&self.tables().data.networking_contacts, limit))
    }

    async fn update_goal(
        &self,
        kind: GoalKind,
        id: i64,
        completed: bool,
        description: &str,
    ) -> Result<(), StoreError> {
        let desc = description.trim();
        let mut tables = self.tables();
        let goal = tables
            .goals_mut(kind)
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or(StoreError::NotFound)?;
        goal.completed = completed;
        if !desc.is_empty() {
            goal.description = desc.to_string();
        }
        Ok(())
    }

    async fn update_goal_completed_by_description(
        &self,
        kind: GoalKind,
        description: &str,
        completed: bool,
    ) -> Result<u64, StoreError> {
        let desc = required_description(description)?.to_lowercase();
        let mut tables = self.tables();
        let mut rows = 0;
        for goal in tables
            .goals_mut(kind)
            .iter_mut()
            .filter(|g| g.description.to_lowercase() == desc)
        {
            goal.completed = completed;
            rows += 1;
        }
        affected(rows)
    }

    async fn update_job_status(&self, id: i64, status: &str) -> Result<(), StoreError> {
        let status = required_status(status)?;
        let mut tables = self.tables();
        let job = tables
            .data
            .job_applications
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or(StoreError::NotFound)?;
        job.status = status.to_string();
        if is_rejection(status) {
            job.result_date = Some(Utc::now().date_naive());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn goal(description: &str) -> Goal {
        Goal {
            id: 0,
            description: description.to_string(),
            target_date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
            completed: false,
            job_application_id: None,
            coding_problem_id: None,
            project_id: None,
            contact_id: None,
        }
    }

    #[tokio::test]
    async fn test_update_goal_by_description_matches_case_insensitively() {
        let store = MemoryStore::new();
        for desc in ["Apply to 3 jobs", "apply to 3 JOBS", "Solve 2 problems"] {
            store
                .insert(&NewRecord::Goal(GoalKind::Daily, goal(desc)))
                .await
                .unwrap();
        }

        let rows = store
            .update_goal_completed_by_description(GoalKind::Daily, "  APPLY TO 3 jobs ", true)
            .await
            .unwrap();
        assert_eq!(rows, 2);

        let missing = store
            .update_goal_completed_by_description(GoalKind::Weekly, "Apply to 3 jobs", true)
            .await;
        assert!(matches!(missing, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_update_goal_by_id_keeps_description_when_blank() {
        let store = MemoryStore::new();
        let id = store
            .insert(&NewRecord::Goal(GoalKind::Monthly, goal("Ship portfolio")))
            .await
            .unwrap();

        store
            .update_goal(GoalKind::Monthly, id, true, "   ")
            .await
            .unwrap();
        let goals = store.contents().monthly_goals;
        assert!(goals[0].completed);
        assert_eq!(goals[0].description, "Ship portfolio");

        let err = store.update_goal(GoalKind::Monthly, 999, true, "").await;
        assert!(matches!(err, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_job_rejection_stamps_result_date() {
        let store = MemoryStore::new();
        let id = store
            .insert(&NewRecord::JobApplication(JobApplication {
                job_title: "Engineer".to_string(),
                ..Default::default()
            }))
            .await
            .unwrap();

        store.update_job_status(id, "interviewing").await.unwrap();
        assert_eq!(store.contents().job_applications[0].result_date, None);

        store.update_job_status(id, " Rejected ").await.unwrap();
        let job = &store.contents().job_applications[0];
        assert_eq!(job.status, "Rejected");
        assert_eq!(job.result_date, Some(Utc::now().date_naive()));
    }
}
