use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use super::{clamp_progress, OkrStore, StorageError, StoreResult};
use crate::models::{
    CheckResult, NewOkr, NewReminder, NewTask, Okr, OkrStatus, OkrWithTasks, PlannedTask,
    Reminder, ReminderStatus, Task, TaskStatus, TaskUpdate, TaskWithReminders, ValidationReport,
};

const INSERT_OKR: &str = r#"
    INSERT INTO okrs (id, title, description, target_date, objective, key_results, status)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    RETURNING *
"#;

const INSERT_TASK: &str = r#"
    INSERT INTO tasks (id, okr_id, title, description, deadline, evidence_hint, level, status)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
    RETURNING *
"#;

/// PostgreSQL-backed store. Enum columns are stored as their wire labels.
#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    async fn fetch_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let row: Option<TaskRow> = sqlx::query_as("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Task::try_from).transpose()
    }

    async fn write_task(&self, task: &Task) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE tasks
            SET title = $2, description = $3, deadline = $4, evidence_hint = $5, level = $6,
                status = $7, completed_at = $8, proof_url = $9, updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.deadline)
        .bind(task.evidence_hint.as_str())
        .bind(task.level.as_str())
        .bind(task.status.as_str())
        .bind(task.completed_at)
        .bind(&task.proof_url)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Row types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, FromRow)]
struct OkrRow {
    id: Uuid,
    title: String,
    description: String,
    target_date: NaiveDate,
    objective: String,
    key_results: Vec<String>,
    status: String,
    progress: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OkrRow> for Okr {
    type Error = StorageError;

    fn try_from(row: OkrRow) -> Result<Self, Self::Error> {
        Ok(Okr {
            id: row.id,
            title: row.title,
            description: row.description,
            target_date: row.target_date,
            objective: row.objective,
            key_results: row.key_results,
            status: row.status.parse()?,
            progress: row.progress,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct TaskRow {
    id: Uuid,
    okr_id: Uuid,
    title: String,
    description: Option<String>,
    deadline: NaiveDate,
    evidence_hint: String,
    level: String,
    status: String,
    completed_at: Option<DateTime<Utc>>,
    proof_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = StorageError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        Ok(Task {
            id: row.id,
            okr_id: row.okr_id,
            title: row.title,
            description: row.description,
            deadline: row.deadline,
            evidence_hint: row.evidence_hint.parse()?,
            level: row.level.parse()?,
            status: row.status.parse()?,
            completed_at: row.completed_at,
            proof_url: row.proof_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ReminderRow {
    id: Uuid,
    task_id: Uuid,
    message: String,
    delivery_method: String,
    status: String,
    scheduled_for: DateTime<Utc>,
    sent_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReminderRow> for Reminder {
    type Error = StorageError;

    fn try_from(row: ReminderRow) -> Result<Self, Self::Error> {
        Ok(Reminder {
            id: row.id,
            task_id: row.task_id,
            message: row.message,
            delivery_method: row.delivery_method,
            status: row.status.parse()?,
            scheduled_for: row.scheduled_for,
            sent_at: row.sent_at,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ReportRow {
    id: Uuid,
    task_id: Uuid,
    okr_id: Uuid,
    submission_type: String,
    success: bool,
    overall_result: String,
    checks: Value,
    suggestions: String,
    outcome_analysis: Option<String>,
    archive_key: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReportRow> for ValidationReport {
    type Error = StorageError;

    fn try_from(row: ReportRow) -> Result<Self, Self::Error> {
        let checks: Vec<CheckResult> = serde_json::from_value(row.checks)?;
        Ok(ValidationReport {
            id: row.id,
            task_id: row.task_id,
            okr_id: row.okr_id,
            submission_type: row.submission_type.parse()?,
            success: row.success,
            overall_result: row.overall_result,
            checks,
            suggestions: row.suggestions,
            outcome_analysis: row.outcome_analysis,
            archive_key: row.archive_key,
            created_at: row.created_at,
        })
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> StoreResult<Vec<T>>
where
    T: TryFrom<R, Error = StorageError>,
{
    rows.into_iter().map(T::try_from).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Store implementation
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl OkrStore for PgStorage {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_okr(&self, new: NewOkr) -> StoreResult<Okr> {
        let row: OkrRow = sqlx::query_as(INSERT_OKR)
            .bind(Uuid::new_v4())
            .bind(&new.title)
            .bind(&new.description)
            .bind(new.target_date)
            .bind(&new.objective)
            .bind(&new.key_results)
            .bind(new.status.as_str())
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn create_okr_with_tasks(
        &self,
        new: NewOkr,
        tasks: Vec<PlannedTask>,
    ) -> StoreResult<Okr> {
        let mut tx = self.pool.begin().await?;
        let row: OkrRow = sqlx::query_as(INSERT_OKR)
            .bind(Uuid::new_v4())
            .bind(&new.title)
            .bind(&new.description)
            .bind(new.target_date)
            .bind(&new.objective)
            .bind(&new.key_results)
            .bind(new.status.as_str())
            .fetch_one(&mut *tx)
            .await?;

        for planned in tasks {
            let task = planned.for_okr(row.id);
            sqlx::query(INSERT_TASK)
                .bind(Uuid::new_v4())
                .bind(task.okr_id)
                .bind(&task.title)
                .bind(&task.description)
                .bind(task.deadline)
                .bind(task.evidence_hint.as_str())
                .bind(task.level.as_str())
                .bind(TaskStatus::Pending.as_str())
                .execute(&mut *tx)
                .await?;
        }

        // Dropping the transaction without commit rolls every insert back.
        tx.commit().await?;
        row.try_into()
    }

    async fn list_okrs(&self) -> StoreResult<Vec<OkrWithTasks>> {
        let okrs: Vec<Okr> = convert_all(
            sqlx::query_as::<_, OkrRow>("SELECT * FROM okrs ORDER BY created_at ASC")
                .fetch_all(&self.pool)
                .await?,
        )?;
        let tasks: Vec<Task> = convert_all(
            sqlx::query_as::<_, TaskRow>("SELECT * FROM tasks ORDER BY created_at ASC")
                .fetch_all(&self.pool)
                .await?,
        )?;

        let mut by_okr: HashMap<Uuid, Vec<Task>> = HashMap::new();
        for task in tasks {
            by_okr.entry(task.okr_id).or_default().push(task);
        }
        Ok(okrs
            .into_iter()
            .map(|okr| {
                let tasks = by_okr.remove(&okr.id).unwrap_or_default();
                OkrWithTasks::assemble(okr, tasks)
            })
            .collect())
    }

    async fn get_okr(&self, id: Uuid) -> StoreResult<Option<OkrWithTasks>> {
        let row: Option<OkrRow> = sqlx::query_as("SELECT * FROM okrs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let tasks = self.tasks_for_okr(id).await?;
        Ok(Some(OkrWithTasks::assemble(row.try_into()?, tasks)))
    }

    async fn update_okr_progress(&self, id: Uuid, progress: i32) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE okrs SET progress = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(clamp_progress(progress))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_okr_status(&self, id: Uuid, status: OkrStatus) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE okrs SET status = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_task(&self, new: NewTask) -> StoreResult<Task> {
        let row: TaskRow = sqlx::query_as(INSERT_TASK)
            .bind(Uuid::new_v4())
            .bind(new.okr_id)
            .bind(&new.title)
            .bind(&new.description)
            .bind(new.deadline)
            .bind(new.evidence_hint.as_str())
            .bind(new.level.as_str())
            .bind(TaskStatus::Pending.as_str())
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        convert_all(
            sqlx::query_as::<_, TaskRow>("SELECT * FROM tasks ORDER BY created_at ASC")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn tasks_for_okr(&self, okr_id: Uuid) -> StoreResult<Vec<Task>> {
        convert_all(
            sqlx::query_as::<_, TaskRow>(
                "SELECT * FROM tasks WHERE okr_id = $1 ORDER BY created_at ASC",
            )
            .bind(okr_id)
            .fetch_all(&self.pool)
            .await?,
        )
    }

    async fn get_task(&self, id: Uuid) -> StoreResult<Option<TaskWithReminders>> {
        let Some(task) = self.fetch_task(id).await? else {
            return Ok(None);
        };
        let reminders = convert_all(
            sqlx::query_as::<_, ReminderRow>(
                "SELECT * FROM reminders WHERE task_id = $1 ORDER BY created_at ASC",
            )
            .bind(id)
            .fetch_all(&self.pool)
            .await?,
        )?;
        Ok(Some(TaskWithReminders { task, reminders }))
    }

    async fn update_task(&self, id: Uuid, update: TaskUpdate) -> StoreResult<Option<Task>> {
        let Some(mut task) = self.fetch_task(id).await? else {
            return Ok(None);
        };
        if update.apply(&mut task) {
            task.updated_at = Utc::now();
            self.write_task(&task).await?;
        }
        Ok(Some(task))
    }

    async fn complete_task(
        &self,
        id: Uuid,
        proof_url: Option<String>,
    ) -> StoreResult<Option<Task>> {
        let row: Option<TaskRow> = sqlx::query_as(
            r#"
            UPDATE tasks
            SET status = $2, completed_at = now(), proof_url = COALESCE($3, proof_url),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(TaskStatus::Completed.as_str())
        .bind(proof_url)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Task::try_from).transpose()
    }

    async fn create_reminder(&self, new: NewReminder) -> StoreResult<Reminder> {
        let row: ReminderRow = sqlx::query_as(
            r#"
            INSERT INTO reminders (id, task_id, message, delivery_method, status, scheduled_for)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.task_id)
        .bind(&new.message)
        .bind(&new.delivery_method)
        .bind(ReminderStatus::Pending.as_str())
        .bind(new.scheduled_for)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn list_reminders(&self) -> StoreResult<Vec<Reminder>> {
        convert_all(
            sqlx::query_as::<_, ReminderRow>("SELECT * FROM reminders ORDER BY created_at ASC")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn upcoming_reminders(&self, now: DateTime<Utc>) -> StoreResult<Vec<Reminder>> {
        convert_all(
            sqlx::query_as::<_, ReminderRow>(
                r#"
                SELECT * FROM reminders
                WHERE status = 'pending' AND scheduled_for > $1
                ORDER BY scheduled_for ASC
                "#,
            )
            .bind(now)
            .fetch_all(&self.pool)
            .await?,
        )
    }

    async fn due_reminders(&self, now: DateTime<Utc>) -> StoreResult<Vec<Reminder>> {
        convert_all(
            sqlx::query_as::<_, ReminderRow>(
                r#"
                SELECT * FROM reminders
                WHERE status = 'pending' AND scheduled_for <= $1
                ORDER BY scheduled_for ASC
                "#,
            )
            .bind(now)
            .fetch_all(&self.pool)
            .await?,
        )
    }

    async fn update_reminder_status(&self, id: Uuid, status: ReminderStatus) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE reminders
            SET status = $2,
                sent_at = CASE WHEN $2 = 'sent' THEN now() ELSE sent_at END
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn save_report(&self, report: &ValidationReport) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO validation_reports
                (id, task_id, okr_id, submission_type, success, overall_result,
                 checks, suggestions, outcome_analysis, archive_key, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(report.id)
        .bind(report.task_id)
        .bind(report.okr_id)
        .bind(report.submission_type.as_str())
        .bind(report.success)
        .bind(&report.overall_result)
        .bind(serde_json::to_value(&report.checks)?)
        .bind(&report.suggestions)
        .bind(&report.outcome_analysis)
        .bind(&report.archive_key)
        .bind(report.created_at)
        .execute(&self.pool)
        .await?;
        info!("Saved validation report {} for task {}", report.id, report.task_id);
        Ok(())
    }

    async fn get_report(&self, id: Uuid) -> StoreResult<Option<ValidationReport>> {
        let row: Option<ReportRow> =
            sqlx::query_as("SELECT * FROM validation_reports WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(ValidationReport::try_from).transpose()
    }

    async fn reports_for_task(&self, task_id: Uuid) -> StoreResult<Vec<ValidationReport>> {
        convert_all(
            sqlx::query_as::<_, ReportRow>(
                "SELECT * FROM validation_reports WHERE task_id = $1 ORDER BY created_at ASC",
            )
            .bind(task_id)
            .fetch_all(&self.pool)
            .await?,
        )
    }
}
