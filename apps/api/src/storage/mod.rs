//! Document store for OKRs, micro-tasks, reminders and validation reports.
//!
//! `AppState` holds an `Arc<dyn OkrStore>`: `PgStorage` when `DATABASE_URL`
//! is set, `MemStorage` otherwise (and in tests).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    NewOkr, NewReminder, NewTask, Okr, OkrStatus, OkrWithTasks, PlannedTask, Reminder,
    ReminderStatus, Task, TaskUpdate, TaskWithReminders, UnknownVariant, ValidationReport,
};

#[cfg(test)]
pub mod faulty;
pub mod memory;
pub mod postgres;

pub use memory::MemStorage;
pub use postgres::PgStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl From<UnknownVariant> for StorageError {
    fn from(e: UnknownVariant) -> Self {
        StorageError::Corrupt(e.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Corrupt(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StorageError>;

/// Lookups return `Ok(None)` (or `Ok(false)` for in-place updates) when the id
/// does not exist; handlers turn that into a 404.
#[async_trait]
pub trait OkrStore: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;

    // OKRs
    async fn create_okr(&self, okr: NewOkr) -> StoreResult<Okr>;
    /// Stores the OKR and its tasks as one unit: all rows or none.
    async fn create_okr_with_tasks(&self, okr: NewOkr, tasks: Vec<PlannedTask>)
        -> StoreResult<Okr>;
    async fn list_okrs(&self) -> StoreResult<Vec<OkrWithTasks>>;
    async fn get_okr(&self, id: Uuid) -> StoreResult<Option<OkrWithTasks>>;
    /// Progress is clamped to 0..=100.
    async fn update_okr_progress(&self, id: Uuid, progress: i32) -> StoreResult<bool>;
    async fn update_okr_status(&self, id: Uuid, status: OkrStatus) -> StoreResult<bool>;

    // Tasks
    async fn create_task(&self, task: NewTask) -> StoreResult<Task>;
    async fn list_tasks(&self) -> StoreResult<Vec<Task>>;
    async fn tasks_for_okr(&self, okr_id: Uuid) -> StoreResult<Vec<Task>>;
    async fn get_task(&self, id: Uuid) -> StoreResult<Option<TaskWithReminders>>;
    async fn update_task(&self, id: Uuid, update: TaskUpdate) -> StoreResult<Option<Task>>;
    /// Marks the task completed now. A `None` proof keeps any existing proof URL.
    async fn complete_task(&self, id: Uuid, proof_url: Option<String>)
        -> StoreResult<Option<Task>>;

    // Reminders
    async fn create_reminder(&self, reminder: NewReminder) -> StoreResult<Reminder>;
    async fn list_reminders(&self) -> StoreResult<Vec<Reminder>>;
    /// Pending reminders scheduled strictly after `now`.
    async fn upcoming_reminders(&self, now: DateTime<Utc>) -> StoreResult<Vec<Reminder>>;
    /// Pending reminders scheduled at or before `now`.
    async fn due_reminders(&self, now: DateTime<Utc>) -> StoreResult<Vec<Reminder>>;
    /// Setting `Sent` stamps `sent_at`.
    async fn update_reminder_status(&self, id: Uuid, status: ReminderStatus) -> StoreResult<bool>;

    // Validation reports
    async fn save_report(&self, report: &ValidationReport) -> StoreResult<()>;
    async fn get_report(&self, id: Uuid) -> StoreResult<Option<ValidationReport>>;
    async fn reports_for_task(&self, task_id: Uuid) -> StoreResult<Vec<ValidationReport>>;
}

pub(crate) fn clamp_progress(progress: i32) -> i32 {
    progress.clamp(0, 100)
}
