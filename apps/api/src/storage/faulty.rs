//! Test store that delegates to [`MemStorage`] but can be told to fail
//! specific writes.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{MemStorage, OkrStore, StorageError, StoreResult};
use crate::models::{
    NewOkr, NewReminder, NewTask, Okr, OkrStatus, OkrWithTasks, PlannedTask, Reminder,
    ReminderStatus, Task, TaskUpdate, TaskWithReminders, ValidationReport,
};

#[derive(Default)]
pub struct FaultyStore {
    pub inner: MemStorage,
    pub fail_okr_inserts: AtomicBool,
    pub fail_reminder_updates: AtomicBool,
}

fn injected(what: &str) -> StorageError {
    StorageError::Database(sqlx::Error::Protocol(format!("injected {what} failure")))
}

#[async_trait]
impl OkrStore for FaultyStore {
    async fn ping(&self) -> StoreResult<()> {
        self.inner.ping().await
    }

    async fn create_okr(&self, okr: NewOkr) -> StoreResult<Okr> {
        if self.fail_okr_inserts.load(Ordering::SeqCst) {
            return Err(injected("OKR insert"));
        }
        self.inner.create_okr(okr).await
    }

    async fn create_okr_with_tasks(
        &self,
        okr: NewOkr,
        tasks: Vec<PlannedTask>,
    ) -> StoreResult<Okr> {
        if self.fail_okr_inserts.load(Ordering::SeqCst) {
            return Err(injected("OKR insert"));
        }
        self.inner.create_okr_with_tasks(okr, tasks).await
    }

    async fn list_okrs(&self) -> StoreResult<Vec<OkrWithTasks>> {
        self.inner.list_okrs().await
    }

    async fn get_okr(&self, id: Uuid) -> StoreResult<Option<OkrWithTasks>> {
        self.inner.get_okr(id).await
    }

    async fn update_okr_progress(&self, id: Uuid, progress: i32) -> StoreResult<bool> {
        self.inner.update_okr_progress(id, progress).await
    }

    async fn update_okr_status(&self, id: Uuid, status: OkrStatus) -> StoreResult<bool> {
        self.inner.update_okr_status(id, status).await
    }

    async fn create_task(&self, task: NewTask) -> StoreResult<Task> {
        self.inner.create_task(task).await
    }

    async fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        self.inner.list_tasks().await
    }

    async fn tasks_for_okr(&self, okr_id: Uuid) -> StoreResult<Vec<Task>> {
        self.inner.tasks_for_okr(okr_id).await
    }

    async fn get_task(&self, id: Uuid) -> StoreResult<Option<TaskWithReminders>> {
        self.inner.get_task(id).await
    }

    async fn update_task(&self, id: Uuid, update: TaskUpdate) -> StoreResult<Option<Task>> {
        self.inner.update_task(id, update).await
    }

    async fn complete_task(
        &self,
        id: Uuid,
        proof_url: Option<String>,
    ) -> StoreResult<Option<Task>> {
        self.inner.complete_task(id, proof_url).await
    }

    async fn create_reminder(&self, reminder: NewReminder) -> StoreResult<Reminder> {
        self.inner.create_reminder(reminder).await
    }

    async fn list_reminders(&self) -> StoreResult<Vec<Reminder>> {
        self.inner.list_reminders().await
    }

    async fn upcoming_reminders(&self, now: DateTime<Utc>) -> StoreResult<Vec<Reminder>> {
        self.inner.upcoming_reminders(now).await
    }

    async fn due_reminders(&self, now: DateTime<Utc>) -> StoreResult<Vec<Reminder>> {
        self.inner.due_reminders(now).await
    }

    async fn update_reminder_status(&self, id: Uuid, status: ReminderStatus) -> StoreResult<bool> {
        if self.fail_reminder_updates.load(Ordering::SeqCst) {
            return Err(injected("reminder update"));
        }
        self.inner.update_reminder_status(id, status).await
    }

    async fn save_report(&self, report: &ValidationReport) -> StoreResult<()> {
        self.inner.save_report(report).await
    }

    async fn get_report(&self, id: Uuid) -> StoreResult<Option<ValidationReport>> {
        self.inner.get_report(id).await
    }

    async fn reports_for_task(&self, task_id: Uuid) -> StoreResult<Vec<ValidationReport>> {
        self.inner.reports_for_task(task_id).await
    }
}
