use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{clamp_progress, OkrStore, StoreResult};
use crate::models::{
    NewOkr, NewReminder, NewTask, Okr, OkrStatus, OkrWithTasks, PlannedTask, Reminder,
    ReminderStatus, Task, TaskStatus, TaskUpdate, TaskWithReminders, ValidationReport,
};

#[derive(Default)]
struct Collections {
    okrs: Vec<Okr>,
    tasks: Vec<Task>,
    reminders: Vec<Reminder>,
    reports: Vec<ValidationReport>,
}

impl Collections {
    fn tasks_for(&self, okr_id: Uuid) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| t.okr_id == okr_id)
            .cloned()
            .collect()
    }
}

/// Process-local store. Collections keep insertion order, so listings come
/// back oldest first like the PostgreSQL backend.
#[derive(Default)]
pub struct MemStorage {
    inner: RwLock<Collections>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn build_okr(new: NewOkr, now: DateTime<Utc>) -> Okr {
    Okr {
        id: Uuid::new_v4(),
        title: new.title,
        description: new.description,
        target_date: new.target_date,
        objective: new.objective,
        key_results: new.key_results,
        status: new.status,
        progress: 0,
        created_at: now,
        updated_at: now,
    }
}

fn build_task(new: NewTask, now: DateTime<Utc>) -> Task {
    Task {
        id: Uuid::new_v4(),
        okr_id: new.okr_id,
        title: new.title,
        description: new.description,
        deadline: new.deadline,
        evidence_hint: new.evidence_hint,
        level: new.level,
        status: TaskStatus::Pending,
        completed_at: None,
        proof_url: None,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl OkrStore for MemStorage {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_okr(&self, new: NewOkr) -> StoreResult<Okr> {
        let okr = build_okr(new, Utc::now());
        self.inner.write().await.okrs.push(okr.clone());
        Ok(okr)
    }

    async fn create_okr_with_tasks(
        &self,
        new: NewOkr,
        tasks: Vec<PlannedTask>,
    ) -> StoreResult<Okr> {
        let now = Utc::now();
        let okr = build_okr(new, now);
        let tasks: Vec<Task> = tasks
            .into_iter()
            .map(|planned| build_task(planned.for_okr(okr.id), now))
            .collect();
        let mut inner = self.inner.write().await;
        inner.okrs.push(okr.clone());
        inner.tasks.extend(tasks);
        Ok(okr)
    }

    async fn list_okrs(&self) -> StoreResult<Vec<OkrWithTasks>> {
        let inner = self.inner.read().await;
        Ok(inner
            .okrs
            .iter()
            .map(|okr| OkrWithTasks::assemble(okr.clone(), inner.tasks_for(okr.id)))
            .collect())
    }

    async fn get_okr(&self, id: Uuid) -> StoreResult<Option<OkrWithTasks>> {
        let inner = self.inner.read().await;
        Ok(inner
            .okrs
            .iter()
            .find(|o| o.id == id)
            .map(|okr| OkrWithTasks::assemble(okr.clone(), inner.tasks_for(id))))
    }

    async fn update_okr_progress(&self, id: Uuid, progress: i32) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(okr) = inner.okrs.iter_mut().find(|o| o.id == id) else {
            return Ok(false);
        };
        okr.progress = clamp_progress(progress);
        okr.updated_at = Utc::now();
        Ok(true)
    }

    async fn update_okr_status(&self, id: Uuid, status: OkrStatus) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(okr) = inner.okrs.iter_mut().find(|o| o.id == id) else {
            return Ok(false);
        };
        okr.status = status;
        okr.updated_at = Utc::now();
        Ok(true)
    }

    async fn create_task(&self, new: NewTask) -> StoreResult<Task> {
        let task = build_task(new, Utc::now());
        self.inner.write().await.tasks.push(task.clone());
        Ok(task)
    }

    async fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        Ok(self.inner.read().await.tasks.clone())
    }

    async fn tasks_for_okr(&self, okr_id: Uuid) -> StoreResult<Vec<Task>> {
        Ok(self.inner.read().await.tasks_for(okr_id))
    }

    async fn get_task(&self, id: Uuid) -> StoreResult<Option<TaskWithReminders>> {
        let inner = self.inner.read().await;
        Ok(inner.tasks.iter().find(|t| t.id == id).map(|task| {
            let reminders = inner
                .reminders
                .iter()
                .filter(|r| r.task_id == id)
                .cloned()
                .collect();
            TaskWithReminders {
                task: task.clone(),
                reminders,
            }
        }))
    }

    async fn update_task(&self, id: Uuid, update: TaskUpdate) -> StoreResult<Option<Task>> {
        let mut inner = self.inner.write().await;
        let Some(task) = inner.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        if update.apply(task) {
            task.updated_at = Utc::now();
        }
        Ok(Some(task.clone()))
    }

    async fn complete_task(
        &self,
        id: Uuid,
        proof_url: Option<String>,
    ) -> StoreResult<Option<Task>> {
        let mut inner = self.inner.write().await;
        let Some(task) = inner.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        let now = Utc::now();
        task.status = TaskStatus::Completed;
        task.completed_at = Some(now);
        if proof_url.is_some() {
            task.proof_url = proof_url;
        }
        task.updated_at = now;
        Ok(Some(task.clone()))
    }

    async fn create_reminder(&self, new: NewReminder) -> StoreResult<Reminder> {
        let reminder = Reminder {
            id: Uuid::new_v4(),
            task_id: new.task_id,
            message: new.message,
            delivery_method: new.delivery_method,
            status: ReminderStatus::Pending,
            scheduled_for: new.scheduled_for,
            sent_at: None,
            created_at: Utc::now(),
        };
        self.inner.write().await.reminders.push(reminder.clone());
        Ok(reminder)
    }

    async fn list_reminders(&self) -> StoreResult<Vec<Reminder>> {
        Ok(self.inner.read().await.reminders.clone())
    }

    async fn upcoming_reminders(&self, now: DateTime<Utc>) -> StoreResult<Vec<Reminder>> {
        let inner = self.inner.read().await;
        let mut upcoming: Vec<_> = inner
            .reminders
            .iter()
            .filter(|r| r.is_upcoming(now))
            .cloned()
            .collect();
        upcoming.sort_by_key(|r| r.scheduled_for);
        Ok(upcoming)
    }

    async fn due_reminders(&self, now: DateTime<Utc>) -> StoreResult<Vec<Reminder>> {
        let inner = self.inner.read().await;
        let mut due: Vec<_> = inner
            .reminders
            .iter()
            .filter(|r| r.is_due(now))
            .cloned()
            .collect();
        due.sort_by_key(|r| r.scheduled_for);
        Ok(due)
    }

    async fn update_reminder_status(&self, id: Uuid, status: ReminderStatus) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(reminder) = inner.reminders.iter_mut().find(|r| r.id == id) else {
            return Ok(false);
        };
        reminder.status = status;
        if status == ReminderStatus::Sent {
            reminder.sent_at = Some(Utc::now());
        }
        Ok(true)
    }

    async fn save_report(&self, report: &ValidationReport) -> StoreResult<()> {
        self.inner.write().await.reports.push(report.clone());
        Ok(())
    }

    async fn get_report(&self, id: Uuid) -> StoreResult<Option<ValidationReport>> {
        Ok(self
            .inner
            .read()
            .await
            .reports
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn reports_for_task(&self, task_id: Uuid) -> StoreResult<Vec<ValidationReport>> {
        Ok(self
            .inner
            .read()
            .await
            .reports
            .iter()
            .filter(|r| r.task_id == task_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::*;
    use crate::models::{EvidenceKind, TaskLevel};

    fn new_okr() -> NewOkr {
        NewOkr {
            title: "Publish AI Articles".into(),
            description: "I want to publish 3 AI articles this quarter.".into(),
            target_date: NaiveDate::from_ymd_opt(2025, 9, 30).unwrap(),
            objective: "Publish 3 AI articles".into(),
            key_results: vec!["3 published articles".into()],
            status: OkrStatus::Active,
        }
    }

    fn new_task(okr_id: Uuid, title: &str) -> NewTask {
        NewTask {
            okr_id,
            title: title.into(),
            description: None,
            deadline: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            evidence_hint: EvidenceKind::Pdf,
            level: TaskLevel::Medium,
        }
    }

    fn new_reminder(task_id: Uuid, scheduled_for: DateTime<Utc>) -> NewReminder {
        NewReminder {
            task_id,
            message: "Draft due tomorrow".into(),
            delivery_method: "dashboard".into(),
            scheduled_for,
        }
    }

    #[tokio::test]
    async fn test_okr_counts_completed_tasks() {
        let store = MemStorage::new();
        let okr = store.create_okr(new_okr()).await.unwrap();
        let a = store.create_task(new_task(okr.id, "Outline")).await.unwrap();
        store.create_task(new_task(okr.id, "Draft")).await.unwrap();
        store.complete_task(a.id, None).await.unwrap();

        let loaded = store.get_okr(okr.id).await.unwrap().unwrap();
        assert_eq!(loaded.total_tasks, 2);
        assert_eq!(loaded.completed_tasks, 1);
        assert_eq!(loaded.tasks[0].title, "Outline");
    }

    #[tokio::test]
    async fn test_okr_with_tasks_stored_together() {
        let store = MemStorage::new();
        let planned = ["Outline", "Draft"].map(|title| PlannedTask {
            title: title.into(),
            deadline: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            evidence_hint: EvidenceKind::Text,
            level: TaskLevel::Easy,
        });
        let okr = store
            .create_okr_with_tasks(new_okr(), planned.to_vec())
            .await
            .unwrap();

        let loaded = store.get_okr(okr.id).await.unwrap().unwrap();
        assert_eq!(loaded.total_tasks, 2);
        assert!(loaded.tasks.iter().all(|t| t.okr_id == okr.id));
        assert!(loaded.tasks.iter().all(|t| t.status == TaskStatus::Pending));
        assert_eq!(loaded.tasks[1].title, "Draft");
    }

    #[tokio::test]
    async fn test_unknown_ids_are_none() {
        let store = MemStorage::new();
        let id = Uuid::new_v4();
        assert!(store.get_okr(id).await.unwrap().is_none());
        assert!(store.get_task(id).await.unwrap().is_none());
        assert!(store
            .update_task(id, TaskUpdate::default())
            .await
            .unwrap()
            .is_none());
        assert!(!store.update_okr_progress(id, 50).await.unwrap());
        assert!(!store
            .update_reminder_status(id, ReminderStatus::Sent)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_progress_is_clamped() {
        let store = MemStorage::new();
        let okr = store.create_okr(new_okr()).await.unwrap();
        store.update_okr_progress(okr.id, 140).await.unwrap();
        assert_eq!(store.get_okr(okr.id).await.unwrap().unwrap().okr.progress, 100);
        store.update_okr_progress(okr.id, -3).await.unwrap();
        assert_eq!(store.get_okr(okr.id).await.unwrap().unwrap().okr.progress, 0);
    }

    #[tokio::test]
    async fn test_complete_task_keeps_existing_proof_when_none_given() {
        let store = MemStorage::new();
        let okr = store.create_okr(new_okr()).await.unwrap();
        let task = store.create_task(new_task(okr.id, "Draft")).await.unwrap();
        store
            .update_task(
                task.id,
                TaskUpdate {
                    proof_url: Some("https://github.com/me/post".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let done = store.complete_task(task.id, None).await.unwrap().unwrap();
        assert_eq!(done.status, TaskStatus::Completed);
        assert!(done.completed_at.is_some());
        assert_eq!(done.proof_url.as_deref(), Some("https://github.com/me/post"));
    }

    #[tokio::test]
    async fn test_reminder_windows_and_sent_stamp() {
        let store = MemStorage::new();
        let okr = store.create_okr(new_okr()).await.unwrap();
        let task = store.create_task(new_task(okr.id, "Draft")).await.unwrap();
        let now = Utc::now();
        let past = store
            .create_reminder(new_reminder(task.id, now - Duration::hours(1)))
            .await
            .unwrap();
        let future = store
            .create_reminder(new_reminder(task.id, now + Duration::hours(1)))
            .await
            .unwrap();

        let due = store.due_reminders(now).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, past.id);
        let upcoming = store.upcoming_reminders(now).await.unwrap();
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].id, future.id);

        store
            .update_reminder_status(past.id, ReminderStatus::Sent)
            .await
            .unwrap();
        assert!(store.due_reminders(now).await.unwrap().is_empty());
        let with = store.get_task(task.id).await.unwrap().unwrap();
        let sent = with.reminders.iter().find(|r| r.id == past.id).unwrap();
        assert!(sent.sent_at.is_some());
    }
}
