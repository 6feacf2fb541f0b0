//! Background reminder delivery.
//!
//! Every poll the dispatcher takes the reminders that are due, hands each to a
//! [`ReminderSink`] and records the outcome as `sent` or `failed`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::models::{Reminder, ReminderStatus};
use crate::storage::{OkrStore, StorageError};

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("payload encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Where due reminders go.
#[async_trait]
pub trait ReminderSink: Send + Sync {
    async fn deliver(&self, reminder: &Reminder) -> Result<(), DeliveryError>;
}

/// Message pushed onto the delivery queue.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderDelivery<'a> {
    pub id: Uuid,
    pub task_id: Uuid,
    pub message: &'a str,
    pub delivery_method: &'a str,
    pub scheduled_for: DateTime<Utc>,
}

impl<'a> From<&'a Reminder> for ReminderDelivery<'a> {
    fn from(r: &'a Reminder) -> Self {
        Self {
            id: r.id,
            task_id: r.task_id,
            message: &r.message,
            delivery_method: &r.delivery_method,
            scheduled_for: r.scheduled_for,
        }
    }
}

pub fn queue_key(delivery_method: &str) -> String {
    format!("reminders:{}", delivery_method.trim().to_lowercase())
}

/// LPUSHes a JSON payload onto `reminders:{delivery_method}` for a worker to pick up.
///
/// One multiplexed connection is opened lazily and shared by every delivery.
/// A failed push drops it so the next delivery reconnects.
pub struct RedisQueue {
    client: redis::Client,
    conn: Mutex<Option<MultiplexedConnection>>,
}

impl RedisQueue {
    pub fn new(client: redis::Client) -> Self {
        Self {
            client,
            conn: Mutex::new(None),
        }
    }

    async fn connection(&self) -> Result<MultiplexedConnection, DeliveryError> {
        let mut cached = self.conn.lock().await;
        if let Some(conn) = cached.as_ref() {
            return Ok(conn.clone());
        }
        let conn = self.client.get_multiplexed_tokio_connection().await?;
        debug!("Opened Redis connection for reminder delivery");
        *cached = Some(conn.clone());
        Ok(conn)
    }
}

#[async_trait]
impl ReminderSink for RedisQueue {
    async fn deliver(&self, reminder: &Reminder) -> Result<(), DeliveryError> {
        let payload = serde_json::to_string(&ReminderDelivery::from(reminder))?;
        let mut conn = self.connection().await?;
        if let Err(e) = conn
            .lpush::<_, _, ()>(queue_key(&reminder.delivery_method), payload)
            .await
        {
            *self.conn.lock().await = None;
            return Err(e.into());
        }
        Ok(())
    }
}

/// Used when no queue is configured; the reminder only appears in the logs.
pub struct LogSink;

#[async_trait]
impl ReminderSink for LogSink {
    async fn deliver(&self, reminder: &Reminder) -> Result<(), DeliveryError> {
        info!(
            "Reminder {} for task {} via {}: {}",
            reminder.id, reminder.task_id, reminder.delivery_method, reminder.message
        );
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    pub sent: usize,
    pub failed: usize,
}

/// One pass over the due reminders.
pub async fn dispatch_due(
    store: &dyn OkrStore,
    sink: &dyn ReminderSink,
    now: DateTime<Utc>,
) -> Result<DispatchSummary, StorageError> {
    let due = store.due_reminders(now).await?;
    let mut summary = DispatchSummary::default();

    for reminder in &due {
        let status = match sink.deliver(reminder).await {
            Ok(()) => {
                summary.sent += 1;
                ReminderStatus::Sent
            }
            Err(e) => {
                warn!("Delivery of reminder {} failed: {e}", reminder.id);
                summary.failed += 1;
                ReminderStatus::Failed
            }
        };
        // The delivery already happened; a lost status write must not stop
        // the remaining reminders.
        if let Err(e) = store.update_reminder_status(reminder.id, status).await {
            error!(
                "Reminder {} could not be marked {}: {e}",
                reminder.id,
                status.as_str()
            );
        }
    }

    if !due.is_empty() {
        debug!(
            "Reminder pass: {} sent, {} failed",
            summary.sent, summary.failed
        );
    }
    Ok(summary)
}

/// Runs [`dispatch_due`] every `period` until the task is aborted.
pub fn spawn_dispatcher(
    store: Arc<dyn OkrStore>,
    sink: Arc<dyn ReminderSink>,
    period: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Err(e) = dispatch_due(store.as_ref(), sink.as_ref(), Utc::now()).await {
                error!("Reminder dispatch failed: {e}");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use chrono::{Duration as ChronoDuration, NaiveDate};

    use super::*;
    use crate::models::{NewOkr, NewReminder, NewTask, OkrStatus, TaskLevel};
    use crate::storage::faulty::FaultyStore;
    use crate::storage::MemStorage;

    /// Records deliveries and fails every reminder sent via "sms".
    #[derive(Default)]
    struct RecordingSink {
        delivered: std::sync::Mutex<Vec<Uuid>>,
    }

    #[async_trait]
    impl ReminderSink for RecordingSink {
        async fn deliver(&self, reminder: &Reminder) -> Result<(), DeliveryError> {
            if reminder.delivery_method == "sms" {
                let err = serde_json::from_str::<()>("nope").unwrap_err();
                return Err(DeliveryError::Encode(err));
            }
            self.delivered.lock().unwrap().push(reminder.id);
            Ok(())
        }
    }

    async fn seed_task(store: &MemStorage) -> Uuid {
        let okr = store
            .create_okr(NewOkr {
                title: "Write articles".into(),
                description: "Publish three AI articles".into(),
                target_date: NaiveDate::from_ymd_opt(2025, 9, 30).unwrap(),
                objective: "Publish 3 AI articles".into(),
                key_results: vec![],
                status: OkrStatus::Active,
            })
            .await
            .unwrap();
        store
            .create_task(NewTask {
                okr_id: okr.id,
                title: "Draft article 1".into(),
                description: None,
                deadline: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
                evidence_hint: Default::default(),
                level: TaskLevel::Easy,
            })
            .await
            .unwrap()
            .id
    }

    async fn remind(store: &MemStorage, task_id: Uuid, method: &str, at: DateTime<Utc>) -> Uuid {
        store
            .create_reminder(NewReminder {
                task_id,
                message: "Draft is due".into(),
                delivery_method: method.into(),
                scheduled_for: at,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_dispatch_marks_sent_and_failed() {
        let store = MemStorage::new();
        let task = seed_task(&store).await;
        let now = Utc::now();
        let due_email = remind(&store, task, "email", now - ChronoDuration::minutes(5)).await;
        let due_sms = remind(&store, task, "sms", now - ChronoDuration::minutes(1)).await;
        let later = remind(&store, task, "email", now + ChronoDuration::hours(2)).await;

        let sink = RecordingSink::default();
        let summary = dispatch_due(&store, &sink, now).await.unwrap();
        assert_eq!(summary, DispatchSummary { sent: 1, failed: 1 });
        assert_eq!(*sink.delivered.lock().unwrap(), vec![due_email]);

        let all = store.list_reminders().await.unwrap();
        let status_of = |id: Uuid| all.iter().find(|r| r.id == id).unwrap().clone();
        assert_eq!(status_of(due_email).status, ReminderStatus::Sent);
        assert!(status_of(due_email).sent_at.is_some());
        assert_eq!(status_of(due_sms).status, ReminderStatus::Failed);
        assert_eq!(status_of(later).status, ReminderStatus::Pending);

        // nothing left to deliver on the next pass
        let again = dispatch_due(&store, &sink, now).await.unwrap();
        assert_eq!(again, DispatchSummary::default());
    }

    #[tokio::test]
    async fn test_status_write_failure_does_not_stop_pass() {
        let store = FaultyStore::default();
        let task = seed_task(&store.inner).await;
        let now = Utc::now();
        let first = remind(&store.inner, task, "email", now - ChronoDuration::minutes(2)).await;
        let second = remind(&store.inner, task, "email", now - ChronoDuration::minutes(1)).await;
        store.fail_reminder_updates.store(true, Ordering::SeqCst);

        let sink = RecordingSink::default();
        let summary = dispatch_due(&store, &sink, now).await.unwrap();
        assert_eq!(summary, DispatchSummary { sent: 2, failed: 0 });
        assert_eq!(*sink.delivered.lock().unwrap(), vec![first, second]);
    }

    #[tokio::test]
    async fn test_log_sink_always_delivers() {
        let store = MemStorage::new();
        let task = seed_task(&store).await;
        remind(&store, task, "dashboard", Utc::now() - ChronoDuration::seconds(1)).await;
        let summary = dispatch_due(&store, &LogSink, Utc::now()).await.unwrap();
        assert_eq!(summary.sent, 1);
    }

    #[test]
    fn test_queue_key_and_payload() {
        assert_eq!(queue_key(" Email "), "reminders:email");
        let r = Reminder {
            id: Uuid::nil(),
            task_id: Uuid::nil(),
            message: "hi".into(),
            delivery_method: "email".into(),
            status: ReminderStatus::Pending,
            scheduled_for: Utc::now(),
            sent_at: None,
            created_at: Utc::now(),
        };
        let v = serde_json::to_value(ReminderDelivery::from(&r)).unwrap();
        assert_eq!(v["deliveryMethod"], "email");
        assert_eq!(v["taskId"], Uuid::nil().to_string());
    }
}
