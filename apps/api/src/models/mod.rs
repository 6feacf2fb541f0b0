pub mod okr;
pub mod reminder;
pub mod report;
pub mod task;

pub use okr::{NewOkr, Okr, OkrStatus, OkrWithTasks};
pub use reminder::{NewReminder, Reminder, ReminderStatus};
pub use report::{CheckKind, CheckResult, CheckStatus, ValidationReport};
pub use task::{
    EvidenceKind, NewTask, PlannedTask, Task, TaskLevel, TaskStatus, TaskUpdate, TaskWithReminders,
};

/// Error returned when a stored or submitted enum label is not recognised.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
