use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::reminder::Reminder;
use super::UnknownVariant;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    Active,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Active => "active",
            TaskStatus::Completed => "completed",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "active" => Ok(TaskStatus::Active),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err(UnknownVariant::new("task status", s)),
        }
    }
}

/// Effort band for a micro-task. Drives how much calendar time it gets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskLevel {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl TaskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskLevel::Easy => "easy",
            TaskLevel::Medium => "medium",
            TaskLevel::Hard => "hard",
        }
    }
}

impl FromStr for TaskLevel {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(TaskLevel::Easy),
            "medium" => Ok(TaskLevel::Medium),
            "hard" => Ok(TaskLevel::Hard),
            _ => Err(UnknownVariant::new("task level", s)),
        }
    }
}

/// The kind of evidence a micro-task expects, which is also the kind of a submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvidenceKind {
    #[default]
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "git-url")]
    GitUrl,
    #[serde(rename = "youtube-url")]
    YoutubeUrl,
    #[serde(rename = "linkedIn-url", alias = "linkedin-url")]
    LinkedinUrl,
    #[serde(rename = "screenshot")]
    Screenshot,
    #[serde(rename = "other-url")]
    OtherUrl,
    #[serde(rename = "pdf")]
    Pdf,
}

impl EvidenceKind {
    pub const ALL: [EvidenceKind; 7] = [
        EvidenceKind::Text,
        EvidenceKind::GitUrl,
        EvidenceKind::YoutubeUrl,
        EvidenceKind::LinkedinUrl,
        EvidenceKind::Screenshot,
        EvidenceKind::OtherUrl,
        EvidenceKind::Pdf,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceKind::Text => "text",
            EvidenceKind::GitUrl => "git-url",
            EvidenceKind::YoutubeUrl => "youtube-url",
            EvidenceKind::LinkedinUrl => "linkedIn-url",
            EvidenceKind::Screenshot => "screenshot",
            EvidenceKind::OtherUrl => "other-url",
            EvidenceKind::Pdf => "pdf",
        }
    }

    pub fn is_url(&self) -> bool {
        matches!(
            self,
            EvidenceKind::GitUrl
                | EvidenceKind::YoutubeUrl
                | EvidenceKind::LinkedinUrl
                | EvidenceKind::OtherUrl
        )
    }

    /// Binary uploads whose text has to be extracted before checking.
    pub fn is_document(&self) -> bool {
        matches!(self, EvidenceKind::Pdf | EvidenceKind::Screenshot)
    }

    /// Hosts a URL submission must belong to. Empty means any host is accepted.
    pub fn expected_domains(&self) -> &'static [&'static str] {
        match self {
            EvidenceKind::GitUrl => &["github.com"],
            EvidenceKind::LinkedinUrl => &["linkedin.com"],
            EvidenceKind::YoutubeUrl => &["youtube.com", "youtu.be"],
            _ => &[],
        }
    }
}

impl FromStr for EvidenceKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        EvidenceKind::ALL
            .into_iter()
            .find(|k| k.as_str().to_lowercase() == wanted)
            .ok_or_else(|| UnknownVariant::new("evidence kind", s))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub okr_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub deadline: NaiveDate,
    pub evidence_hint: EvidenceKind,
    pub level: TaskLevel,
    pub status: TaskStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub proof_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub okr_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub deadline: NaiveDate,
    #[serde(default)]
    pub evidence_hint: EvidenceKind,
    #[serde(default)]
    pub level: TaskLevel,
}

/// A micro-task planned before its OKR has an id.
#[derive(Debug, Clone)]
pub struct PlannedTask {
    pub title: String,
    pub deadline: NaiveDate,
    pub evidence_hint: EvidenceKind,
    pub level: TaskLevel,
}

impl PlannedTask {
    pub fn for_okr(self, okr_id: Uuid) -> NewTask {
        NewTask {
            okr_id,
            title: self.title,
            description: None,
            deadline: self.deadline,
            evidence_hint: self.evidence_hint,
            level: self.level,
        }
    }
}

/// Partial update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub status: Option<TaskStatus>,
    pub evidence_hint: Option<EvidenceKind>,
    pub level: Option<TaskLevel>,
    pub completed_at: Option<DateTime<Utc>>,
    pub proof_url: Option<String>,
}

impl TaskUpdate {
    /// Applies the patch in place. Returns whether any field changed.
    ///
    /// Moving to `Completed` stamps `completed_at` unless it is already set
    /// or supplied by the patch.
    pub fn apply(&self, task: &mut Task) -> bool {
        let mut changed = false;
        if let Some(title) = &self.title {
            task.title = title.clone();
            changed = true;
        }
        if let Some(description) = &self.description {
            task.description = Some(description.clone());
            changed = true;
        }
        if let Some(deadline) = self.deadline {
            task.deadline = deadline;
            changed = true;
        }
        if let Some(status) = self.status {
            if status == TaskStatus::Completed && task.completed_at.is_none() {
                task.completed_at = Some(Utc::now());
            }
            task.status = status;
            changed = true;
        }
        if let Some(hint) = self.evidence_hint {
            task.evidence_hint = hint;
            changed = true;
        }
        if let Some(level) = self.level {
            task.level = level;
            changed = true;
        }
        if let Some(at) = self.completed_at {
            task.completed_at = Some(at);
            changed = true;
        }
        if let Some(url) = &self.proof_url {
            task.proof_url = Some(url.clone());
            changed = true;
        }
        changed
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskWithReminders {
    #[serde(flatten)]
    pub task: Task,
    pub reminders: Vec<Reminder>,
}
