use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::task::{Task, TaskStatus};
use super::UnknownVariant;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OkrStatus {
    #[default]
    Inactive,
    Active,
    Completed,
}

impl OkrStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OkrStatus::Inactive => "inactive",
            OkrStatus::Active => "active",
            OkrStatus::Completed => "completed",
        }
    }
}

impl FromStr for OkrStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inactive" => Ok(OkrStatus::Inactive),
            "active" => Ok(OkrStatus::Active),
            "completed" => Ok(OkrStatus::Completed),
            _ => Err(UnknownVariant::new("OKR status", s)),
        }
    }
}

/// An objective together with the key results extracted from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Okr {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub target_date: NaiveDate,
    /// Cleaned objective statement as extracted by the parser.
    pub objective: String,
    pub key_results: Vec<String>,
    pub status: OkrStatus,
    /// Percentage of micro-tasks completed, 0..=100.
    pub progress: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new OKR. The store assigns id, progress (0) and timestamps.
#[derive(Debug, Clone)]
pub struct NewOkr {
    pub title: String,
    pub description: String,
    pub target_date: NaiveDate,
    pub objective: String,
    pub key_results: Vec<String>,
    pub status: OkrStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OkrWithTasks {
    #[serde(flatten)]
    pub okr: Okr,
    pub tasks: Vec<Task>,
    pub completed_tasks: usize,
    pub total_tasks: usize,
}

impl OkrWithTasks {
    pub fn assemble(okr: Okr, tasks: Vec<Task>) -> Self {
        let completed_tasks = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count();
        let total_tasks = tasks.len();
        Self {
            okr,
            tasks,
            completed_tasks,
            total_tasks,
        }
    }
}

/// Rounded completion percentage. An OKR without tasks has made no progress.
pub fn progress_percent(completed: usize, total: usize) -> i32 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as i32
}
