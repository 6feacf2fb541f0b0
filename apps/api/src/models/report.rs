use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::task::EvidenceKind;

/// One step of the validation chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// PDF text extraction or URL domain verification.
    Evidence,
    Pillars,
    SemanticDrift,
    Measurability,
    EvidenceMatch,
}

impl CheckKind {
    pub fn label(&self) -> &'static str {
        match self {
            CheckKind::Evidence => "Evidence",
            CheckKind::Pillars => "5 Pillars Check",
            CheckKind::SemanticDrift => "Semantic Drift Check",
            CheckKind::Measurability => "Measurability Check",
            CheckKind::EvidenceMatch => "Task-Evidence Hint Match",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Passed,
    Failed,
    /// Not applicable to this submission.
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub check: CheckKind,
    pub status: CheckStatus,
    pub summary: String,
}

impl CheckResult {
    pub fn passed(check: CheckKind, summary: impl Into<String>) -> Self {
        Self {
            check,
            status: CheckStatus::Passed,
            summary: summary.into(),
        }
    }

    pub fn failed(check: CheckKind, summary: impl Into<String>) -> Self {
        Self {
            check,
            status: CheckStatus::Failed,
            summary: summary.into(),
        }
    }

    pub fn skipped(check: CheckKind, summary: impl Into<String>) -> Self {
        Self {
            check,
            status: CheckStatus::Skipped,
            summary: summary.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status == CheckStatus::Failed
    }
}

/// Persisted outcome of validating one submission against its task and OKR.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub id: Uuid,
    pub task_id: Uuid,
    pub okr_id: Uuid,
    pub submission_type: EvidenceKind,
    pub success: bool,
    /// Human-readable aggregation of every check, in pipeline order.
    pub overall_result: String,
    pub checks: Vec<CheckResult>,
    pub suggestions: String,
    /// Pillar outcome analysis; resume goals only.
    pub outcome_analysis: Option<String>,
    /// Object key of the archived markdown copy, when archiving is configured.
    pub archive_key: Option<String>,
    pub created_at: DateTime<Utc>,
}
