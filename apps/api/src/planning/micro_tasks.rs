//! Micro-task decomposition — breaks a parsed OKR into small, dated, evidence-bearing tasks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::llm_client::{complete_json, Completion};
use crate::models::{EvidenceKind, TaskLevel};
use crate::planning::parser::ParsedOkr;
use crate::planning::prompts::{MICRO_TASK_PROMPT, MICRO_TASK_SYSTEM};

/// Upper bound on tasks per OKR, LLM-generated or heuristic.
pub const MAX_MICRO_TASKS: usize = 10;
const DEFAULT_DEADLINE_HINT: &str = "in 2 weeks";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicroTask {
    pub task: String,
    /// `YYYY-MM-DD` as produced by the planner; checked by [`validate_task_schedule`].
    pub due: String,
    pub evidence_hint: EvidenceKind,
    pub level: TaskLevel,
}

impl MicroTask {
    pub fn due_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.due.trim(), "%Y-%m-%d").ok()
    }
}

/// Lenient model output: unknown hints or levels degrade to defaults rather
/// than discarding the whole plan.
#[derive(Debug, Deserialize)]
struct RawMicroTask {
    #[serde(default)]
    task: String,
    #[serde(default)]
    due: String,
    #[serde(default)]
    evidence_hint: String,
    #[serde(default)]
    level: String,
}

impl From<RawMicroTask> for MicroTask {
    fn from(raw: RawMicroTask) -> Self {
        MicroTask {
            task: raw.task.trim().to_string(),
            due: raw.due.trim().to_string(),
            evidence_hint: raw.evidence_hint.parse().unwrap_or_default(),
            level: raw.level.parse().unwrap_or_default(),
        }
    }
}

/// Asks the LLM for up to [`MAX_MICRO_TASKS`] micro-tasks. Returns an empty
/// list when the OKR has no key results or the model output is unusable.
pub async fn create_micro_tasks(
    parsed: &ParsedOkr,
    deadline: Option<NaiveDate>,
    llm: &dyn Completion,
) -> Vec<MicroTask> {
    let key_results = parsed.key_results();
    if key_results.is_empty() {
        warn!("No key results to decompose for '{}'", parsed.objective);
        return Vec::new();
    }

    let deadline_str = deadline
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| DEFAULT_DEADLINE_HINT.to_string());
    let prompt = MICRO_TASK_PROMPT
        .replace("{okr_deadline}", &deadline_str)
        .replace("{objective}", &parsed.objective)
        .replace("{key_results}", &key_results.join("\n"));

    let raw: Vec<RawMicroTask> = match complete_json(llm, &prompt, MICRO_TASK_SYSTEM).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Micro-task generation failed: {e}");
            return Vec::new();
        }
    };

    let tasks: Vec<MicroTask> = raw
        .into_iter()
        .map(MicroTask::from)
        .filter(|t| !t.task.is_empty())
        .take(MAX_MICRO_TASKS)
        .collect();

    info!("LLM produced {} micro-tasks", tasks.len());
    tasks
}

/// True when every due date parses, none is after `deadline`, and due dates
/// never go backwards.
pub fn validate_task_schedule(tasks: &[MicroTask], deadline: NaiveDate) -> bool {
    let mut prev: Option<NaiveDate> = None;
    for (idx, task) in tasks.iter().enumerate() {
        let Some(due) = task.due_date() else {
            warn!("Task {} has an unparseable due date '{}'", idx + 1, task.due);
            return false;
        };
        if due > deadline {
            warn!("Task {} exceeds overall deadline", idx + 1);
            return false;
        }
        if prev.is_some_and(|p| due < p) {
            warn!("Task {} is due before task {}", idx + 1, idx);
            return false;
        }
        prev = Some(due);
    }
    true
}
