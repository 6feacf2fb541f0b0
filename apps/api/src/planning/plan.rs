//! OKR planning flow: parse → decompose → (fallback) → schedule check → persist.

use anyhow::anyhow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::Completion;
use crate::models::{NewOkr, OkrStatus, OkrWithTasks, PlannedTask};
use crate::planning::heuristics::heuristic_micro_tasks;
use crate::planning::micro_tasks::{create_micro_tasks, validate_task_schedule, MicroTask};
use crate::planning::parser::{parse_okr, ParsedOkr};
use crate::storage::OkrStore;

const MIN_DESCRIPTION_CHARS: usize = 10;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkrInput {
    pub title: String,
    pub description: String,
    #[serde(alias = "deadline", alias = "target_date")]
    pub target_date: NaiveDate,
}

impl OkrInput {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("title cannot be empty".to_string()));
        }
        if self.description.trim().chars().count() < MIN_DESCRIPTION_CHARS {
            return Err(AppError::Validation(format!(
                "description must be at least {MIN_DESCRIPTION_CHARS} characters"
            )));
        }
        Ok(())
    }

    /// The sentence handed to the parser, e.g. "Publish 3 articles by 2025-09-30".
    pub fn okr_text(&self) -> String {
        format!("{} by {}", self.description.trim(), self.target_date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSource {
    Llm,
    Heuristic,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OkrPlan {
    pub parsed: ParsedOkr,
    pub micro_tasks: Vec<MicroTask>,
    /// False when a due date is unparseable, out of order, or past the target date.
    pub schedule_valid: bool,
    pub source: PlanSource,
}

/// Produces a plan without touching the store. Falls back to the rule-based
/// planner when the LLM yields no tasks.
pub async fn plan_okr(input: &OkrInput, llm: &dyn Completion, today: NaiveDate) -> OkrPlan {
    let parsed = parse_okr(&input.okr_text(), llm).await;

    let mut micro_tasks = create_micro_tasks(&parsed, Some(input.target_date), llm).await;
    let source = if micro_tasks.is_empty() {
        info!("Falling back to heuristic plan for '{}'", input.title);
        micro_tasks = heuristic_micro_tasks(&input.description, today);
        PlanSource::Heuristic
    } else {
        PlanSource::Llm
    };

    let schedule_valid = validate_task_schedule(&micro_tasks, input.target_date);
    if !schedule_valid {
        warn!("Invalid schedule detected for '{}'", input.title);
    }

    OkrPlan {
        parsed,
        micro_tasks,
        schedule_valid,
        source,
    }
}

/// Stores the OKR as active together with one task per micro-task, in a
/// single store write. Task deadlines never exceed the OKR target date.
pub async fn persist_plan(
    store: &dyn OkrStore,
    input: &OkrInput,
    plan: &OkrPlan,
) -> Result<OkrWithTasks, AppError> {
    let tasks = plan
        .micro_tasks
        .iter()
        .map(|micro| PlannedTask {
            title: micro.task.clone(),
            deadline: micro
                .due_date()
                .map_or(input.target_date, |d| d.min(input.target_date)),
            evidence_hint: micro.evidence_hint,
            level: micro.level,
        })
        .collect();

    let okr = store
        .create_okr_with_tasks(
            NewOkr {
                title: input.title.trim().to_string(),
                description: input.description.trim().to_string(),
                target_date: input.target_date,
                objective: plan.parsed.objective.clone(),
                key_results: plan.parsed.key_results().to_vec(),
                status: OkrStatus::Active,
            },
            tasks,
        )
        .await?;

    info!(
        "Created OKR {} with {} micro-tasks",
        okr.id,
        plan.micro_tasks.len()
    );

    store
        .get_okr(okr.id)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow!("OKR {} missing after insert", okr.id)))
}
