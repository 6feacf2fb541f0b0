//! Submission validation: evidence → checks → report → task/OKR status.

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::Completion;
use crate::models::okr::progress_percent;
use crate::models::{EvidenceKind, OkrStatus, TaskStatus, ValidationReport};
use crate::storage::OkrStore;
use crate::validation::checks::{
    outcome_analysis, pillar_report, run_checks, suggestions, CheckContext,
};
use crate::validation::evidence::{prepare_evidence, SubmissionPayload};
use crate::validation::report::{overall_result, render_report_md, ReportArchive, NO_CONTENT};

#[derive(Debug, Clone)]
pub struct Submission {
    pub kind: EvidenceKind,
    pub payload: SubmissionPayload,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub success: bool,
    /// The report's aggregated text, or the no-content notice.
    pub message: String,
    /// What happened to the task and its OKR.
    pub okr_update: String,
    pub report_id: Uuid,
    pub report: ValidationReport,
}

/// Validates one submission for a task and applies the result.
///
/// A report is stored for every submission that reaches the checks, passing
/// or not. Only a passing submission completes the task.
pub async fn validate_submission(
    store: &dyn OkrStore,
    llm: &dyn Completion,
    archive: Option<&ReportArchive>,
    task_id: Uuid,
    submission: Submission,
) -> Result<ValidationOutcome, AppError> {
    let task = store
        .get_task(task_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Task {task_id} not found")))?
        .task;
    let okr = store
        .get_okr(task.okr_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("OKR {} not found", task.okr_id)))?
        .okr;

    info!(
        "Validating {} submission for task {} (OKR {})",
        submission.kind.as_str(),
        task.id,
        okr.id
    );

    let evidence = prepare_evidence(submission.kind, submission.payload).await;
    let has_content = !evidence.content.is_empty();

    let mut checks = vec![evidence.check.clone()];
    let mut advice = String::new();
    let mut analysis = None;
    if has_content {
        let ctx = CheckContext {
            okr: &okr,
            task: &task,
            submission_type: submission.kind,
            content: &evidence.content,
        };
        checks.extend(run_checks(ctx, llm).await);
        if let Some(pillars) = pillar_report(&ctx) {
            analysis = outcome_analysis(&ctx, &pillars, llm).await;
        }
        advice = suggestions(&ctx, &checks, llm).await;
    }

    let success = has_content && !checks.iter().any(|c| c.is_failure());
    let overall = overall_result(&checks, &advice, has_content);

    let mut report = ValidationReport {
        id: Uuid::new_v4(),
        task_id: task.id,
        okr_id: okr.id,
        submission_type: submission.kind,
        success,
        overall_result: overall.clone(),
        checks,
        suggestions: advice,
        outcome_analysis: analysis,
        archive_key: None,
        created_at: Utc::now(),
    };

    if let Some(archive) = archive {
        let md = render_report_md(&report, &okr, &task);
        match archive.upload(&report, md).await {
            Ok(key) => report.archive_key = Some(key),
            Err(e) => warn!("Report {} not archived: {e}", report.id),
        }
    }

    store.save_report(&report).await?;

    let okr_update = if success {
        store.complete_task(task.id, evidence.proof_url).await?;
        let tasks = store.tasks_for_okr(okr.id).await?;
        let completed = tasks.iter().filter(|t| t.status == TaskStatus::Completed).count();
        store
            .update_okr_progress(okr.id, progress_percent(completed, tasks.len()))
            .await?;
        if completed == tasks.len() {
            store.update_okr_status(okr.id, OkrStatus::Completed).await?;
            format!("OKR {} status updated to completed.", okr.id)
        } else {
            format!(
                "OKR {} not yet completed, {}/{} tasks completed.",
                okr.id,
                completed,
                tasks.len()
            )
        }
    } else {
        format!(
            "Task {} validation failed. OKR {} status not updated.",
            task.id, okr.id
        )
    };

    info!(
        "Task {} validation {} (report {})",
        task.id,
        if success { "passed" } else { "failed" },
        report.id
    );

    Ok(ValidationOutcome {
        success,
        message: if has_content {
            overall
        } else {
            NO_CONTENT.to_string()
        },
        okr_update,
        report_id: report.id,
        report,
    })
}
