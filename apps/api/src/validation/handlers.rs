use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{EvidenceKind, UnknownVariant, ValidationReport};
use crate::state::AppState;
use crate::validation::evidence::SubmissionPayload;
use crate::validation::pipeline::{validate_submission, Submission, ValidationOutcome};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    #[serde(alias = "submission_type")]
    pub submission_type: EvidenceKind,
    /// Base64 for pdf/screenshot, the URL for *-url kinds, raw text otherwise.
    pub content: String,
}

/// POST /api/v1/tasks/:id/submissions
pub async fn handle_submit(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<SubmissionRequest>,
) -> Result<Json<ValidationOutcome>, AppError> {
    if req.content.trim().is_empty() {
        return Err(AppError::Validation("content cannot be empty".to_string()));
    }
    let submission = Submission {
        kind: req.submission_type,
        payload: SubmissionPayload::Inline(req.content),
    };
    run(&state, task_id, submission).await
}

/// POST /api/v1/tasks/:id/submissions/upload
///
/// Multipart form: `submissionType` (or `submission_type`) text field plus a
/// `file` (or `content`) part.
pub async fn handle_submit_upload(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ValidationOutcome>, AppError> {
    let mut kind: Option<EvidenceKind> = None;
    let mut body: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "submission_type" | "submissionType" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable submissionType: {e}")))?;
                let parsed: EvidenceKind = text
                    .parse()
                    .map_err(|e: UnknownVariant| AppError::Validation(e.to_string()))?;
                kind = Some(parsed);
            }
            "file" | "content" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable upload: {e}")))?;
                debug!("Received {} byte upload for task {task_id}", bytes.len());
                body = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    let kind = kind.ok_or_else(|| AppError::Validation("submissionType is required".to_string()))?;
    let body = body
        .filter(|b| !b.is_empty())
        .ok_or_else(|| AppError::Validation("file is required".to_string()))?;

    let submission = Submission {
        kind,
        payload: SubmissionPayload::Upload(body),
    };
    run(&state, task_id, submission).await
}

async fn run(
    state: &AppState,
    task_id: Uuid,
    submission: Submission,
) -> Result<Json<ValidationOutcome>, AppError> {
    let outcome = validate_submission(
        state.store.as_ref(),
        state.llm.as_ref(),
        state.archive.as_ref(),
        task_id,
        submission,
    )
    .await?;
    Ok(Json(outcome))
}

/// GET /api/v1/tasks/:id/reports
pub async fn handle_task_reports(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> Result<Json<Vec<ValidationReport>>, AppError> {
    if state.store.get_task(task_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Task {task_id} not found")));
    }
    Ok(Json(state.store.reports_for_task(task_id).await?))
}

/// GET /api/v1/reports/:id
pub async fn handle_get_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ValidationReport>, AppError> {
    state
        .store
        .get_report(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Report {id} not found")))
}
