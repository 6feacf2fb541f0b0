//! Micro-task CRUD handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{NewTask, Task, TaskUpdate, TaskWithReminders};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteQuery {
    #[serde(alias = "proof_url")]
    pub proof_url: Option<String>,
}

/// GET /api/v1/tasks
pub async fn handle_list_tasks(State(state): State<AppState>) -> Result<Json<Vec<Task>>, AppError> {
    Ok(Json(state.store.list_tasks().await?))
}

/// GET /api/v1/tasks/:id
pub async fn handle_get_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskWithReminders>, AppError> {
    state
        .store
        .get_task(id)
        .await?
        .map(Json)
        .ok_or_else(|| task_not_found(id))
}

/// POST /api/v1/tasks
pub async fn handle_create_task(
    State(state): State<AppState>,
    Json(req): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    let Some(okr) = state.store.get_okr(req.okr_id).await? else {
        return Err(AppError::NotFound(format!("OKR {} not found", req.okr_id)));
    };
    check_deadline(req.deadline, okr.okr.target_date)?;
    let task = state.store.create_task(req).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// PATCH /api/v1/tasks/:id
pub async fn handle_update_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<TaskUpdate>,
) -> Result<Json<Task>, AppError> {
    if let Some(deadline) = update.deadline {
        let Some(current) = state.store.get_task(id).await? else {
            return Err(task_not_found(id));
        };
        let okr_id = current.task.okr_id;
        let Some(okr) = state.store.get_okr(okr_id).await? else {
            return Err(AppError::NotFound(format!("OKR {okr_id} not found")));
        };
        check_deadline(deadline, okr.okr.target_date)?;
    }
    state
        .store
        .update_task(id, update)
        .await?
        .map(Json)
        .ok_or_else(|| task_not_found(id))
}

/// POST /api/v1/tasks/:id/complete?proofUrl=
pub async fn handle_complete_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<CompleteQuery>,
) -> Result<Json<Task>, AppError> {
    state
        .store
        .complete_task(id, query.proof_url)
        .await?
        .map(Json)
        .ok_or_else(|| task_not_found(id))
}

/// A task may not be due after its OKR's target date.
fn check_deadline(deadline: NaiveDate, target_date: NaiveDate) -> Result<(), AppError> {
    if deadline > target_date {
        return Err(AppError::UnprocessableEntity(format!(
            "deadline {deadline} is after the OKR target date {target_date}"
        )));
    }
    Ok(())
}

fn task_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Task {id} not found"))
}
