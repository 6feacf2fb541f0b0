use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{NewReminder, Reminder, ReminderStatus};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: ReminderStatus,
}

/// GET /api/v1/reminders
pub async fn handle_list_reminders(
    State(state): State<AppState>,
) -> Result<Json<Vec<Reminder>>, AppError> {
    Ok(Json(state.store.list_reminders().await?))
}

/// GET /api/v1/reminders/upcoming
pub async fn handle_upcoming_reminders(
    State(state): State<AppState>,
) -> Result<Json<Vec<Reminder>>, AppError> {
    Ok(Json(state.store.upcoming_reminders(Utc::now()).await?))
}

/// POST /api/v1/reminders
pub async fn handle_create_reminder(
    State(state): State<AppState>,
    Json(req): Json<NewReminder>,
) -> Result<(StatusCode, Json<Reminder>), AppError> {
    if req.message.trim().is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }
    if req.delivery_method.trim().is_empty() {
        return Err(AppError::Validation("deliveryMethod cannot be empty".to_string()));
    }
    if state.store.get_task(req.task_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Task {} not found", req.task_id)));
    }
    let reminder = state.store.create_reminder(req).await?;
    Ok((StatusCode::CREATED, Json(reminder)))
}

/// PATCH /api/v1/reminders/:id/status
pub async fn handle_update_reminder_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusUpdate>,
) -> Result<StatusCode, AppError> {
    if !state.store.update_reminder_status(id, req.status).await? {
        return Err(AppError::NotFound(format!("Reminder {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}
