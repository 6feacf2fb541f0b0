use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::OkrWithTasks;
use crate::planning::parser::{parse_okr, ParsedOkr};
use crate::planning::plan::{persist_plan, plan_okr, OkrInput, OkrPlan};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseOkrRequest {
    #[serde(alias = "okr_text")]
    pub okr_text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOkrResponse {
    pub okr: OkrWithTasks,
    pub plan: OkrPlan,
}

#[derive(Debug, Deserialize)]
pub struct ProgressUpdate {
    pub progress: i32,
}

/// POST /api/v1/okrs/parse
pub async fn handle_parse_okr(
    State(state): State<AppState>,
    Json(req): Json<ParseOkrRequest>,
) -> Result<Json<ParsedOkr>, AppError> {
    if req.okr_text.trim().is_empty() {
        return Err(AppError::Validation("okrText cannot be empty".to_string()));
    }
    Ok(Json(parse_okr(&req.okr_text, state.llm.as_ref()).await))
}

/// POST /api/v1/okrs/plan
///
/// Previews the parsed OKR and its micro-tasks without storing anything.
pub async fn handle_plan_okr(
    State(state): State<AppState>,
    Json(input): Json<OkrInput>,
) -> Result<Json<OkrPlan>, AppError> {
    input.validate()?;
    let plan = plan_okr(&input, state.llm.as_ref(), Utc::now().date_naive()).await;
    Ok(Json(plan))
}

/// POST /api/v1/okrs
pub async fn handle_create_okr(
    State(state): State<AppState>,
    Json(input): Json<OkrInput>,
) -> Result<(StatusCode, Json<CreateOkrResponse>), AppError> {
    input.validate()?;
    let plan = plan_okr(&input, state.llm.as_ref(), Utc::now().date_naive()).await;
    let okr = persist_plan(state.store.as_ref(), &input, &plan).await?;
    Ok((StatusCode::CREATED, Json(CreateOkrResponse { okr, plan })))
}

/// GET /api/v1/okrs
pub async fn handle_list_okrs(
    State(state): State<AppState>,
) -> Result<Json<Vec<OkrWithTasks>>, AppError> {
    Ok(Json(state.store.list_okrs().await?))
}

/// GET /api/v1/okrs/:id
pub async fn handle_get_okr(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OkrWithTasks>, AppError> {
    state
        .store
        .get_okr(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("OKR {id} not found")))
}

/// PATCH /api/v1/okrs/:id/progress
pub async fn handle_update_progress(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ProgressUpdate>,
) -> Result<StatusCode, AppError> {
    if !(0..=100).contains(&req.progress) {
        return Err(AppError::Validation(
            "progress must be between 0 and 100".to_string(),
        ));
    }
    if !state.store.update_okr_progress(id, req.progress).await? {
        return Err(AppError::NotFound(format!("OKR {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}
