pub mod stats;

use axum::{extract::State, Json};
use chrono::Utc;

use crate::errors::AppError;
use crate::state::AppState;
use stats::{compute_dashboard_stats, DashboardStats};

/// GET /api/v1/dashboard/stats
pub async fn handle_dashboard_stats(
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>, AppError> {
    let now = Utc::now();
    let okrs: Vec<_> = state
        .store
        .list_okrs()
        .await?
        .into_iter()
        .map(|o| o.okr)
        .collect();
    let tasks = state.store.list_tasks().await?;
    let upcoming = state.store.upcoming_reminders(now).await?.len();
    Ok(Json(compute_dashboard_stats(&okrs, &tasks, upcoming, now)))
}
