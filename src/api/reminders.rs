//! Reminder API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateReminderRequest, Reminder};
use crate::AppState;

/// Reminder listing filter.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderFilter {
    #[serde(default)]
    pub plant_id: Option<i64>,
}

/// GET /api/reminders - List reminders, optionally for one plant.
pub async fn list_reminders(
    State(state): State<AppState>,
    Query(filter): Query<ReminderFilter>,
) -> ApiResult<Vec<Reminder>> {
    success(state.repo.list_reminders(filter.plant_id).await?)
}

/// POST /api/reminders - Create a reminder.
pub async fn create_reminder(
    State(state): State<AppState>,
    Json(request): Json<CreateReminderRequest>,
) -> ApiResult<Reminder> {
    // Validate required fields
    if request.plant_name.trim().is_empty() {
        return Err(AppError::Validation("Plant name is required".to_string()));
    }
    if request.frequency.trim().is_empty() {
        return Err(AppError::Validation("Frequency is required".to_string()));
    }

    let reminder = state.repo.create_reminder(&request, Utc::now()).await?;
    tracing::info!(
        "Created {} reminder {} for '{}'",
        reminder.task.as_str(),
        reminder.id,
        reminder.plant_name
    );
    success(reminder)
}

/// PUT /api/reminders/{id}/toggle - Enable or disable a reminder.
pub async fn toggle_reminder(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Reminder> {
    success(state.repo.toggle_reminder(&id).await?)
}

/// DELETE /api/reminders/{id} - Delete a reminder.
pub async fn delete_reminder(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.repo.delete_reminder(&id).await?;
    success(())
}
