//! Reminder command endpoints.
//!
//! POST   /reminders        schedule a one-shot reminder from a recipe
//! GET    /reminders        list pending reminders for an owner
//! DELETE /reminders/{id}   cancel a pending reminder

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sojourner_core::reminder::ReminderPayload;
use sojourner_scheduler::{Job, SchedulerError};
use tracing::warn;

use crate::app::AppState;

#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    pub owner_id: u64,
    pub channel_id: u64,
    /// Key into the recipe catalog.
    pub recipe: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub owner_id: u64,
}

/// Client-facing view of a scheduled job.
#[derive(Debug, Serialize)]
pub struct ReminderView {
    pub job_id: String,
    pub task_name: String,
    pub due_time: DateTime<Utc>,
}

impl From<Job> for ReminderView {
    fn from(job: Job) -> Self {
        Self {
            job_id: job.id,
            task_name: job.payload.task_name,
            due_time: job.due_time,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

fn api_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (
        status,
        Json(ApiError {
            error: message.into(),
        }),
    )
}

/// Map a scheduler failure to an HTTP status + body.
///
/// Collision exhaustion and duplicate IDs are transient from the client's
/// point of view: retrying gets a fresh draw.
fn map_scheduler_error(err: SchedulerError) -> (StatusCode, Json<ApiError>) {
    let status = match err {
        SchedulerError::InvalidSchedule(_) => StatusCode::BAD_REQUEST,
        SchedulerError::NotFound { .. } => StatusCode::NOT_FOUND,
        SchedulerError::DuplicateId { .. }
        | SchedulerError::CollisionExhausted { .. }
        | SchedulerError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    api_error(status, err.to_string())
}

/// Absolute due time for a job scheduled now, `duration_seconds` out.
///
/// `None` when the duration cannot be represented in the datetime range;
/// `chrono::Duration::seconds` and `DateTime + Duration` both panic there.
fn due_time_for(duration_seconds: u64) -> Option<DateTime<Utc>> {
    let delta = i64::try_from(duration_seconds)
        .ok()
        .and_then(Duration::try_seconds)?;
    Utc::now().checked_add_signed(delta)
}

/// POST /reminders. Resolve the recipe, schedule the job, return its ID.
pub async fn schedule_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScheduleRequest>,
) -> ApiResult<(StatusCode, Json<ReminderView>)> {
    let recipe = state
        .recipes
        .resolve(&req.recipe)
        .map_err(|e| api_error(StatusCode::NOT_FOUND, e.to_string()))?
        .clone();

    let due_time = due_time_for(recipe.duration_seconds).ok_or_else(|| {
        warn!(
            recipe = %req.recipe,
            seconds = recipe.duration_seconds,
            "recipe duration out of range"
        );
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "recipe duration out of range",
        )
    })?;
    let payload = ReminderPayload {
        owner_id: req.owner_id,
        channel_id: req.channel_id,
        task_name: recipe.name.clone(),
    };

    let id = state.scheduler.add_job(payload, due_time).map_err(|e| {
        warn!(error = %e, recipe = %req.recipe, "schedule failed");
        map_scheduler_error(e)
    })?;

    Ok((
        StatusCode::CREATED,
        Json(ReminderView {
            job_id: id,
            task_name: recipe.name,
            due_time,
        }),
    ))
}

/// GET /reminders?owner_id=N. Pending reminders for one owner, soonest first.
pub async fn list_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<ReminderView>>> {
    let jobs = state
        .scheduler
        .get_user_jobs(query.owner_id)
        .map_err(map_scheduler_error)?;
    Ok(Json(jobs.into_iter().map(ReminderView::from).collect()))
}

/// DELETE /reminders/{id}. Cancel a pending reminder.
pub async fn cancel_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.scheduler.remove_job(&id).map_err(|e| {
        if !matches!(e, SchedulerError::NotFound { .. }) {
            warn!(error = %e, job_id = %id, "cancel failed");
        }
        map_scheduler_error(e)
    })?;
    Ok(StatusCode::NO_CONTENT)
}
