//! Route handlers and wire types.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use super::AppState;
use crate::error::NotifyError;
use crate::notifications::{WorkerState, WorkerStats};
use crate::preferences::{PreferenceRecord, PreferenceUpdate};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Error payload: `{"detail": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Response of `POST /notifications/{user_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub message: String,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    /// `ok` while the worker can drain the queue, `unavailable` otherwise.
    pub status: &'static str,
    pub worker_state: WorkerState,
    #[serde(flatten)]
    pub worker: WorkerStats,
    pub queue_depth: usize,
    pub queue_capacity: usize,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Detail sent for 500-class failures; the cause only goes to the log.
const INTERNAL_ERROR_DETAIL: &str = "Internal server error";

/// A [`NotifyError`] on its way to the client.
#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    /// Replace the detail shown to the client, keeping the status.
    fn with_detail(mut self, detail: &str) -> Self {
        self.detail = detail.to_owned();
        self
    }
}

impl From<NotifyError> for ApiError {
    fn from(err: NotifyError) -> Self {
        let status = err.status();
        if status.is_server_error() {
            error!("request failed: {err}");
        }
        let detail = if status == StatusCode::INTERNAL_SERVER_ERROR {
            INTERNAL_ERROR_DETAIL.to_owned()
        } else {
            err.to_string()
        };
        Self { status, detail }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!("rejected preference payload: {rejection}");
        NotifyError::InvalidInput(rejection.body_text()).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                detail: self.detail,
            }),
        )
            .into_response()
    }
}

fn parse_user_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim().parse::<i64>().map_err(|_| {
        NotifyError::InvalidInput(format!("user_id must be an integer, got '{raw}'")).into()
    })
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// `POST|PUT /preferences/{user_id}`: create or replace preferences.
pub(super) async fn update_preferences(
    State(state): State<AppState>,
    Path(raw_user_id): Path<String>,
    payload: Result<Json<PreferenceUpdate>, JsonRejection>,
) -> Result<Json<PreferenceRecord>, ApiError> {
    let user_id = parse_user_id(&raw_user_id)?;
    let Json(update) = payload?;
    let record = state.preferences.upsert(user_id, update).await?;
    Ok(Json(record))
}

/// `GET /preferences/{user_id}`: read preferences.
pub(super) async fn read_preferences(
    State(state): State<AppState>,
    Path(raw_user_id): Path<String>,
) -> Result<Json<PreferenceRecord>, ApiError> {
    let user_id = parse_user_id(&raw_user_id)?;
    state
        .preferences
        .require(user_id)
        .await
        .map(Json)
        .map_err(|e| not_found_detail(e, "User not found"))
}

/// `POST /notifications/{user_id}`: schedule a notification job.
pub(super) async fn schedule_notifications(
    State(state): State<AppState>,
    Path(raw_user_id): Path<String>,
) -> Result<Json<ScheduleResponse>, ApiError> {
    let user_id = parse_user_id(&raw_user_id)?;
    let outcome = state
        .dispatcher
        .schedule(user_id)
        .await
        .map_err(|e| not_found_detail(e, "User preferences not found"))?;
    Ok(Json(ScheduleResponse {
        message: outcome.message,
    }))
}

/// `GET /health`: worker state and queue occupancy.
pub(super) async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let worker_state = state.worker.state();
    let queue = state.dispatcher.queue();
    let (status, code) = if worker_state == WorkerState::Stopped {
        ("unavailable", StatusCode::SERVICE_UNAVAILABLE)
    } else {
        ("ok", StatusCode::OK)
    };

    (
        code,
        Json(HealthReport {
            status,
            worker_state,
            worker: state.worker.stats(),
            queue_depth: queue.depth(),
            queue_capacity: queue.capacity(),
        }),
    )
}

fn not_found_detail(err: NotifyError, detail: &str) -> ApiError {
    let is_not_found = matches!(err, NotifyError::NotFound(_));
    let api = ApiError::from(err);
    if is_not_found {
        api.with_detail(detail)
    } else {
        api
    }
}
