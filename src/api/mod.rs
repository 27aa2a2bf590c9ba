//! HTTP surface for preferences and notification scheduling.
//!
//! ## Endpoints
//!
//! - `POST|PUT /preferences/{user_id}`: create or replace a user's preferences
//! - `GET /preferences/{user_id}`: read a user's preferences
//! - `POST /notifications/{user_id}`: schedule a notification job
//! - `GET /health`: worker and queue status

mod handlers;

use axum::Router;
use axum::routing::{get, post};

use crate::notifications::{NotificationDispatcher, WorkerMonitor};
use crate::preferences::PreferenceService;

pub use handlers::{ErrorBody, HealthReport, ScheduleResponse};

/// Shared state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub preferences: PreferenceService,
    pub dispatcher: NotificationDispatcher,
    pub worker: WorkerMonitor,
}

/// Build the service router over `state`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/preferences/{user_id}",
            get(handlers::read_preferences)
                .post(handlers::update_preferences)
                .put(handlers::update_preferences),
        )
        .route(
            "/notifications/{user_id}",
            post(handlers::schedule_notifications),
        )
        .route("/health", get(handlers::health))
        .with_state(state)
}
