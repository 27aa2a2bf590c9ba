//! notify-prefs: per-user notification preferences with asynchronous dispatch.
//!
//! # Architecture
//!
//! - **Preferences**: one SQLite row per user, written with an atomic upsert
//! - **Dispatcher**: snapshots a user's channels into a job and enqueues it
//! - **Task queue**: bounded FIFO from request handlers to the worker
//! - **Worker**: a single supervised consumer that simulates delivery by logging
//! - **API**: axum routes over the above, wired up by [`NotifyService`]

pub mod api;
pub mod config;
pub mod error;
pub mod notifications;
pub mod preferences;
pub mod server;

pub use config::ServiceConfig;
pub use error::{NotifyError, Result};
pub use notifications::{NotificationDispatcher, NotificationJob, TaskQueue};
pub use preferences::{PreferenceRecord, PreferenceService, PreferenceUpdate};
pub use server::NotifyService;
