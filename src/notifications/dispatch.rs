//! The schedule-notification flow.

use tracing::info;
use uuid::Uuid;

use super::job::{Channel, NotificationJob, describe_channels};
use super::queue::TaskQueue;
use crate::error::{NotifyError, Result};
use crate::preferences::PreferenceService;

/// What a schedule request asked for.
///
/// Describes intent only; delivery happens later on the worker and its
/// outcome is never reported back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleOutcome {
    /// Human-readable summary of the requested channels.
    pub message: String,
    /// Channels snapshotted from the preference record.
    pub channels: Vec<Channel>,
    /// Id of the enqueued job; `None` when no channel was enabled.
    pub job_id: Option<Uuid>,
}

impl ScheduleOutcome {
    /// Whether a job was put on the queue.
    pub fn was_enqueued(&self) -> bool {
        self.job_id.is_some()
    }
}

/// Turns schedule requests into queued [`NotificationJob`]s.
#[derive(Clone)]
pub struct NotificationDispatcher {
    preferences: PreferenceService,
    queue: TaskQueue,
}

impl NotificationDispatcher {
    /// Dispatcher reading from `preferences` and producing onto `queue`.
    pub fn new(preferences: PreferenceService, queue: TaskQueue) -> Self {
        Self { preferences, queue }
    }

    /// The producer handle jobs are pushed onto.
    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    /// Snapshot `user_id`'s preferences and enqueue a job for them.
    ///
    /// Returns as soon as the job is queued. A user with no channel enabled
    /// gets the "not scheduled" message and nothing is enqueued.
    ///
    /// # Errors
    ///
    /// [`NotifyError::NotFound`] when the user has no preferences (nothing is
    /// enqueued), storage errors from the lookup, and queue errors from
    /// [`TaskQueue::enqueue`].
    pub async fn schedule(&self, user_id: i64) -> Result<ScheduleOutcome> {
        let record = self
            .preferences
            .get(user_id)
            .await?
            .ok_or(NotifyError::NotFound(user_id))?;

        let job = NotificationJob::snapshot(&record);
        let channels = job.channels();
        let message = describe_channels(&channels);

        if job.is_empty() {
            info!(user_id, "no notification channel enabled, nothing enqueued");
            return Ok(ScheduleOutcome {
                message,
                channels,
                job_id: None,
            });
        }

        let job_id = job.id;
        self.queue.enqueue(job).await?;
        info!(%job_id, user_id, ?channels, "notification scheduled");

        Ok(ScheduleOutcome {
            message,
            channels,
            job_id: Some(job_id),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::notifications::queue::{JobReceiver, OverflowPolicy, task_queue};
    use crate::preferences::{PreferenceUpdate, SqlitePreferenceStore};
    use std::sync::Arc;

    fn dispatcher(capacity: usize) -> (NotificationDispatcher, PreferenceService, JobReceiver) {
        let preferences = PreferenceService::new(Arc::new(
            SqlitePreferenceStore::open_in_memory().expect("in-memory store"),
        ));
        let (queue, rx) = task_queue(capacity, OverflowPolicy::Reject);
        (
            NotificationDispatcher::new(preferences.clone(), queue),
            preferences,
            rx,
        )
    }

    fn flags(email_enabled: bool, sms_enabled: bool) -> PreferenceUpdate {
        PreferenceUpdate {
            email_enabled,
            sms_enabled,
            email: Some("user@example.com".to_owned()),
            phone_number: Some("1234567890".to_owned()),
        }
    }

    #[tokio::test]
    async fn unknown_user_is_not_found_and_enqueues_nothing() {
        let (dispatcher, _prefs, _rx) = dispatcher(4);
        let err = dispatcher.schedule(999).await.unwrap_err();
        assert!(matches!(err, NotifyError::NotFound(999)));
        assert_eq!(dispatcher.queue().depth(), 0);
    }

    #[tokio::test]
    async fn email_only_enqueues_snapshot() {
        let (dispatcher, prefs, mut rx) = dispatcher(4);
        prefs.upsert(1, flags(true, false)).await.unwrap();

        let outcome = dispatcher.schedule(1).await.unwrap();
        assert_eq!(
            outcome.message,
            "Notifications scheduled successfully via Email"
        );
        assert_eq!(outcome.channels, vec![Channel::Email]);

        let job = rx.dequeue().await.expect("job queued");
        assert_eq!(Some(job.id), outcome.job_id);
        assert_eq!(job.user_id, 1);
        assert!(job.email_enabled);
        assert!(!job.sms_enabled);
    }

    #[tokio::test]
    async fn both_channels_listed_in_order() {
        let (dispatcher, prefs, _rx) = dispatcher(4);
        prefs.upsert(42, flags(true, true)).await.unwrap();

        let outcome = dispatcher.schedule(42).await.unwrap();
        assert_eq!(
            outcome.message,
            "Notifications scheduled successfully via Email, SMS"
        );
        assert!(outcome.was_enqueued());
    }

    #[tokio::test]
    async fn no_channels_skips_enqueue() {
        let (dispatcher, prefs, _rx) = dispatcher(4);
        prefs.upsert(21, flags(false, false)).await.unwrap();

        let outcome = dispatcher.schedule(21).await.unwrap();
        assert_eq!(
            outcome.message,
            "No notification method enabled. Notifications not scheduled."
        );
        assert!(!outcome.was_enqueued());
        assert_eq!(dispatcher.queue().depth(), 0);
    }

    #[tokio::test]
    async fn job_reflects_preferences_at_schedule_time() {
        let (dispatcher, prefs, mut rx) = dispatcher(4);
        prefs.upsert(5, flags(true, false)).await.unwrap();
        dispatcher.schedule(5).await.unwrap();
        prefs.upsert(5, flags(false, true)).await.unwrap();
        dispatcher.schedule(5).await.unwrap();

        let first = rx.dequeue().await.unwrap();
        let second = rx.dequeue().await.unwrap();
        assert_eq!(first.channels(), vec![Channel::Email]);
        assert_eq!(second.channels(), vec![Channel::Sms]);
    }

    #[tokio::test]
    async fn full_queue_surfaces_queue_full() {
        let (dispatcher, prefs, _rx) = dispatcher(1);
        prefs.upsert(1, flags(true, false)).await.unwrap();
        dispatcher.schedule(1).await.unwrap();

        let err = dispatcher.schedule(1).await.unwrap_err();
        assert!(matches!(err, NotifyError::QueueFull { capacity: 1 }));
    }
}
