//! Notification job descriptors.

use std::fmt;
use uuid::Uuid;

use crate::preferences::PreferenceRecord;
use crate::preferences::types::now_epoch_secs;

/// Message returned when a user has no channel enabled.
pub const NO_CHANNEL_MESSAGE: &str = "No notification method enabled. Notifications not scheduled.";

/// A delivery channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Email,
    Sms,
}

impl Channel {
    /// Human-facing label used in scheduling messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::Sms => "SMS",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Channels enabled by a pair of flags, always Email before SMS.
pub fn enabled_channels(email_enabled: bool, sms_enabled: bool) -> Vec<Channel> {
    let mut channels = Vec::with_capacity(2);
    if email_enabled {
        channels.push(Channel::Email);
    }
    if sms_enabled {
        channels.push(Channel::Sms);
    }
    channels
}

/// Describe which channels were requested.
///
/// This states intent only; it says nothing about delivery.
pub fn describe_channels(channels: &[Channel]) -> String {
    if channels.is_empty() {
        return NO_CHANNEL_MESSAGE.to_owned();
    }
    let labels: Vec<&str> = channels.iter().map(|c| c.label()).collect();
    format!(
        "Notifications scheduled successfully via {}",
        labels.join(", ")
    )
}

/// An ephemeral queue item snapshotting which channels to notify for a user.
///
/// Never persisted; owned by the queue until the worker dequeues it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationJob {
    /// Unique job identifier, for log correlation.
    pub id: Uuid,
    /// Target user.
    pub user_id: i64,
    /// Email flag as it was when the job was built.
    pub email_enabled: bool,
    /// SMS flag as it was when the job was built.
    pub sms_enabled: bool,
    /// Unix seconds at which the job was built.
    pub enqueued_at: u64,
}

impl NotificationJob {
    /// Snapshot the channel flags of `record` at this instant.
    pub fn snapshot(record: &PreferenceRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: record.user_id,
            email_enabled: record.email_enabled,
            sms_enabled: record.sms_enabled,
            enqueued_at: now_epoch_secs(),
        }
    }

    /// Channels this job targets.
    pub fn channels(&self) -> Vec<Channel> {
        enabled_channels(self.email_enabled, self.sms_enabled)
    }

    /// `true` when no channel is enabled and processing would be a no-op.
    pub fn is_empty(&self) -> bool {
        !self.email_enabled && !self.sms_enabled
    }

    /// Simulated delivery actions, one per enabled channel.
    pub fn actions(&self) -> Vec<String> {
        self.channels()
            .into_iter()
            .map(|channel| match channel {
                Channel::Email => format!("would email user {}", self.user_id),
                Channel::Sms => format!("would SMS user {}", self.user_id),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(email_enabled: bool, sms_enabled: bool) -> PreferenceRecord {
        PreferenceRecord {
            user_id: 7,
            email_enabled,
            sms_enabled,
            email: None,
            phone_number: None,
        }
    }

    #[test]
    fn messages_match_enabled_channels() {
        assert_eq!(
            describe_channels(&enabled_channels(true, false)),
            "Notifications scheduled successfully via Email"
        );
        assert_eq!(
            describe_channels(&enabled_channels(false, true)),
            "Notifications scheduled successfully via SMS"
        );
        assert_eq!(
            describe_channels(&enabled_channels(true, true)),
            "Notifications scheduled successfully via Email, SMS"
        );
        assert_eq!(
            describe_channels(&enabled_channels(false, false)),
            "No notification method enabled. Notifications not scheduled."
        );
    }

    #[test]
    fn actions_follow_flags() {
        let both = NotificationJob::snapshot(&record(true, true));
        assert_eq!(
            both.actions(),
            vec!["would email user 7".to_owned(), "would SMS user 7".to_owned()]
        );

        let sms = NotificationJob::snapshot(&record(false, true));
        assert_eq!(sms.actions(), vec!["would SMS user 7".to_owned()]);

        let none = NotificationJob::snapshot(&record(false, false));
        assert!(none.actions().is_empty());
        assert!(none.is_empty());
    }

    #[test]
    fn snapshot_is_detached_from_record() {
        let mut rec = record(true, false);
        let job = NotificationJob::snapshot(&rec);
        rec.email_enabled = false;
        rec.sms_enabled = true;

        assert_eq!(job.channels(), vec![Channel::Email]);
        assert_eq!(job.user_id, 7);
    }

    #[test]
    fn each_snapshot_gets_a_fresh_id() {
        let rec = record(true, true);
        assert_ne!(
            NotificationJob::snapshot(&rec).id,
            NotificationJob::snapshot(&rec).id
        );
    }
}
