//! Preference record types shared by the store, service, and HTTP layer.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Durable per-user notification settings.
///
/// Serializes to the wire shape
/// `{user_id, email_enabled, sms_enabled, email, phone_number}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceRecord {
    /// Owning user. Unique, never changes after creation.
    pub user_id: i64,
    /// Whether email notifications are wanted.
    pub email_enabled: bool,
    /// Whether SMS notifications are wanted.
    pub sms_enabled: bool,
    /// Contact email address.
    pub email: Option<String>,
    /// Contact phone number.
    pub phone_number: Option<String>,
}

impl PreferenceRecord {
    /// Build the record an upsert of `update` for `user_id` should produce.
    pub fn from_update(user_id: i64, update: PreferenceUpdate) -> Self {
        Self {
            user_id,
            email_enabled: update.email_enabled,
            sms_enabled: update.sms_enabled,
            email: update.email,
            phone_number: update.phone_number,
        }
    }
}

/// The four mutable fields of a [`PreferenceRecord`].
///
/// Upserts overwrite all of them; there is no field-level merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceUpdate {
    pub email_enabled: bool,
    pub sms_enabled: bool,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Current Unix time in seconds.
pub(crate) fn now_epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
