//! Storage seam for preference records.

use super::types::{PreferenceRecord, PreferenceUpdate};
use crate::error::Result;

/// Keyed persistent storage of [`PreferenceRecord`]s.
///
/// Implementations must keep at most one record per `user_id` even when
/// `upsert` is called concurrently for the same key.
pub trait PreferenceStore: Send + Sync {
    /// Look up the record for `user_id`.
    fn get(&self, user_id: i64) -> Result<Option<PreferenceRecord>>;

    /// Create the record for `user_id`, or overwrite all of its mutable
    /// fields if it exists, as one atomic write. Returns the stored record.
    fn upsert(&self, user_id: i64, update: &PreferenceUpdate) -> Result<PreferenceRecord>;
}
