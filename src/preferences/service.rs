//! Create-or-update semantics over a [`PreferenceStore`].

use std::sync::Arc;

use tracing::{debug, info};

use super::store::PreferenceStore;
use super::types::{PreferenceRecord, PreferenceUpdate};
use crate::error::{NotifyError, Result};

/// Reads and writes preference records on behalf of request handlers.
///
/// Cheap to clone; clones share the underlying store.
#[derive(Clone)]
pub struct PreferenceService {
    store: Arc<dyn PreferenceStore>,
}

impl PreferenceService {
    /// Wrap a store.
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    /// Pure lookup.
    pub async fn get(&self, user_id: i64) -> Result<Option<PreferenceRecord>> {
        self.with_store(move |store| store.get(user_id)).await
    }

    /// Lookup that treats a missing record as [`NotifyError::NotFound`].
    pub async fn require(&self, user_id: i64) -> Result<PreferenceRecord> {
        self.get(user_id).await?.ok_or(NotifyError::NotFound(user_id))
    }

    /// Create the user's record, or overwrite all four mutable fields of the
    /// existing one. Last writer wins.
    pub async fn upsert(
        &self,
        user_id: i64,
        update: PreferenceUpdate,
    ) -> Result<PreferenceRecord> {
        debug!(user_id, "upserting notification preferences");
        let record = self
            .with_store(move |store| store.upsert(user_id, &update))
            .await?;
        info!(
            user_id,
            email_enabled = record.email_enabled,
            sms_enabled = record.sms_enabled,
            "notification preferences saved"
        );
        Ok(record)
    }

    /// Run a store call on the blocking pool so SQLite I/O and lock waits
    /// never park a runtime worker thread.
    async fn with_store<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&dyn PreferenceStore) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(store.as_ref()))
            .await
            .map_err(|e| NotifyError::Storage(format!("storage task failed: {e}")))?
    }
}
