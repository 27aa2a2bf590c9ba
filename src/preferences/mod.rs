//! Per-user notification preferences.
//!
//! Sub-modules:
//! - `types`: `PreferenceRecord` and the `PreferenceUpdate` write payload.
//! - `schema`: SQLite DDL definitions.
//! - `store`: the `PreferenceStore` trait.
//! - `sqlite`: SQLite-backed `SqlitePreferenceStore`.
//! - `service`: `PreferenceService`, create-or-update semantics over a store.

pub(crate) mod schema;
pub mod service;
pub mod sqlite;
pub mod store;
pub mod types;

pub use service::PreferenceService;
pub use sqlite::SqlitePreferenceStore;
pub use store::PreferenceStore;
pub use types::{PreferenceRecord, PreferenceUpdate};
