//! File-backed preference store behaviour across threads and reopen.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use notify_prefs::PreferenceUpdate;
use notify_prefs::preferences::{PreferenceService, PreferenceStore, SqlitePreferenceStore};
use std::sync::Arc;

fn update(i: usize) -> PreferenceUpdate {
    PreferenceUpdate {
        email_enabled: i % 2 == 0,
        sms_enabled: i % 2 == 1,
        email: Some(format!("writer{i}@example.com")),
        phone_number: Some(format!("555-{i:04}")),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_writers_leave_one_record_from_some_writer() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let store = Arc::new(SqlitePreferenceStore::open(&dir.path().join("prefs.db")).unwrap());
    let service = PreferenceService::new(store.clone());

    let handles: Vec<_> = (0..12)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move { service.upsert(77, update(i)).await.expect("upsert") })
        })
        .collect();
    let mut written = Vec::new();
    for h in handles {
        written.push(h.await.unwrap());
    }

    assert_eq!(store.count().unwrap(), 1);
    let stored = store.get(77).unwrap().expect("record");
    assert!(
        written.contains(&stored),
        "stored record must equal one writer's full payload, never a mix"
    );
}

#[test]
fn distinct_users_are_independent() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let store = Arc::new(SqlitePreferenceStore::open(&dir.path().join("prefs.db")).unwrap());

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || store.upsert(i as i64, &update(i)).expect("upsert"))
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(store.count().unwrap(), 10);
    let record = store.get(4).unwrap().unwrap();
    assert_eq!(record.email.as_deref(), Some("writer4@example.com"));
}

#[tokio::test]
async fn upserts_persist_across_restart() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let path = dir.path().join("data").join("prefs.db");

    {
        let service = PreferenceService::new(Arc::new(SqlitePreferenceStore::open(&path).unwrap()));
        service.upsert(1, update(0)).await.unwrap();
        service.upsert(1, update(1)).await.unwrap();
    }

    let service = PreferenceService::new(Arc::new(SqlitePreferenceStore::open(&path).unwrap()));
    let record = service.require(1).await.unwrap();
    assert!(!record.email_enabled);
    assert!(record.sms_enabled);
    assert_eq!(record.phone_number.as_deref(), Some("555-0001"));
}
