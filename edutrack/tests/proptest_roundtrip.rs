//! Property-based tests over generated store states.
//!
//! Uses `proptest` to generate random collections, arbitrary finite floats
//! included, and verify that export -> restore reproduces them exactly, that
//! any edit to a record is caught by the checksum, and that the digest ignores
//! snapshot metadata.

use edutrack::backup::{checksum, BackupManager, ConfirmDecision, LogNotifier};
use edutrack::config::BackupConfig;
use edutrack::Error;
use edutrack_storage::{Collections, MemoryStore};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn student() -> impl Strategy<Value = Value> {
    (
        "[A-Z][0-9]{3}",
        "[a-zA-Z ]{1,24}",
        0i64..=100,
        any::<f64>().prop_filter("finite", |f| f.is_finite()),
        any::<bool>(),
    )
        .prop_map(|(id, name, grade, gpa, active)| {
            json!({"id": id, "name": name, "grades": {"math": grade}, "gpa": gpa, "active": active})
        })
}

fn attendance() -> impl Strategy<Value = Value> {
    (
        "[A-Z][0-9]{3}",
        "2024-0[1-9]-[12][0-9]",
        prop_oneof![Just("present"), Just("absent"), Just("late")],
    )
        .prop_map(|(id, date, status)| json!({"studentId": id, "date": date, "status": status}))
}

fn activity() -> impl Strategy<Value = Value> {
    ("[a-zA-Z ]{1,20}", "[a-zA-Z0-9 ()]{0,30}").prop_map(|(action, details)| {
        json!({"timestamp": "2024-03-01T08:00:00.000Z", "action": action, "details": details})
    })
}

fn collections() -> impl Strategy<Value = Collections> {
    (
        prop::collection::vec(student(), 1..8),
        prop::collection::vec(attendance(), 0..12),
        prop::collection::vec(activity(), 0..6),
    )
        .prop_map(|(s, a, l)| Collections::new(s, a, l))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn manager(store: Arc<MemoryStore>) -> BackupManager {
    BackupManager::new(
        store,
        &BackupConfig::default(),
        Arc::new(LogNotifier::new(ConfirmDecision::Confirm)),
    )
}

async fn export(collections: Collections) -> Value {
    let store = Arc::new(MemoryStore::with_collections(collections));
    let (bytes, _) = manager(store).export_bytes().await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    #[test]
    fn prop_export_restore_reproduces_store(state in collections()) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let exported = export(state.clone()).await;

            let target = Arc::new(MemoryStore::new());
            manager(target.clone())
                .coordinator()
                .restore(&serde_json::to_vec(&exported).unwrap())
                .await
                .unwrap();

            assert_eq!(target.snapshot(), state);
        });
    }

    #[test]
    fn prop_edited_record_is_detected(state in collections(), pick in any::<prop::sample::Index>()) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let mut exported = export(state.clone()).await;
            let i = pick.index(state.students.len());
            let name = exported["students"][i]["name"].as_str().unwrap().to_string();
            exported["students"][i]["name"] = json!(format!("{}x", name));

            let target = Arc::new(MemoryStore::new());
            let err = manager(target.clone())
                .coordinator()
                .restore(&serde_json::to_vec(&exported).unwrap())
                .await
                .unwrap_err();

            assert!(matches!(err, Error::ChecksumMismatch { .. }));
            assert!(target.snapshot().is_empty());
        });
    }

    #[test]
    fn prop_digest_ignores_metadata(state in collections(), version in "[2-9]\\.[0-9]\\.[0-9]") {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let mut exported = export(state.clone()).await;
            let declared = exported["checksum"].as_str().unwrap().to_string();
            exported["version"] = json!(version);
            exported["lastBackup"] = json!("2000-01-01T00:00:00.000Z");

            prop_assert_eq!(checksum::digest(&state).unwrap(), declared.clone());

            let target = Arc::new(MemoryStore::new());
            let pending = manager(target)
                .coordinator()
                .begin(&serde_json::to_vec(&exported).unwrap())
                .await;
            prop_assert!(pending.is_ok());
            Ok::<(), TestCaseError>(())
        })?;
    }
}
