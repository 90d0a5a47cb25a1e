//! Structural validation of untrusted snapshot input.
//!
//! Only the envelope is checked: the three collections must be present and be
//! arrays, and `version` must be a non-empty string. Individual records are not
//! inspected.

use edutrack_storage::Collections;
use serde_json::{Map, Value};
use tracing::warn;

use super::types::Snapshot;
use crate::error::{Error, Result};

/// Validate a deserialized snapshot and take ownership of its contents.
///
/// The first failed requirement is reported; nothing is partially accepted.
pub fn validate(raw: Value) -> Result<Snapshot> {
    let mut object = match raw {
        Value::Object(object) => object,
        other => {
            return Err(Error::Schema(format!(
                "backup must be a JSON object, found {}",
                json_kind(&other)
            )))
        }
    };

    let students = take_sequence(&mut object, "students")?;
    let attendance = take_sequence(&mut object, "attendance")?;
    let activity_log = take_sequence(&mut object, "activityLog")?;

    let version = match object.get("version") {
        None | Some(Value::Null) => {
            return Err(Error::Schema("missing required field 'version'".to_string()))
        }
        Some(Value::String(v)) if !v.is_empty() => v.clone(),
        Some(Value::String(_)) => {
            return Err(Error::Schema("field 'version' must not be empty".to_string()))
        }
        Some(other) => {
            return Err(Error::Schema(format!(
                "field 'version' must be a string, found {}",
                json_kind(other)
            )))
        }
    };

    let last_backup = match object.get("lastBackup") {
        Some(Value::String(ts)) => Some(ts.clone()),
        None | Some(Value::Null) => None,
        Some(other) => {
            warn!("Ignoring non-string lastBackup ({})", json_kind(other));
            None
        }
    };

    let checksum = match object.get("checksum") {
        Some(Value::String(sum)) if !sum.is_empty() => Some(sum.clone()),
        None | Some(Value::Null) | Some(Value::String(_)) => None,
        Some(other) => {
            return Err(Error::Schema(format!(
                "field 'checksum' must be a string, found {}",
                json_kind(other)
            )))
        }
    };

    Ok(Snapshot {
        collections: Collections::new(students, attendance, activity_log),
        last_backup,
        version,
        checksum,
    })
}

fn take_sequence(object: &mut Map<String, Value>, field: &str) -> Result<Vec<Value>> {
    match object.remove(field) {
        Some(Value::Array(records)) => Ok(records),
        None => Err(Error::Schema(format!("missing required field '{}'", field))),
        Some(other) => Err(Error::Schema(format!(
            "field '{}' must be an array, found {}",
            field,
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema_message(raw: Value) -> String {
        match validate(raw) {
            Err(Error::Schema(msg)) => msg,
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_minimal_snapshot() {
        let snapshot = validate(json!({
            "students": [],
            "attendance": [],
            "activityLog": [],
            "version": "2.0.0"
        }))
        .unwrap();

        assert!(snapshot.collections.is_empty());
        assert_eq!(snapshot.version, "2.0.0");
        assert!(snapshot.last_backup.is_none());
        assert!(snapshot.checksum.is_none());
    }

    #[test]
    fn test_full_snapshot() {
        let snapshot = validate(json!({
            "students": [{"id": "S1"}, {"id": "S2"}],
            "attendance": [{"studentId": "S1"}],
            "activityLog": [],
            "lastBackup": "2024-03-01T08:00:00.000Z",
            "version": "2.1.0",
            "checksum": "00ff"
        }))
        .unwrap();

        assert_eq!(snapshot.collections.counts(), (2, 1, 0));
        assert_eq!(snapshot.last_backup.as_deref(), Some("2024-03-01T08:00:00.000Z"));
        assert_eq!(snapshot.checksum.as_deref(), Some("00ff"));
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(schema_message(json!(null)).contains("JSON object"));
        assert!(schema_message(json!([1, 2])).contains("found array"));
        assert!(schema_message(json!("backup")).contains("found string"));
    }

    #[test]
    fn test_rejects_missing_collections() {
        let msg = schema_message(json!({"students": [], "activityLog": [], "version": "2.1.0"}));
        assert_eq!(msg, "missing required field 'attendance'");

        let msg = schema_message(json!({"students": [], "attendance": [], "version": "2.1.0"}));
        assert_eq!(msg, "missing required field 'activityLog'");
    }

    #[test]
    fn test_rejects_non_sequence_collections() {
        let msg = schema_message(json!({
            "students": {"id": "S1"},
            "attendance": [],
            "activityLog": [],
            "version": "2.1.0"
        }));
        assert_eq!(msg, "field 'students' must be an array, found object");

        let msg = schema_message(json!({
            "students": [],
            "attendance": null,
            "activityLog": [],
            "version": "2.1.0"
        }));
        assert!(msg.contains("'attendance'"));
    }

    #[test]
    fn test_rejects_bad_version() {
        let base = || json!({"students": [], "attendance": [], "activityLog": []});

        assert!(schema_message(base()).contains("'version'"));

        let mut empty = base();
        empty["version"] = json!("");
        assert!(schema_message(empty).contains("must not be empty"));

        let mut numeric = base();
        numeric["version"] = json!(2);
        assert!(schema_message(numeric).contains("found number"));
    }

    #[test]
    fn test_checksum_handling() {
        let mut raw = json!({"students": [], "attendance": [], "activityLog": [], "version": "2.1.0"});

        raw["checksum"] = json!("");
        assert!(validate(raw.clone()).unwrap().checksum.is_none());

        raw["checksum"] = json!(null);
        assert!(validate(raw.clone()).unwrap().checksum.is_none());

        raw["checksum"] = json!(12345);
        assert!(schema_message(raw).contains("'checksum'"));
    }

    #[test]
    fn test_non_string_last_backup_is_ignored() {
        let snapshot = validate(json!({
            "students": [],
            "attendance": [],
            "activityLog": [],
            "lastBackup": 1700000000,
            "version": "2.1.0"
        }))
        .unwrap();
        assert!(snapshot.last_backup.is_none());
    }

    #[test]
    fn test_records_are_not_inspected() {
        let snapshot = validate(json!({
            "students": [1, "two", null, [3]],
            "attendance": [],
            "activityLog": [],
            "version": "2.1.0"
        }))
        .unwrap();
        assert_eq!(snapshot.collections.students.len(), 4);
    }
}
