//! JSONL audit trail for consultation events.
//!
//! Each [`ConversationEvent`] becomes one JSON object on its own line. The
//! payload's fields are lifted to the top level next to `type` and an
//! RFC 3339 `timestamp`; non-object payloads are kept under `data`.

use chrono::{SecondsFormat, Utc};
use consult_application::{ConversationEvent, ConversationLogger};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Appends consultation events to a JSONL file.
///
/// Successive consultations append to the same file. Writes are
/// serialized through a mutex and flushed per event.
pub struct JsonlConversationLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlConversationLogger {
    /// Open `path` for appending, creating parent directories as needed.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Flatten an event into the record written to disk
fn to_record(event: ConversationEvent, timestamp: String) -> Value {
    let mut record = match event.payload {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("data".to_string(), other);
            map
        }
    };
    record.insert("type".to_string(), Value::from(event.event_type));
    record.insert("timestamp".to_string(), Value::from(timestamp));
    Value::Object(record)
}

impl ConversationLogger for JsonlConversationLogger {
    fn log(&self, event: ConversationEvent) {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let event_type = event.event_type;
        let Ok(line) = serde_json::to_string(&to_record(event, timestamp)) else {
            return;
        };

        let Ok(mut writer) = self.writer.lock() else {
            return;
        };
        if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
            warn!(
                "Could not write {} event to {}: {}",
                event_type,
                self.path.display(),
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_record_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("consultations.jsonl");
        let logger = JsonlConversationLogger::open(&path).unwrap();

        logger.log(ConversationEvent::new(
            "agent_response",
            json!({"agent_id": "cardiology", "confidence": 0.8, "valid": true}),
        ));
        logger.log(ConversationEvent::new(
            "consensus",
            json!({"reached": false, "needs_review": true}),
        ));
        drop(logger);

        let records = read_lines(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["type"], "agent_response");
        assert_eq!(records[0]["agent_id"], "cardiology");
        assert_eq!(records[1]["type"], "consensus");
        assert_eq!(records[1]["needs_review"], true);
        for record in &records {
            let timestamp = record["timestamp"].as_str().unwrap();
            assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
        }
    }

    #[test]
    fn test_appends_across_loggers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("log.jsonl");

        for id in ["c1", "c2"] {
            let logger = JsonlConversationLogger::open(&path).unwrap();
            logger.log(ConversationEvent::new("consensus", json!({"run": id})));
        }

        let records = read_lines(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["run"], "c2");
    }

    #[test]
    fn test_non_object_payload_goes_under_data() {
        let record = to_record(
            ConversationEvent::new("conflict_detected", json!(["a", "b"])),
            "2026-01-01T00:00:00.000Z".to_string(),
        );
        assert_eq!(record["type"], "conflict_detected");
        assert_eq!(record["data"], json!(["a", "b"]));
    }

    #[test]
    fn test_open_fails_under_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        assert!(JsonlConversationLogger::open(blocker.join("log.jsonl")).is_err());
    }
}
