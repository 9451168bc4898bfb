//! Append-only feedback log, one JSON object per line.

use super::{StoreError, timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
    sync::Mutex,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub name: String,
    pub email: String,
    pub role: String,
    pub rating: String,
    pub message: String,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl FeedbackRecord {
    /// Build a record from raw form values, trimming each one and stamping
    /// the current time.
    #[must_use]
    pub fn new(name: &str, email: &str, role: &str, rating: &str, message: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            role: role.trim().to_string(),
            rating: rating.trim().to_string(),
            message: message.trim().to_string(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug)]
pub struct FeedbackLog {
    path: PathBuf,
    // Keeps concurrent lines from interleaving.
    append_lock: Mutex<()>,
}

impl FeedbackLog {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            append_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a single line at the end of the log.
    ///
    /// # Errors
    /// Returns an error if the log cannot be opened or written.
    pub fn append(&self, record: &FeedbackRecord) -> Result<(), StoreError> {
        let mut line = serde_json::to_vec(record).map_err(|e| StoreError::Io {
            path: self.path.clone(),
            source: e.into(),
        })?;
        line.push(b'\n');

        let _guard = self.append_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::io(&self.path, e))?;
        file.write_all(&line)
            .map_err(|e| StoreError::io(&self.path, e))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;

    fn lines(path: &Path) -> Vec<serde_json::Value> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn new_trims_every_field() {
        let record = FeedbackRecord::new(" Ann ", "ann@x.com\n", "\tdriver", " 5", "  great  ");
        assert_eq!(record.name, "Ann");
        assert_eq!(record.email, "ann@x.com");
        assert_eq!(record.role, "driver");
        assert_eq!(record.rating, "5");
        assert_eq!(record.message, "great");
    }

    #[test]
    fn append_adds_exactly_one_line_per_record() {
        let tmp = tempfile::tempdir().unwrap();
        let log = FeedbackLog::new(tmp.path().join("feedback.json"));

        log.append(&FeedbackRecord::new("a", "", "", "", "first")).unwrap();
        let after_first = fs::read_to_string(log.path()).unwrap();
        log.append(&FeedbackRecord::new("b", "", "", "", "second")).unwrap();

        let entries = lines(log.path());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["message"], "first");
        assert_eq!(entries[1]["message"], "second");
        assert!(fs::read_to_string(log.path()).unwrap().starts_with(&after_first));
    }

    #[test]
    fn append_keeps_empty_fields_and_field_names() {
        let tmp = tempfile::tempdir().unwrap();
        let log = FeedbackLog::new(tmp.path().join("feedback.json"));

        log.append(&FeedbackRecord::new("", "", "", "", "")).unwrap();

        let entry = &lines(log.path())[0];
        for field in ["name", "email", "role", "rating", "message"] {
            assert_eq!(entry[field], "", "field {field}");
        }
        assert!(entry["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn append_preserves_non_ascii() {
        let tmp = tempfile::tempdir().unwrap();
        let log = FeedbackLog::new(tmp.path().join("feedback.json"));

        log.append(&FeedbackRecord::new("Zoë", "", "", "", "très bien")).unwrap();

        let raw = fs::read_to_string(log.path()).unwrap();
        assert!(raw.contains("très bien"));
        assert!(raw.ends_with('\n'));
    }

    #[test]
    fn append_to_missing_directory_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let log = FeedbackLog::new(tmp.path().join("missing").join("feedback.json"));

        let err = log.append(&FeedbackRecord::new("", "", "", "", "x")).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }
}
