//! Flat-file persistence for accounts and feedback.
//!
//! Both files live under a single data directory which is created, together
//! with empty seed files, when the server starts.

pub mod accounts;
pub mod feedback;

pub use accounts::{
    Account, AccountRecord, AccountRepository, Accounts, CredentialStore, DEFAULT_ROLE,
    JsonFileAccounts, MemoryAccounts, normalize_identifier,
};
pub use feedback::{FeedbackLog, FeedbackRecord};

use std::{
    fs::{self, OpenOptions},
    io,
    path::{Path, PathBuf},
};
use tracing::info;

pub const USERS_FILE: &str = "users.json";
pub const FEEDBACK_FILE: &str = "feedback.json";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("account already exists")]
    DuplicateAccount,

    /// Unknown identifier and wrong password collapse into this one variant.
    #[error("invalid credentials")]
    AuthFailure,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("account store {} is corrupt: {reason}", .path.display())]
    StorageReadCorrupt { path: PathBuf, reason: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("store lock poisoned")]
    Poisoned,

    #[error("storage task failed: {0}")]
    Task(String),
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Resolved locations of the persisted files.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub users: PathBuf,
    pub feedback: PathBuf,
}

/// Create the data directory and seed `users.json` with `{}` and an empty
/// `feedback.json` when they do not exist yet. Existing files are left alone.
///
/// # Errors
/// Returns an error if the directory or the seed files cannot be created.
pub fn init_data_dir(dir: &Path) -> Result<DataPaths, StoreError> {
    fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;

    let users = dir.join(USERS_FILE);
    if !users.exists() {
        fs::write(&users, b"{}").map_err(|e| StoreError::io(&users, e))?;
        info!("Created account store {}", users.display());
    }

    let feedback = dir.join(FEEDBACK_FILE);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&feedback)
        .map_err(|e| StoreError::io(&feedback, e))?;

    Ok(DataPaths { users, feedback })
}

/// Timestamps are written as RFC 3339 UTC with microseconds. Reading also
/// accepts naive ISO-8601 values (no offset), which are taken as UTC.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn init_data_dir_seeds_missing_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("data");

        let paths = init_data_dir(&dir).unwrap();

        assert_eq!(fs::read_to_string(&paths.users).unwrap(), "{}");
        assert_eq!(fs::read_to_string(&paths.feedback).unwrap(), "");
    }

    #[test]
    fn init_data_dir_keeps_existing_files() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(USERS_FILE), r#"{"a@x.com":{}}"#).unwrap();
        fs::write(tmp.path().join(FEEDBACK_FILE), "{}\n").unwrap();

        let paths = init_data_dir(tmp.path()).unwrap();

        assert_eq!(fs::read_to_string(&paths.users).unwrap(), r#"{"a@x.com":{}}"#);
        assert_eq!(fs::read_to_string(&paths.feedback).unwrap(), "{}\n");
    }

    #[test]
    fn timestamp_parses_rfc3339_and_naive() {
        let zoned = timestamp::parse("2024-05-01T10:20:30.123456Z").unwrap();
        let naive = timestamp::parse("2024-05-01T10:20:30.123456").unwrap();
        assert_eq!(zoned, naive);
        assert_eq!(zoned.year(), 2024);
        assert_eq!(zoned.second(), 30);

        let whole_seconds = timestamp::parse("2024-05-01T10:20:30").unwrap();
        assert_eq!(whole_seconds.nanosecond(), 0);

        assert!(timestamp::parse("yesterday").is_none());
    }
}
