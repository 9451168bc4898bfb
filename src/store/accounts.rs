//! Account credential store.
//!
//! Accounts are kept as one mapping from lower-cased email to
//! [`AccountRecord`]. The mapping is read and rewritten wholesale; the
//! [`AccountRepository`] trait is the seam where another backend can replace
//! the JSON file without touching callers.

use super::{StoreError, timestamp};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{Mutex, OnceLock},
};
use tracing::{debug, info, warn};

pub const DEFAULT_ROLE: &str = "student";

pub type Accounts = BTreeMap<String, AccountRecord>;

/// Persisted value of the account mapping. The identifier is the map key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub password_hash: String,
    pub role: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for AccountRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountRecord")
            .field("password_hash", &"***")
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Account as handed back to callers; never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub identifier: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    fn from_record(identifier: String, record: &AccountRecord) -> Self {
        Self {
            identifier,
            role: record.role.clone(),
            created_at: record.created_at,
        }
    }
}

/// Normalize an email for lookup/uniqueness checks.
#[must_use]
pub fn normalize_identifier(identifier: &str) -> String {
    identifier.trim().to_lowercase()
}

/// Durable storage of the whole account mapping.
pub trait AccountRepository: Send + Sync {
    /// Read the full mapping. Missing storage is an empty mapping; unreadable
    /// or unparseable storage is an error.
    ///
    /// # Errors
    /// Returns [`StoreError::StorageReadCorrupt`] or [`StoreError::Io`].
    fn read(&self) -> Result<Accounts, StoreError>;

    /// Replace the full mapping.
    ///
    /// # Errors
    /// Returns [`StoreError::Io`] if the mapping cannot be persisted.
    fn write(&self, accounts: &Accounts) -> Result<(), StoreError>;
}

/// Account mapping stored as pretty-printed JSON in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileAccounts {
    path: PathBuf,
}

impl JsonFileAccounts {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl AccountRepository for JsonFileAccounts {
    fn read(&self) -> Result<Accounts, StoreError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Accounts::new()),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        serde_json::from_slice(&data).map_err(|e| StoreError::StorageReadCorrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    fn write(&self, accounts: &Accounts) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(accounts).map_err(|e| StoreError::Io {
            path: self.path.clone(),
            source: e.into(),
        })?;

        // Readers only ever see the old or the new file, never a partial one.
        let tmp = self.temp_path();
        fs::write(&tmp, json).map_err(|e| StoreError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::io(&self.path, e))
    }
}

/// Account mapping held in memory only.
#[derive(Debug, Default)]
pub struct MemoryAccounts {
    accounts: Mutex<Accounts>,
}

impl MemoryAccounts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountRepository for MemoryAccounts {
    fn read(&self) -> Result<Accounts, StoreError> {
        self.accounts
            .lock()
            .map(|accounts| accounts.clone())
            .map_err(|_| StoreError::Poisoned)
    }

    fn write(&self, accounts: &Accounts) -> Result<(), StoreError> {
        let mut guard = self.accounts.lock().map_err(|_| StoreError::Poisoned)?;
        guard.clone_from(accounts);
        Ok(())
    }
}

/// Account operations on top of an [`AccountRepository`].
///
/// Every method blocks on storage and on Argon2; async callers should run
/// them on the blocking pool.
pub struct CredentialStore {
    repository: Box<dyn AccountRepository>,
    // Serializes the load-check-insert-save sequence of signups.
    write_lock: Mutex<()>,
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}

impl CredentialStore {
    pub fn new(repository: impl AccountRepository + 'static) -> Self {
        Self {
            repository: Box::new(repository),
            write_lock: Mutex::new(()),
        }
    }

    /// Read the account mapping, degrading to an empty mapping when the
    /// stored data cannot be read. The result is not a durable view.
    pub fn load(&self) -> Accounts {
        match self.repository.read() {
            Ok(accounts) => accounts,
            Err(e) => {
                warn!("Account store unreadable, treating as empty: {e}");
                Accounts::new()
            }
        }
    }

    /// Overwrite the stored mapping.
    ///
    /// # Errors
    /// Returns an error if the backend fails to persist the mapping.
    pub fn save(&self, accounts: &Accounts) -> Result<(), StoreError> {
        self.repository.write(accounts)
    }

    /// Strict read of the stored mapping, without the empty-mapping fallback.
    ///
    /// # Errors
    /// Returns the backend's read error.
    pub fn check(&self) -> Result<(), StoreError> {
        self.repository.read().map(|_| ())
    }

    /// Create a new account. An empty role falls back to [`DEFAULT_ROLE`].
    ///
    /// # Errors
    /// - [`StoreError::MissingField`] for an empty identifier or password
    /// - [`StoreError::DuplicateAccount`] if the identifier is taken
    /// - [`StoreError::StorageReadCorrupt`] if existing data cannot be parsed;
    ///   the stored file is not overwritten in that case
    pub fn create_account(
        &self,
        identifier: &str,
        password: &str,
        role: &str,
    ) -> Result<Account, StoreError> {
        let identifier = normalize_identifier(identifier);
        if identifier.is_empty() {
            return Err(StoreError::MissingField("email"));
        }
        if password.is_empty() {
            return Err(StoreError::MissingField("password"));
        }
        let role = match role.trim() {
            "" => DEFAULT_ROLE.to_string(),
            role => role.to_string(),
        };

        let password_hash = hash_password(password)?;

        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut accounts = self.repository.read()?;
        if accounts.contains_key(&identifier) {
            debug!("Signup rejected, account exists");
            return Err(StoreError::DuplicateAccount);
        }

        let record = AccountRecord {
            password_hash,
            role,
            // Stored with microsecond precision; keep the returned value identical.
            created_at: Utc::now().trunc_subsecs(6),
        };
        let account = Account::from_record(identifier.clone(), &record);
        accounts.insert(identifier, record);
        self.repository.write(&accounts)?;

        info!("Account created");

        Ok(account)
    }

    /// Check a password against the stored hash.
    ///
    /// # Errors
    /// Returns [`StoreError::AuthFailure`] whether the identifier is unknown
    /// or the password does not match.
    pub fn authenticate(&self, identifier: &str, password: &str) -> Result<Account, StoreError> {
        let identifier = normalize_identifier(identifier);
        let accounts = self.load();
        let record = accounts.get(&identifier);

        // Unknown identifiers are checked against a dummy hash so both
        // failures cost one Argon2 verification.
        let hash = match record {
            Some(record) => record.password_hash.as_str(),
            None => dummy_hash(),
        };
        let verified = verify_password(hash, password);

        match record {
            Some(record) if verified => Ok(Account::from_record(identifier, record)),
            _ => Err(StoreError::AuthFailure),
        }
    }
}

fn hash_password(password: &str) -> Result<String, StoreError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| StoreError::Hash(e.to_string()))
}

/// PHC string of a throwaway password, built once with the same parameters
/// as real hashes.
fn dummy_hash() -> &'static str {
    static DUMMY_HASH: OnceLock<String> = OnceLock::new();
    DUMMY_HASH.get_or_init(|| hash_password("axis-unknown-account").unwrap_or_default())
}

fn verify_password(hash: &str, password: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}
