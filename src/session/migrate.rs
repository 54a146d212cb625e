//! Persisted session record and the one-time upgrade from legacy keys.
//!
//! Older consoles wrote the same user JSON under both `admin_user` and
//! `user`. The current layout is a single versioned record under
//! [`SESSION_KEY`]; legacy keys are read once and then removed.

use serde::{Deserialize, Serialize};

use crate::identity::UserIdentity;
use crate::storage::{SessionStorage, StorageError};

pub const SESSION_KEY: &str = "admin_session";
pub const LEGACY_USER_KEY: &str = "admin_user";
pub const LEGACY_FALLBACK_KEY: &str = "user";
pub const SCHEMA_VERSION: u32 = 1;

/// Legacy keys in read-priority order.
const LEGACY_KEYS: [&str; 2] = [LEGACY_USER_KEY, LEGACY_FALLBACK_KEY];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub version: u32,
    pub user: UserIdentity,
}

impl PersistedSession {
    #[must_use]
    pub fn new(user: UserIdentity) -> Self {
        Self { version: SCHEMA_VERSION, user }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MigrationOutcome {
    /// The canonical record was already present and valid.
    Current(UserIdentity),
    /// A legacy record was upgraded and the legacy keys removed.
    Migrated { from_key: &'static str, user: UserIdentity },
    /// No session of any vintage.
    Nothing,
    /// A record exists but does not decode, or has an unknown version.
    Corrupt,
}

/// Bring storage to the current layout and report what was found.
///
/// Storage is only written on a successful upgrade; a corrupt record is left
/// for the caller to clear.
///
/// # Errors
///
/// Returns an error if storage cannot be read or written.
pub fn migrate(storage: &dyn SessionStorage) -> Result<MigrationOutcome, StorageError> {
    if let Some(raw) = read_non_empty(storage, SESSION_KEY)? {
        return Ok(match serde_json::from_str::<PersistedSession>(&raw) {
            Ok(record) if record.version == SCHEMA_VERSION => {
                remove_legacy(storage)?;
                MigrationOutcome::Current(record.user)
            }
            Ok(record) => {
                tracing::warn!(version = record.version, "unsupported session record version");
                MigrationOutcome::Corrupt
            }
            Err(e) => {
                tracing::warn!(error = %e, "session record does not decode");
                MigrationOutcome::Corrupt
            }
        });
    }

    for key in LEGACY_KEYS {
        let Some(raw) = read_non_empty(storage, key)? else {
            continue;
        };
        return match serde_json::from_str::<UserIdentity>(&raw) {
            Ok(user) => {
                write_record(storage, &user)?;
                remove_legacy(storage)?;
                tracing::info!(from_key = key, "migrated legacy session record");
                Ok(MigrationOutcome::Migrated { from_key: key, user })
            }
            Err(e) => {
                tracing::warn!(error = %e, key, "legacy session record does not decode");
                Ok(MigrationOutcome::Corrupt)
            }
        };
    }

    Ok(MigrationOutcome::Nothing)
}

/// Write `user` as the canonical record.
///
/// # Errors
///
/// Returns an error if encoding or the storage write fails.
pub fn write_record(storage: &dyn SessionStorage, user: &UserIdentity) -> Result<(), StorageError> {
    let raw = serde_json::to_string(&PersistedSession::new(user.clone()))?;
    storage.set(SESSION_KEY, &raw)
}

/// Remove the canonical record and every legacy key.
///
/// # Errors
///
/// Returns an error if a storage write fails.
pub fn remove_all(storage: &dyn SessionStorage) -> Result<(), StorageError> {
    storage.remove(SESSION_KEY)?;
    remove_legacy(storage)
}

fn remove_legacy(storage: &dyn SessionStorage) -> Result<(), StorageError> {
    for key in LEGACY_KEYS {
        storage.remove(key)?;
    }
    Ok(())
}

fn read_non_empty(storage: &dyn SessionStorage, key: &str) -> Result<Option<String>, StorageError> {
    Ok(storage.get(key)?.filter(|raw| !raw.trim().is_empty()))
}

#[cfg(test)]
#[path = "migrate_test.rs"]
mod tests;
