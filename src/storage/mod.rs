// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Key-Value Storage
//!
//! Durable state for the node: local user records, the node's bootstrap
//! record and its signing keys. The rest of the crate only sees the
//! [`KeyValueStore`] contract; [`FileStore`] backs it with JSON files under
//! `DATA_DIR` and [`MemoryStore`] keeps everything in process for tests.
//!
//! Implementations serialize their own writes.

pub mod file;
pub mod memory;
pub mod paths;

use std::io;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use paths::StoragePaths;

use crate::crypto::SigningKeys;
use crate::ledger::LedgerUser;
use crate::models::UserRecord;
use crate::node::NodeRecord;

/// Error type for storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error during file operations
    Io(io::Error),
    /// JSON serialization/deserialization error
    Json(serde_json::Error),
    /// Entity not found
    NotFound(String),
    /// Identifier that cannot be used as a storage key
    InvalidKey(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {e}"),
            StorageError::Json(e) => write!(f, "JSON error: {e}"),
            StorageError::NotFound(entity) => write!(f, "Not found: {entity}"),
            StorageError::InvalidKey(key) => write!(f, "Invalid storage key: {key}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::NotFound {
            StorageError::NotFound(e.to_string())
        } else {
            StorageError::Io(e)
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Json(e)
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage contract consumed by the node.
pub trait KeyValueStore: Send + Sync {
    /// Fetch a local user by uuid.
    fn get_user(&self, uuid: &str) -> StorageResult<UserRecord>;

    /// Insert or update the user owning `pub_key`.
    ///
    /// A key that is already registered keeps its uuid; only the ledger
    /// account is refreshed.
    fn put_user(&self, pub_key: &str, fount_user: Option<LedgerUser>) -> StorageResult<UserRecord>;

    /// Fetch a node bootstrap record, `None` if it was never saved.
    fn get_node_record(&self, id: &str) -> StorageResult<Option<NodeRecord>>;

    /// Persist a node bootstrap record under its own `uuid`.
    fn save_node_record(&self, record: &NodeRecord) -> StorageResult<()>;

    /// The node's signing keys, `None` before the first start.
    fn get_signing_keys(&self) -> StorageResult<Option<SigningKeys>>;

    /// Replace the node's signing keys.
    fn save_signing_keys(&self, keys: &SigningKeys) -> StorageResult<()>;
}

/// Reject identifiers that could escape their directory.
pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_key_accepts_uuids_and_hex() {
        assert!(validate_key("3f4d6542-b8ce-4226-93d3-80d6f14d6db2").is_ok());
        assert!(validate_key("02abcdef").is_ok());
        assert!(validate_key("aretha").is_ok());
    }

    #[test]
    fn validate_key_rejects_path_tricks() {
        assert!(validate_key("").is_err());
        assert!(validate_key("..").is_err());
        assert!(validate_key("a/b").is_err());
        assert!(validate_key(".hidden").is_err());
    }
}
