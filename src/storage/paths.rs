// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path layout for the file-backed key-value store.

use std::path::{Path, PathBuf};

/// Default data directory when `DATA_DIR` is not set.
pub const DATA_ROOT: &str = "./data";

/// Storage path utilities.
///
/// ```text
/// {root}/
///   users/{uuid}.json             # local user records
///   users/by-pubkey/{pubKey}.json # pubKey -> uuid index
///   node/{id}.json                # bootstrap record ("aretha")
///   keys/signing.json             # node signing keys
/// ```
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== User Paths ==========

    /// Directory containing all user records.
    pub fn users_dir(&self) -> PathBuf {
        self.root.join("users")
    }

    /// Path to a specific user record.
    pub fn user(&self, uuid: &str) -> PathBuf {
        self.users_dir().join(format!("{uuid}.json"))
    }

    /// Directory containing the pubKey index.
    pub fn pub_key_index_dir(&self) -> PathBuf {
        self.users_dir().join("by-pubkey")
    }

    /// Path to the index entry for a public key.
    pub fn pub_key_index(&self, pub_key: &str) -> PathBuf {
        self.pub_key_index_dir().join(format!("{pub_key}.json"))
    }

    // ========== Node Paths ==========

    /// Directory containing node bootstrap records.
    pub fn node_dir(&self) -> PathBuf {
        self.root.join("node")
    }

    /// Path to a node bootstrap record.
    pub fn node_record(&self, id: &str) -> PathBuf {
        self.node_dir().join(format!("{id}.json"))
    }

    // ========== Key Paths ==========

    /// Directory containing key material.
    pub fn keys_dir(&self) -> PathBuf {
        self.root.join("keys")
    }

    /// Path to the node signing keys.
    pub fn signing_keys(&self) -> PathBuf {
        self.keys_dir().join("signing.json")
    }
}
