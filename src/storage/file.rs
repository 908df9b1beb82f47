// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JSON-file key-value store.
//!
//! Each record is one pretty-printed JSON file. Writes go to a temp file and
//! are renamed into place, and a process-wide lock serializes writers so the
//! pubKey index and the user record stay consistent.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use super::{validate_key, KeyValueStore, StoragePaths, StorageError, StorageResult};
use crate::crypto::SigningKeys;
use crate::ledger::LedgerUser;
use crate::models::UserRecord;
use crate::node::NodeRecord;

/// Index entry mapping a public key to its user uuid.
#[derive(Debug, Serialize, Deserialize)]
struct PubKeyIndex {
    uuid: String,
}

/// File-backed [`KeyValueStore`].
#[derive(Debug)]
pub struct FileStore {
    paths: StoragePaths,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open a store rooted at `paths`, creating its directories.
    ///
    /// Safe to call multiple times (idempotent).
    pub fn open(paths: StoragePaths) -> StorageResult<Self> {
        for dir in [
            paths.users_dir(),
            paths.pub_key_index_dir(),
            paths.node_dir(),
            paths.keys_dir(),
        ] {
            fs::create_dir_all(&dir)?;
        }

        Ok(Self {
            paths,
            write_lock: Mutex::new(()),
        })
    }

    /// Get the storage paths.
    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    fn read_json<T: DeserializeOwned>(&self, path: impl AsRef<Path>) -> StorageResult<T> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    fn read_optional<T: DeserializeOwned>(&self, path: impl AsRef<Path>) -> StorageResult<Option<T>> {
        match self.read_json(path) {
            Ok(value) => Ok(Some(value)),
            Err(StorageError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Write a JSON file (atomic write via rename).
    fn write_json<T: Serialize>(&self, path: impl AsRef<Path>, value: &T) -> StorageResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("tmp");
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.flush()?;
        }

        fs::rename(&temp_path, path)?;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for FileStore {
    fn get_user(&self, uuid: &str) -> StorageResult<UserRecord> {
        validate_key(uuid).map_err(|_| StorageError::NotFound(format!("user {uuid}")))?;
        self.read_optional(self.paths.user(uuid))?
            .ok_or_else(|| StorageError::NotFound(format!("user {uuid}")))
    }

    fn put_user(&self, pub_key: &str, fount_user: Option<LedgerUser>) -> StorageResult<UserRecord> {
        validate_key(pub_key)?;
        let _guard = self.lock();

        let index_path = self.paths.pub_key_index(pub_key);
        let uuid = match self.read_optional::<PubKeyIndex>(&index_path)? {
            Some(index) => index.uuid,
            None => Uuid::new_v4().to_string(),
        };

        let record = UserRecord {
            uuid: uuid.clone(),
            pub_key: pub_key.to_string(),
            fount_user,
        };

        self.write_json(self.paths.user(&uuid), &record)?;
        self.write_json(&index_path, &PubKeyIndex { uuid })?;
        Ok(record)
    }

    fn get_node_record(&self, id: &str) -> StorageResult<Option<NodeRecord>> {
        validate_key(id)?;
        self.read_optional(self.paths.node_record(id))
    }

    fn save_node_record(&self, record: &NodeRecord) -> StorageResult<()> {
        validate_key(&record.uuid)?;
        let _guard = self.lock();
        self.write_json(self.paths.node_record(&record.uuid), record)
    }

    fn get_signing_keys(&self) -> StorageResult<Option<SigningKeys>> {
        self.read_optional(self.paths.signing_keys())
    }

    fn save_signing_keys(&self, keys: &SigningKeys) -> StorageResult<()> {
        let _guard = self.lock();
        self.write_json(self.paths.signing_keys(), keys)
    }
}
