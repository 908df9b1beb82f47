// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process key-value store.

use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use super::{KeyValueStore, StorageError, StorageResult};
use crate::crypto::SigningKeys;
use crate::ledger::LedgerUser;
use crate::models::UserRecord;
use crate::node::NodeRecord;

#[derive(Default)]
struct Inner {
    users: HashMap<String, UserRecord>,
    by_pub_key: HashMap<String, String>,
    nodes: HashMap<String, NodeRecord>,
    signing_keys: Option<SigningKeys>,
}

/// [`KeyValueStore`] held entirely in memory. Used by tests and local runs.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored user records.
    pub fn user_count(&self) -> usize {
        self.read().users.len()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get_user(&self, uuid: &str) -> StorageResult<UserRecord> {
        self.read()
            .users
            .get(uuid)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("user {uuid}")))
    }

    fn put_user(&self, pub_key: &str, fount_user: Option<LedgerUser>) -> StorageResult<UserRecord> {
        let mut inner = self.write();
        let uuid = inner
            .by_pub_key
            .get(pub_key)
            .cloned()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let record = UserRecord {
            uuid: uuid.clone(),
            pub_key: pub_key.to_string(),
            fount_user,
        };
        inner.by_pub_key.insert(pub_key.to_string(), uuid.clone());
        inner.users.insert(uuid, record.clone());
        Ok(record)
    }

    fn get_node_record(&self, id: &str) -> StorageResult<Option<NodeRecord>> {
        Ok(self.read().nodes.get(id).cloned())
    }

    fn save_node_record(&self, record: &NodeRecord) -> StorageResult<()> {
        self.write()
            .nodes
            .insert(record.uuid.clone(), record.clone());
        Ok(())
    }

    fn get_signing_keys(&self) -> StorageResult<Option<SigningKeys>> {
        Ok(self.read().signing_keys.clone())
    }

    fn save_signing_keys(&self, keys: &SigningKeys) -> StorageResult<()> {
        self.write().signing_keys = Some(keys.clone());
        Ok(())
    }
}
