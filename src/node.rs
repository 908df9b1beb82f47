// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Node Record
//!
//! The node's bootstrap record and the process-wide handle it is published
//! through. The record is written only by the bootstrap sequencer; everything
//! else reads it through [`NodeHandle::ready`], which fails with
//! [`AppError::NotReady`] until bootstrap has completed.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::AppError;
use crate::magic::Spellbook;

/// Storage key of this node's own record.
pub const NODE_RECORD_ID: &str = "aretha";

/// Galaxy namespace claimed by this node ("ARET").
pub const ARETHA_GALAXY: &str = "41524554";

/// This node's identities, routing table and namespace claim.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NodeRecord {
    /// Local storage key, always [`NODE_RECORD_ID`] for the running node.
    pub uuid: String,

    #[serde(rename = "fountUUID", default)]
    pub ledger_uuid: String,

    #[serde(rename = "fountPubKey", default)]
    pub ledger_pub_key: String,

    #[serde(rename = "bdoUUID", default)]
    pub document_store_uuid: String,

    #[serde(default)]
    pub spellbooks: Vec<Spellbook>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub galaxy: Option<String>,

    /// Gateway ordinal; read when issuing tokens, never advanced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordinal: Option<u64>,
}

impl NodeRecord {
    pub fn new(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            ..Self::default()
        }
    }

    /// Whether every registration field is populated.
    pub fn is_complete(&self) -> bool {
        !self.ledger_uuid.is_empty()
            && !self.document_store_uuid.is_empty()
            && !self.spellbooks.is_empty()
    }

    /// Whether this record already holds the node's galaxy.
    pub fn has_galaxy(&self) -> bool {
        self.galaxy.as_deref() == Some(ARETHA_GALAXY)
    }

    pub fn ordinal(&self) -> u64 {
        self.ordinal.unwrap_or(0)
    }
}

/// Shared, late-initialized view of the node record.
#[derive(Clone, Default)]
pub struct NodeHandle {
    inner: Arc<RwLock<Option<Arc<NodeRecord>>>>,
}

impl NodeHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// The published record, or `NotReady` before bootstrap completes.
    pub async fn ready(&self) -> Result<Arc<NodeRecord>, AppError> {
        self.inner
            .read()
            .await
            .clone()
            .ok_or(AppError::NotReady)
    }

    pub async fn is_ready(&self) -> bool {
        self.inner.read().await.is_some()
    }

    /// Replace the published record.
    pub async fn publish(&self, record: NodeRecord) {
        *self.inner.write().await = Some(Arc::new(record));
    }
}
