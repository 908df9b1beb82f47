// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Document-store ("bdo") provisioning client.
//!
//! The document store holds the node's spellbooks. The node owns one account
//! there, keyed by `sha256(subdomain + "aretha")`.

use std::sync::Arc;

use reqwest::Client;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::clock;
use crate::crypto::{Canonical, MessageSigner, SignatureError};
use crate::magic::Spellbook;

#[derive(Debug, thiserror::Error)]
pub enum ProvisioningError {
    #[error("document store call failed: {0}")]
    Request(String),

    #[error("document store response was invalid: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Signing(#[from] SignatureError),
}

/// Hash identifying this node's document-store account.
pub fn bdo_hash(subdomain: &str) -> String {
    let digest = Sha256::digest(format!("{subdomain}aretha").as_bytes());
    hex::encode(digest)
}

/// Client for the document store.
#[derive(Clone)]
pub struct DocumentStoreClient {
    base_url: String,
    http: Client,
    signer: Arc<dyn MessageSigner>,
}

impl DocumentStoreClient {
    pub fn new(base_url: impl Into<String>, http: Client, signer: Arc<dyn MessageSigner>) -> Self {
        Self {
            base_url: base_url.into(),
            http,
            signer,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Create (or re-obtain) the node's account and return its uuid.
    pub async fn create_user(&self, hash: &str) -> Result<String, ProvisioningError> {
        let pub_key = self.signer.public_key()?;
        let timestamp = clock::timestamp();
        let message = Canonical::DocumentStoreCreate {
            timestamp: &timestamp,
            pub_key: &pub_key,
            hash,
        }
        .message();
        let signature = self.signer.sign(&message)?;

        let payload = json!({
            "timestamp": timestamp,
            "pubKey": pub_key,
            "hash": hash,
            "bdo": {},
            "signature": signature,
        });

        let response = self
            .http
            .put(self.url("user/create"))
            .json(&payload)
            .send()
            .await
            .map_err(|e| ProvisioningError::Request(format!("PUT user/create failed: {e}")))?;
        let body = read_json(response, "PUT user/create").await?;

        let uuid = body
            .get("uuid")
            .and_then(Value::as_str)
            .filter(|uuid| !uuid.is_empty())
            .ok_or_else(|| {
                ProvisioningError::InvalidResponse(format!("no uuid in create response: {body}"))
            })?;

        info!(uuid = %uuid, "Document store account ready");
        Ok(uuid.to_string())
    }

    /// Fetch the spellbooks provisioned for `uuid`.
    pub async fn get_spellbooks(
        &self,
        uuid: &str,
        hash: &str,
    ) -> Result<Vec<Spellbook>, ProvisioningError> {
        let timestamp = clock::timestamp();
        let message = Canonical::DocumentStoreSpellbooks {
            timestamp: &timestamp,
            uuid,
            hash,
        }
        .message();
        let signature = self.signer.sign(&message)?;

        let path = format!("user/{uuid}/spellbooks");
        let response = self
            .http
            .get(self.url(&path))
            .query(&[
                ("timestamp", timestamp.as_str()),
                ("hash", hash),
                ("signature", signature.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ProvisioningError::Request(format!("GET {path} failed: {e}")))?;
        let body = read_json(response, &format!("GET {path}")).await?;

        let spellbooks = parse_spellbooks(body)?;
        debug!(count = spellbooks.len(), "Fetched spellbooks");
        Ok(spellbooks)
    }
}

async fn read_json(response: reqwest::Response, what: &str) -> Result<Value, ProvisioningError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProvisioningError::Request(format!(
            "{what} returned {status}: {body}"
        )));
    }
    response
        .json()
        .await
        .map_err(|e| ProvisioningError::InvalidResponse(format!("{what} invalid JSON: {e}")))
}

/// Accept either a bare array or `{"spellbooks": [...]}`.
fn parse_spellbooks(body: Value) -> Result<Vec<Spellbook>, ProvisioningError> {
    let list = match body {
        Value::Array(_) => body,
        Value::Object(mut map) => map.remove("spellbooks").ok_or_else(|| {
            ProvisioningError::InvalidResponse("missing spellbooks field".to_string())
        })?,
        other => {
            return Err(ProvisioningError::InvalidResponse(format!(
                "unexpected spellbooks response: {other}"
            )))
        }
    };
    serde_json::from_value(list)
        .map_err(|e| ProvisioningError::InvalidResponse(format!("invalid spellbooks: {e}")))
}
