// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP client for the ledger ("fount") service.
//!
//! Every operation is one signed request (identity creation may look up
//! first). Responses are read as JSON whatever the HTTP status, because the
//! ledger reports refusals such as "already claimed" in the body.

use std::sync::Arc;

use reqwest::Client;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use super::flavor::Flavor;
use super::types::{error_text, LedgerUser};
use crate::clock;
use crate::crypto::{Canonical, MessageSigner, SignatureError};

/// Rank byte marking a galactic nineum (hex chars 14..16 of its id).
const GALACTIC_RANK: &str = "ff";

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("{0}")]
    Validation(String),

    #[error("ledger call failed: {0}")]
    LedgerCallFailed(String),

    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Signing(#[from] SignatureError),
}

impl From<super::flavor::FlavorError> for LedgerError {
    fn from(e: super::flavor::FlavorError) -> Self {
        LedgerError::Validation(e.to_string())
    }
}

/// Who signs an outbound envelope.
#[derive(Debug, Clone)]
pub enum Signing {
    /// Sign now with the node's own key.
    Node,
    /// Forward an envelope the caller already signed.
    Forwarded { timestamp: String, signature: String },
}

/// How a galaxy claim ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalaxyClaim {
    /// The ledger returned a galactic nineum.
    Claimed,
    /// The ledger reported the galaxy as already claimed.
    AlreadyClaimed,
}

/// Typed operations against the ledger service.
#[derive(Clone)]
pub struct LedgerClient {
    base_url: String,
    http: Client,
    signer: Arc<dyn MessageSigner>,
}

impl LedgerClient {
    pub fn new(base_url: impl Into<String>, http: Client, signer: Arc<dyn MessageSigner>) -> Self {
        Self {
            base_url: base_url.into(),
            http,
            signer,
        }
    }

    /// Base URL, always ending in `/`.
    pub fn base_url(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }

    /// Look up an account by uuid or public key.
    ///
    /// `Ok(None)` when the ledger answers without an account.
    pub async fn query_identity(
        &self,
        key: &str,
        signing: Signing,
    ) -> Result<Option<LedgerUser>, LedgerError> {
        let (timestamp, signature) = self.envelope(signing, |timestamp| {
            Canonical::UserLookup {
                timestamp,
                uuid: key,
            }
            .message()
        })?;

        let body = self
            .get_json(
                &format!("user/{key}"),
                &[("timestamp", &timestamp), ("signature", &signature)],
            )
            .await?;
        Ok(LedgerUser::from_response(&body))
    }

    /// Find the account owning `pub_key`, creating it when absent.
    pub async fn create_identity(
        &self,
        pub_key: &str,
        signing: Signing,
    ) -> Result<LedgerUser, LedgerError> {
        require("pubKey", pub_key)?;

        let (timestamp, signature) = self.envelope(signing, |timestamp| {
            Canonical::UserCreate { timestamp, pub_key }.message()
        })?;

        // The lookup is signed over the same message as the create.
        let lookup = self
            .get_json(
                &format!("user/{pub_key}"),
                &[("timestamp", &timestamp), ("signature", &signature)],
            )
            .await;
        match lookup {
            Ok(body) => {
                if let Some(user) = LedgerUser::from_response(&body) {
                    debug!(uuid = %user.uuid, "Ledger identity already exists");
                    return Ok(user);
                }
            }
            Err(e) => debug!(error = %e, "Ledger identity lookup failed, creating"),
        }

        let payload = json!({
            "timestamp": timestamp,
            "pubKey": pub_key,
            "signature": signature,
        });
        let body = self.put_json("user/create", &payload).await?;

        let user = LedgerUser::from_response(&body)
            .ok_or_else(|| rejected(&body, "ledger did not return a user"))?;
        info!(uuid = %user.uuid, "Created ledger identity");
        Ok(user)
    }

    /// Mint `quantity` nineum of `flavor` to the node's own account.
    ///
    /// `caller_uuid` is the local user paying for the tickets; the ledger
    /// only ever sees the node's service account.
    pub async fn purchase_ticket(
        &self,
        self_uuid: &str,
        caller_uuid: &str,
        flavor: &str,
        quantity: u64,
    ) -> Result<(), LedgerError> {
        let flavor = Flavor::parse(flavor)?;
        require_quantity(quantity)?;

        let timestamp = clock::timestamp();
        let message = Canonical::NineumMove {
            timestamp: &timestamp,
            from_uuid: self_uuid,
            to_uuid: self_uuid,
            flavor: flavor.as_str(),
            quantity,
        }
        .message();
        let signature = self.signer.sign(&message)?;

        let payload = nineum_payload(&timestamp, self_uuid, &flavor, quantity, &signature);
        let body = self
            .put_json(&format!("user/{self_uuid}/nineum"), &payload)
            .await?;

        if body.get("uuid").and_then(Value::as_str) == Some(self_uuid) {
            info!(
                caller = %caller_uuid,
                flavor = %flavor,
                quantity,
                "Purchased nineum tickets"
            );
            Ok(())
        } else {
            Err(rejected(&body, "Nineum purchase failed"))
        }
    }

    /// Move `quantity` nineum of `flavor` from the node to `buyer_uuid`.
    pub async fn transfer_ticket(
        &self,
        self_uuid: &str,
        buyer_uuid: &str,
        flavor: &str,
        quantity: u64,
    ) -> Result<(), LedgerError> {
        require("uuid", buyer_uuid)?;
        let flavor = Flavor::parse(flavor)?;
        require_quantity(quantity)?;

        let timestamp = clock::timestamp();
        let message = Canonical::NineumMove {
            timestamp: &timestamp,
            from_uuid: self_uuid,
            to_uuid: buyer_uuid,
            flavor: flavor.as_str(),
            quantity,
        }
        .message();
        let signature = self.signer.sign(&message)?;

        let payload = nineum_payload(&timestamp, buyer_uuid, &flavor, quantity, &signature);
        let body = self
            .put_json(&format!("user/{self_uuid}/nineum/transfer"), &payload)
            .await?;

        let succeeded = body.get("success").and_then(Value::as_bool) == Some(true)
            || body.get("uuid").and_then(Value::as_str) == Some(buyer_uuid);
        if succeeded {
            info!(buyer = %buyer_uuid, flavor = %flavor, quantity, "Transferred nineum tickets");
            Ok(())
        } else {
            Err(rejected(&body, "Nineum transfer failed"))
        }
    }

    /// Ask the ledger to grant admin nineum to `target_uuid`.
    ///
    /// Any JSON answer counts as success; the ledger's verdict is returned
    /// for logging only.
    pub async fn grant_admin(
        &self,
        self_uuid: &str,
        target_uuid: &str,
        signing: Signing,
    ) -> Result<Value, LedgerError> {
        require("uuid", target_uuid)?;

        let (timestamp, signature) = self.envelope(signing, |timestamp| {
            Canonical::AdminGrant {
                timestamp,
                uuid: target_uuid,
            }
            .message()
        })?;

        let payload = json!({
            "timestamp": timestamp,
            "toUserUUID": self_uuid,
            "uuid": target_uuid,
            "signature": signature,
        });
        let body = self
            .put_json(&format!("user/{target_uuid}/nineum/admin"), &payload)
            .await?;
        debug!(target = %target_uuid, response = %body, "Admin grant answered");
        Ok(body)
    }

    /// Claim `galaxy` for the node's own account.
    pub async fn claim_galaxy(
        &self,
        self_uuid: &str,
        galaxy: &str,
    ) -> Result<GalaxyClaim, LedgerError> {
        let timestamp = clock::timestamp();
        let message = Canonical::GalaxyClaim {
            timestamp: &timestamp,
            uuid: self_uuid,
            galaxy,
        }
        .message();
        let signature = self.signer.sign(&message)?;

        let payload = json!({
            "timestamp": timestamp,
            "uuid": self_uuid,
            "galaxy": galaxy,
            "signature": signature,
        });
        let body = self
            .put_json(&format!("user/{self_uuid}/nineum/galactic"), &payload)
            .await?;

        if has_galactic_nineum(&body) {
            return Ok(GalaxyClaim::Claimed);
        }
        match error_text(&body) {
            Some(text) if text.contains("already claimed") => Ok(GalaxyClaim::AlreadyClaimed),
            Some(text) => Err(LedgerError::Rejected(text)),
            None => Err(LedgerError::Rejected(format!(
                "unexpected galaxy claim response: {body}"
            ))),
        }
    }

    /// Assign `galaxy` to `uuid` and return the ledger's answer.
    pub async fn assign_galaxy(
        &self,
        uuid: &str,
        galaxy: &str,
        signing: Signing,
    ) -> Result<Value, LedgerError> {
        require("uuid", uuid)?;
        require("galaxy", galaxy)?;

        let (timestamp, signature) = self.envelope(signing, |timestamp| {
            Canonical::GalaxyAssign { timestamp, uuid }.message()
        })?;

        let payload = json!({
            "timestamp": timestamp,
            "uuid": uuid,
            "galaxy": galaxy,
            "signature": signature,
        });
        self.put_json(&format!("user/{uuid}/nineum/galactic"), &payload)
            .await
    }

    /// POST a spell to the ledger's base URL and return its body.
    pub async fn post_spell(&self, spell: &Value) -> Result<Value, LedgerError> {
        let url = self.base_url();
        let response = self
            .http
            .post(&url)
            .json(spell)
            .send()
            .await
            .map_err(|e| LedgerError::LedgerCallFailed(format!("POST {url} failed: {e}")))?;
        read_json(response, "POST", &url).await
    }

    fn envelope(
        &self,
        signing: Signing,
        message: impl FnOnce(&str) -> String,
    ) -> Result<(String, String), LedgerError> {
        match signing {
            Signing::Node => {
                let timestamp = clock::timestamp();
                let signature = self.signer.sign(&message(&timestamp))?;
                Ok((timestamp, signature))
            }
            Signing::Forwarded {
                timestamp,
                signature,
            } => {
                require("signature", &signature)?;
                Ok((timestamp, signature))
            }
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, LedgerError> {
        let url = self.url(path);
        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| LedgerError::LedgerCallFailed(format!("GET {path} failed: {e}")))?;
        read_json(response, "GET", path).await
    }

    async fn put_json(&self, path: &str, payload: &Value) -> Result<Value, LedgerError> {
        let url = self.url(path);
        let response = self
            .http
            .put(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| LedgerError::LedgerCallFailed(format!("PUT {path} failed: {e}")))?;
        read_json(response, "PUT", path).await
    }
}

async fn read_json(
    response: reqwest::Response,
    method: &str,
    path: &str,
) -> Result<Value, LedgerError> {
    let status = response.status();
    if !status.is_success() {
        warn!(method, path, status = %status, "Ledger returned non-success status");
    }
    response.json().await.map_err(|e| {
        LedgerError::LedgerCallFailed(format!(
            "{method} {path} returned {status} with invalid JSON: {e}"
        ))
    })
}

fn nineum_payload(
    timestamp: &str,
    to_user_uuid: &str,
    flavor: &Flavor,
    quantity: u64,
    signature: &str,
) -> Value {
    let mut payload = Map::new();
    payload.insert("timestamp".to_string(), json!(timestamp));
    payload.extend(flavor.payload_fields());
    payload.insert("toUserUUID".to_string(), json!(to_user_uuid));
    payload.insert("quantity".to_string(), json!(quantity));
    payload.insert("signature".to_string(), json!(signature));
    Value::Object(payload)
}

fn has_galactic_nineum(body: &Value) -> bool {
    body.get("nineum")
        .and_then(Value::as_array)
        .is_some_and(|ids| {
            ids.iter()
                .filter_map(Value::as_str)
                .any(|id| id.get(14..16) == Some(GALACTIC_RANK))
        })
}

fn rejected(body: &Value, fallback: &str) -> LedgerError {
    LedgerError::Rejected(error_text(body).unwrap_or_else(|| fallback.to_string()))
}

fn require(field: &str, value: &str) -> Result<(), LedgerError> {
    if value.trim().is_empty() {
        Err(LedgerError::Validation(format!("Missing required field: {field}")))
    } else {
        Ok(())
    }
}

fn require_quantity(quantity: u64) -> Result<(), LedgerError> {
    if quantity == 0 {
        Err(LedgerError::Validation(
            "Missing required field: quantity".to_string(),
        ))
    } else {
        Ok(())
    }
}
