// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Spell Relay
//!
//! One hop of a spell's journey: stamp a gateway token onto the spell, work
//! out where it goes next, and forward it there. There are no retries at this
//! layer; a failed forward is reported to the caller as `RelayFailed`.

use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::gateway::{GatewayTokenIssuer, DEFAULT_MINIMUM_COST};
use super::resolver::{resolve, Hop, ResolveError};
use super::types::Spell;
use crate::crypto::SignatureError;
use crate::ledger::LedgerClient;
use crate::node::NodeRecord;

/// Entry appended to `uuids` on a successful forward.
const TICKETS_SERVICE_UUID: &str = "nineum-tickets";

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("failed to issue gateway token: {0}")]
    Gateway(#[from] SignatureError),

    #[error("relay failed: {0}")]
    RelayFailed(String),
}

/// What happened to a relayed spell.
#[derive(Debug)]
pub enum RelayOutcome {
    /// The next hop answered; its body, possibly augmented.
    Forwarded(Value),
    /// This node is the last stop; the spell (with our gateway appended)
    /// must be executed locally.
    Terminal(Spell),
}

/// Forwards spells along their spellbook routes.
#[derive(Clone)]
pub struct SpellRelay {
    http: Client,
    issuer: GatewayTokenIssuer,
    ledger: LedgerClient,
    stop_name: String,
}

impl SpellRelay {
    pub fn new(
        http: Client,
        issuer: GatewayTokenIssuer,
        ledger: LedgerClient,
        stop_name: impl Into<String>,
    ) -> Self {
        Self {
            http,
            issuer,
            ledger,
            stop_name: stop_name.into(),
        }
    }

    pub fn stop_name(&self) -> &str {
        &self.stop_name
    }

    /// Relay `spell` to the next stop on its route.
    pub async fn relay(
        &self,
        mut spell: Spell,
        node: &NodeRecord,
    ) -> Result<RelayOutcome, RelayError> {
        self.stamp(&mut spell, node)?;

        match resolve(&node.spellbooks, &spell.spell_name, &self.stop_name)? {
            Hop::Next { stop_name, url } => {
                info!(
                    spell_name = %spell.spell_name,
                    next_stop = %stop_name,
                    gateways = spell.gateways.len(),
                    "Forwarding spell"
                );
                let body = self.forward(&spell, &url).await?;
                Ok(RelayOutcome::Forwarded(self.augment(body)))
            }
            Hop::Terminal => {
                debug!(spell_name = %spell.spell_name, "Spell terminates here");
                Ok(RelayOutcome::Terminal(spell))
            }
        }
    }

    /// Stamp `spell` and hand it straight to the ledger service.
    pub async fn relay_to_ledger(
        &self,
        mut spell: Spell,
        node: &NodeRecord,
    ) -> Result<Value, RelayError> {
        self.stamp(&mut spell, node)?;

        let payload = serde_json::to_value(&spell)
            .map_err(|e| RelayError::RelayFailed(format!("failed to encode spell: {e}")))?;
        info!(spell_name = %spell.spell_name, "Forwarding spell to ledger");
        self.ledger
            .post_spell(&payload)
            .await
            .map_err(|e| RelayError::RelayFailed(e.to_string()))
    }

    fn stamp(&self, spell: &mut Spell, node: &NodeRecord) -> Result<(), RelayError> {
        let token = self.issuer.issue(
            &spell.spell_name,
            &node.ledger_uuid,
            DEFAULT_MINIMUM_COST,
            node.ordinal(),
        )?;
        let token = serde_json::to_value(token).map_err(|e| {
            RelayError::RelayFailed(format!("failed to encode gateway token: {e}"))
        })?;
        spell.gateways.push(token);
        Ok(())
    }

    async fn forward(&self, spell: &Spell, url: &str) -> Result<Value, RelayError> {
        let response = self
            .http
            .post(url)
            .json(spell)
            .send()
            .await
            .map_err(|e| RelayError::RelayFailed(format!("POST {url} failed: {e}")))?;

        let status = response.status();
        response.json().await.map_err(|e| {
            RelayError::RelayFailed(format!("POST {url} returned {status} with invalid JSON: {e}"))
        })
    }

    /// Record this node in `uuids` when the downstream reports success.
    fn augment(&self, mut body: Value) -> Value {
        if body.get("success").and_then(Value::as_bool) != Some(true) {
            return body;
        }
        if let Some(object) = body.as_object_mut() {
            let entry = json!({"service": self.stop_name, "uuid": TICKETS_SERVICE_UUID});
            match object.get_mut("uuids") {
                Some(Value::Array(uuids)) => uuids.push(entry),
                _ => {
                    object.insert("uuids".to_string(), Value::Array(vec![entry]));
                }
            }
        }
        body
    }
}
