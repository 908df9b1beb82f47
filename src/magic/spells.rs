// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Spell Dispatch
//!
//! Maps spell names to what this node does with them:
//!
//! | Spell | Behaviour |
//! |-------|-----------|
//! | `joinup` | relay to the next stop, or execute locally when terminal |
//! | `linkup` | relay straight to the ledger service |
//! | `arethaUserCreate` | find or create a ledger identity for `pubKey` |
//! | `arethaUserTickets` | mint `quantity` tickets of `flavor` |
//! | `arethaUserTransfer` | move tickets from the node to `uuid` |
//! | `arethaUserGrant` | grant admin nineum to `uuid` |
//! | `arethaUserGalaxy` | assign `galaxy` to `uuid` |
//!
//! Relay-routed spells carry no caller signature of their own: the route and
//! the ledger perform authorization. Local spells sign their ledger calls
//! with the node's key.

use serde_json::{json, Value};
use tracing::{info, warn};

use super::relay::RelayOutcome;
use super::types::Spell;
use crate::error::AppError;
use crate::ledger::{Flavor, Signing};
use crate::state::AppState;

/// A spell this node executes itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalSpell {
    UserCreate,
    UserTickets,
    UserTransfer,
    UserGrant,
    UserGalaxy,
}

impl LocalSpell {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "arethaUserCreate" => Some(Self::UserCreate),
            "arethaUserTickets" => Some(Self::UserTickets),
            "arethaUserTransfer" => Some(Self::UserTransfer),
            "arethaUserGrant" => Some(Self::UserGrant),
            "arethaUserGalaxy" => Some(Self::UserGalaxy),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::UserCreate => "arethaUserCreate",
            Self::UserTickets => "arethaUserTickets",
            Self::UserTransfer => "arethaUserTransfer",
            Self::UserGrant => "arethaUserGrant",
            Self::UserGalaxy => "arethaUserGalaxy",
        }
    }

    /// Whether the spell acts as the node's ledger account.
    pub fn needs_node(&self) -> bool {
        matches!(self, Self::UserTickets | Self::UserTransfer | Self::UserGrant)
    }
}

/// Every spell name the node answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpellKind {
    Joinup,
    Linkup,
    Local(LocalSpell),
}

impl SpellKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "joinup" => Some(Self::Joinup),
            "linkup" => Some(Self::Linkup),
            other => LocalSpell::from_name(other).map(Self::Local),
        }
    }
}

/// Cast `spell` under the handler named `spell_name`.
///
/// Unknown names are `NotFound`. Relay failures and an unbootstrapped node
/// surface as errors; failures inside local spells come back as
/// `{success: false, error}` results.
pub async fn cast(state: &AppState, spell_name: &str, spell: Spell) -> Result<Value, AppError> {
    let kind = SpellKind::from_name(spell_name)
        .ok_or_else(|| AppError::NotFound("spell not found".to_string()))?;

    match kind {
        SpellKind::Joinup => {
            let node = state.node.ready().await?;
            match state.relay.relay(spell, &node).await? {
                RelayOutcome::Forwarded(body) => Ok(body),
                RelayOutcome::Terminal(spell) => {
                    let local = LocalSpell::from_name(&spell.spell_name).ok_or_else(|| {
                        AppError::NotFound(format!("no local binding for {}", spell.spell_name))
                    })?;
                    Ok(execute(state, local, &spell).await)
                }
            }
        }
        SpellKind::Linkup => {
            let node = state.node.ready().await?;
            Ok(state.relay.relay_to_ledger(spell, &node).await?)
        }
        SpellKind::Local(local) => {
            if local.needs_node() {
                state.node.ready().await?;
            }
            Ok(execute(state, local, &spell).await)
        }
    }
}

/// Run a local spell, folding any error into a failure result.
pub async fn execute(state: &AppState, local: LocalSpell, spell: &Spell) -> Value {
    match run(state, local, spell).await {
        Ok(result) => result,
        Err(e) => {
            warn!(spell_name = local.name(), error = %e, "Local spell failed");
            failure(e.to_string())
        }
    }
}

async fn run(state: &AppState, local: LocalSpell, spell: &Spell) -> Result<Value, AppError> {
    match local {
        LocalSpell::UserCreate => {
            let pub_key = spell
                .str_component("pubKey")
                .ok_or_else(|| missing("Missing required field: pubKey"))?;

            let ledger_user = state.ledger.create_identity(pub_key, Signing::Node).await?;
            let user = state.store.put_user(pub_key, Some(ledger_user))?;
            info!(uuid = %user.uuid, "Created user via spell");
            Ok(json!({"success": true, "user": user}))
        }
        LocalSpell::UserTickets => {
            let (uuid, flavor, quantity) = ticket_components(spell)?;
            let node = state.node.ready().await?;
            state
                .ledger
                .purchase_ticket(&node.ledger_uuid, uuid, flavor.as_str(), quantity)
                .await?;
            Ok(json!({"success": true}))
        }
        LocalSpell::UserTransfer => {
            let (uuid, flavor, quantity) = ticket_components(spell)?;
            let node = state.node.ready().await?;
            state
                .ledger
                .transfer_ticket(&node.ledger_uuid, uuid, flavor.as_str(), quantity)
                .await?;
            Ok(json!({"success": true}))
        }
        LocalSpell::UserGrant => {
            let uuid = spell
                .str_component("uuid")
                .ok_or_else(|| missing("Missing required field: uuid"))?;
            let node = state.node.ready().await?;
            state
                .ledger
                .grant_admin(&node.ledger_uuid, uuid, Signing::Node)
                .await?;
            Ok(json!({"success": true}))
        }
        LocalSpell::UserGalaxy => {
            let (uuid, galaxy) = spell
                .str_component("uuid")
                .zip(spell.str_component("galaxy"))
                .ok_or_else(|| missing("Missing required fields: uuid, galaxy"))?;
            let data = state.ledger.assign_galaxy(uuid, galaxy, Signing::Node).await?;
            Ok(json!({"success": true, "data": data}))
        }
    }
}

fn ticket_components(spell: &Spell) -> Result<(&str, Flavor, u64), AppError> {
    let uuid = spell.str_component("uuid");
    let flavor = spell.str_component("flavor");
    let quantity = spell.quantity_component("quantity");

    let (Some(uuid), Some(flavor), Some(quantity)) = (uuid, flavor, quantity) else {
        return Err(missing("Missing required fields: uuid, flavor, quantity"));
    };
    let flavor = Flavor::parse(flavor).map_err(|e| AppError::Validation(e.to_string()))?;
    Ok((uuid, flavor, quantity))
}

fn missing(message: &str) -> AppError {
    AppError::Validation(message.to_string())
}

/// A spell result reporting failure.
pub fn failure(error: impl Into<String>) -> Value {
    json!({"success": false, "error": error.into()})
}

/// Whether a spell result reports success.
pub fn succeeded(result: &Value) -> bool {
    result.get("success").and_then(Value::as_bool) == Some(true)
}
