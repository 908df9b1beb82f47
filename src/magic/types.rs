// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wire types for spells, gateway tokens and spellbooks.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

// =============================================================================
// Gateway Token
// =============================================================================

/// Signed proof that a node processed a spell at a cost floor.
///
/// Signed over `timestamp + uuid + minimumCost + ordinal`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GatewayToken {
    /// Decimal Unix milliseconds.
    pub timestamp: String,
    /// Ledger identity id of the issuing node.
    #[serde(rename = "uuid")]
    pub node_identity_id: String,
    /// Cost floor the node charges for the spell.
    pub minimum_cost: u64,
    /// Per-node counter reserved for replay detection.
    #[serde(default)]
    pub ordinal: u64,
    /// Hex signature by the issuing node.
    pub signature: String,
}

// =============================================================================
// Spell
// =============================================================================

/// A named operation travelling along its spellbook route.
///
/// Gateways are only ever appended. Tokens from earlier hops stay raw JSON so
/// they reach the next stop exactly as received. Fields this node does not
/// understand are kept in `extra` and forwarded untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Spell {
    #[serde(rename = "spellName", default)]
    pub spell_name: String,

    /// Operation-specific parameters, opaque to the relay.
    #[serde(default)]
    pub components: Map<String, Value>,

    #[serde(rename = "casterUUID", default, skip_serializing_if = "Option::is_none")]
    pub caster_uuid: Option<String>,

    #[serde(default)]
    pub gateways: Vec<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Spell {
    pub fn new(spell_name: impl Into<String>) -> Self {
        Self {
            spell_name: spell_name.into(),
            components: Map::new(),
            caster_uuid: None,
            gateways: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Builder-style component setter.
    pub fn with_component(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.components.insert(key.to_string(), value.into());
        self
    }

    /// A string component, ignoring empty strings.
    pub fn str_component(&self, key: &str) -> Option<&str> {
        self.components
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// A positive integer component given either as a number or a numeric
    /// string.
    pub fn quantity_component(&self, key: &str) -> Option<u64> {
        let quantity = match self.components.get(key)? {
            Value::Number(n) => n.as_u64()?,
            Value::String(s) => s.trim().parse().ok()?,
            _ => return None,
        };
        (quantity > 0).then_some(quantity)
    }
}

// =============================================================================
// Spellbooks
// =============================================================================

/// One stop on a spell's route.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Destination {
    #[serde(rename = "stopName")]
    pub stop_name: String,
    #[serde(rename = "stopURL", alias = "stopUrl")]
    pub stop_url: String,
}

/// The route of a single spell.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct SpellbookEntry {
    pub destinations: Vec<Destination>,
}

/// A set of spell routes keyed by spell name.
///
/// Provisioned spellbooks may carry non-route keys (names, metadata), so
/// entries are kept as raw JSON and parsed on lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Spellbook {
    entries: Map<String, Value>,
}

impl Spellbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style route insertion.
    pub fn with_route(mut self, spell_name: &str, destinations: Vec<Destination>) -> Self {
        let entry = SpellbookEntry { destinations };
        if let Ok(value) = serde_json::to_value(entry) {
            self.entries.insert(spell_name.to_string(), value);
        }
        self
    }

    /// Whether this spellbook has any entry under `spell_name`.
    pub fn contains(&self, spell_name: &str) -> bool {
        self.entries.contains_key(spell_name)
    }

    /// Parse the route for `spell_name`.
    ///
    /// `None` when the spell is absent, `Some(Err)` when the entry exists but
    /// is not a route.
    pub fn entry(&self, spell_name: &str) -> Option<Result<SpellbookEntry, serde_json::Error>> {
        self.entries
            .get(spell_name)
            .map(|value| serde_json::from_value(value.clone()))
    }

    /// All entries that parse as routes.
    pub fn routes(&self) -> impl Iterator<Item = (&str, SpellbookEntry)> {
        self.entries.iter().filter_map(|(name, value)| {
            serde_json::from_value::<SpellbookEntry>(value.clone())
                .ok()
                .map(|entry| (name.as_str(), entry))
        })
    }
}
