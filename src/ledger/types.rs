// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A ledger account as returned by the ledger service.
///
/// Only the fields this node reads are typed; the rest is carried through
/// untouched so local user records mirror the ledger's answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerUser {
    pub uuid: String,

    #[serde(rename = "pubKey", default, skip_serializing_if = "Option::is_none")]
    pub pub_key: Option<String>,

    /// Nineum ids held by the account.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nineum: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LedgerUser {
    pub fn new(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            pub_key: None,
            nineum: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Parse a ledger response, `None` unless it carries a non-empty `uuid`.
    pub fn from_response(value: &Value) -> Option<Self> {
        let uuid = value.get("uuid").and_then(Value::as_str)?;
        if uuid.is_empty() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}

/// Extract the ledger's error text from a response body.
pub(crate) fn error_text(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
