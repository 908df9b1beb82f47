// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response data structures used by the edge API. All types
//! derive `ToSchema` for OpenAPI documentation.
//!
//! ## Signed Envelopes
//!
//! Every mutating request carries `timestamp` (decimal Unix milliseconds) and
//! `signature`. Peers send timestamps and quantities either as JSON numbers
//! or as strings; both are accepted and kept in their textual form, because
//! that text is what was signed.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::ledger::LedgerUser;

// =============================================================================
// User Records
// =============================================================================

/// A local user and the ledger account backing it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Local id (UUID v4).
    pub uuid: String,
    /// Compressed secp256k1 public key, hex encoded.
    pub pub_key: String,
    /// Ledger account as last returned by the ledger service.
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub fount_user: Option<LedgerUser>,
}

// =============================================================================
// Edge Requests
// =============================================================================

/// Body for `PUT /user/create`.
///
/// Signed over `timestamp + pubKey`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(deserialize_with = "string_or_number")]
    #[schema(value_type = String)]
    pub timestamp: String,
    pub pub_key: String,
    #[serde(default)]
    pub signature: Option<String>,
}

/// Query for signed `GET` requests.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SignedQuery {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub signature: Option<String>,
}

/// Body for `PUT /user/{uuid}/tickets/{flavor}`.
///
/// Signed over `timestamp + uuid + flavor + quantity`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PurchaseTicketsRequest {
    #[serde(deserialize_with = "string_or_number")]
    #[schema(value_type = String)]
    pub timestamp: String,
    #[serde(deserialize_with = "string_or_number")]
    #[schema(value_type = u64)]
    pub quantity: String,
    #[serde(default)]
    pub signature: Option<String>,
}

impl PurchaseTicketsRequest {
    /// Quantity as a positive integer.
    pub fn quantity(&self) -> Option<u64> {
        self.quantity.trim().parse().ok().filter(|q| *q > 0)
    }
}

/// Body for `PUT /user/{uuid}/grant`, signed by the caller over
/// `timestamp + uuid`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GrantRequest {
    #[serde(deserialize_with = "string_or_number")]
    #[schema(value_type = String)]
    pub timestamp: String,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub signature: Option<String>,
}

/// Body for `PUT /user/{uuid}/galaxy`, signed by the caller over
/// `timestamp + uuid`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GalaxyRequest {
    #[serde(deserialize_with = "string_or_number")]
    #[schema(value_type = String)]
    pub timestamp: String,
    #[serde(default)]
    pub uuid: Option<String>,
    pub galaxy: String,
    #[serde(default)]
    pub signature: Option<String>,
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_record_uses_camel_case() {
        let record = UserRecord {
            uuid: "u-1".to_string(),
            pub_key: "02ab".to_string(),
            fount_user: Some(LedgerUser::new("f-1")),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["pubKey"], "02ab");
        assert_eq!(value["fountUser"]["uuid"], "f-1");
    }

    #[test]
    fn purchase_request_accepts_numbers_and_strings() {
        let numeric: PurchaseTicketsRequest = serde_json::from_value(json!({
            "timestamp": 1700000000000u64,
            "quantity": 10,
            "signature": "sig"
        }))
        .unwrap();
        assert_eq!(numeric.timestamp, "1700000000000");
        assert_eq!(numeric.quantity, "10");
        assert_eq!(numeric.quantity(), Some(10));

        let textual: PurchaseTicketsRequest = serde_json::from_value(json!({
            "timestamp": "1700000000000",
            "quantity": "0"
        }))
        .unwrap();
        assert_eq!(textual.quantity(), None);
        assert!(textual.signature.is_none());
    }

    #[test]
    fn boolean_timestamp_is_rejected() {
        let result: Result<CreateUserRequest, _> =
            serde_json::from_value(json!({"timestamp": true, "pubKey": "02ab"}));
        assert!(result.is_err());
    }
}
