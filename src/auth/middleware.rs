// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request freshness middleware.
//!
//! Applies the skew window to every inbound request that carries a
//! `timestamp`, read from the query string first and the JSON body second.
//! Requests without a parseable timestamp pass through; per-endpoint
//! authentication still applies to them.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/user/create", put(users::create_user))
//!     .layer(axum::middleware::from_fn_with_state(
//!         authenticator,
//!         freshness_guard,
//!     ));
//! ```

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::debug;

use super::authenticator::parse_timestamp;
use super::{AuthError, RequestAuthenticator};
use crate::clock;

/// Largest body the guard will buffer to look for a timestamp.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Reject requests whose `timestamp` is outside the skew window.
pub async fn freshness_guard(
    State(authenticator): State<RequestAuthenticator>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();

    let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(error = %e, "Failed to buffer request body");
            let body = json!({"success": false, "error": "request body too large"});
            return (StatusCode::PAYLOAD_TOO_LARGE, Json(body)).into_response();
        }
    };

    let timestamp = parts
        .uri
        .query()
        .and_then(query_timestamp)
        .or_else(|| body_timestamp(&bytes));

    if let Some(timestamp) = timestamp {
        let now = clock::now_millis();
        if now.abs_diff(timestamp) > authenticator.max_skew_ms().unsigned_abs() {
            debug!(path = %parts.uri.path(), timestamp, now, "Rejected stale request");
            return AuthError::StaleTimestamp.into_response();
        }
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

fn query_timestamp(query: &str) -> Option<i64> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "timestamp")
        .and_then(|(_, value)| parse_timestamp(&value))
        .filter(|ts| *ts != 0)
}

fn body_timestamp(bytes: &[u8]) -> Option<i64> {
    if bytes.is_empty() {
        return None;
    }
    let body: Value = serde_json::from_slice(bytes).ok()?;
    match body.get("timestamp")? {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|v| v as i64)),
        _ => None,
    }
    .filter(|ts| *ts != 0)
}
