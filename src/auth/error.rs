// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Signed-request authentication error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No signature on the request
    MissingSignature,
    /// Signature does not verify against the claimed identity
    InvalidSignature,
    /// Timestamp is not a decimal millisecond value
    MalformedTimestamp,
    /// Timestamp is outside the allowed skew window
    StaleTimestamp,
}

#[derive(Serialize)]
struct AuthErrorBody {
    success: bool,
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingSignature => "missing_signature",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::MalformedTimestamp => "malformed_timestamp",
            AuthError::StaleTimestamp => "stale_timestamp",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingSignature | AuthError::InvalidSignature => StatusCode::FORBIDDEN,
            AuthError::MalformedTimestamp | AuthError::StaleTimestamp => StatusCode::UNAUTHORIZED,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingSignature | AuthError::InvalidSignature => write!(f, "auth error"),
            AuthError::MalformedTimestamp => write!(f, "timestamp must be decimal milliseconds"),
            AuthError::StaleTimestamp => write!(f, "no time like the present"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            success: false,
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
