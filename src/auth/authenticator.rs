// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signed-request verification.
//!
//! Stateless: there is no nonce cache, so a captured request stays valid
//! until it ages out of the skew window.

use super::AuthError;
use crate::crypto::verify;

/// Default skew window in milliseconds.
pub const DEFAULT_MAX_SKEW_MS: i64 = 300_000;

#[derive(Debug, Clone, Copy)]
pub struct RequestAuthenticator {
    max_skew_ms: i64,
}

impl Default for RequestAuthenticator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SKEW_MS)
    }
}

impl RequestAuthenticator {
    pub fn new(max_skew_ms: i64) -> Self {
        Self {
            max_skew_ms: max_skew_ms.max(0),
        }
    }

    pub fn max_skew_ms(&self) -> i64 {
        self.max_skew_ms
    }

    /// Reject timestamps more than `max_skew_ms` away from `now_ms`.
    pub fn check_freshness(&self, timestamp: &str, now_ms: i64) -> Result<(), AuthError> {
        let claimed = parse_timestamp(timestamp).ok_or(AuthError::MalformedTimestamp)?;
        if now_ms.abs_diff(claimed) > self.max_skew_ms.unsigned_abs() {
            return Err(AuthError::StaleTimestamp);
        }
        Ok(())
    }

    /// Verify a signed request against `pub_key`.
    ///
    /// `message` must already be the canonical message for the operation.
    pub fn authenticate(
        &self,
        timestamp: &str,
        signature: Option<&str>,
        message: &str,
        pub_key: &str,
        now_ms: i64,
    ) -> Result<(), AuthError> {
        let signature = signature
            .filter(|s| !s.is_empty())
            .ok_or(AuthError::MissingSignature)?;
        self.check_freshness(timestamp, now_ms)?;

        if !verify(signature, message, pub_key) {
            return Err(AuthError::InvalidSignature);
        }
        Ok(())
    }
}

/// Parse a decimal millisecond timestamp.
pub(crate) fn parse_timestamp(timestamp: &str) -> Option<i64> {
    let trimmed = timestamp.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v as i64))
}
