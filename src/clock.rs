// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wall-clock helpers for signed envelopes.
//!
//! Every envelope timestamp is the decimal string of Unix milliseconds.

use chrono::Utc;

/// Current Unix time in milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Current Unix time in milliseconds, formatted for an envelope.
pub fn timestamp() -> String {
    now_millis().to_string()
}
