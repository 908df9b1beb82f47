// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Sessionless request authentication for the edge API.
//!
//! ## Auth Flow
//!
//! 1. The caller builds the operation's canonical message
//!    (e.g. `timestamp + uuid`) and signs it with its secp256k1 key
//! 2. The request carries `timestamp` and `signature` in the query string or
//!    JSON body
//! 3. The node:
//!    - rejects any request whose timestamp is outside the skew window
//!      (`freshness_guard`)
//!    - rebuilds the canonical message and verifies the signature against
//!      the stored public key of the claimed identity
//!
//! ## Security
//!
//! - No nonce cache: replays are possible inside the skew window
//! - Default skew window is 300 seconds (`ALLOWED_TIME_DIFFERENCE`)

pub mod authenticator;
pub mod error;
pub mod middleware;

pub use authenticator::RequestAuthenticator;
pub use error::AuthError;
pub use middleware::freshness_guard;
