// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signed-message primitives.
//!
//! - `signing` - secp256k1 sign/verify and the injected signing capability
//! - `canonical` - per-operation canonical message builders

pub mod canonical;
pub mod signing;

pub use canonical::Canonical;
pub use signing::{
    ensure_signing_keys, verify, MessageSigner, SignatureError, SigningKeys, StoreSigner,
};
