// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Aretha - Spell Relay Node
//!
//! This crate provides a node that relays signed spells along spellbook
//! routes and sells nineum tickets through a remote ledger service.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Signed-request verification and freshness guard
//! - `bootstrap` - Background node registration and galaxy claim
//! - `crypto` - secp256k1 signing and canonical messages
//! - `ledger` - Ledger ("fount") client and nineum flavors
//! - `magic` - Spells, gateway tokens, route resolution and relay
//! - `provisioning` - Document-store ("bdo") client
//! - `storage` - Key-value storage (JSON files, in-memory)

pub mod api;
pub mod auth;
pub mod bootstrap;
pub mod clock;
pub mod config;
pub mod crypto;
pub mod error;
pub mod ledger;
pub mod magic;
pub mod models;
pub mod node;
pub mod provisioning;
pub mod state;
pub mod storage;
