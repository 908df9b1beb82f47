// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Ledger Integration
//!
//! The ledger ("fount") service owns every nineum balance. This module holds
//! the typed client the node uses to talk to it:
//!
//! - `client` - signed ledger operations
//! - `flavor` - 12-hex nineum flavor codes
//! - `types` - ledger account wire types

pub mod client;
pub mod flavor;
pub mod types;

pub use client::{GalaxyClaim, LedgerClient, LedgerError, Signing};
pub use flavor::{Flavor, FlavorError};
pub use types::LedgerUser;
