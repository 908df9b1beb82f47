// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Magic
//!
//! Spells are named operations that travel along a route of nodes declared
//! in a spellbook. Each node stamps a signed gateway token onto the spell and
//! forwards it; the last stop executes it.
//!
//! - `types` - spell, gateway token and spellbook wire types
//! - `gateway` - gateway token issuance
//! - `resolver` - route position and next-hop resolution
//! - `relay` - single-hop forwarding
//! - `spells` - spell dispatch and local spell bindings

pub mod gateway;
pub mod relay;
pub mod resolver;
pub mod spells;
pub mod types;

pub use gateway::{GatewayTokenIssuer, DEFAULT_MINIMUM_COST};
pub use relay::{RelayError, RelayOutcome, SpellRelay};
pub use resolver::{duplicate_stops, resolve, DuplicateStop, Hop, ResolveError};
pub use types::{Destination, GatewayToken, Spell, Spellbook, SpellbookEntry};
