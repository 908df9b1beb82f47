// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Spellbook route resolution.
//!
//! Spellbooks are scanned in order and the first one that knows the spell
//! wins. Inside its route the first destination named after this node is our
//! position; the destination after it is where the spell goes next.

use super::types::Spellbook;

/// Where a spell goes after this node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hop {
    /// Forward to the next stop; `url` is `stopURL + spellName`.
    Next { stop_name: String, url: String },
    /// This node is the last stop and executes the spell itself.
    Terminal,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("spellbook not found for spell {0}")]
    SpellbookNotFound(String),

    #[error("stop {stop_name} is not on the route for spell {spell_name}")]
    SelfNotInRoute {
        spell_name: String,
        stop_name: String,
    },

    #[error("spellbook entry for {spell_name} is malformed: {reason}")]
    MalformedEntry { spell_name: String, reason: String },
}

/// A stop that appears more than once on a single route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateStop {
    pub spell_name: String,
    pub stop_name: String,
}

/// Resolve the hop after `self_stop_name` for `spell_name`.
pub fn resolve(
    spellbooks: &[Spellbook],
    spell_name: &str,
    self_stop_name: &str,
) -> Result<Hop, ResolveError> {
    let spellbook = spellbooks
        .iter()
        .find(|book| book.contains(spell_name))
        .ok_or_else(|| ResolveError::SpellbookNotFound(spell_name.to_string()))?;

    let entry = spellbook
        .entry(spell_name)
        .ok_or_else(|| ResolveError::SpellbookNotFound(spell_name.to_string()))?
        .map_err(|e| ResolveError::MalformedEntry {
            spell_name: spell_name.to_string(),
            reason: e.to_string(),
        })?;

    let current_index = entry
        .destinations
        .iter()
        .position(|stop| stop.stop_name == self_stop_name)
        .ok_or_else(|| ResolveError::SelfNotInRoute {
            spell_name: spell_name.to_string(),
            stop_name: self_stop_name.to_string(),
        })?;

    Ok(match entry.destinations.get(current_index + 1) {
        Some(next) => Hop::Next {
            stop_name: next.stop_name.clone(),
            url: format!("{}{}", next.stop_url, spell_name),
        },
        None => Hop::Terminal,
    })
}

/// Report stops listed more than once on a route.
///
/// Resolution still uses the first occurrence; this is surfaced as a
/// configuration warning when spellbooks are loaded.
pub fn duplicate_stops(spellbooks: &[Spellbook]) -> Vec<DuplicateStop> {
    let mut duplicates = Vec::new();

    for book in spellbooks {
        for (spell_name, entry) in book.routes() {
            let mut seen: Vec<&str> = Vec::new();
            for stop in &entry.destinations {
                if seen.contains(&stop.stop_name.as_str()) {
                    let duplicate = DuplicateStop {
                        spell_name: spell_name.to_string(),
                        stop_name: stop.stop_name.clone(),
                    };
                    if !duplicates.contains(&duplicate) {
                        duplicates.push(duplicate);
                    }
                } else {
                    seen.push(&stop.stop_name);
                }
            }
        }
    }

    duplicates
}
