// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Nineum flavor codes.
//!
//! A flavor is 12 hex characters read positionally as six 2-character
//! attributes: charge, direction, rarity, size, texture, shape.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

pub const FLAVOR_LENGTH: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlavorError {
    #[error("Invalid flavor format (must be 12 hex characters): {0}")]
    InvalidFormat(String),
}

/// A validated flavor code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flavor {
    code: String,
}

impl Flavor {
    pub fn parse(code: &str) -> Result<Self, FlavorError> {
        let valid = code.len() == FLAVOR_LENGTH && code.bytes().all(|b| b.is_ascii_hexdigit());
        if !valid {
            return Err(FlavorError::InvalidFormat(code.to_string()));
        }
        Ok(Self {
            code: code.to_string(),
        })
    }

    /// The code exactly as given; this is what gets signed.
    pub fn as_str(&self) -> &str {
        &self.code
    }

    pub fn charge(&self) -> &str {
        &self.code[0..2]
    }

    pub fn direction(&self) -> &str {
        &self.code[2..4]
    }

    pub fn rarity(&self) -> &str {
        &self.code[4..6]
    }

    pub fn size(&self) -> &str {
        &self.code[6..8]
    }

    pub fn texture(&self) -> &str {
        &self.code[8..10]
    }

    pub fn shape(&self) -> &str {
        &self.code[10..12]
    }

    /// The six attribute fields as ledger payload entries.
    pub fn payload_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        for (name, value) in [
            ("charge", self.charge()),
            ("direction", self.direction()),
            ("rarity", self.rarity()),
            ("size", self.size()),
            ("texture", self.texture()),
            ("shape", self.shape()),
        ] {
            fields.insert(name.to_string(), Value::String(value.to_string()));
        }
        fields
    }
}

impl FromStr for Flavor {
    type Err = FlavorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}
