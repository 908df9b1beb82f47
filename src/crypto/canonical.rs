// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Canonical signed-message construction.
//!
//! Every signed envelope is verified against a plain concatenation of some of
//! its fields. The order is fixed per operation and must match byte for byte
//! on both the signing and verifying side, so each operation kind gets exactly
//! one builder here and nobody concatenates envelope fields by hand.

/// One canonical message per operation kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Canonical<'a> {
    /// `timestamp + pubKey`: identity creation (edge and ledger).
    UserCreate { timestamp: &'a str, pub_key: &'a str },

    /// `timestamp + uuid`: identity lookup (edge fetch and ledger query).
    UserLookup { timestamp: &'a str, uuid: &'a str },

    /// `timestamp + uuid + flavor + quantity`: edge ticket purchase.
    TicketPurchase {
        timestamp: &'a str,
        uuid: &'a str,
        flavor: &'a str,
        quantity: &'a str,
    },

    /// `timestamp + fromUUID + toUserUUID + flavor + quantity`: ledger
    /// nineum mint and transfer.
    NineumMove {
        timestamp: &'a str,
        from_uuid: &'a str,
        to_uuid: &'a str,
        flavor: &'a str,
        quantity: u64,
    },

    /// `timestamp + uuid`: admin nineum grant.
    AdminGrant { timestamp: &'a str, uuid: &'a str },

    /// `timestamp + uuid + galaxy`: the node claiming its own galaxy.
    GalaxyClaim {
        timestamp: &'a str,
        uuid: &'a str,
        galaxy: &'a str,
    },

    /// `timestamp + uuid`: galaxy assignment on behalf of a user.
    GalaxyAssign { timestamp: &'a str, uuid: &'a str },

    /// `timestamp + uuid + minimumCost + ordinal`: gateway token.
    Gateway {
        timestamp: &'a str,
        uuid: &'a str,
        minimum_cost: u64,
        ordinal: u64,
    },

    /// `timestamp + pubKey + hash`: document-store identity creation.
    DocumentStoreCreate {
        timestamp: &'a str,
        pub_key: &'a str,
        hash: &'a str,
    },

    /// `timestamp + uuid + hash`: document-store spellbook fetch.
    DocumentStoreSpellbooks {
        timestamp: &'a str,
        uuid: &'a str,
        hash: &'a str,
    },
}

impl Canonical<'_> {
    /// The exact string that gets signed.
    pub fn message(&self) -> String {
        match self {
            Canonical::UserCreate { timestamp, pub_key } => format!("{timestamp}{pub_key}"),
            Canonical::UserLookup { timestamp, uuid }
            | Canonical::AdminGrant { timestamp, uuid }
            | Canonical::GalaxyAssign { timestamp, uuid } => format!("{timestamp}{uuid}"),
            Canonical::TicketPurchase {
                timestamp,
                uuid,
                flavor,
                quantity,
            } => format!("{timestamp}{uuid}{flavor}{quantity}"),
            Canonical::NineumMove {
                timestamp,
                from_uuid,
                to_uuid,
                flavor,
                quantity,
            } => format!("{timestamp}{from_uuid}{to_uuid}{flavor}{quantity}"),
            Canonical::GalaxyClaim {
                timestamp,
                uuid,
                galaxy,
            } => format!("{timestamp}{uuid}{galaxy}"),
            Canonical::Gateway {
                timestamp,
                uuid,
                minimum_cost,
                ordinal,
            } => format!("{timestamp}{uuid}{minimum_cost}{ordinal}"),
            Canonical::DocumentStoreCreate {
                timestamp,
                pub_key,
                hash,
            } => format!("{timestamp}{pub_key}{hash}"),
            Canonical::DocumentStoreSpellbooks {
                timestamp,
                uuid,
                hash,
            } => format!("{timestamp}{uuid}{hash}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS: &str = "1700000000000";

    #[test]
    fn user_create_is_timestamp_then_key() {
        let msg = Canonical::UserCreate {
            timestamp: TS,
            pub_key: "02abc",
        }
        .message();
        assert_eq!(msg, "170000000000002abc");
    }

    #[test]
    fn ticket_purchase_orders_uuid_flavor_quantity() {
        let msg = Canonical::TicketPurchase {
            timestamp: TS,
            uuid: "u-1",
            flavor: "010203040506",
            quantity: "10",
        }
        .message();
        assert_eq!(msg, "1700000000000u-101020304050610");

        let padded = Canonical::TicketPurchase {
            timestamp: TS,
            uuid: "u-1",
            flavor: "010203040506",
            quantity: "010",
        }
        .message();
        assert_eq!(padded, "1700000000000u-1010203040506010");
    }

    #[test]
    fn nineum_move_puts_sender_before_recipient() {
        let msg = Canonical::NineumMove {
            timestamp: TS,
            from_uuid: "self",
            to_uuid: "buyer",
            flavor: "aabbccddeeff",
            quantity: 3,
        }
        .message();
        assert_eq!(msg, "1700000000000selfbuyeraabbccddeeff3");
    }

    #[test]
    fn gateway_uses_decimal_cost_and_ordinal() {
        let msg = Canonical::Gateway {
            timestamp: TS,
            uuid: "node",
            minimum_cost: 20,
            ordinal: 0,
        }
        .message();
        assert_eq!(msg, "1700000000000node200");
    }

    #[test]
    fn galaxy_claim_includes_galaxy_but_assign_does_not() {
        let claim = Canonical::GalaxyClaim {
            timestamp: TS,
            uuid: "node",
            galaxy: "41524554",
        }
        .message();
        let assign = Canonical::GalaxyAssign {
            timestamp: TS,
            uuid: "node",
        }
        .message();
        assert_eq!(claim, "1700000000000node41524554");
        assert_eq!(assign, "1700000000000node");
    }

    #[test]
    fn document_store_messages_end_with_hash() {
        let create = Canonical::DocumentStoreCreate {
            timestamp: TS,
            pub_key: "02ab",
            hash: "h",
        }
        .message();
        let books = Canonical::DocumentStoreSpellbooks {
            timestamp: TS,
            uuid: "u",
            hash: "h",
        }
        .message();
        assert_eq!(create, "170000000000002abh");
        assert_eq!(books, "1700000000000uh");
    }
}
