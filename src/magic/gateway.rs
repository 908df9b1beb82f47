// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gateway token issuance.

use std::sync::Arc;

use tracing::debug;

use super::types::GatewayToken;
use crate::clock;
use crate::crypto::{Canonical, MessageSigner, SignatureError};

/// Cost floor this node attaches to every spell it handles.
pub const DEFAULT_MINIMUM_COST: u64 = 20;

/// Issues signed gateway tokens on behalf of this node.
///
/// The ordinal is supplied by the caller and never incremented here; it is
/// carried so downstream consumers can reject stale tokens once nodes start
/// advancing it.
#[derive(Clone)]
pub struct GatewayTokenIssuer {
    signer: Arc<dyn MessageSigner>,
}

impl GatewayTokenIssuer {
    pub fn new(signer: Arc<dyn MessageSigner>) -> Self {
        Self { signer }
    }

    /// Build and sign a token for `spell_name`.
    pub fn issue(
        &self,
        spell_name: &str,
        node_identity_id: &str,
        minimum_cost: u64,
        ordinal: u64,
    ) -> Result<GatewayToken, SignatureError> {
        let timestamp = clock::timestamp();
        let message = Canonical::Gateway {
            timestamp: &timestamp,
            uuid: node_identity_id,
            minimum_cost,
            ordinal,
        }
        .message();
        let signature = self.signer.sign(&message)?;

        debug!(
            spell_name = %spell_name,
            node = %node_identity_id,
            minimum_cost,
            ordinal,
            "Issued gateway token"
        );

        Ok(GatewayToken {
            timestamp,
            node_identity_id: node_identity_id.to_string(),
            minimum_cost,
            ordinal,
            signature,
        })
    }
}
