// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use reqwest::Client;

use crate::auth::RequestAuthenticator;
use crate::config::Config;
use crate::crypto::{MessageSigner, StoreSigner};
use crate::error::AppError;
use crate::ledger::LedgerClient;
use crate::magic::{GatewayTokenIssuer, SpellRelay};
use crate::node::NodeHandle;
use crate::provisioning::DocumentStoreClient;
use crate::storage::KeyValueStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn KeyValueStore>,
    pub signer: Arc<dyn MessageSigner>,
    pub ledger: LedgerClient,
    pub documents: DocumentStoreClient,
    pub relay: SpellRelay,
    pub node: NodeHandle,
    pub authenticator: RequestAuthenticator,
}

impl AppState {
    /// Wire every collaborator from `config` around `store`.
    ///
    /// All outbound calls share one HTTP client bounded by the configured
    /// timeout.
    pub fn new(config: Config, store: Arc<dyn KeyValueStore>) -> Result<Self, AppError> {
        let http = Client::builder()
            .timeout(config.outbound_timeout)
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {e}")))?;

        let signer: Arc<dyn MessageSigner> = Arc::new(StoreSigner::new(store.clone()));
        let ledger = LedgerClient::new(config.fount_url.clone(), http.clone(), signer.clone());
        let documents =
            DocumentStoreClient::new(config.bdo_url.clone(), http.clone(), signer.clone());
        let relay = SpellRelay::new(
            http,
            GatewayTokenIssuer::new(signer.clone()),
            ledger.clone(),
            config.stop_name.clone(),
        );
        let authenticator = RequestAuthenticator::new(config.allowed_time_difference_ms);

        Ok(Self {
            config: Arc::new(config),
            store,
            signer,
            ledger,
            documents,
            relay,
            node: NodeHandle::new(),
            authenticator,
        })
    }
}
