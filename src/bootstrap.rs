// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Node Bootstrap
//!
//! Background task that establishes the node's identities, loads its
//! spellbooks and claims its galaxy, then publishes the node record.
//!
//! ## Strategy
//!
//! Each attempt walks `Uninitialized -> Registering -> NamespaceClaiming ->
//! Ready`:
//! 1. Loads the saved record. A complete record skips registration entirely.
//! 2. Obtains the ledger identity and document-store account (both calls are
//!    idempotent upstream) and fetches the spellbooks.
//! 3. Claims the galaxy unless the record already holds it. "Already
//!    claimed" counts as success; other failures are logged and ignored.
//! 4. Saves and publishes the record.
//!
//! A failed attempt is retried after `bootstrap_retry`, forever.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken`, shared with the HTTP server.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::ledger::{GalaxyClaim, Signing};
use crate::magic::duplicate_stops;
use crate::node::{NodeRecord, ARETHA_GALAXY, NODE_RECORD_ID};
use crate::provisioning::bdo_hash;
use crate::state::AppState;

/// Where the current bootstrap attempt is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    Uninitialized,
    Registering,
    NamespaceClaiming,
    Ready,
}

/// Retry-forever bootstrap of the node record.
pub struct BootstrapSequencer {
    state: AppState,
    attempts: Arc<AtomicU64>,
    phase: Arc<watch::Sender<BootstrapState>>,
}

impl BootstrapSequencer {
    pub fn new(state: AppState) -> Self {
        let (phase, _) = watch::channel(BootstrapState::Uninitialized);
        Self {
            state,
            attempts: Arc::new(AtomicU64::new(0)),
            phase: Arc::new(phase),
        }
    }

    /// Number of attempts started so far.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn phase(&self) -> BootstrapState {
        *self.phase.borrow()
    }

    /// Shared counter behind [`Self::attempts`], readable after `run` takes
    /// ownership of the sequencer.
    pub fn attempt_counter(&self) -> Arc<AtomicU64> {
        self.attempts.clone()
    }

    /// Retry [`Self::attempt`] until it succeeds or `shutdown` fires.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(sequencer.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        let retry = self.state.config.bootstrap_retry;
        info!(retry = ?retry, "Node bootstrap starting");

        loop {
            if shutdown.is_cancelled() {
                info!("Node bootstrap shutting down");
                return;
            }

            match self.attempt().await {
                Ok(record) => {
                    info!(
                        attempt = self.attempts(),
                        ledger_uuid = %record.ledger_uuid,
                        spellbooks = record.spellbooks.len(),
                        galaxy = ?record.galaxy,
                        "Node ready"
                    );
                    return;
                }
                Err(e) => {
                    warn!(attempt = self.attempts(), error = %e, "Bootstrap attempt failed");
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(retry) => {},
                _ = shutdown.cancelled() => {
                    info!("Node bootstrap shutting down");
                    return;
                }
            }
        }
    }

    /// Run one bootstrap attempt and publish the record on success.
    pub async fn attempt(&self) -> Result<NodeRecord, AppError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        self.enter(BootstrapState::Uninitialized);

        let existing = self.state.store.get_node_record(NODE_RECORD_ID)?;
        let mut record = match existing {
            Some(record) if record.is_complete() => {
                debug!(attempt, "Reusing saved node record");
                record
            }
            existing => {
                self.enter(BootstrapState::Registering);
                self.register(existing.unwrap_or_else(|| NodeRecord::new(NODE_RECORD_ID)))
                    .await?
            }
        };

        for duplicate in duplicate_stops(&record.spellbooks) {
            warn!(
                spell_name = %duplicate.spell_name,
                stop_name = %duplicate.stop_name,
                "Stop appears more than once in route; first occurrence wins"
            );
        }

        if !record.has_galaxy() {
            self.enter(BootstrapState::NamespaceClaiming);
            self.claim_namespace(&mut record).await;
        }

        self.state.store.save_node_record(&record)?;
        self.state.node.publish(record.clone()).await;
        self.enter(BootstrapState::Ready);
        Ok(record)
    }

    async fn register(&self, mut record: NodeRecord) -> Result<NodeRecord, AppError> {
        let pub_key = self
            .state
            .signer
            .public_key()
            .map_err(|e| AppError::Config(e.to_string()))?;

        if record.ledger_uuid.is_empty() {
            let user = self.state.ledger.create_identity(&pub_key, Signing::Node).await?;
            record.ledger_uuid = user.uuid;
        }
        record.ledger_pub_key = pub_key;

        let hash = bdo_hash(&self.state.config.subdomain);
        if record.document_store_uuid.is_empty() {
            record.document_store_uuid = self.state.documents.create_user(&hash).await?;
        }
        if record.spellbooks.is_empty() {
            record.spellbooks = self
                .state
                .documents
                .get_spellbooks(&record.document_store_uuid, &hash)
                .await?;
        }

        if record.ledger_uuid.is_empty() {
            return Err(AppError::Upstream("ledger identity missing".to_string()));
        }
        if record.document_store_uuid.is_empty() {
            return Err(AppError::Upstream("document store account missing".to_string()));
        }
        if record.spellbooks.is_empty() {
            return Err(AppError::Upstream("no spellbooks provisioned".to_string()));
        }

        info!(
            ledger_uuid = %record.ledger_uuid,
            document_store_uuid = %record.document_store_uuid,
            "Node registered"
        );
        Ok(record)
    }

    async fn claim_namespace(&self, record: &mut NodeRecord) {
        match self
            .state
            .ledger
            .claim_galaxy(&record.ledger_uuid, ARETHA_GALAXY)
            .await
        {
            Ok(claim) => {
                if claim == GalaxyClaim::AlreadyClaimed {
                    debug!(galaxy = ARETHA_GALAXY, "Galaxy already claimed");
                }
                record.galaxy = Some(ARETHA_GALAXY.to_string());
            }
            Err(e) => {
                warn!(galaxy = ARETHA_GALAXY, error = %e, "Galaxy claim failed");
            }
        }
    }

    fn enter(&self, phase: BootstrapState) {
        self.phase.send_replace(phase);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::crypto::ensure_signing_keys;
    use crate::magic::{Destination, Spellbook};
    use crate::storage::{KeyValueStore, MemoryStore};
    use std::time::Duration;

    fn sequencer(store: Arc<MemoryStore>) -> BootstrapSequencer {
        ensure_signing_keys(store.as_ref()).unwrap();
        // Nothing listens on port 9; any outbound call fails fast.
        let mut config =
            Config::default().with_service_urls("http://127.0.0.1:9/", "http://127.0.0.1:9/");
        config.bootstrap_retry = Duration::from_millis(10);
        config.outbound_timeout = Duration::from_secs(2);
        BootstrapSequencer::new(AppState::new(config, store).unwrap())
    }

    fn complete_record() -> NodeRecord {
        NodeRecord {
            ledger_uuid: "ledger-1".to_string(),
            ledger_pub_key: "02ab".to_string(),
            document_store_uuid: "bdo-1".to_string(),
            spellbooks: vec![Spellbook::new().with_route(
                "joinup",
                vec![Destination {
                    stop_name: "aretha".to_string(),
                    stop_url: "http://127.0.0.1:9/magic/spell/".to_string(),
                }],
            )],
            galaxy: Some(ARETHA_GALAXY.to_string()),
            ..NodeRecord::new(NODE_RECORD_ID)
        }
    }

    #[tokio::test]
    async fn ready_record_is_reused_without_calls() {
        let store = Arc::new(MemoryStore::new());
        store.save_node_record(&complete_record()).unwrap();
        let sequencer = sequencer(store.clone());

        let record = sequencer.attempt().await.unwrap();

        assert_eq!(record, complete_record());
        assert_eq!(store.get_node_record(NODE_RECORD_ID).unwrap(), Some(complete_record()));
        assert_eq!(sequencer.phase(), BootstrapState::Ready);
        assert!(sequencer.state.node.is_ready().await);
    }

    #[tokio::test]
    async fn unreachable_ledger_fails_in_registering() {
        let sequencer = sequencer(Arc::new(MemoryStore::new()));

        let err = sequencer.attempt().await.unwrap_err();

        assert!(matches!(err, AppError::Upstream(_)));
        assert_eq!(sequencer.phase(), BootstrapState::Registering);
        assert_eq!(sequencer.attempts(), 1);
        assert!(!sequencer.state.node.is_ready().await);
    }

    #[tokio::test]
    async fn run_stops_on_cancellation() {
        let sequencer = sequencer(Arc::new(MemoryStore::new()));
        let attempts = sequencer.attempt_counter();
        let shutdown = CancellationToken::new();

        let task = tokio::spawn(sequencer.run(shutdown.clone()));
        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown.cancel();
        task.await.unwrap();

        assert!(attempts.load(Ordering::SeqCst) >= 1);
    }
}
