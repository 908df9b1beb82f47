// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use aretha::{
    api::router,
    bootstrap::BootstrapSequencer,
    config::{Config, LogFormat},
    crypto::ensure_signing_keys,
    state::AppState,
    storage::{FileStore, StoragePaths},
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();
    init_tracing(config.log_format);

    let store = FileStore::open(StoragePaths::new(&config.data_dir))
        .expect("Failed to open data directory");
    let keys = ensure_signing_keys(&store).expect("Failed to load signing keys");
    info!(pub_key = %keys.pub_key, data_dir = %config.data_dir.display(), "Signing keys loaded");

    let addr = config.bind_address();
    let state =
        AppState::new(config, Arc::new(store)).expect("Failed to build application state");

    let shutdown = CancellationToken::new();
    let bootstrap = tokio::spawn(BootstrapSequencer::new(state.clone()).run(shutdown.clone()));

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listener");
    info!(%addr, "Aretha listening (docs at /docs)");

    let signal = shutdown.clone();
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutdown signal received");
            signal.cancel();
        })
        .await;

    if let Err(e) = served {
        error!(error = %e, "HTTP server failed");
    }
    shutdown.cancel();
    let _ = bootstrap.await;
}
