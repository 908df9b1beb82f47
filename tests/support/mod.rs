// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fake ledger, document store and next-hop node on one local listener.
//!
//! ```text
//! {base}/                          ledger ("fount")
//! {base}/bdo/                      document store
//! {base}/next/magic/spell/{name}   next hop on every test route
//! ```

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use aretha::{
    config::Config,
    crypto::{ensure_signing_keys, verify},
    state::AppState,
    storage::{KeyValueStore, MemoryStore},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use uuid::Uuid;

/// Galactic nineum id: rank byte `ff` at hex chars 14..16.
pub const GALACTIC_NINEUM: &str = "01000000000000ff000000000001";

#[derive(Default)]
pub struct Calls {
    pub identity_creates: usize,
    pub self_signed_creates: usize,
    pub identity_lookups: usize,
    pub bdo_creates: usize,
    pub spellbook_fetches: usize,
    pub galaxy_claims: usize,
    pub mints: Vec<Value>,
    pub transfers: Vec<Value>,
    pub grants: Vec<Value>,
    pub spells_at_ledger: Vec<Value>,
    pub spells_at_next_hop: Vec<Value>,
}

#[derive(Default)]
struct Inner {
    users_by_pub_key: HashMap<String, Value>,
    claimed_galaxies: HashSet<String>,
    spellbooks: Vec<Value>,
    next_hop_success: bool,
    calls: Calls,
}

#[derive(Clone, Default)]
struct Shared(Arc<Mutex<Inner>>);

impl Shared {
    fn with<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        f(&mut self.0.lock().unwrap())
    }
}

pub struct FakeServices {
    base: String,
    shared: Shared,
}

impl FakeServices {
    pub async fn start() -> Self {
        let shared = Shared::default();
        shared.with(|inner| inner.next_hop_success = true);

        let bdo = Router::new()
            .route("/user/create", put(bdo_create))
            .route("/user/{uuid}/spellbooks", get(bdo_spellbooks));

        let app = Router::new()
            .route("/", post(ledger_spell))
            .route("/user/create", put(ledger_create))
            .route("/user/{key}", get(ledger_lookup))
            .route("/user/{uuid}/nineum", put(ledger_mint))
            .route("/user/{uuid}/nineum/transfer", put(ledger_transfer))
            .route("/user/{uuid}/nineum/admin", put(ledger_grant))
            .route("/user/{uuid}/nineum/galactic", put(ledger_galactic))
            .route("/next/magic/spell/{spell_name}", post(next_hop))
            .nest("/bdo", bdo)
            .with_state(shared.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let services = Self {
            base: format!("http://{addr}/"),
            shared,
        };
        services.set_spellbooks(vec![services.default_spellbook()]);
        services
    }

    pub fn fount_url(&self) -> String {
        self.base.clone()
    }

    pub fn bdo_url(&self) -> String {
        format!("{}bdo/", self.base)
    }

    pub fn next_hop_url(&self) -> String {
        format!("{}next/magic/spell/", self.base)
    }

    /// Routes used across the suite.
    ///
    /// `arethaUserTickets` passes through this node to `next`;
    /// `arethaUserGrant` ends here.
    pub fn default_spellbook(&self) -> Value {
        json!({
            "spellbookName": "aretha-tests",
            "arethaUserTickets": {"destinations": [
                {"stopName": "caster", "stopURL": self.next_hop_url()},
                {"stopName": "aretha", "stopURL": self.next_hop_url()},
                {"stopName": "next", "stopURL": self.next_hop_url()}
            ]},
            "arethaUserGrant": {"destinations": [
                {"stopName": "caster", "stopURL": self.next_hop_url()},
                {"stopName": "aretha", "stopURL": self.next_hop_url()}
            ]}
        })
    }

    pub fn set_spellbooks(&self, spellbooks: Vec<Value>) {
        self.shared.with(|inner| inner.spellbooks = spellbooks);
    }

    pub fn set_next_hop_success(&self, success: bool) {
        self.shared.with(|inner| inner.next_hop_success = success);
    }

    pub fn claim_galaxy_elsewhere(&self, galaxy: &str) {
        self.shared
            .with(|inner| inner.claimed_galaxies.insert(galaxy.to_string()));
    }

    pub fn calls<R>(&self, f: impl FnOnce(&Calls) -> R) -> R {
        self.shared.with(|inner| f(&inner.calls))
    }

    /// Config pointing every collaborator at this fake.
    pub fn config(&self) -> Config {
        let mut config = Config::default().with_service_urls(self.fount_url(), self.bdo_url());
        config.bootstrap_retry = Duration::from_millis(20);
        config.outbound_timeout = Duration::from_secs(5);
        config
    }

    /// Fresh state over an in-memory store with signing keys in place.
    pub fn state(&self) -> AppState {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        self.state_with(store)
    }

    pub fn state_with(&self, store: Arc<dyn KeyValueStore>) -> AppState {
        ensure_signing_keys(store.as_ref()).unwrap();
        AppState::new(self.config(), store).unwrap()
    }
}

fn field<'a>(body: &'a Value, key: &str) -> &'a str {
    body.get(key).and_then(Value::as_str).unwrap_or_default()
}

// =============================================================================
// Ledger
// =============================================================================

async fn ledger_lookup(
    State(shared): State<Shared>,
    Path(key): Path<String>,
) -> (StatusCode, Json<Value>) {
    shared.with(|inner| {
        inner.calls.identity_lookups += 1;
        match inner.users_by_pub_key.get(&key) {
            Some(user) => (StatusCode::OK, Json(user.clone())),
            None => (StatusCode::NOT_FOUND, Json(json!({"error": "not found"}))),
        }
    })
}

async fn ledger_create(
    State(shared): State<Shared>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let timestamp = field(&body, "timestamp");
    let pub_key = field(&body, "pubKey");
    let signature = field(&body, "signature");
    if signature.is_empty() {
        return (StatusCode::FORBIDDEN, Json(json!({"error": "auth error"})));
    }
    // Spell-driven creates are signed by the node rather than the key owner.
    let self_signed = verify(signature, &format!("{timestamp}{pub_key}"), pub_key);

    shared.with(|inner| {
        inner.calls.identity_creates += 1;
        if self_signed {
            inner.calls.self_signed_creates += 1;
        }
        let user = inner
            .users_by_pub_key
            .entry(pub_key.to_string())
            .or_insert_with(|| {
                json!({"uuid": Uuid::new_v4().to_string(), "pubKey": pub_key, "nineum": []})
            })
            .clone();
        (StatusCode::OK, Json(user))
    })
}

async fn ledger_mint(
    State(shared): State<Shared>,
    Path(uuid): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    shared.with(|inner| inner.calls.mints.push(body));
    Json(json!({"uuid": uuid, "nineum": []}))
}

async fn ledger_transfer(State(shared): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let buyer = field(&body, "toUserUUID").to_string();
    shared.with(|inner| inner.calls.transfers.push(body));
    Json(json!({"uuid": buyer, "nineum": []}))
}

async fn ledger_grant(State(shared): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    shared.with(|inner| inner.calls.grants.push(body));
    Json(json!({"success": true}))
}

async fn ledger_galactic(
    State(shared): State<Shared>,
    Path(uuid): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let galaxy = field(&body, "galaxy").to_string();
    shared.with(|inner| {
        inner.calls.galaxy_claims += 1;
        if inner.claimed_galaxies.insert(galaxy) {
            (
                StatusCode::OK,
                Json(json!({"uuid": uuid, "nineum": [GALACTIC_NINEUM]})),
            )
        } else {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "galaxy already claimed"})),
            )
        }
    })
}

async fn ledger_spell(State(shared): State<Shared>, Json(spell): Json<Value>) -> Json<Value> {
    shared.with(|inner| inner.calls.spells_at_ledger.push(spell));
    Json(json!({"success": true, "handledBy": "fount"}))
}

// =============================================================================
// Document store
// =============================================================================

async fn bdo_create(
    State(shared): State<Shared>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let timestamp = field(&body, "timestamp");
    let pub_key = field(&body, "pubKey");
    let hash = field(&body, "hash");
    let signature = field(&body, "signature");
    if !verify(signature, &format!("{timestamp}{pub_key}{hash}"), pub_key) {
        return (StatusCode::FORBIDDEN, Json(json!({"error": "auth error"})));
    }

    shared.with(|inner| inner.calls.bdo_creates += 1);
    (StatusCode::OK, Json(json!({"uuid": "bdo-aretha", "bdo": {}})))
}

async fn bdo_spellbooks(State(shared): State<Shared>) -> Json<Value> {
    shared.with(|inner| {
        inner.calls.spellbook_fetches += 1;
        Json(json!({"spellbooks": inner.spellbooks.clone()}))
    })
}

// =============================================================================
// Next hop
// =============================================================================

async fn next_hop(
    State(shared): State<Shared>,
    Path(spell_name): Path<String>,
    Json(spell): Json<Value>,
) -> Json<Value> {
    shared.with(|inner| {
        inner.calls.spells_at_next_hop.push(spell);
        if inner.next_hop_success {
            Json(json!({"success": true, "hop": spell_name}))
        } else {
            Json(json!({"success": false, "error": "insufficient mp"}))
        }
    })
}
