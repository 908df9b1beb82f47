// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

mod support;

use aretha::crypto::{verify, SigningKeys};
use aretha::ledger::{GalaxyClaim, LedgerError, Signing};
use aretha::node::ARETHA_GALAXY;
use support::FakeServices;

#[tokio::test]
async fn create_identity_is_idempotent() {
    let services = FakeServices::start().await;
    let state = services.state();
    let pub_key = state.signer.public_key().unwrap();

    let first = state.ledger.create_identity(&pub_key, Signing::Node).await.unwrap();
    let second = state.ledger.create_identity(&pub_key, Signing::Node).await.unwrap();

    assert_eq!(first.uuid.len(), 36);
    assert_eq!(first.uuid, second.uuid);
    assert_eq!(services.calls(|c| c.identity_creates), 1);
    assert_eq!(services.calls(|c| c.identity_lookups), 2);
}

#[tokio::test]
async fn query_identity_returns_none_for_unknown_key() {
    let services = FakeServices::start().await;
    let state = services.state();

    let unknown = format!("02{}", "ff".repeat(32));
    let found = state
        .ledger
        .query_identity(&unknown, Signing::Node)
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn forwarded_create_carries_caller_signature() {
    let services = FakeServices::start().await;
    let state = services.state();
    let caller = SigningKeys::generate();
    let timestamp = aretha::clock::timestamp();
    let signature = caller.sign(&format!("{timestamp}{}", caller.pub_key)).unwrap();

    let user = state
        .ledger
        .create_identity(&caller.pub_key, Signing::Forwarded { timestamp, signature })
        .await
        .unwrap();
    assert_eq!(user.pub_key.as_deref(), Some(caller.pub_key.as_str()));
}

#[tokio::test]
async fn galaxy_claimed_twice_succeeds_both_times() {
    let services = FakeServices::start().await;
    let state = services.state();

    let first = state.ledger.claim_galaxy("ledger-self", ARETHA_GALAXY).await.unwrap();
    let second = state.ledger.claim_galaxy("ledger-self", ARETHA_GALAXY).await.unwrap();

    assert_eq!(first, GalaxyClaim::Claimed);
    assert_eq!(second, GalaxyClaim::AlreadyClaimed);
    assert_eq!(services.calls(|c| c.galaxy_claims), 2);
}

#[tokio::test]
async fn purchase_mints_to_service_account() {
    let services = FakeServices::start().await;
    let state = services.state();
    let pub_key = state.signer.public_key().unwrap();

    state
        .ledger
        .purchase_ticket("ledger-self", "caller-1", "010203040506", 10)
        .await
        .unwrap();

    let mint = services.calls(|c| c.mints[0].clone());
    assert_eq!(mint["toUserUUID"], "ledger-self");
    assert_eq!(mint["quantity"], 10);
    assert_eq!(mint["charge"], "01");
    assert_eq!(mint["direction"], "02");
    assert_eq!(mint["rarity"], "03");
    assert_eq!(mint["size"], "04");
    assert_eq!(mint["texture"], "05");
    assert_eq!(mint["shape"], "06");

    let timestamp = mint["timestamp"].as_str().unwrap();
    let message = format!("{timestamp}ledger-selfledger-self01020304050610");
    assert!(verify(mint["signature"].as_str().unwrap(), &message, &pub_key));
}

#[tokio::test]
async fn transfer_moves_tickets_to_buyer() {
    let services = FakeServices::start().await;
    let state = services.state();

    state
        .ledger
        .transfer_ticket("ledger-self", "buyer-1", "0a0b0c0d0e0f", 3)
        .await
        .unwrap();

    let transfer = services.calls(|c| c.transfers[0].clone());
    assert_eq!(transfer["toUserUUID"], "buyer-1");
    assert_eq!(transfer["quantity"], 3);
    assert_eq!(transfer["shape"], "0f");
}

#[tokio::test]
async fn invalid_flavor_never_reaches_the_ledger() {
    let services = FakeServices::start().await;
    let state = services.state();

    let err = state
        .ledger
        .purchase_ticket("ledger-self", "caller-1", "01020304050g", 10)
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::Validation(_)));
    assert!(services.calls(|c| c.mints.is_empty()));
}

#[tokio::test]
async fn grant_admin_names_the_service_account() {
    let services = FakeServices::start().await;
    let state = services.state();

    let answer = state
        .ledger
        .grant_admin("ledger-self", "target-1", Signing::Node)
        .await
        .unwrap();

    assert_eq!(answer["success"], true);
    let grant = services.calls(|c| c.grants[0].clone());
    assert_eq!(grant["toUserUUID"], "ledger-self");
    assert_eq!(grant["uuid"], "target-1");
}

#[tokio::test]
async fn linkup_spell_is_posted_to_ledger_root() {
    let services = FakeServices::start().await;
    let state = services.state();

    let body = state
        .ledger
        .post_spell(&serde_json::json!({"spellName": "linkup", "gateways": []}))
        .await
        .unwrap();

    assert_eq!(body["handledBy"], "fount");
    assert_eq!(services.calls(|c| c.spells_at_ledger.len()), 1);
}
