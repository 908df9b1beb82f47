// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Edge user endpoints.
//!
//! Each request is signed by the caller's own key. Creation and lookup are
//! verified here; grant and galaxy requests are forwarded with the caller's
//! envelope and verified by the ledger.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::{
    auth::AuthError,
    clock,
    crypto::Canonical,
    error::AppError,
    ledger::Signing,
    models::{
        CreateUserRequest, GalaxyRequest, GrantRequest, PurchaseTicketsRequest, SignedQuery,
        SuccessResponse, UserRecord,
    },
    state::AppState,
};

/// Register a public key, creating its ledger account when needed.
#[utoipa::path(
    put,
    path = "/user/create",
    request_body = CreateUserRequest,
    tag = "Users",
    responses(
        (status = 200, description = "User created or already known", body = UserRecord),
        (status = 403, description = "Signature does not match pubKey"),
        (status = 502, description = "Ledger call failed")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<UserRecord>, AppError> {
    let message = Canonical::UserCreate {
        timestamp: &request.timestamp,
        pub_key: &request.pub_key,
    }
    .message();
    state.authenticator.authenticate(
        &request.timestamp,
        request.signature.as_deref(),
        &message,
        &request.pub_key,
        clock::now_millis(),
    )?;

    let signing = forwarded(&request.timestamp, request.signature.as_deref())?;
    let ledger_user = state.ledger.create_identity(&request.pub_key, signing).await?;
    let user = state.store.put_user(&request.pub_key, Some(ledger_user))?;

    info!(uuid = %user.uuid, "User created");
    Ok(Json(user))
}

/// Fetch a user, signed by that user over `timestamp + uuid`.
#[utoipa::path(
    get,
    path = "/user/{uuid}",
    params(
        ("uuid" = String, Path, description = "Local user id"),
        SignedQuery
    ),
    tag = "Users",
    responses(
        (status = 200, description = "User record", body = UserRecord),
        (status = 403, description = "Signature does not match the user's key"),
        (status = 404, description = "Unknown user")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    Query(query): Query<SignedQuery>,
) -> Result<Json<UserRecord>, AppError> {
    let user = state.store.get_user(&uuid)?;

    let message = Canonical::UserLookup {
        timestamp: &query.timestamp,
        uuid: &uuid,
    }
    .message();
    state.authenticator.authenticate(
        &query.timestamp,
        query.signature.as_deref(),
        &message,
        &user.pub_key,
        clock::now_millis(),
    )?;

    Ok(Json(user))
}

/// Buy `quantity` tickets of `flavor` for the user.
#[utoipa::path(
    put,
    path = "/user/{uuid}/tickets/{flavor}",
    params(
        ("uuid" = String, Path, description = "Local user id"),
        ("flavor" = String, Path, description = "12-hex-character nineum flavor")
    ),
    request_body = PurchaseTicketsRequest,
    tag = "Users",
    responses(
        (status = 200, description = "Tickets purchased", body = SuccessResponse),
        (status = 400, description = "Invalid flavor or quantity"),
        (status = 403, description = "Signature does not match the user's key"),
        (status = 503, description = "Node still bootstrapping")
    )
)]
pub async fn purchase_tickets(
    State(state): State<AppState>,
    Path((uuid, flavor)): Path<(String, String)>,
    Json(request): Json<PurchaseTicketsRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    let quantity = request
        .quantity()
        .ok_or_else(|| AppError::Validation("Missing required field: quantity".to_string()))?;
    let user = state.store.get_user(&uuid)?;

    let message = Canonical::TicketPurchase {
        timestamp: &request.timestamp,
        uuid: &uuid,
        flavor: &flavor,
        quantity: &request.quantity,
    }
    .message();
    state.authenticator.authenticate(
        &request.timestamp,
        request.signature.as_deref(),
        &message,
        &user.pub_key,
        clock::now_millis(),
    )?;

    let node = state.node.ready().await?;
    state
        .ledger
        .purchase_ticket(&node.ledger_uuid, &uuid, &flavor, quantity)
        .await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Forward an admin grant for the user to the ledger.
#[utoipa::path(
    put,
    path = "/user/{uuid}/grant",
    params(("uuid" = String, Path, description = "Ledger id receiving the grant")),
    request_body = GrantRequest,
    tag = "Users",
    responses(
        (status = 200, description = "Grant forwarded", body = SuccessResponse),
        (status = 403, description = "Missing signature"),
        (status = 503, description = "Node still bootstrapping")
    )
)]
pub async fn grant_admin(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    Json(request): Json<GrantRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    let signing = forwarded(&request.timestamp, request.signature.as_deref())?;
    let target = request.uuid.as_deref().unwrap_or(&uuid);

    let node = state.node.ready().await?;
    state
        .ledger
        .grant_admin(&node.ledger_uuid, target, signing)
        .await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Forward a galaxy assignment to the ledger and return its answer.
#[utoipa::path(
    put,
    path = "/user/{uuid}/galaxy",
    params(("uuid" = String, Path, description = "Ledger id receiving the galaxy")),
    request_body = GalaxyRequest,
    tag = "Users",
    responses(
        (status = 200, description = "Ledger response"),
        (status = 403, description = "Missing signature")
    )
)]
pub async fn assign_galaxy(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    Json(request): Json<GalaxyRequest>,
) -> Result<Json<Value>, AppError> {
    let signing = forwarded(&request.timestamp, request.signature.as_deref())?;
    let target = request.uuid.as_deref().unwrap_or(&uuid);

    let data = state
        .ledger
        .assign_galaxy(target, &request.galaxy, signing)
        .await?;
    Ok(Json(data))
}

fn forwarded(timestamp: &str, signature: Option<&str>) -> Result<Signing, AuthError> {
    let signature = signature
        .filter(|s| !s.is_empty())
        .ok_or(AuthError::MissingSignature)?;
    Ok(Signing::Forwarded {
        timestamp: timestamp.to_string(),
        signature: signature.to_string(),
    })
}
