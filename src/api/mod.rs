// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::freshness_guard,
    magic::{Destination, GatewayToken, SpellbookEntry},
    models::{
        CreateUserRequest, GalaxyRequest, GrantRequest, PurchaseTicketsRequest, SuccessResponse,
        UserRecord,
    },
    state::AppState,
};

pub mod health;
pub mod magic;
pub mod users;

pub fn router(state: AppState) -> Router {
    let authenticator = state.authenticator;

    let routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/user/create", put(users::create_user))
        .route("/user/{uuid}", get(users::get_user))
        .route("/user/{uuid}/tickets/{flavor}", put(users::purchase_tickets))
        .route("/user/{uuid}/grant", put(users::grant_admin))
        .route("/user/{uuid}/galaxy", put(users::assign_galaxy))
        .route("/magic/spell/{spell_name}", post(magic::cast_spell))
        .layer(middleware::from_fn_with_state(authenticator, freshness_guard))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        users::create_user,
        users::get_user,
        users::purchase_tickets,
        users::grant_admin,
        users::assign_galaxy,
        magic::cast_spell
    ),
    components(
        schemas(
            UserRecord,
            CreateUserRequest,
            PurchaseTicketsRequest,
            GrantRequest,
            GalaxyRequest,
            SuccessResponse,
            GatewayToken,
            Destination,
            SpellbookEntry,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Users", description = "Signed edge user operations"),
        (name = "Magic", description = "Spell relay and execution")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::storage::MemoryStore;

    fn state() -> AppState {
        AppState::new(Config::default(), Arc::new(MemoryStore::new())).unwrap()
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = router(state());
        // Ensure the router can be converted into a service without panicking.
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn unknown_spell_is_not_found() {
        let response = router(state())
            .oneshot(
                Request::post("/magic/spell/teleport")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"spellName":"teleport"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn joinup_before_bootstrap_is_unavailable() {
        let response = router(state())
            .oneshot(
                Request::post("/magic/spell/joinup")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"spellName":"arethaUserTickets"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn local_ticket_spell_before_bootstrap_is_unavailable() {
        let body = r#"{"spellName":"arethaUserTickets","components":{"uuid":"u-1","flavor":"010203040506","quantity":1}}"#;
        let response = router(state())
            .oneshot(
                Request::post("/magic/spell/arethaUserTickets")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn openapi_lists_edge_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/user/create"));
        assert!(doc.paths.paths.contains_key("/magic/spell/{spell_name}"));
    }

    #[test]
    fn spell_route_documents_a_request_body() {
        let doc = ApiDoc::openapi();
        let spell = doc
            .paths
            .paths
            .get("/magic/spell/{spell_name}")
            .and_then(|item| item.post.as_ref())
            .unwrap();
        assert!(spell.request_body.is_some());
    }
}
