// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Spell endpoint.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tracing::debug;

use crate::{
    error::AppError,
    magic::{
        spells::{self, succeeded},
        Spell,
    },
    state::AppState,
};

/// Status returned with a spell result that reports failure.
pub const SPELL_FAILED: u16 = 900;

/// Cast a spell.
///
/// Successful results are 200. Failed results keep their `{success: false}`
/// body and come back with status 900.
#[utoipa::path(
    post,
    path = "/magic/spell/{spell_name}",
    params(("spell_name" = String, Path, description = "Spell to cast")),
    request_body = Object,
    tag = "Magic",
    responses(
        (status = 200, description = "Spell succeeded"),
        (status = 404, description = "Unknown spell or route"),
        (status = 502, description = "Next hop unreachable"),
        (status = 503, description = "Node still bootstrapping")
    )
)]
pub async fn cast_spell(
    State(state): State<AppState>,
    Path(spell_name): Path<String>,
    Json(spell): Json<Spell>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let result = spells::cast(&state, &spell_name, spell).await?;
    debug!(spell_name = %spell_name, success = succeeded(&result), "Spell cast");
    Ok((spell_status(&result), Json(result)))
}

fn spell_status(result: &Value) -> StatusCode {
    if succeeded(result) {
        StatusCode::OK
    } else {
        StatusCode::from_u16(SPELL_FAILED).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}
