// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::auth::AuthError;
use crate::ledger::LedgerError;
use crate::magic::{RelayError, ResolveError};
use crate::provisioning::ProvisioningError;
use crate::storage::StorageError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            success: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Crate-wide error taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Upstream(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("service not ready")]
    NotReady,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(e) => e.status_code(),
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Auth(e) => e.into_response(),
            AppError::Config(ref message) | AppError::Internal(ref message) => {
                error!(error = %message, "Request failed");
                ApiError::new(self.status_code(), self.to_string()).into_response()
            }
            other => ApiError::new(other.status_code(), other.to_string()).into_response(),
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::Validation(message) => AppError::Validation(message),
            LedgerError::LedgerCallFailed(message) | LedgerError::Rejected(message) => {
                AppError::Upstream(message)
            }
            LedgerError::Signing(e) => AppError::Config(e.to_string()),
        }
    }
}

impl From<ProvisioningError> for AppError {
    fn from(e: ProvisioningError) -> Self {
        match e {
            ProvisioningError::Signing(e) => AppError::Config(e.to_string()),
            other => AppError::Upstream(other.to_string()),
        }
    }
}

impl From<ResolveError> for AppError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::SpellbookNotFound(_) => AppError::NotFound(e.to_string()),
            ResolveError::SelfNotInRoute { .. } | ResolveError::MalformedEntry { .. } => {
                AppError::Config(e.to_string())
            }
        }
    }
}

impl From<RelayError> for AppError {
    fn from(e: RelayError) -> Self {
        match e {
            RelayError::Resolve(e) => e.into(),
            RelayError::Gateway(e) => AppError::Config(e.to_string()),
            RelayError::RelayFailed(message) => AppError::Upstream(message),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound(_) => AppError::NotFound("not found".to_string()),
            StorageError::InvalidKey(key) => {
                AppError::Validation(format!("invalid identifier: {key}"))
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::new(StatusCode::BAD_REQUEST, "bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"success":false,"error":"bad data"}"#);
    }

    #[tokio::test]
    async fn app_error_uses_api_error_body() {
        let response = AppError::NotFound("spell not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error"], "spell not found");
        assert_eq!(body["success"], false);
    }

    #[test]
    fn taxonomy_maps_to_statuses() {
        assert_eq!(
            AppError::Auth(AuthError::InvalidSignature).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Auth(AuthError::StaleTimestamp).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Config("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(AppError::Upstream("x".into()).status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(AppError::NotReady.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn module_errors_convert() {
        let e: AppError = LedgerError::Validation("Missing required field: uuid".into()).into();
        assert!(matches!(e, AppError::Validation(_)));

        let e: AppError = LedgerError::LedgerCallFailed("timeout".into()).into();
        assert!(matches!(e, AppError::Upstream(_)));

        let e: AppError = ResolveError::SpellbookNotFound("joinup".into()).into();
        assert!(matches!(e, AppError::NotFound(_)));

        let e: AppError = ResolveError::SelfNotInRoute {
            spell_name: "joinup".into(),
            stop_name: "aretha".into(),
        }
        .into();
        assert!(matches!(e, AppError::Config(_)));

        let e: AppError = StorageError::NotFound("user".into()).into();
        assert!(matches!(e, AppError::NotFound(_)));
    }
}
