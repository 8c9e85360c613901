//! API error mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::registry::RegistryError;
use crate::store::StoreError;

/// Error returned by every handler.
#[derive(Debug)]
pub enum ApiError {
    Registry(RegistryError),
    /// A blocking registry task died.
    Internal(String),
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        ApiError::Registry(e)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Registry(RegistryError::Store(e))
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Registry(e) => match e {
                RegistryError::Invalid(_) => (StatusCode::BAD_REQUEST, json!({"error": e.to_string()})),
                RegistryError::Conflict { .. } => (StatusCode::CONFLICT, json!({"error": e.to_string()})),
                RegistryError::NotFound(_) => (StatusCode::NOT_FOUND, json!({"error": e.to_string()})),
                RegistryError::UnknownCredentialKind { supported, .. } => (
                    StatusCode::NOT_FOUND,
                    json!({"error": e.to_string(), "supportedKinds": supported}),
                ),
                _ => {
                    tracing::error!(error = %e, "Request failed");
                    internal_error()
                }
            },
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Request task failed");
                internal_error()
            }
        };
        (status, Json(body)).into_response()
    }
}

fn internal_error() -> (StatusCode, serde_json::Value) {
    (StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "internal error"}))
}
