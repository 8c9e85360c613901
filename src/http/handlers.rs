//! Request handlers.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::model::{Endpoint, EndpointRegistration, ROOT_PATH};

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn create_endpoint(
    State(state): State<AppState>,
    Json(registration): Json<EndpointRegistration>,
) -> Result<Response, ApiError> {
    let registry = state.registry.clone();
    let endpoint = tokio::task::spawn_blocking(move || registry.create_endpoint(registration)).await??;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, endpoint.id.to_string())],
        Json(endpoint),
    )
        .into_response())
}

pub async fn list_endpoints(State(state): State<AppState>) -> Result<Json<Vec<Endpoint>>, ApiError> {
    Ok(Json(state.registry.list_endpoints()?))
}

pub async fn get_endpoint(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Endpoint>, ApiError> {
    Ok(Json(state.registry.get_endpoint(id)?))
}

pub async fn delete_endpoint(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let registry = state.registry.clone();
    tokio::task::spawn_blocking(move || registry.delete_endpoint(id)).await??;
    Ok(StatusCode::NO_CONTENT)
}

/// Body is the raw credential (PEM text), not JSON.
pub async fn update_credential(
    State(state): State<AppState>,
    Path((id, kind)): Path<(Uuid, String)>,
    body: String,
) -> Result<StatusCode, ApiError> {
    let registry = state.registry.clone();
    tokio::task::spawn_blocking(move || registry.update_credential(id, &kind, &body)).await??;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct AuthQuery {
    pub domain: String,
    #[serde(default)]
    pub path: Option<String>,
}

/// Auth configuration for the external authorization filter. 404 means
/// "attach no authorization".
pub async fn get_auth(State(state): State<AppState>, Query(query): Query<AuthQuery>) -> Result<Response, ApiError> {
    let path = query.path.as_deref().unwrap_or(ROOT_PATH);
    match state.resolver.resolve(&query.domain, path)? {
        Some(config) => Ok(Json(config).into_response()),
        None => Ok((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "no auth configuration for domain and path"})),
        )
            .into_response()),
    }
}
