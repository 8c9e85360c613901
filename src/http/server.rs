//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum Router with all handlers
//! - Wire up the trace layer
//! - Serve until the shutdown coordinator fires

use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::lifecycle::Shutdown;
use crate::registry::EndpointRegistry;
use crate::routing::AuthResolver;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<EndpointRegistry>,
    pub resolver: Arc<AuthResolver>,
}

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/endpoint",
            get(handlers::list_endpoints).post(handlers::create_endpoint),
        )
        .route(
            "/endpoint/{id}",
            get(handlers::get_endpoint).delete(handlers::delete_endpoint),
        )
        .route("/endpoint/{id}/credential/{kind}", put(handlers::update_credential))
        .route("/auth", get(handlers::get_auth))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Registration and auth lookup API.
pub struct ApiServer {
    router: Router,
}

impl ApiServer {
    pub fn new(state: AppState) -> Self {
        Self {
            router: build_router(state),
        }
    }

    /// Serve on `listener` until `shutdown` is triggered.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "API server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.signalled())
            .await?;

        tracing::info!("API server stopped");
        Ok(())
    }
}
