//! Endpoint configuration service
//!
//! Sidecar control plane for an authenticating reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!     Registration API          ┌──────────────────────────────────────────────┐
//!     ──────────────────────────┼─▶ http ──▶ registry ──▶ store (rows)         │
//!                               │               │    └──▶ credentials (files)  │
//!                               │               ▼                              │
//!                               │           scheduler (debounced)              │
//!                               │               │                              │
//!                               │               ▼                              │
//!                               │           synthesis ──▶ cluster.yaml         │
//!                               │                     ──▶ listener.yaml ───────┼──▶ Envoy
//!                               │                     ──▶ mesh extension       │
//!                               │                                              │
//!     Auth lookup               │                                              │
//!     ──────────────────────────┼─▶ http ──▶ routing (longest prefix) ──▶ store│
//!                               └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use endpoint_config_service::config::{load_config, ServiceConfig};
use endpoint_config_service::http::ApiServer;
use endpoint_config_service::lifecycle::{signals, Service, Shutdown};
use endpoint_config_service::observability::{logging, metrics};
use endpoint_config_service::store::InMemoryEndpointStore;

#[derive(Parser)]
#[command(name = "endpoint-config-service")]
#[command(about = "Control plane for an authenticating reverse-proxy sidecar", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides the configured log level.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    let level = cli
        .log_level
        .as_deref()
        .unwrap_or(&config.observability.log_level);
    logging::init_logging(level);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "endpoint-config-service starting");
    tracing::info!(
        bind_address = %config.api.bind_address,
        envoy_enabled = config.envoy.enabled,
        mesh_extension_enabled = config.mesh_extension.enabled,
        update_delay_secs = config.general.update_delay_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let shutdown = Shutdown::new();
    let store = std::sync::Arc::new(InMemoryEndpointStore::new());
    let service = Service::build(&config, store, &shutdown)?;

    // The proxy needs documents before the first registration arrives.
    if let Err(e) = service.scheduler.run_now().await {
        tracing::warn!(error = %e, "Initial regeneration failed");
    }

    let listener = TcpListener::bind(&config.api.bind_address).await?;
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    let server = ApiServer::new(service.app_state());
    let result = server.run(listener, shutdown.clone()).await;

    shutdown.trigger();
    if let Err(e) = service.worker.await {
        tracing::error!(error = %e, "Regeneration worker ended abnormally");
    }

    result?;
    tracing::info!("Shutdown complete");
    Ok(())
}
