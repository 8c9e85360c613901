//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate the configuration, compile templates, check auth handlers
//! - Create the credential root
//! - Wire store, credential store, resolver, scheduler and registry
//!
//! # Design Decisions
//! - Fail fast: template and handler errors are fatal
//! - The listener is bound by the caller, after the first regeneration

use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;

use crate::config::validation::validate_config;
use crate::config::{ConfigError, ServiceConfig};
use crate::credentials::FileCredentialStore;
use crate::http::AppState;
use crate::lifecycle::Shutdown;
use crate::registry::{AuthHandlers, EndpointRegistry, EndpointWriteService, IShareWriteService, RegistryError};
use crate::routing::AuthResolver;
use crate::scheduler::RegenerationScheduler;
use crate::store::EndpointStore;
use crate::synthesis::{build_targets, RenderError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("template error: {0}")]
    Render(#[from] RenderError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("failed to create credential root: {0}")]
    Io(#[from] std::io::Error),
}

/// The wired control plane.
pub struct Service {
    pub registry: Arc<EndpointRegistry>,
    pub resolver: Arc<AuthResolver>,
    pub scheduler: Arc<RegenerationScheduler>,
    /// Regeneration worker; finishes after shutdown.
    pub worker: JoinHandle<()>,
}

impl Service {
    /// Build every component. Must run inside a tokio runtime.
    pub fn build(
        config: &ServiceConfig,
        store: Arc<dyn EndpointStore>,
        shutdown: &Shutdown,
    ) -> Result<Self, StartupError> {
        validate_config(config).map_err(ConfigError::Validation)?;

        let targets = build_targets(&config.envoy, &config.mesh_extension)?;
        if targets.is_empty() {
            tracing::warn!("No configuration target enabled, regeneration is a no-op");
        }

        std::fs::create_dir_all(&config.credentials.certificate_folder_path)?;
        let credentials = Arc::new(FileCredentialStore::new(
            config.credentials.certificate_folder_path.clone(),
        ));
        tracing::info!(folder = %credentials.root().display(), "Credential store ready");
        let handlers = AuthHandlers::new(vec![
            Arc::new(IShareWriteService::new(credentials)) as Arc<dyn EndpointWriteService>
        ])?;

        let resolver = Arc::new(AuthResolver::new(store.clone()));
        let (scheduler, worker) = RegenerationScheduler::spawn(
            store.clone(),
            targets,
            config.general.update_delay(),
            config.general.regeneration_timeout(),
            shutdown.subscribe(),
        );
        let scheduler = Arc::new(scheduler);
        let registry = Arc::new(EndpointRegistry::new(
            store,
            handlers,
            scheduler.clone(),
            resolver.clone(),
        ));

        Ok(Self {
            registry,
            resolver,
            scheduler,
            worker,
        })
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            registry: self.registry.clone(),
            resolver: self.resolver.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryEndpointStore;

    fn config_in(dir: &std::path::Path) -> ServiceConfig {
        let templates = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("templates");
        let mut config = ServiceConfig::default();
        config.envoy.listener_template = templates.join("listener.yaml.j2");
        config.envoy.cluster_template = templates.join("cluster.yaml.j2");
        config.envoy.listener_yaml_path = dir.join("listener.yaml");
        config.envoy.cluster_yaml_path = dir.join("cluster.yaml");
        config.credentials.certificate_folder_path = dir.join("certs");
        config
    }

    #[tokio::test]
    async fn test_build_creates_credential_root() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        let service = Service::build(&config, Arc::new(InMemoryEndpointStore::new()), &Shutdown::new()).unwrap();

        assert!(dir.path().join("certs").is_dir());
        assert!(service.registry.list_endpoints().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_config_fails_startup() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.general.regeneration_timeout_secs = 0;

        let err = Service::build(&config, Arc::new(InMemoryEndpointStore::new()), &Shutdown::new())
            .err()
            .unwrap();

        assert!(matches!(err, StartupError::Config(ConfigError::Validation(_))));
    }

    #[tokio::test]
    async fn test_missing_template_fails_startup() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.envoy.listener_template = dir.path().join("missing.j2");

        let err = Service::build(&config, Arc::new(InMemoryEndpointStore::new()), &Shutdown::new())
            .err()
            .unwrap();

        assert!(matches!(err, StartupError::Render(_)));
    }
}
