//! Generated documents.
//!
//! # Responsibilities
//! - Own the compiled templates of one generator
//! - Render the full document set from an endpoint snapshot
//! - Publish the documents in dependency order
//!
//! # Design Decisions
//! - Every document of a target is rendered before any is written, so a
//!   render failure leaves the previous set in place
//! - Envoy reloads clusters and listeners independently: the cluster
//!   document is always published first, a listener must never reference a
//!   cluster the proxy has not seen yet

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{EnvoyConfig, MeshExtensionConfig};
use crate::model::Endpoint;
use crate::synthesis::context::{EnvoyContext, MeshContext};
use crate::synthesis::error::RenderError;
use crate::synthesis::publisher::write_atomic;
use crate::synthesis::renderer::TemplateRenderer;

const LISTENER_TEMPLATE: &str = "listener";
const CLUSTER_TEMPLATE: &str = "cluster";
const MESH_TEMPLATE: &str = "mesh-extension";

/// A set of documents regenerated from the full endpoint set.
pub trait ConfigTarget: Send + Sync {
    /// Short name used in logs and metric labels.
    fn name(&self) -> &str;

    /// Render and publish every document of this target.
    fn regenerate(&self, endpoints: &[Endpoint]) -> Result<(), RenderError>;
}

/// Envoy cluster and listener documents.
pub struct EnvoyTarget {
    renderer: TemplateRenderer,
    config: EnvoyConfig,
}

impl EnvoyTarget {
    /// Compile the configured template files.
    pub fn from_config(config: &EnvoyConfig) -> Result<Self, RenderError> {
        let mut renderer = TemplateRenderer::new();
        renderer.load_template(LISTENER_TEMPLATE, &config.listener_template)?;
        renderer.load_template(CLUSTER_TEMPLATE, &config.cluster_template)?;
        Ok(Self {
            renderer,
            config: config.clone(),
        })
    }

    /// Build from in-memory template sources.
    pub fn with_templates(
        config: &EnvoyConfig,
        listener: impl Into<String>,
        cluster: impl Into<String>,
    ) -> Result<Self, RenderError> {
        let mut renderer = TemplateRenderer::new();
        renderer.add_template(LISTENER_TEMPLATE, listener)?;
        renderer.add_template(CLUSTER_TEMPLATE, cluster)?;
        Ok(Self {
            renderer,
            config: config.clone(),
        })
    }
}

impl ConfigTarget for EnvoyTarget {
    fn name(&self) -> &str {
        "envoy"
    }

    fn regenerate(&self, endpoints: &[Endpoint]) -> Result<(), RenderError> {
        let ctx = EnvoyContext::build(&self.config, endpoints);
        let cluster = self.renderer.render(CLUSTER_TEMPLATE, &ctx)?;
        let listener = self.renderer.render(LISTENER_TEMPLATE, &ctx)?;

        write_atomic(&self.config.cluster_yaml_path, &cluster)?;
        write_atomic(&self.config.listener_yaml_path, &listener)?;

        tracing::info!(
            virtual_hosts = ctx.virtual_hosts.len(),
            routes = ctx.endpoints.len(),
            cluster = %self.config.cluster_yaml_path.display(),
            listener = %self.config.listener_yaml_path.display(),
            "Envoy configuration published"
        );
        Ok(())
    }
}

/// Service-mesh extension document.
pub struct MeshExtensionTarget {
    renderer: TemplateRenderer,
    config: MeshExtensionConfig,
}

impl MeshExtensionTarget {
    pub fn from_config(config: &MeshExtensionConfig) -> Result<Self, RenderError> {
        let mut renderer = TemplateRenderer::new();
        renderer.load_template(MESH_TEMPLATE, &config.template)?;
        Ok(Self {
            renderer,
            config: config.clone(),
        })
    }

    pub fn with_template(config: &MeshExtensionConfig, template: impl Into<String>) -> Result<Self, RenderError> {
        let mut renderer = TemplateRenderer::new();
        renderer.add_template(MESH_TEMPLATE, template)?;
        Ok(Self {
            renderer,
            config: config.clone(),
        })
    }

    pub fn output_path(&self) -> &PathBuf {
        &self.config.output_path
    }
}

impl ConfigTarget for MeshExtensionTarget {
    fn name(&self) -> &str {
        "mesh_extension"
    }

    fn regenerate(&self, endpoints: &[Endpoint]) -> Result<(), RenderError> {
        let ctx = MeshContext::build(&self.config, endpoints);
        let document = self.renderer.render(MESH_TEMPLATE, &ctx)?;
        write_atomic(&self.config.output_path, &document)?;

        tracing::info!(
            auth_types = ctx.mesh_endpoints.len(),
            file = %self.config.output_path.display(),
            "Mesh extension published"
        );
        Ok(())
    }
}

/// Targets enabled by `config`, templates compiled. Compile errors are
/// startup errors.
pub fn build_targets(
    envoy: &EnvoyConfig,
    mesh: &MeshExtensionConfig,
) -> Result<Vec<Arc<dyn ConfigTarget>>, RenderError> {
    let mut targets: Vec<Arc<dyn ConfigTarget>> = Vec::new();
    if envoy.enabled {
        targets.push(Arc::new(EnvoyTarget::from_config(envoy)?));
    }
    if mesh.enabled {
        targets.push(Arc::new(MeshExtensionTarget::from_config(mesh)?));
    }
    Ok(targets)
}
