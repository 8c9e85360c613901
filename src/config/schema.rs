//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the endpoint configuration service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Regeneration timing.
    pub general: GeneralConfig,

    /// Registration and auth lookup API.
    pub api: ApiConfig,

    /// Envoy listener/cluster generation.
    pub envoy: EnvoyConfig,

    /// Service-mesh extension generation.
    pub mesh_extension: MeshExtensionConfig,

    /// Credential file storage.
    pub credentials: CredentialsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// General settings shared by all generators.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Delay between a registry mutation and the regeneration it triggers.
    pub update_delay_secs: u64,

    /// Upper bound for a single regeneration run of one target.
    pub regeneration_timeout_secs: u64,
}

impl GeneralConfig {
    pub fn update_delay(&self) -> Duration {
        Duration::from_secs(self.update_delay_secs)
    }

    pub fn regeneration_timeout(&self) -> Duration {
        Duration::from_secs(self.regeneration_timeout_secs)
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            update_delay_secs: 5,
            regeneration_timeout_secs: 30,
        }
    }
}

/// HTTP API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// An address/port pair rendered into the proxy documents.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct AddressConfig {
    pub address: String,
    pub port: u16,
}

/// Envoy document generation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EnvoyConfig {
    /// Generate listener.yaml and cluster.yaml.
    pub enabled: bool,

    /// Template source for the listener document.
    pub listener_template: PathBuf,

    /// Template source for the cluster document.
    pub cluster_template: PathBuf,

    /// Output path of the listener document.
    pub listener_yaml_path: PathBuf,

    /// Output path of the cluster document.
    pub cluster_yaml_path: PathBuf,

    /// Absolute path of the cached-auth wasm filter inside the proxy.
    pub wasm_filter_path: Option<String>,

    /// Address envoy listens on. Usually 0.0.0.0 in a shared network
    /// namespace, localhost inside a single container.
    pub socket_address: AddressConfig,

    /// Address of the external authorization service.
    pub external_auth: AddressConfig,
}

impl Default for EnvoyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            listener_template: PathBuf::from("templates/listener.yaml.j2"),
            cluster_template: PathBuf::from("templates/cluster.yaml.j2"),
            listener_yaml_path: PathBuf::from("/envoy/listener.yaml"),
            cluster_yaml_path: PathBuf::from("/envoy/cluster.yaml"),
            wasm_filter_path: Some("/cache-filter/cache-filter.wasm".to_string()),
            socket_address: AddressConfig {
                address: "0.0.0.0".to_string(),
                port: 15001,
            },
            external_auth: AddressConfig {
                address: "auth-provider".to_string(),
                port: 7070,
            },
        }
    }
}

/// A name/value metadata entry (label, annotation or selector).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct MetaData {
    pub name: String,
    pub value: String,
}

/// Service-mesh extension generation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MeshExtensionConfig {
    /// Generate the mesh extension document.
    pub enabled: bool,

    /// Template source for the extension document.
    pub template: PathBuf,

    /// Output path of the extension document.
    pub output_path: PathBuf,

    /// Name of the extension resource.
    pub extension_name: String,

    /// Namespace the extension is deployed into.
    pub extension_namespace: String,

    /// Mesh address of the auth provider, e.g. `outbound|80||ext-authz`.
    pub auth_provider_name: String,

    /// Label selecting the workload the extension applies to.
    pub workload_selector: MetaData,

    /// Version of the filter referenced by the extension.
    pub filter_version: String,

    /// Labels applied to the extension's metadata.
    pub labels: Vec<MetaData>,

    /// Annotations applied to the extension's metadata.
    pub annotations: Vec<MetaData>,
}

impl Default for MeshExtensionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            template: PathBuf::from("templates/service-mesh-extension.yaml.j2"),
            output_path: PathBuf::from("/mesh/service-mesh-extension.yaml"),
            extension_name: "endpoint-auth-filter".to_string(),
            extension_namespace: "default".to_string(),
            auth_provider_name: "outbound|80||ext-authz".to_string(),
            workload_selector: MetaData {
                name: "app".to_string(),
                value: "sidecar".to_string(),
            },
            filter_version: "1.0.0".to_string(),
            labels: Vec::new(),
            annotations: Vec::new(),
        }
    }
}

/// Credential storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Root folder; every endpoint gets a sub-folder named by its id.
    pub certificate_folder_path: PathBuf,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            certificate_folder_path: PathBuf::from("/certs"),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: ServiceConfig = toml::from_str(
            r#"
            [credentials]
            certificate_folder_path = "/tmp/certs"
            "#,
        )
        .unwrap();

        assert_eq!(config.general.update_delay_secs, 5);
        assert_eq!(config.envoy.socket_address.port, 15001);
        assert!(!config.mesh_extension.enabled);
        assert_eq!(
            config.credentials.certificate_folder_path,
            PathBuf::from("/tmp/certs")
        );
    }

    #[test]
    fn test_mesh_metadata_lists() {
        let config: ServiceConfig = toml::from_str(
            r#"
            [mesh_extension]
            enabled = true
            labels = [{ name = "team", value = "data" }]
            annotations = [{ name = "owner", value = "ops" }]
            workload_selector = { name = "app", value = "broker" }
            "#,
        )
        .unwrap();

        assert_eq!(config.mesh_extension.labels.len(), 1);
        assert_eq!(config.mesh_extension.annotations[0].value, "ops");
        assert_eq!(config.mesh_extension.workload_selector.value, "broker");
    }
}
