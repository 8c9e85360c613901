//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Check that every enabled generator has template and output paths
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{AddressConfig, ServiceConfig};

/// A single semantic violation in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be a non-zero port")]
    ZeroPort { field: &'static str },

    #[error("{field} is not a valid socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("general.regeneration_timeout_secs must be greater than zero")]
    ZeroTimeout,
}

/// Check a loaded configuration, collecting every violation.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.general.regeneration_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    check_socket_addr(&mut errors, "api.bind_address", &config.api.bind_address);
    check_path(
        &mut errors,
        "credentials.certificate_folder_path",
        &config.credentials.certificate_folder_path,
    );

    if config.observability.metrics_enabled {
        check_socket_addr(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    let envoy = &config.envoy;
    if envoy.enabled {
        check_path(&mut errors, "envoy.listener_template", &envoy.listener_template);
        check_path(&mut errors, "envoy.cluster_template", &envoy.cluster_template);
        check_path(&mut errors, "envoy.listener_yaml_path", &envoy.listener_yaml_path);
        check_path(&mut errors, "envoy.cluster_yaml_path", &envoy.cluster_yaml_path);
        check_address(&mut errors, "envoy.socket_address", &envoy.socket_address);
        check_address(&mut errors, "envoy.external_auth", &envoy.external_auth);
    }

    let mesh = &config.mesh_extension;
    if mesh.enabled {
        check_path(&mut errors, "mesh_extension.template", &mesh.template);
        check_path(&mut errors, "mesh_extension.output_path", &mesh.output_path);
        if mesh.extension_name.is_empty() {
            errors.push(ValidationError::Empty {
                field: "mesh_extension.extension_name",
            });
        }
        if mesh.extension_namespace.is_empty() {
            errors.push(ValidationError::Empty {
                field: "mesh_extension.extension_namespace",
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_path(errors: &mut Vec<ValidationError>, field: &'static str, path: &Path) {
    if path.as_os_str().is_empty() {
        errors.push(ValidationError::Empty { field });
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, addr: &AddressConfig) {
    if addr.address.is_empty() {
        errors.push(ValidationError::Empty { field });
    }
    if addr.port == 0 {
        errors.push(ValidationError::ZeroPort { field });
    }
}

fn check_socket_addr(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
