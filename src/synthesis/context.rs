//! Render contexts for the generated documents.
//!
//! Field names are the template variables, serialized camelCase.

use serde::Serialize;

use crate::config::{EnvoyConfig, MeshExtensionConfig, MetaData};
use crate::model::{AuthType, Endpoint};
use crate::synthesis::aggregator::{aggregate, auth_types_in_use, RouteEntry, VirtualHost};

/// Context of the listener and cluster documents.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvoyContext {
    pub socket_address: String,
    pub socket_port: u16,
    pub auth_service_address: String,
    pub auth_service_port: u16,
    pub wasm_filter_path: Option<String>,
    pub virtual_hosts: Vec<VirtualHost>,
    /// Every route of every virtual host, passthrough routes included.
    pub endpoints: Vec<RouteEntry>,
    pub auth_types: Vec<AuthType>,
    /// The auth filter is only wired in when some endpoint needs it.
    pub enable_wasm_filter: bool,
}

impl EnvoyContext {
    pub fn build(config: &EnvoyConfig, endpoints: &[Endpoint]) -> Self {
        let virtual_hosts = aggregate(endpoints);
        let routes = virtual_hosts
            .iter()
            .flat_map(|host| host.routes.iter().cloned())
            .collect();
        let auth_types = auth_types_in_use(endpoints);

        Self {
            socket_address: config.socket_address.address.clone(),
            socket_port: config.socket_address.port,
            auth_service_address: config.external_auth.address.clone(),
            auth_service_port: config.external_auth.port,
            wasm_filter_path: config.wasm_filter_path.clone(),
            virtual_hosts,
            endpoints: routes,
            enable_wasm_filter: !auth_types.is_empty(),
            auth_types,
        }
    }
}

/// Paths registered under one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeshDomain {
    pub domain: String,
    pub paths: Vec<String>,
}

/// Domains protected by one auth type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshEndpoint {
    pub auth_type: AuthType,
    pub domains: Vec<MeshDomain>,
}

/// Context of the service-mesh extension document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshContext {
    pub extension_name: String,
    pub extension_namespace: String,
    pub auth_provider_name: String,
    pub selector_label: String,
    pub selector_value: String,
    pub filter_version: String,
    pub labels: Vec<MetaData>,
    pub annotations: Vec<MetaData>,
    pub mesh_endpoints: Vec<MeshEndpoint>,
}

impl MeshContext {
    pub fn build(config: &MeshExtensionConfig, endpoints: &[Endpoint]) -> Self {
        Self {
            extension_name: config.extension_name.clone(),
            extension_namespace: config.extension_namespace.clone(),
            auth_provider_name: config.auth_provider_name.clone(),
            selector_label: config.workload_selector.name.clone(),
            selector_value: config.workload_selector.value.clone(),
            filter_version: config.filter_version.clone(),
            labels: config.labels.clone(),
            annotations: config.annotations.clone(),
            mesh_endpoints: group_by_auth_type(endpoints),
        }
    }
}

/// authType → domain → paths, first-seen order at every level.
fn group_by_auth_type(endpoints: &[Endpoint]) -> Vec<MeshEndpoint> {
    let mut grouped: Vec<MeshEndpoint> = Vec::new();
    for endpoint in endpoints {
        let auth_type = endpoint.auth_type();
        let idx = match grouped.iter().position(|m| m.auth_type == auth_type) {
            Some(idx) => idx,
            None => {
                grouped.push(MeshEndpoint {
                    auth_type,
                    domains: Vec::new(),
                });
                grouped.len() - 1
            }
        };
        let domains = &mut grouped[idx].domains;
        match domains.iter_mut().find(|d| d.domain == endpoint.domain) {
            Some(domain) => domain.paths.push(endpoint.path.clone()),
            None => domains.push(MeshDomain {
                domain: endpoint.domain.clone(),
                paths: vec![endpoint.path.clone()],
            }),
        }
    }
    grouped
}
