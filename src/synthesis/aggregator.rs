//! Endpoint → virtual host aggregation.
//!
//! # Responsibilities
//! - Group endpoints by domain (first-seen order)
//! - Collect the distinct listen ports of each domain
//! - Inject a passthrough route at `/` for domains without a root endpoint
//!
//! # Design Decisions
//! - Pure function of the endpoint set, no state between cycles
//! - Route entries always carry every field (null when absent) so templates
//!   rendered with strict undefined handling can test them

use std::collections::HashMap;

use serde::Serialize;

use crate::model::{AuthType, Endpoint, ROOT_PATH};

/// Id of the synthesized root route; also the name of its cluster.
pub const PASSTHROUGH_ID: &str = "passthrough";

/// Marker rendered for routes that reach their upstream over TLS.
const HTTPS_MARKER: &str = "https";

/// One route of a virtual host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEntry {
    pub id: String,
    pub domain: String,
    pub path: String,
    pub port: u16,
    pub target_port: u16,
    pub https_port: Option<&'static str>,
    pub auth_type: Option<AuthType>,
    pub passthrough: bool,
}

impl RouteEntry {
    fn from_endpoint(endpoint: &Endpoint) -> Self {
        Self {
            id: endpoint.id.to_string(),
            domain: endpoint.domain.clone(),
            path: endpoint.path.clone(),
            port: endpoint.port,
            target_port: endpoint.target_port,
            https_port: endpoint.use_https.then_some(HTTPS_MARKER),
            auth_type: Some(endpoint.auth_type()),
            passthrough: false,
        }
    }

    /// Root route forwarding unregistered traffic without authorization.
    fn passthrough(domain: &str) -> Self {
        Self {
            id: PASSTHROUGH_ID.to_string(),
            domain: domain.to_string(),
            path: ROOT_PATH.to_string(),
            port: 0,
            target_port: 0,
            https_port: None,
            auth_type: None,
            passthrough: true,
        }
    }
}

/// All routes of one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VirtualHost {
    pub domain: String,
    /// Distinct listen ports, first-seen order.
    pub ports: Vec<u16>,
    pub routes: Vec<RouteEntry>,
}

/// Build the virtual hosts for the full endpoint set.
pub fn aggregate(endpoints: &[Endpoint]) -> Vec<VirtualHost> {
    let mut hosts: Vec<VirtualHost> = Vec::new();
    let mut by_domain: HashMap<&str, usize> = HashMap::new();

    for endpoint in endpoints {
        let slot = *by_domain.entry(endpoint.domain.as_str()).or_insert_with(|| {
            hosts.push(VirtualHost {
                domain: endpoint.domain.clone(),
                ports: Vec::new(),
                routes: Vec::new(),
            });
            hosts.len() - 1
        });
        let host = &mut hosts[slot];
        if !host.ports.contains(&endpoint.port) {
            host.ports.push(endpoint.port);
        }
        host.routes.push(RouteEntry::from_endpoint(endpoint));
    }

    for host in &mut hosts {
        if !host.routes.iter().any(|r| r.path == ROOT_PATH) {
            host.routes.push(RouteEntry::passthrough(&host.domain));
        }
    }
    hosts
}

/// Distinct auth types in use, first-seen order.
pub fn auth_types_in_use(endpoints: &[Endpoint]) -> Vec<AuthType> {
    let mut types = Vec::new();
    for endpoint in endpoints {
        let auth_type = endpoint.auth_type();
        if !types.contains(&auth_type) {
            types.push(auth_type);
        }
    }
    types
}
