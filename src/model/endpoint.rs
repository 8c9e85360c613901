//! Endpoint records and registration requests.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::auth::{AuthCredentials, AuthType, EndpointAuth};

pub const ROOT_PATH: &str = "/";
pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_HTTPS_PORT: u16 = 443;

/// A registered (domain, path) route with its upstream target and auth
/// configuration.
///
/// `id`, `domain`, `path` and `port` never change after creation. The secret
/// material of the auth method is not part of the record; it lives in the
/// credential store under `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub id: Uuid,
    pub domain: String,
    pub path: String,
    pub port: u16,
    pub target_port: u16,
    pub use_https: bool,
    #[serde(flatten)]
    pub auth: EndpointAuth,
}

impl Endpoint {
    pub fn auth_type(&self) -> AuthType {
        self.auth.auth_type()
    }
}

/// Inbound registration of a new endpoint. Optional fields are filled by
/// [`EndpointRegistration::resolve_defaults`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointRegistration {
    pub domain: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub target_port: Option<u16>,
    #[serde(default)]
    pub use_https: bool,
    #[serde(flatten)]
    pub credentials: AuthCredentials,
}

impl EndpointRegistration {
    pub fn auth_type(&self) -> AuthType {
        self.credentials.auth_type()
    }

    /// Path the endpoint will be stored under.
    pub fn effective_path(&self) -> &str {
        match self.path.as_deref() {
            Some(path) if !path.is_empty() => path,
            _ => ROOT_PATH,
        }
    }

    /// Upstream port: explicit target port, else the listen port, else the
    /// scheme default.
    pub fn effective_target_port(&self) -> u16 {
        self.target_port
            .or(self.port)
            .unwrap_or(if self.use_https { DEFAULT_HTTPS_PORT } else { DEFAULT_PORT })
    }

    /// Check the fields that end up in the generated proxy documents.
    pub fn validate(&self) -> Result<(), String> {
        if !is_valid_domain(&self.domain) {
            return Err(format!("domain '{}' is not a valid host name", self.domain));
        }
        let path = self.effective_path();
        if !is_valid_path(path) {
            return Err(format!("path '{path}' must start with '/' and contain no whitespace, quotes, '?' or '#'"));
        }
        Ok(())
    }

    /// Resolve defaults and build the record stored under `id`.
    pub fn resolve_defaults(&self, id: Uuid) -> Endpoint {
        Endpoint {
            id,
            domain: self.domain.clone(),
            path: self.effective_path().to_string(),
            port: self.port.unwrap_or(DEFAULT_PORT),
            target_port: self.effective_target_port(),
            use_https: self.use_https,
            auth: self.credentials.inline_auth(),
        }
    }
}

/// Dot separated labels of ASCII letters, digits and hyphens.
fn is_valid_domain(domain: &str) -> bool {
    !domain.is_empty()
        && domain.len() <= 253
        && domain.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
        })
}

fn is_valid_path(path: &str) -> bool {
    path.starts_with('/')
        && !path
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '"' | '\\' | '\'' | '?' | '#'))
}
