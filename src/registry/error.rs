//! Registry errors.

use thiserror::Error;
use uuid::Uuid;

use crate::credentials::CredentialError;
use crate::model::AuthType;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// (domain, path) is already registered.
    #[error("an endpoint for {domain}{path} already exists")]
    Conflict { domain: String, path: String },

    /// Registration rejected before anything was stored.
    #[error("invalid registration: {0}")]
    Invalid(String),

    #[error("endpoint {0} not found")]
    NotFound(Uuid),

    /// No write service handles the auth type. A startup misconfiguration.
    #[error("no write service registered for auth type {0}")]
    UnsupportedAuthType(AuthType),

    #[error("unknown credential kind '{requested}', supported: {}", supported.join(", "))]
    UnknownCredentialKind {
        requested: String,
        supported: Vec<&'static str>,
    },

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
