//! Per-auth-type write services.
//!
//! # Responsibilities
//! - Persist the secret part of a registration in the credential store
//! - Remove and refresh those secrets
//!
//! # Design Decisions
//! - One service per [`AuthType`], looked up through [`AuthHandlers`]
//! - [`AuthHandlers::new`] proves every variant in [`AuthType::ALL`] has a
//!   service, so a missing handler fails startup instead of a request

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::credentials::{CredentialError, FileCredentialStore};
use crate::model::{AuthCredentials, AuthType, CredentialKind, Endpoint, EndpointRegistration};
use crate::registry::error::RegistryError;

/// Auth-type specific side of the endpoint lifecycle.
pub trait EndpointWriteService: Send + Sync {
    fn auth_type(&self) -> AuthType;

    /// Store the credentials of a new endpoint. Partially written state is
    /// removed before an error is returned.
    fn create_endpoint(&self, id: Uuid, registration: &EndpointRegistration) -> Result<(), RegistryError>;

    fn delete_endpoint(&self, endpoint: &Endpoint) -> Result<(), CredentialError>;

    fn update_credential(&self, endpoint: &Endpoint, kind: CredentialKind, body: &str) -> Result<(), RegistryError>;
}

/// iShare endpoints: signing key and certificate chain on disk.
pub struct IShareWriteService {
    credentials: Arc<FileCredentialStore>,
}

impl IShareWriteService {
    pub fn new(credentials: Arc<FileCredentialStore>) -> Self {
        Self { credentials }
    }
}

impl EndpointWriteService for IShareWriteService {
    fn auth_type(&self) -> AuthType {
        AuthType::IShare
    }

    fn create_endpoint(&self, id: Uuid, registration: &EndpointRegistration) -> Result<(), RegistryError> {
        match &registration.credentials {
            AuthCredentials::IShare(creds) => {
                self.credentials
                    .save(id, &creds.signing_key, &creds.certificate_chain)?;
            }
        }
        Ok(())
    }

    fn delete_endpoint(&self, endpoint: &Endpoint) -> Result<(), CredentialError> {
        self.credentials.delete(endpoint.id)
    }

    fn update_credential(&self, endpoint: &Endpoint, kind: CredentialKind, body: &str) -> Result<(), RegistryError> {
        match kind {
            CredentialKind::SigningKey => self.credentials.update_key(endpoint.id, body)?,
            CredentialKind::CertificateChain => self.credentials.update_cert_chain(endpoint.id, body)?,
        }
        Ok(())
    }
}

/// Write service lookup by auth type.
pub struct AuthHandlers {
    handlers: HashMap<AuthType, Arc<dyn EndpointWriteService>>,
}

impl AuthHandlers {
    /// Fails with [`RegistryError::UnsupportedAuthType`] for the first auth
    /// type without a service.
    pub fn new(services: Vec<Arc<dyn EndpointWriteService>>) -> Result<Self, RegistryError> {
        let handlers: HashMap<_, _> = services
            .into_iter()
            .map(|service| (service.auth_type(), service))
            .collect();

        if let Some(missing) = AuthType::ALL.iter().find(|t| !handlers.contains_key(t)) {
            return Err(RegistryError::UnsupportedAuthType(*missing));
        }
        Ok(Self { handlers })
    }

    pub fn for_type(&self, auth_type: AuthType) -> Result<&Arc<dyn EndpointWriteService>, RegistryError> {
        self.handlers
            .get(&auth_type)
            .ok_or(RegistryError::UnsupportedAuthType(auth_type))
    }
}
