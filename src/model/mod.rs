//! Endpoint data model shared by the registry, the generators and the
//! resolver.

pub mod auth;
pub mod endpoint;

pub use auth::{AuthCredentials, AuthType, CredentialKind, EndpointAuth, IShareAuthInfo, IShareCredentials};
pub use endpoint::{Endpoint, EndpointRegistration, ROOT_PATH};
