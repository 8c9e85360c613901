//! Auth types and their credential shapes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Auth methods an endpoint can be protected with.
///
/// New methods are added as variants; [`AuthType::ALL`] must list every
/// variant so startup validation can prove each one has a write service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AuthType {
    #[serde(rename = "iShare")]
    IShare,
}

impl AuthType {
    pub const ALL: &'static [AuthType] = &[AuthType::IShare];

    /// Wire name, as used in API bodies and rendered documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthType::IShare => "iShare",
        }
    }

    /// Credential kinds stored on disk for this auth type.
    pub fn credential_kinds(&self) -> &'static [CredentialKind] {
        match self {
            AuthType::IShare => &[CredentialKind::SigningKey, CredentialKind::CertificateChain],
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file-backed credential of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    SigningKey,
    CertificateChain,
}

impl CredentialKind {
    /// File name inside the endpoint's credential folder.
    pub fn file_name(&self) -> &'static str {
        match self {
            CredentialKind::SigningKey => "key.pem",
            CredentialKind::CertificateChain => "cert.cer",
        }
    }

    /// Name used by callers to address this credential.
    pub fn wire_name(&self) -> &'static str {
        match self {
            CredentialKind::SigningKey => "signingKey",
            CredentialKind::CertificateChain => "certificateChain",
        }
    }

    pub fn from_wire_name(name: &str) -> Option<Self> {
        match name {
            "signingKey" => Some(CredentialKind::SigningKey),
            "certificateChain" => Some(CredentialKind::CertificateChain),
            _ => None,
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Non-secret iShare settings stored inline on the endpoint record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IShareAuthInfo {
    #[serde(rename = "iShareClientId")]
    pub client_id: String,
    #[serde(rename = "iShareIdpId")]
    pub idp_id: String,
    #[serde(rename = "iShareIdpAddress")]
    pub idp_address: String,
    pub request_grant_type: String,
}

/// Inline auth configuration of an endpoint, one variant per [`AuthType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "authType")]
pub enum EndpointAuth {
    #[serde(rename = "iShare")]
    IShare(IShareAuthInfo),
}

impl EndpointAuth {
    pub fn auth_type(&self) -> AuthType {
        match self {
            EndpointAuth::IShare(_) => AuthType::IShare,
        }
    }
}

/// Credentials supplied on registration: inline settings plus the secret
/// material that ends up in the credential store.
///
/// Arrives as `"authType": "...", "authCredentials": {...}` next to the other
/// registration fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "authType", content = "authCredentials")]
pub enum AuthCredentials {
    #[serde(rename = "iShare")]
    IShare(IShareCredentials),
}

impl AuthCredentials {
    pub fn auth_type(&self) -> AuthType {
        match self {
            AuthCredentials::IShare(_) => AuthType::IShare,
        }
    }

    /// The part of the credentials that is stored on the endpoint record.
    pub fn inline_auth(&self) -> EndpointAuth {
        match self {
            AuthCredentials::IShare(creds) => EndpointAuth::IShare(creds.info.clone()),
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IShareCredentials {
    #[serde(flatten)]
    pub info: IShareAuthInfo,
    pub signing_key: String,
    pub certificate_chain: String,
}

// Keep the secret material out of logs.
impl fmt::Debug for IShareCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IShareCredentials")
            .field("info", &self.info)
            .field("signing_key", &"<redacted>")
            .field("certificate_chain", &"<redacted>")
            .finish()
    }
}
