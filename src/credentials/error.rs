//! Credential store errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

use crate::model::CredentialKind;

/// A single file that could not be removed during [`delete`].
///
/// [`delete`]: crate::credentials::FileCredentialStore::delete
#[derive(Debug)]
pub struct DeletionFailure {
    pub kind: CredentialKind,
    pub path: PathBuf,
    pub source: io::Error,
}

impl DeletionFailure {
    /// The file was already gone.
    pub fn is_not_found(&self) -> bool {
        self.source.kind() == io::ErrorKind::NotFound
    }
}

/// Errors raised by the file based credential store. Every filesystem
/// variant carries the failing path.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// `save` found an existing credential file for the id.
    #[error("credentials for {id} already exist")]
    AlreadyExists { id: Uuid },

    #[error("failed to create credential folder {}: {source}", path.display())]
    FolderCreation { path: PathBuf, source: io::Error },

    #[error("failed to create credential file {}: {source}", path.display())]
    FileCreation { path: PathBuf, source: io::Error },

    /// Refreshing an existing credential failed.
    #[error("failed to update credential file {}: {source}", path.display())]
    FileUpdate { path: PathBuf, source: io::Error },

    #[error("failed to delete {} credential file(s) in {}", failures.len(), folder.display())]
    Deletion {
        folder: PathBuf,
        failures: Vec<DeletionFailure>,
    },
}

impl CredentialError {
    /// True for a deletion error where every file was simply missing.
    pub fn is_already_absent(&self) -> bool {
        match self {
            CredentialError::Deletion { failures, .. } => {
                failures.iter().all(DeletionFailure::is_not_found)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_path() {
        let err = CredentialError::FileCreation {
            path: PathBuf::from("/certs/abc/key.pem"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/certs/abc/key.pem"));
    }

    #[test]
    fn test_already_absent() {
        let missing = |kind: CredentialKind| DeletionFailure {
            kind,
            path: PathBuf::from(kind.file_name()),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        let err = CredentialError::Deletion {
            folder: PathBuf::from("/certs/abc"),
            failures: vec![
                missing(CredentialKind::SigningKey),
                missing(CredentialKind::CertificateChain),
            ],
        };
        assert!(err.is_already_absent());
        assert!(err.to_string().contains("2 credential file(s)"));

        let err = CredentialError::Deletion {
            folder: PathBuf::from("/certs/abc"),
            failures: vec![DeletionFailure {
                kind: CredentialKind::SigningKey,
                path: PathBuf::from("key.pem"),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            }],
        };
        assert!(!err.is_already_absent());
    }
}
