//! Credential persistence subsystem.
//!
//! # Data Flow
//! ```text
//! registration (signing key + certificate chain)
//!     → store.rs save(id, ...)   → {root}/{id}/key.pem, cert.cer
//! credential update
//!     → store.rs update_*(id)    → overwrite one file
//! endpoint deletion
//!     → store.rs delete(id)      → remove both files and the folder
//! ```
//!
//! # Design Decisions
//! - Independent of the endpoint store; no shared transaction
//! - Creation failures are compensated locally and then propagated so the
//!   caller can undo its registry write
//! - Error kinds separate creation, update and deletion failures

pub mod error;
pub mod store;

pub use error::{CredentialError, DeletionFailure};
pub use store::FileCredentialStore;
