//! Endpoint registration subsystem.
//!
//! # Data Flow
//! ```text
//! API request (create / delete / update credential)
//!     → service.rs (uniqueness, default resolution, rollback)
//!     → EndpointStore (row)
//!     → write_service.rs (auth-type specific credential files)
//!     → AuthResolver::invalidate + UpdateScheduler::schedule_config_update
//! ```

pub mod error;
pub mod service;
pub mod write_service;

pub use error::RegistryError;
pub use service::EndpointRegistry;
pub use write_service::{AuthHandlers, EndpointWriteService, IShareWriteService};
