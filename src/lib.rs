//! Endpoint configuration service library.
//!
//! Control plane of an authenticating reverse-proxy sidecar: keeps a
//! registry of protected endpoints, stores their credentials on disk and
//! regenerates the proxy's listener, cluster and mesh-extension documents
//! after every change.

pub mod config;
pub mod credentials;
pub mod http;
pub mod lifecycle;
pub mod model;
pub mod observability;
pub mod registry;
pub mod routing;
pub mod scheduler;
pub mod store;
pub mod synthesis;

pub use config::schema::ServiceConfig;
pub use http::ApiServer;
pub use lifecycle::{Service, Shutdown};
