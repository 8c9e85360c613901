//! HTTP API subsystem.
//!
//! # Data Flow
//! ```text
//! Operator / auth filter request
//!     → server.rs (axum Router, TraceLayer)
//!     → handlers.rs (extract, call registry or resolver)
//!     → error.rs (RegistryError → status code + JSON body)
//! ```
//!
//! # Design Decisions
//! - Mutations run on the blocking pool: they touch the filesystem
//! - The auth lookup stays on the async path, it is in-memory only

pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, ApiServer, AppState};
