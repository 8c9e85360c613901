//! Configuration synthesis subsystem.
//!
//! # Data Flow
//! ```text
//! Endpoint snapshot (store.find_all)
//!     → aggregator.rs (virtual hosts + passthrough routes)
//!     → context.rs (template variables)
//!     → renderer.rs (minijinja, strict undefined)
//!     → publisher.rs (temp file + rename)
//!     → cluster.yaml, listener.yaml, mesh extension
//! ```
//!
//! # Design Decisions
//! - Every cycle recomputes every document from scratch; no diffing
//! - Templates are compiled once at startup
//! - Targets are independent; only the envoy documents are ordered

pub mod aggregator;
pub mod context;
pub mod error;
pub mod publisher;
pub mod renderer;
pub mod targets;

pub use aggregator::{aggregate, RouteEntry, VirtualHost};
pub use error::RenderError;
pub use renderer::TemplateRenderer;
pub use targets::{build_targets, ConfigTarget, EnvoyTarget, MeshExtensionTarget};
