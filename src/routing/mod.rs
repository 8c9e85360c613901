//! Auth routing subsystem.
//!
//! # Data Flow
//! ```text
//! Authorization filter query (domain, path)
//!     → resolver.rs (per-domain index cache)
//!     → index.rs (segment trie walk)
//!     → matcher.rs (segment-boundary prefix check)
//!     → Return: AuthConfig or not found
//! ```
//!
//! # Design Decisions
//! - Reads the endpoint store directly; independent of generated files
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same registry always resolves to the same endpoint
//! - Most specific registered path wins

pub mod index;
pub mod matcher;
pub mod resolver;

pub use index::PathIndex;
pub use resolver::{AuthConfig, AuthResolver};
