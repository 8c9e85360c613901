//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Compile templates → Wire components → First regeneration
//!     → Bind API listener
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → API stops accepting → scheduler worker exits → main returns
//! ```
//!
//! # Design Decisions
//! - One broadcast channel; every long-running task subscribes
//! - Pending regeneration timers are dropped on shutdown; the next start
//!   regenerates from the store anyway

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{Service, StartupError};
