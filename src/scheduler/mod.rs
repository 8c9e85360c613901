//! Debounced configuration regeneration.
//!
//! # Data Flow
//! ```text
//! Registry mutation
//!     → schedule_config_update() (returns immediately)
//!     → delay timer task (one per call, never cancelled)
//!     → tick channel
//!     → single worker: store snapshot → every target, one at a time
//! ```
//!
//! # Design Decisions
//! - Bursts may produce several runs; each run re-reads the full store, so
//!   extra runs only rewrite identical documents
//! - No retry: a failed run waits for the next mutation
//! - A failed, timed-out or panicking run is logged and counted, the worker
//!   keeps serving later ticks

pub mod regeneration;

pub use regeneration::RegenerationScheduler;

/// Entry point the mutation path uses to request a regeneration.
pub trait UpdateScheduler: Send + Sync {
    /// Enqueue a regeneration after the configured delay. Never blocks on
    /// the regeneration itself.
    fn schedule_config_update(&self);
}
