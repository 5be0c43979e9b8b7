//! podtune-controller — the closed loop.
//!
//! Each cycle runs strictly in order and to completion:
//!
//! ```text
//! SignalSource::sessions()        → u64 (0 when metrics are unavailable)
//! RuleSet::resolve(sessions)      → target limit
//! Orchestrator::current_limit()   → Option<String> (None when unknown)
//! reconcile(current, target)      → at most one resize patch
//! Ticker::wait()                  → fixed-delay or fixed-rate pause
//! ```
//!
//! Shutdown is only observed while waiting between cycles.

pub mod controller;
pub mod reconcile;
pub mod ticker;

pub use controller::{Controller, CycleReport};
pub use reconcile::{PatchOutcome, Reconciliation, reconcile};
pub use ticker::Ticker;
