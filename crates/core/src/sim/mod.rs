//! Simulation drivers.
//!
//! The engine itself only exposes `load` / `store`. This module holds the
//! access-event source that feeds it from recorded traces.

/// Trace parsing and replay with optional activation windows.
pub mod trace;

pub use trace::{ReplaySummary, TraceEvent, TraceReplayer};
