//! Period classification and aggregation.
//!
//! Responsibilities:
//!
//! - derive half-month cycles and fetch windows from a reference date
//! - partition daily records into named buckets per policy
//! - compute per-bucket totals, averages, and the best day

pub mod classify;
pub mod periods;
pub mod summary;

pub use classify::*;
pub use periods::*;
pub use summary::*;
