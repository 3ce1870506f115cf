//! Cohort statistics and comparative scoring.
//!
//! Computes derived metrics from fetched peer data:
//! - Per-metric sample counts and means across a cohort
//! - Signed deltas and percentage deviations against the peer mean
//! - Directional classification (above/below/equal)

mod aggregate;
mod compare;

pub use aggregate::aggregate;
pub use compare::compare;
