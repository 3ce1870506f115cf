//! Per-metric descriptive statistics.

use serde::{Deserialize, Serialize};

/// Sample count and arithmetic mean for one metric across a cohort.
///
/// When no peer contributed a value, `count` is 0 and `mean` is absent.
/// A missing mean is "insufficient data", never a zero value, and must
/// not enter a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricAggregate {
    pub count: u32,
    pub mean: Option<f64>,
}

impl MetricAggregate {
    /// Aggregate over an empty sample.
    pub fn empty() -> Self {
        Self {
            count: 0,
            mean: None,
        }
    }

    pub fn has_data(&self) -> bool {
        self.count > 0
    }
}

impl Default for MetricAggregate {
    fn default() -> Self {
        Self::empty()
    }
}
