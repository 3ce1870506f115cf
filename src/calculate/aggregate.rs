//! Per-metric aggregation over a cohort.

use std::collections::BTreeMap;

use crate::models::{MetricAggregate, PeerRecord};

/// Compute sample count and arithmetic mean for each requested metric.
///
/// Exclusion is per metric, not per record: a peer missing one metric
/// still contributes to every metric it did record. Values are summed
/// in cohort order and divided once, so the same inputs always produce
/// the same aggregates.
pub fn aggregate(cohort: &[PeerRecord], metric_names: &[String]) -> BTreeMap<String, MetricAggregate> {
    let mut aggregates = BTreeMap::new();

    for name in metric_names {
        let mut sum = 0.0;
        let mut count = 0u32;

        for peer in cohort {
            if let Some(value) = peer.metric(name) {
                sum += value;
                count += 1;
            }
        }

        let mean = if count > 0 {
            Some(sum / count as f64)
        } else {
            None
        };

        aggregates.insert(name.clone(), MetricAggregate { count, mean });
    }

    aggregates
}
