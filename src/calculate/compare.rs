//! Player-versus-cohort comparison.

use crate::models::{ComparisonResult, Direction, MetricAggregate};

/// Compare one player metric value against the cohort aggregate.
///
/// Never fails: when the player value or the peer mean is absent, the
/// result carries no delta, percentage, or direction and renders as
/// "insufficient data" downstream. The percentage deviation is rounded
/// to one decimal and is absent when the peer mean is zero, since a
/// percentage of zero is undefined.
///
/// `epsilon` widens the band treated as "equal": deltas within
/// `[-epsilon, epsilon]` classify as [`Direction::Equal`]. Zero keeps
/// exact equality.
pub fn compare(
    metric: &str,
    player_value: Option<f64>,
    aggregate: &MetricAggregate,
    epsilon: f64,
) -> ComparisonResult {
    let (Some(value), Some(mean)) = (player_value, aggregate.mean) else {
        return ComparisonResult {
            metric: metric.to_string(),
            player_value,
            peer_mean: aggregate.mean,
            peer_count: aggregate.count,
            delta: None,
            percentage: None,
            direction: None,
        };
    };

    let delta = value - mean;

    let percentage = if mean == 0.0 {
        None
    } else {
        Some(round_to_tenth((delta / mean) * 100.0))
    };

    let direction = if delta > epsilon {
        Direction::Above
    } else if delta < -epsilon {
        Direction::Below
    } else {
        Direction::Equal
    };

    ComparisonResult {
        metric: metric.to_string(),
        player_value: Some(value),
        peer_mean: Some(mean),
        peer_count: aggregate.count,
        delta: Some(delta),
        percentage,
        direction: Some(direction),
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
