//! Comparison results and composite reports.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MatchCriteria;

/// Where the player sits relative to the peer mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Above,
    Below,
    Equal,
}

/// Comparison of one player metric against the cohort aggregate.
///
/// Absent `delta`/`percentage`/`direction` mean the metric was not
/// comparable (no player value or no peer data). `percentage` is also
/// absent when the peer mean is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub metric: String,
    pub player_value: Option<f64>,
    pub peer_mean: Option<f64>,
    pub peer_count: u32,
    pub delta: Option<f64>,
    pub percentage: Option<f64>,
    pub direction: Option<Direction>,
}

impl ComparisonResult {
    pub fn is_comparable(&self) -> bool {
        self.delta.is_some()
    }
}

/// Comparisons for one test level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelReport {
    pub test_number: u32,

    /// Peers actually returned, which may be fewer than requested
    pub cohort_size: u32,

    pub comparisons: Vec<ComparisonResult>,
}

impl LevelReport {
    /// Look up one metric's comparison.
    pub fn comparison(&self, metric: &str) -> Option<&ComparisonResult> {
        self.comparisons.iter().find(|c| c.metric == metric)
    }
}

/// Why one test level produced no report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelFailure {
    pub message: String,

    /// Whether the caller should retry rather than adjust filters
    pub retryable: bool,
}

/// Outcome of one test level inside a multi-level report.
///
/// A failed level carries an error marker instead of voiding the levels
/// that did succeed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum LevelOutcome {
    Ok(LevelReport),
    Failed(LevelFailure),
}

impl LevelOutcome {
    pub fn report(&self) -> Option<&LevelReport> {
        match self {
            LevelOutcome::Ok(report) => Some(report),
            LevelOutcome::Failed(_) => None,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, LevelOutcome::Ok(_))
    }
}

/// Composite comparison across multiple test levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiLevelReport {
    pub player_id: String,

    /// Request generation that produced this report; callers discard
    /// reports from superseded generations
    pub generation: u64,

    /// The effective criteria shared by every level
    pub criteria: MatchCriteria,

    pub computed_at: DateTime<Utc>,

    /// Per-level outcomes keyed by test number
    pub levels: BTreeMap<u32, LevelOutcome>,
}

impl MultiLevelReport {
    pub fn succeeded_levels(&self) -> usize {
        self.levels.values().filter(|l| l.is_ok()).count()
    }

    pub fn failed_levels(&self) -> usize {
        self.levels.len() - self.succeeded_levels()
    }

    pub fn level(&self, test_number: u32) -> Option<&LevelOutcome> {
        self.levels.get(&test_number)
    }
}
