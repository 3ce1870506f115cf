//! Comparison orchestration.
//!
//! Runs the full pipeline for a request: resolve effective criteria from
//! the filter and the player's profile, fetch the cohort and the player's
//! own metrics, aggregate, and compare. Multi-level requests fan the
//! per-level pipelines out concurrently and merge outcomes keyed by test
//! number; a failed level degrades to an error marker instead of hiding
//! the levels that succeeded.

mod generation;

pub use generation::{GenerationCounter, LatestReport};

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::calculate::{aggregate, compare};
use crate::models::{
    CriteriaError, LevelFailure, LevelOutcome, LevelReport, MatchCriteria, MultiLevelReport,
    PeerRecord,
};
use crate::provider::{PeerDataProvider, ProviderError};
use crate::resolve::resolve_criteria;

/// Errors that abort a whole comparison request.
///
/// Per-level and per-metric problems never surface here; they degrade to
/// markers inside the report instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("invalid criteria: {0}")]
    Criteria(#[from] CriteriaError),
}

/// Engine tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum peers requested per cohort
    #[serde(default = "default_cohort_limit")]
    pub cohort_limit: u32,

    /// Tolerance below which a delta classifies as "equal"
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
}

fn default_cohort_limit() -> u32 {
    20
}

fn default_epsilon() -> f64 {
    0.0
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cohort_limit: default_cohort_limit(),
            epsilon: default_epsilon(),
        }
    }
}

/// The benchmarking engine.
///
/// Stateless apart from the request generation counter and the
/// latest-wins report slot; cheap to clone and safe to share.
#[derive(Clone)]
pub struct Engine {
    provider: Arc<dyn PeerDataProvider>,
    config: EngineConfig,
    generations: Arc<GenerationCounter>,
    latest: Arc<LatestReport>,
}

impl Engine {
    pub fn new(provider: Arc<dyn PeerDataProvider>, config: EngineConfig) -> Self {
        Self {
            provider,
            config,
            generations: Arc::new(GenerationCounter::new()),
            latest: Arc::new(LatestReport::new()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The freshest completed multi-level report, if any.
    pub fn latest_report(&self) -> Option<MultiLevelReport> {
        self.latest.latest()
    }

    /// Effective criteria for a player: explicit fields win, the profile
    /// fills the rest. Inverted ranges are rejected before any cohort
    /// query runs.
    pub async fn resolve_for_player(
        &self,
        player_id: &str,
        explicit: &MatchCriteria,
    ) -> Result<MatchCriteria, EngineError> {
        explicit.validate()?;

        let profile = self.provider.player_profile(player_id).await?;
        let resolved = resolve_criteria(explicit, &profile);

        // An explicit bound mixed with a profile-derived one can still
        // produce an inverted range
        resolved.validate()?;

        Ok(resolved)
    }

    /// Resolve criteria and fetch the matching peer sample.
    pub async fn peer_group(
        &self,
        player_id: &str,
        explicit: &MatchCriteria,
        test_number: Option<u32>,
        limit: Option<u32>,
    ) -> Result<(MatchCriteria, Vec<PeerRecord>), EngineError> {
        let criteria = self.resolve_for_player(player_id, explicit).await?;
        let limit = limit.unwrap_or(self.config.cohort_limit);

        let peers = self
            .provider
            .fetch_cohort(player_id, test_number, &criteria, limit)
            .await?;

        info!(
            "Peer group for {}: {} peer(s) (limit {})",
            player_id,
            peers.len(),
            limit
        );

        Ok((criteria, peers))
    }

    /// Run the fetch-aggregate-compare pipeline for one test level.
    ///
    /// Metric names are the union of the player's snapshot and the
    /// cohort's recorded metrics, so a metric only the peers have still
    /// shows up as "not comparable" rather than disappearing.
    pub async fn compare_level(
        &self,
        player_id: &str,
        test_number: u32,
        criteria: &MatchCriteria,
    ) -> Result<LevelReport, ProviderError> {
        let (cohort, snapshot) = tokio::try_join!(
            self.provider.fetch_cohort(
                player_id,
                Some(test_number),
                criteria,
                self.config.cohort_limit
            ),
            self.provider.metric_snapshot(player_id, test_number),
        )?;

        let mut names: BTreeSet<String> = snapshot.metrics.keys().cloned().collect();
        for peer in &cohort {
            names.extend(peer.metrics.keys().cloned());
        }
        let names: Vec<String> = names.into_iter().collect();

        let aggregates = aggregate(&cohort, &names);

        let comparisons = names
            .iter()
            .map(|name| {
                compare(
                    name,
                    snapshot.metric(name),
                    &aggregates[name],
                    self.config.epsilon,
                )
            })
            .collect();

        debug!(
            "Compared test {} for {}: {} peer(s), {} metric(s)",
            test_number,
            player_id,
            cohort.len(),
            names.len()
        );

        Ok(LevelReport {
            test_number,
            cohort_size: cohort.len() as u32,
            comparisons,
        })
    }

    /// Resolve criteria once and compare a single test level.
    pub async fn compare_single(
        &self,
        player_id: &str,
        test_number: u32,
        explicit: &MatchCriteria,
    ) -> Result<(MatchCriteria, LevelReport), EngineError> {
        let criteria = self.resolve_for_player(player_id, explicit).await?;
        let report = self.compare_level(player_id, test_number, &criteria).await?;
        Ok((criteria, report))
    }

    /// Compare the player against their peers across several test levels.
    ///
    /// Criteria are resolved once and shared; the per-level pipelines run
    /// concurrently and merge in any order. One level failing to fetch
    /// does not abort the others: the report carries a per-level marker
    /// with the retryable flag preserved.
    pub async fn compare_across_levels(
        &self,
        player_id: &str,
        test_numbers: &[u32],
        explicit: &MatchCriteria,
    ) -> Result<MultiLevelReport, EngineError> {
        let generation = self.generations.next();
        let criteria = self.resolve_for_player(player_id, explicit).await?;

        info!(
            "Multi-level comparison for {} across {} test(s) (generation {})",
            player_id,
            test_numbers.len(),
            generation
        );

        let mut handles = Vec::with_capacity(test_numbers.len());
        for &test_number in test_numbers {
            let engine = self.clone();
            let player_id = player_id.to_string();
            let criteria = criteria.clone();
            handles.push((
                test_number,
                tokio::spawn(async move {
                    engine
                        .compare_level(&player_id, test_number, &criteria)
                        .await
                }),
            ));
        }

        let mut levels = BTreeMap::new();
        for (test_number, handle) in handles {
            let outcome = match handle.await {
                Ok(Ok(report)) => LevelOutcome::Ok(report),
                Ok(Err(err)) => {
                    warn!("Test {} comparison failed: {}", test_number, err);
                    LevelOutcome::Failed(LevelFailure {
                        message: err.to_string(),
                        retryable: err.is_retryable(),
                    })
                }
                Err(err) => {
                    warn!("Test {} comparison task panicked: {}", test_number, err);
                    LevelOutcome::Failed(LevelFailure {
                        message: format!("comparison task failed: {}", err),
                        retryable: false,
                    })
                }
            };
            levels.insert(test_number, outcome);
        }

        let report = MultiLevelReport {
            player_id: player_id.to_string(),
            generation,
            criteria,
            computed_at: Utc::now(),
            levels,
        };

        self.latest.offer(report.clone());

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::{Direction, MetricSnapshot, PlayerProfile};
    use crate::provider::memory::InMemoryProvider;

    fn driver_speed_cohort() -> Vec<PeerRecord> {
        vec![
            PeerRecord::new("peer-1", "Alice")
                .with_age(29)
                .with_handicap(8.0)
                .with_category("B")
                .with_metric("driverSpeed", 90.0),
            PeerRecord::new("peer-2", "Bob")
                .with_age(31)
                .with_handicap(11.0)
                .with_category("B")
                .with_metric("driverSpeed", 95.0),
            PeerRecord::new("peer-3", "Cara")
                .with_age(30)
                .with_handicap(12.5)
                .with_category("B")
                .with_metric("driverSpeed", 100.0),
        ]
    }

    fn engine_with(provider: InMemoryProvider) -> Engine {
        Engine::new(Arc::new(provider), EngineConfig::default())
    }

    #[tokio::test]
    async fn test_end_to_end_driver_speed() {
        let provider = InMemoryProvider::new()
            .with_profile(
                PlayerProfile::new("p-1")
                    .with_category("B")
                    .with_age(30)
                    .with_handicap(10.0),
            )
            .with_peers(1, driver_speed_cohort())
            .with_snapshot(MetricSnapshot::empty("p-1", 1).with_metric("driverSpeed", 100.0));
        let engine = engine_with(provider);

        let (criteria, report) = engine
            .compare_single("p-1", 1, &MatchCriteria::default())
            .await
            .unwrap();

        assert_eq!(criteria.category.as_deref(), Some("B"));
        assert_eq!(criteria.age_min, Some(28));
        assert_eq!(criteria.age_max, Some(32));
        assert_eq!(criteria.handicap_min, Some(7.0));
        assert_eq!(criteria.handicap_max, Some(13.0));

        assert_eq!(report.cohort_size, 3);
        let result = report.comparison("driverSpeed").unwrap();
        assert_eq!(result.peer_mean, Some(95.0));
        assert_eq!(result.peer_count, 3);
        assert_eq!(result.delta, Some(5.0));
        assert_eq!(result.percentage, Some(5.3));
        assert_eq!(result.direction, Some(Direction::Above));
    }

    #[tokio::test]
    async fn test_empty_cohort_degrades_to_not_comparable() {
        let provider = InMemoryProvider::new()
            .with_profile(PlayerProfile::new("p-1").with_category("ELITE"))
            .with_snapshot(MetricSnapshot::empty("p-1", 1).with_metric("driverSpeed", 100.0));
        let engine = engine_with(provider);

        let (_, report) = engine
            .compare_single("p-1", 1, &MatchCriteria::default())
            .await
            .unwrap();

        assert_eq!(report.cohort_size, 0);
        let result = report.comparison("driverSpeed").unwrap();
        assert_eq!(result.player_value, Some(100.0));
        assert_eq!(result.peer_count, 0);
        assert!(!result.is_comparable());
    }

    #[tokio::test]
    async fn test_peer_only_metric_is_reported_as_not_comparable() {
        let provider = InMemoryProvider::new()
            .with_profile(PlayerProfile::new("p-1"))
            .with_peers(
                1,
                vec![PeerRecord::new("peer-1", "Alice").with_metric("chipAccuracy", 0.7)],
            );
        let engine = engine_with(provider);

        let (_, report) = engine
            .compare_single("p-1", 1, &MatchCriteria::default())
            .await
            .unwrap();

        let result = report.comparison("chipAccuracy").unwrap();
        assert_eq!(result.player_value, None);
        assert_eq!(result.peer_mean, Some(0.7));
        assert!(!result.is_comparable());
    }

    #[tokio::test]
    async fn test_multi_level_partial_failure_isolation() {
        let provider = InMemoryProvider::new()
            .with_profile(PlayerProfile::new("p-1").with_age(30))
            .with_peers(1, driver_speed_cohort())
            .with_peers(3, driver_speed_cohort())
            .with_unavailable_test(2)
            .with_snapshot(MetricSnapshot::empty("p-1", 1).with_metric("driverSpeed", 100.0))
            .with_snapshot(MetricSnapshot::empty("p-1", 3).with_metric("driverSpeed", 92.0));
        let engine = engine_with(provider);

        let report = engine
            .compare_across_levels("p-1", &[1, 2, 3], &MatchCriteria::default())
            .await
            .unwrap();

        assert_eq!(report.levels.len(), 3);
        assert_eq!(report.succeeded_levels(), 2);
        assert_eq!(report.failed_levels(), 1);

        assert!(report.level(1).unwrap().is_ok());
        assert!(report.level(3).unwrap().is_ok());
        match report.level(2).unwrap() {
            LevelOutcome::Failed(failure) => assert!(failure.retryable),
            LevelOutcome::Ok(_) => panic!("level 2 should have failed"),
        }
    }

    #[tokio::test]
    async fn test_generations_increment_and_latest_wins() {
        let provider = InMemoryProvider::new()
            .with_profile(PlayerProfile::new("p-1").with_age(30))
            .with_peers(1, driver_speed_cohort());
        let engine = engine_with(provider);

        let first = engine
            .compare_across_levels("p-1", &[1], &MatchCriteria::default())
            .await
            .unwrap();
        let second = engine
            .compare_across_levels("p-1", &[1], &MatchCriteria::default())
            .await
            .unwrap();

        assert_eq!(first.generation, 1);
        assert_eq!(second.generation, 2);
        assert_eq!(engine.latest_report().unwrap().generation, 2);
    }

    #[tokio::test]
    async fn test_inverted_explicit_range_is_rejected() {
        let provider = InMemoryProvider::new().with_profile(PlayerProfile::new("p-1"));
        let engine = engine_with(provider);

        let explicit = MatchCriteria {
            age_min: Some(40),
            age_max: Some(30),
            ..Default::default()
        };

        let result = engine.compare_single("p-1", 1, &explicit).await;
        assert!(matches!(result, Err(EngineError::Criteria(_))));
    }

    #[tokio::test]
    async fn test_mixed_explicit_and_fallback_inversion_is_rejected() {
        // Explicit age_min above the profile-derived age_max
        let provider = InMemoryProvider::new().with_profile(PlayerProfile::new("p-1").with_age(30));
        let engine = engine_with(provider);

        let explicit = MatchCriteria {
            age_min: Some(40),
            ..Default::default()
        };

        let result = engine.resolve_for_player("p-1", &explicit).await;
        assert!(matches!(result, Err(EngineError::Criteria(_))));
    }

    #[tokio::test]
    async fn test_unknown_player_propagates_not_found() {
        let engine = engine_with(InMemoryProvider::new());

        let result = engine
            .compare_across_levels("ghost", &[1], &MatchCriteria::default())
            .await;

        match result {
            Err(EngineError::Provider(err)) => assert!(!err.is_retryable()),
            other => panic!("expected a provider error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_peer_group_respects_limit_override() {
        let provider = InMemoryProvider::new()
            .with_profile(PlayerProfile::new("p-1"))
            .with_peers(1, driver_speed_cohort());
        let engine = engine_with(provider);

        let (_, peers) = engine
            .peer_group("p-1", &MatchCriteria::default(), None, Some(2))
            .await
            .unwrap();

        assert_eq!(peers.len(), 2);
    }

    #[tokio::test]
    async fn test_epsilon_from_config_reaches_comparisons() {
        let provider = InMemoryProvider::new()
            .with_profile(PlayerProfile::new("p-1"))
            .with_peers(
                1,
                vec![PeerRecord::new("peer-1", "Alice").with_metric("handicap", 10.0)],
            )
            .with_snapshot(MetricSnapshot::empty("p-1", 1).with_metric("handicap", 10.3));
        let engine = Engine::new(
            Arc::new(provider),
            EngineConfig {
                epsilon: 0.5,
                ..Default::default()
            },
        );

        let (_, report) = engine
            .compare_single("p-1", 1, &MatchCriteria::default())
            .await
            .unwrap();

        assert_eq!(
            report.comparison("handicap").unwrap().direction,
            Some(Direction::Equal)
        );
    }
}
