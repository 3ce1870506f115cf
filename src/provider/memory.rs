//! In-memory peer-data provider.
//!
//! Serves a fixed player population from process memory. Used by tests
//! and by callers that already hold the peer data locally. Individual
//! tests can be marked unavailable to exercise failure isolation.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use super::{PeerDataProvider, ProviderError};
use crate::models::{MatchCriteria, MetricSnapshot, PeerRecord, PlayerProfile};

/// Peer-data provider over fixed in-memory data.
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    profiles: HashMap<String, PlayerProfile>,
    cohorts: HashMap<u32, Vec<PeerRecord>>,
    snapshots: HashMap<(String, u32), MetricSnapshot>,
    unavailable_tests: HashSet<u32>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, profile: PlayerProfile) -> Self {
        self.profiles.insert(profile.id.clone(), profile);
        self
    }

    /// Register the peer population for one test.
    pub fn with_peers(mut self, test_number: u32, peers: Vec<PeerRecord>) -> Self {
        self.cohorts.entry(test_number).or_default().extend(peers);
        self
    }

    pub fn with_snapshot(mut self, snapshot: MetricSnapshot) -> Self {
        self.snapshots.insert(
            (snapshot.player_id.clone(), snapshot.test_number),
            snapshot,
        );
        self
    }

    /// Make cohort fetches for one test fail with a retryable error.
    pub fn with_unavailable_test(mut self, test_number: u32) -> Self {
        self.unavailable_tests.insert(test_number);
        self
    }
}

#[async_trait]
impl PeerDataProvider for InMemoryProvider {
    async fn player_profile(&self, player_id: &str) -> Result<PlayerProfile, ProviderError> {
        self.profiles
            .get(player_id)
            .cloned()
            .ok_or_else(|| ProviderError::PlayerNotFound(player_id.to_string()))
    }

    async fn fetch_cohort(
        &self,
        player_id: &str,
        test_number: Option<u32>,
        criteria: &MatchCriteria,
        limit: u32,
    ) -> Result<Vec<PeerRecord>, ProviderError> {
        if let Some(test_number) = test_number {
            if self.unavailable_tests.contains(&test_number) {
                return Err(ProviderError::Unavailable(format!(
                    "test {} data store offline",
                    test_number
                )));
            }
        }

        // Without a test number, browse the whole registered population
        let mut seen = HashSet::new();
        let candidates: Vec<&PeerRecord> = match test_number {
            Some(test_number) => self
                .cohorts
                .get(&test_number)
                .map(|peers| peers.iter().collect())
                .unwrap_or_default(),
            None => self
                .cohorts
                .values()
                .flatten()
                .filter(|p| seen.insert(p.id.clone()))
                .collect(),
        };

        Ok(candidates
            .into_iter()
            .filter(|p| p.id != player_id)
            .filter(|p| criteria.matches(p))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn metric_snapshot(
        &self,
        player_id: &str,
        test_number: u32,
    ) -> Result<MetricSnapshot, ProviderError> {
        Ok(self
            .snapshots
            .get(&(player_id.to_string(), test_number))
            .cloned()
            .unwrap_or_else(|| MetricSnapshot::empty(player_id, test_number)))
    }
}
