//! Upstream peer-data provider contract.
//!
//! The engine does not own the player population; it defines the query
//! shape (criteria + limit) and treats every response as an unordered,
//! possibly truncated sample. Implementations: [`http::HttpPeerProvider`]
//! against the product's REST backend, [`memory::InMemoryProvider`] for
//! tests and offline use.

pub mod http;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{MatchCriteria, MetricSnapshot, PeerRecord, PlayerProfile};

/// Errors surfaced by a peer-data provider.
///
/// An unreachable provider is a retryable condition and must never be
/// conflated with an empty cohort, which is a valid zero-length result.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("peer data provider unavailable: {0}")]
    Unavailable(String),

    #[error("player not found: {0}")]
    PlayerNotFound(String),
}

impl ProviderError {
    /// Whether the caller should retry rather than adjust its request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::Unavailable(_))
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Unavailable(err.to_string())
    }
}

/// Read-only access to player records, peer populations, and metric
/// snapshots. Safe to query concurrently; the engine never writes.
#[async_trait]
pub trait PeerDataProvider: Send + Sync {
    /// The player's own profile, used to seed criteria fallbacks.
    async fn player_profile(&self, player_id: &str) -> Result<PlayerProfile, ProviderError>;

    /// Peers satisfying the criteria, capped at `limit`. With a test
    /// number, records carry that test's metrics; without one, this is a
    /// plain population browse.
    ///
    /// The requesting player is excluded. An empty vector means no peers
    /// matched and is a valid outcome, not an error.
    async fn fetch_cohort(
        &self,
        player_id: &str,
        test_number: Option<u32>,
        criteria: &MatchCriteria,
        limit: u32,
    ) -> Result<Vec<PeerRecord>, ProviderError>;

    /// The player's own metric values for one test. A player with no
    /// recorded values yields an empty snapshot.
    async fn metric_snapshot(
        &self,
        player_id: &str,
        test_number: u32,
    ) -> Result<MetricSnapshot, ProviderError>;
}
