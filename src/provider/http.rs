//! REST-backed peer-data provider.
//!
//! Talks to the product's player-records backend. Query parameters and
//! JSON fields are camelCase, matching the surrounding product. Non-2xx
//! responses, transport errors, and unreadable bodies all map to the
//! retryable unavailable kind; only a 404 on the profile endpoint means
//! the player does not exist.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode};
use tracing::debug;
use url::Url;

use super::{PeerDataProvider, ProviderError};
use crate::models::{MatchCriteria, MetricSnapshot, PeerRecord, PlayerProfile};

/// Configuration for the HTTP provider.
#[derive(Debug, Clone)]
pub struct HttpProviderConfig {
    /// Base URL of the backend API (e.g., `http://localhost:3000/api`)
    pub base_url: Url,

    /// Request timeout
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,
}

impl Default for HttpProviderConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("http://localhost:3000/api").expect("default base URL is valid"),
            timeout: Duration::from_secs(10),
            user_agent: concat!("peer-bench/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Peer-data provider over the backend REST API.
pub struct HttpPeerProvider {
    client: Client,
    config: HttpProviderConfig,
}

impl HttpPeerProvider {
    /// Create a new provider with the given configuration.
    pub fn new(config: HttpProviderConfig) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("peer-bench")),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a provider with default configuration.
    pub fn with_defaults() -> Result<Self, ProviderError> {
        Self::new(HttpProviderConfig::default())
    }

    /// Append path segments to the configured base URL.
    fn endpoint(&self, path: &str) -> Result<Url, ProviderError> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProviderError::Unavailable("base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(path.split('/'));
        Ok(url)
    }
}

/// Criteria fields as camelCase query parameters, skipping unset fields.
fn criteria_query(criteria: &MatchCriteria) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();

    if let Some(ref category) = criteria.category {
        query.push(("category", category.clone()));
    }
    if let Some(ref gender) = criteria.gender {
        query.push(("gender", gender.clone()));
    }
    if let Some(age_min) = criteria.age_min {
        query.push(("ageMin", age_min.to_string()));
    }
    if let Some(age_max) = criteria.age_max {
        query.push(("ageMax", age_max.to_string()));
    }
    if let Some(handicap_min) = criteria.handicap_min {
        query.push(("handicapMin", handicap_min.to_string()));
    }
    if let Some(handicap_max) = criteria.handicap_max {
        query.push(("handicapMax", handicap_max.to_string()));
    }

    query
}

#[async_trait]
impl PeerDataProvider for HttpPeerProvider {
    async fn player_profile(&self, player_id: &str) -> Result<PlayerProfile, ProviderError> {
        let url = self.endpoint(&format!("players/{}", player_id))?;
        debug!("Fetching profile for {}", player_id);

        let response = self.client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ProviderError::PlayerNotFound(player_id.to_string()));
        }
        if !response.status().is_success() {
            return Err(ProviderError::Unavailable(format!(
                "HTTP {} from profile endpoint",
                response.status()
            )));
        }

        response
            .json::<PlayerProfile>()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("unreadable profile response: {}", e)))
    }

    async fn fetch_cohort(
        &self,
        player_id: &str,
        test_number: Option<u32>,
        criteria: &MatchCriteria,
        limit: u32,
    ) -> Result<Vec<PeerRecord>, ProviderError> {
        let url = self.endpoint("peer-comparison/peer-group")?;

        let mut query = vec![("playerId", player_id.to_string())];
        if let Some(test_number) = test_number {
            query.push(("testNumber", test_number.to_string()));
        }
        query.extend(criteria_query(criteria));
        query.push(("limit", limit.to_string()));

        debug!(
            "Fetching cohort for {} (test {:?}, limit {})",
            player_id, test_number, limit
        );

        let response = self.client.get(url).query(&query).send().await?;

        if !response.status().is_success() {
            return Err(ProviderError::Unavailable(format!(
                "HTTP {} from peer-group endpoint",
                response.status()
            )));
        }

        response
            .json::<Vec<PeerRecord>>()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("unreadable peer-group response: {}", e)))
    }

    async fn metric_snapshot(
        &self,
        player_id: &str,
        test_number: u32,
    ) -> Result<MetricSnapshot, ProviderError> {
        let url = self.endpoint("peer-comparison")?;
        let query = [
            ("playerId", player_id.to_string()),
            ("testNumber", test_number.to_string()),
        ];

        debug!(
            "Fetching metric snapshot for {} (test {})",
            player_id, test_number
        );

        let response = self.client.get(url).query(&query).send().await?;

        // No snapshot recorded for this test: compare as "no data",
        // not as a failure
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(MetricSnapshot::empty(player_id, test_number));
        }
        if !response.status().is_success() {
            return Err(ProviderError::Unavailable(format!(
                "HTTP {} from comparison endpoint",
                response.status()
            )));
        }

        response
            .json::<MetricSnapshot>()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("unreadable snapshot response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_appends_to_base_path() {
        let provider = HttpPeerProvider::new(HttpProviderConfig {
            base_url: Url::parse("http://localhost:3000/api").unwrap(),
            ..Default::default()
        })
        .unwrap();

        let url = provider.endpoint("peer-comparison/peer-group").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/api/peer-comparison/peer-group"
        );
    }

    #[test]
    fn test_endpoint_with_trailing_slash_base() {
        let provider = HttpPeerProvider::new(HttpProviderConfig {
            base_url: Url::parse("http://localhost:3000/api/").unwrap(),
            ..Default::default()
        })
        .unwrap();

        let url = provider.endpoint("players/p-1").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/players/p-1");
    }

    #[test]
    fn test_criteria_query_skips_unset_fields() {
        let criteria = MatchCriteria {
            category: Some("B".to_string()),
            age_min: Some(28),
            age_max: Some(32),
            ..Default::default()
        };

        let query = criteria_query(&criteria);

        assert_eq!(
            query,
            vec![
                ("category", "B".to_string()),
                ("ageMin", "28".to_string()),
                ("ageMax", "32".to_string()),
            ]
        );
    }

    #[test]
    fn test_criteria_query_empty_criteria() {
        assert!(criteria_query(&MatchCriteria::default()).is_empty());
    }

    #[test]
    fn test_criteria_query_handicap_formatting() {
        let criteria = MatchCriteria {
            handicap_min: Some(7.0),
            handicap_max: Some(13.5),
            ..Default::default()
        };

        let query = criteria_query(&criteria);

        assert_eq!(
            query,
            vec![
                ("handicapMin", "7".to_string()),
                ("handicapMax", "13.5".to_string()),
            ]
        );
    }

    #[test]
    fn test_default_config() {
        let config = HttpProviderConfig::default();

        assert_eq!(config.base_url.as_str(), "http://localhost:3000/api");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.user_agent.starts_with("peer-bench/"));
    }
}
