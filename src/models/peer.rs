//! Cohort member records and player metric snapshots.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single cohort member, supplied by the upstream peer provider.
///
/// Read-only input: the engine never mutates or persists peer records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerRecord {
    pub id: String,

    /// Display name
    pub name: String,

    pub age: Option<u32>,

    pub handicap: Option<f64>,

    pub category: Option<String>,

    pub gender: Option<String>,

    /// Metric name to measured value for the test under comparison
    #[serde(default)]
    pub metrics: HashMap<String, f64>,
}

impl PeerRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            age: None,
            handicap: None,
            category: None,
            gender: None,
            metrics: HashMap::new(),
        }
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_handicap(mut self, handicap: f64) -> Self {
        self.handicap = Some(handicap);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    pub fn with_metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(name.into(), value);
        self
    }

    /// Value for one metric, if this peer recorded it.
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}

/// A player's own metric values for one test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSnapshot {
    pub player_id: String,

    pub test_number: u32,

    #[serde(default)]
    pub metrics: HashMap<String, f64>,
}

impl MetricSnapshot {
    /// Snapshot with no recorded values; every metric compares as
    /// "not comparable" rather than zero.
    pub fn empty(player_id: impl Into<String>, test_number: u32) -> Self {
        Self {
            player_id: player_id.into(),
            test_number,
            metrics: HashMap::new(),
        }
    }

    pub fn with_metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(name.into(), value);
        self
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peer_metric_lookup() {
        let peer = PeerRecord::new("peer-1", "Alice")
            .with_metric("driverSpeed", 95.0)
            .with_metric("puttingSuccess", 0.8);

        assert_eq!(peer.metric("driverSpeed"), Some(95.0));
        assert_eq!(peer.metric("chipAccuracy"), None);
    }

    #[test]
    fn test_peer_deserializes_without_metrics() {
        let peer: PeerRecord =
            serde_json::from_str(r#"{"id":"peer-1","name":"Alice","age":30}"#).unwrap();

        assert_eq!(peer.age, Some(30));
        assert!(peer.metrics.is_empty());
    }

    #[test]
    fn test_snapshot_empty() {
        let snapshot = MetricSnapshot::empty("p-1", 3);

        assert_eq!(snapshot.test_number, 3);
        assert!(snapshot.metrics.is_empty());
        assert_eq!(snapshot.metric("driverSpeed"), None);
    }

    #[test]
    fn test_snapshot_serialization_camel_case() {
        let snapshot = MetricSnapshot::empty("p-1", 2).with_metric("driverSpeed", 100.0);
        let json = serde_json::to_string(&snapshot).unwrap();

        assert!(json.contains("\"playerId\":\"p-1\""));
        assert!(json.contains("\"testNumber\":2"));

        let parsed: MetricSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }
}
