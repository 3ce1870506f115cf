//! Request generation tracking.
//!
//! Every multi-level request is stamped with a monotonically increasing
//! generation number, and the report embeds the generation that produced
//! it. The latest-wins slot keeps only the freshest report, so a slow
//! response from a superseded request can never clobber a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::models::MultiLevelReport;

/// Monotonically increasing request generation counter.
#[derive(Debug, Default)]
pub struct GenerationCounter(AtomicU64);

impl GenerationCounter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Allocate the next generation, starting from 1.
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// The most recently allocated generation (0 before the first).
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Latest-wins slot for completed reports.
#[derive(Debug, Default)]
pub struct LatestReport {
    inner: Mutex<Option<MultiLevelReport>>,
}

impl LatestReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `report` unless a fresher generation is already held.
    /// Returns false when the report was discarded as stale.
    pub fn offer(&self, report: MultiLevelReport) -> bool {
        let mut slot = self.inner.lock().unwrap();
        match slot.as_ref() {
            Some(held) if held.generation > report.generation => false,
            _ => {
                *slot = Some(report);
                true
            }
        }
    }

    pub fn latest(&self) -> Option<MultiLevelReport> {
        self.inner.lock().unwrap().clone()
    }

    pub fn latest_generation(&self) -> Option<u64> {
        self.inner.lock().unwrap().as_ref().map(|r| r.generation)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;

    use super::*;
    use crate::models::MatchCriteria;

    fn report(generation: u64) -> MultiLevelReport {
        MultiLevelReport {
            player_id: "p-1".to_string(),
            generation,
            criteria: MatchCriteria::default(),
            computed_at: Utc::now(),
            levels: BTreeMap::new(),
        }
    }

    #[test]
    fn test_counter_is_monotonic() {
        let counter = GenerationCounter::new();

        assert_eq!(counter.current(), 0);
        assert_eq!(counter.next(), 1);
        assert_eq!(counter.next(), 2);
        assert_eq!(counter.next(), 3);
        assert_eq!(counter.current(), 3);
    }

    #[test]
    fn test_slot_starts_empty() {
        let slot = LatestReport::new();

        assert!(slot.latest().is_none());
        assert!(slot.latest_generation().is_none());
    }

    #[test]
    fn test_fresher_report_replaces_older() {
        let slot = LatestReport::new();

        assert!(slot.offer(report(1)));
        assert!(slot.offer(report(2)));
        assert_eq!(slot.latest_generation(), Some(2));
    }

    #[test]
    fn test_stale_report_is_discarded() {
        let slot = LatestReport::new();

        assert!(slot.offer(report(5)));
        // A superseded request finishing late must not win
        assert!(!slot.offer(report(3)));
        assert_eq!(slot.latest_generation(), Some(5));
    }

    #[test]
    fn test_same_generation_is_accepted() {
        let slot = LatestReport::new();

        assert!(slot.offer(report(4)));
        assert!(slot.offer(report(4)));
        assert_eq!(slot.latest_generation(), Some(4));
    }
}
