//! Peer-matching criteria.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::PeerRecord;

/// Errors raised by strict criteria validation.
#[derive(Debug, Error, PartialEq)]
pub enum CriteriaError {
    #[error("age range is inverted: min {min} > max {max}")]
    InvertedAgeRange { min: u32, max: u32 },

    #[error("handicap range is inverted: min {min} > max {max}")]
    InvertedHandicapRange { min: f64, max: f64 },
}

/// The filter used to select a cohort of peers.
///
/// Every field is optional; unset fields place no constraint on the
/// cohort. Range bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCriteria {
    pub category: Option<String>,
    pub gender: Option<String>,
    pub age_min: Option<u32>,
    pub age_max: Option<u32>,
    pub handicap_min: Option<f64>,
    pub handicap_max: Option<f64>,
}

impl MatchCriteria {
    /// Reject inverted ranges (min > max) before any cohort query runs.
    pub fn validate(&self) -> Result<(), CriteriaError> {
        if let (Some(min), Some(max)) = (self.age_min, self.age_max) {
            if min > max {
                return Err(CriteriaError::InvertedAgeRange { min, max });
            }
        }

        if let (Some(min), Some(max)) = (self.handicap_min, self.handicap_max) {
            if min > max {
                return Err(CriteriaError::InvertedHandicapRange { min, max });
            }
        }

        Ok(())
    }

    /// Whether a peer record satisfies every set field.
    ///
    /// A record missing an attribute that a bound constrains does not
    /// match: a peer with no recorded age cannot be confirmed inside an
    /// age range.
    pub fn matches(&self, peer: &PeerRecord) -> bool {
        if let Some(ref category) = self.category {
            let ok = peer
                .category
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(category));
            if !ok {
                return false;
            }
        }

        if let Some(ref gender) = self.gender {
            let ok = peer
                .gender
                .as_deref()
                .is_some_and(|g| g.eq_ignore_ascii_case(gender));
            if !ok {
                return false;
            }
        }

        if self.age_min.is_some() || self.age_max.is_some() {
            let Some(age) = peer.age else {
                return false;
            };
            if self.age_min.is_some_and(|min| age < min) {
                return false;
            }
            if self.age_max.is_some_and(|max| age > max) {
                return false;
            }
        }

        if self.handicap_min.is_some() || self.handicap_max.is_some() {
            let Some(handicap) = peer.handicap else {
                return false;
            };
            if self.handicap_min.is_some_and(|min| handicap < min) {
                return false;
            }
            if self.handicap_max.is_some_and(|max| handicap > max) {
                return false;
            }
        }

        true
    }
}
