//! Player profile attributes.

use serde::{Deserialize, Serialize};

/// Identity and descriptive attributes of a player.
///
/// Owned by the upstream player-record system; used here as the fallback
/// seed when a caller leaves match-criteria fields unset. Immutable for
/// the duration of a comparison request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    /// Player identifier
    pub id: String,

    /// Skill tier (e.g., "ELITE")
    pub category: Option<String>,

    pub gender: Option<String>,

    /// Age in whole years
    pub age: Option<u32>,

    /// Handicap index, conventionally -10 to 54
    pub handicap: Option<f64>,
}

impl PlayerProfile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category: None,
            gender: None,
            age: None,
            handicap: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_handicap(mut self, handicap: f64) -> Self {
        self.handicap = Some(handicap);
        self
    }
}
