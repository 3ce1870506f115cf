//! Effective match-criteria resolution.
//!
//! Fills unset criteria fields from the player's own profile so that an
//! empty filter still selects a sensible peer group: players of similar
//! age, handicap, and skill tier. Explicitly supplied fields always win.

use crate::models::{MatchCriteria, PlayerProfile};

/// Lower bound of the conventional handicap index range.
pub const HANDICAP_FLOOR: f64 = -10.0;

/// Upper bound of the conventional handicap index range.
pub const HANDICAP_CEILING: f64 = 54.0;

/// Half-width of the default age window around the player's own age.
const AGE_SPREAD: u32 = 2;

/// Half-width of the default handicap window around the player's own index.
const HANDICAP_SPREAD: f64 = 3.0;

/// Derive the effective criteria from an explicit filter and a profile.
///
/// Field by field: an explicit value is used verbatim; otherwise the
/// profile supplies a fallback. Age falls back to `[age - 2, age + 2]`
/// (floored at 0), handicap to `[handicap - 3, handicap + 3]` clamped to
/// the conventional index range. A field stays unset only when both the
/// filter and the profile are silent.
///
/// Pure and total: no I/O, no validation. Odd explicit inputs pass
/// through as given; strictness lives at the engine boundary.
pub fn resolve_criteria(explicit: &MatchCriteria, profile: &PlayerProfile) -> MatchCriteria {
    MatchCriteria {
        category: explicit
            .category
            .clone()
            .or_else(|| profile.category.clone()),
        gender: explicit.gender.clone().or_else(|| profile.gender.clone()),
        age_min: explicit
            .age_min
            .or_else(|| profile.age.map(|age| age.saturating_sub(AGE_SPREAD))),
        age_max: explicit.age_max.or_else(|| profile.age.map(|age| age + AGE_SPREAD)),
        handicap_min: explicit
            .handicap_min
            .or_else(|| profile.handicap.map(|h| (h - HANDICAP_SPREAD).max(HANDICAP_FLOOR))),
        handicap_max: explicit
            .handicap_max
            .or_else(|| profile.handicap.map(|h| (h + HANDICAP_SPREAD).min(HANDICAP_CEILING))),
    }
}
