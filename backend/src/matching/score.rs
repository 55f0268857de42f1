//! Match scoring
//!
//! Computes the non-negative score of a (need, supply) pair. Category is
//! the gate: an unrelated supply scores 0 and is ineligible regardless of
//! distance or stock. The remaining factors only rank eligible candidates.
//!
//! Score composition:
//! - category: exact (case-insensitive) `1.0 x weight`, related `0.5 x weight`
//! - proximity: `max(0, 1 - distance/max_km) x weight`, skipped when either
//!   side has unknown coordinates
//! - stock ratio: `min(1, allocatable/remaining) x 0.2`
//! - expiring within 7 days: `+0.1` (move perishable stock first)

use chrono::{DateTime, Utc};

use crate::matching::engine::MatchingConfig;
use crate::models::need::Need;
use crate::models::supply::Supply;

/// Weight of the stock-ratio factor
const STOCK_RATIO_WEIGHT: f64 = 0.2;

/// Flat bonus for stock that expires within seven days
const EXPIRING_SOON_BONUS: f64 = 0.1;

/// Category families; members of one family are "related" to each other.
///
/// Matching is case-insensitive and symmetric within a group. Categories
/// outside every family can only match exactly.
const CATEGORY_FAMILIES: [&[&str]; 5] = [
    &["medical", "health", "firstaid", "medicine", "pharmaceutical"],
    &["food", "nutrition", "supplies", "rations", "emergency"],
    &["shelter", "housing", "tents", "blankets", "bedding"],
    &["water", "hydration", "sanitation", "hygiene"],
    &["equipment", "tools", "gear", "machinery"],
];

/// Whether two categories belong to the same family
pub fn categories_related(a: &str, b: &str) -> bool {
    let a = a.trim().to_ascii_lowercase();
    let b = b.trim().to_ascii_lowercase();

    CATEGORY_FAMILIES
        .iter()
        .any(|family| family.contains(&a.as_str()) && family.contains(&b.as_str()))
}

/// Category sub-score before weighting: 1.0 exact, 0.5 related, 0.0 unrelated
pub fn category_score(need_category: &str, supply_category: &str) -> f64 {
    if need_category.trim().eq_ignore_ascii_case(supply_category.trim()) {
        1.0
    } else if categories_related(need_category, supply_category) {
        0.5
    } else {
        0.0
    }
}

/// Full match score of a (need, supply) pair; 0.0 means ineligible
pub fn match_score(
    need: &Need,
    supply: &Supply,
    config: &MatchingConfig,
    now: DateTime<Utc>,
) -> f64 {
    let category = category_score(need.category(), supply.category());
    if category == 0.0 {
        return 0.0;
    }

    let mut score = category * config.category_match_weight;

    if let Some(distance) = need.location().distance_km(supply.storage_location()) {
        score +=
            (1.0 - distance / config.max_proximity_distance_km).max(0.0) * config.proximity_weight;
    }

    let remaining = need.remaining();
    if remaining > 0 {
        score += (f64::from(supply.allocatable()) / f64::from(remaining)).min(1.0)
            * STOCK_RATIO_WEIGHT;
    }

    if supply.is_expiring_soon(now) {
        score += EXPIRING_SOON_BONUS;
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::location::Location;
    use crate::models::need::PriorityLevel;
    use chrono::Duration;

    fn need_at(category: &str, required: u32, location: Location) -> Need {
        Need::new("n", category, PriorityLevel::Medium, required, "units", location)
    }

    fn supply_at(category: &str, available: u32, location: Location) -> Supply {
        Supply::new("s", category, available, "units", location)
    }

    #[test]
    fn test_exact_match_is_case_insensitive() {
        assert_eq!(category_score("medical", "Medical"), 1.0);
        assert_eq!(category_score("WATER", "water"), 1.0);
    }

    #[test]
    fn test_family_relations() {
        assert!(categories_related("Medical", "FirstAid"));
        assert!(categories_related("firstaid", "MEDICINE"));
        assert!(categories_related("Water", "Hygiene"));
        assert!(!categories_related("Medical", "Toys"));
        assert!(!categories_related("Toys", "Toys")); // unknown family; exact only
        assert_eq!(category_score("Medical", "FirstAid"), 0.5);
        assert_eq!(category_score("Medical", "Toys"), 0.0);
    }

    #[test]
    fn test_unrelated_category_is_ineligible() {
        let now = Utc::now();
        let need = need_at("Water", 10, Location::new(1.0, 1.0, "a"));
        let supply = supply_at("Toys", 100, Location::new(1.0, 1.0, "a"));
        assert_eq!(match_score(&need, &supply, &MatchingConfig::default(), now), 0.0);
    }

    #[test]
    fn test_unknown_coordinates_skip_proximity_only() {
        let now = Utc::now();
        let config = MatchingConfig::default();

        let need = need_at("Water", 10, Location::unknown("camp"));
        let supply = supply_at("Water", 10, Location::new(1.0, 1.0, "depot"));

        // exact category 0.5 + stock ratio 0.2, no proximity term
        let score = match_score(&need, &supply, &config, now);
        assert!((score - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_stock_ratio_caps_at_one() {
        let now = Utc::now();
        let config = MatchingConfig::default();
        let need = need_at("Food", 10, Location::unknown("camp"));

        let fits = supply_at("Food", 10, Location::unknown("depot"));
        let double = supply_at("Food", 20, Location::unknown("depot"));

        let a = match_score(&need, &fits, &config, now);
        let b = match_score(&need, &double, &config, now);
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn test_expiring_soon_bonus() {
        let now = Utc::now();
        let config = MatchingConfig::default();
        let need = need_at("Food", 10, Location::unknown("camp"));

        let fresh = supply_at("Food", 10, Location::unknown("depot"));
        let expiring = supply_at("Food", 10, Location::unknown("depot"))
            .with_expiration(now + Duration::days(3));

        let base = match_score(&need, &fresh, &config, now);
        let bumped = match_score(&need, &expiring, &config, now);
        assert!((bumped - base - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_proximity_decays_with_distance() {
        let now = Utc::now();
        let config = MatchingConfig::default();

        let need = need_at("Water", 10, Location::new(39.93, 32.85, "camp"));
        let near = supply_at("Water", 10, Location::new(39.93, 32.85, "next door"));
        // Istanbul is ~350 km from Ankara, past the 100 km cutoff
        let far = supply_at("Water", 10, Location::new(41.0, 28.98, "far depot"));

        let near_score = match_score(&need, &near, &config, now);
        let far_score = match_score(&need, &far, &config, now);

        assert!(near_score > far_score);
        // Beyond the cutoff the proximity term contributes nothing
        assert!((far_score - 0.7).abs() < 1e-9);
    }
}
