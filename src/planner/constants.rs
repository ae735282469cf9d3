use std::collections::HashMap;
use std::sync::LazyLock;

use crate::models::{ProfileType, SpiceIndex};

// ─────────────────────────────────────────────────────────────────────────────
// Demographic consumption coefficients (fixed domain constants)
// ─────────────────────────────────────────────────────────────────────────────

/// Relative per-capita consumption of an adult male.
pub const MALE_CONSUMPTION: f64 = 1.0;

/// Relative per-capita consumption of an adult female.
pub const FEMALE_CONSUMPTION: f64 = 0.85;

/// Relative per-capita consumption of a child.
pub const CHILD_CONSUMPTION: f64 = 0.5;

// ─────────────────────────────────────────────────────────────────────────────
// Engine defaults (overridable through EngineConfig)
// ─────────────────────────────────────────────────────────────────────────────

/// Stomach ceiling: maximum edible grams served per person across the menu.
pub const DEFAULT_CAPACITY_GRAMS: f64 = 1000.0;

/// Smallest portion worth cooking, in grams per person.
pub const DEFAULT_MIN_PORTION_GRAMS: f64 = 5.0;

/// Category weight for menu categories matching no keyword.
pub const DEFAULT_CATEGORY_WEIGHT: f64 = 1.0;

/// Extra share given to fat/ghee ingredients when fat boost is on.
pub const DEFAULT_FAT_BOOST_PCT: f64 = 15.0;

/// Weight assumed for one discrete piece when the ingredient declares none.
pub const DEFAULT_PIECE_GRAMS: f64 = 50.0;

/// Consumption variance (percent) the trigger-gated batch waits for.
pub const DEFAULT_VARIANCE_THRESHOLD_PCT: f64 = 5.0;

/// Menu category keyword -> share weight. First match wins, so more
/// specific keywords come first.
pub const DEFAULT_CATEGORY_WEIGHTS: &[(&str, f64)] = &[
    ("main", 2.0),
    ("biryani", 1.75),
    ("rice", 1.5),
    ("bread", 1.0),
    ("dal", 1.0),
    ("starter", 0.75),
    ("soup", 0.75),
    ("dessert", 0.6),
    ("salad", 0.5),
    ("beverage", 0.5),
];

/// Ingredient category keywords treated as fat.
pub const DEFAULT_FAT_KEYWORDS: &[&str] = &["ghee", "oil", "fat", "butter"];

/// Ingredient category keywords treated as heat/sourness carriers.
pub const DEFAULT_SPICE_KEYWORDS: &[&str] = &["chili", "chilli", "tamarind", "spice", "masala"];

/// Default JIT schedule: (percentage, minutes after start, trigger-gated).
pub const DEFAULT_BATCH_SCHEDULE: &[(u32, i64, bool)] = &[(60, 0, false), (30, 60, false), (10, 120, true)];

/// Weighting exponent per profile. Below 1.0 flattens category weights
/// (variety), above 1.0 sharpens them (volume).
pub static PROFILE_EXPONENTS: LazyLock<HashMap<ProfileType, f64>> = LazyLock::new(|| {
    let mut m = HashMap::new();
    m.insert(ProfileType::Urban, 0.5);
    m.insert(ProfileType::Rural, 1.5);
    m
});

/// Spice-category share multiplier per spice index.
pub static SPICE_MULTIPLIERS: LazyLock<HashMap<SpiceIndex, f64>> = LazyLock::new(|| {
    let mut m = HashMap::new();
    m.insert(SpiceIndex::Low, 0.75);
    m.insert(SpiceIndex::Medium, 1.0);
    m.insert(SpiceIndex::High, 1.25);
    m
});

/// Get the default weighting exponent for a profile.
pub fn profile_exponent(profile: ProfileType) -> f64 {
    *PROFILE_EXPONENTS.get(&profile).unwrap_or(&1.0)
}

/// Get the default spice multiplier for a spice index.
pub fn spice_multiplier(spice: SpiceIndex) -> f64 {
    *SPICE_MULTIPLIERS.get(&spice).unwrap_or(&1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule_sums_to_hundred() {
        let total: u32 = DEFAULT_BATCH_SCHEDULE.iter().map(|(pct, _, _)| pct).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn test_profile_exponents() {
        assert!(profile_exponent(ProfileType::Urban) < 1.0);
        assert!(profile_exponent(ProfileType::Rural) > 1.0);
        assert_eq!(spice_multiplier(SpiceIndex::Medium), 1.0);
    }
}
