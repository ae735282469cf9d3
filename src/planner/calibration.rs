use crate::config::EngineConfig;
use crate::models::ContextSettings;

/// How an ingredient reacts to context settings, derived from its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngredientClass {
    Fat,
    Spice,
    Neutral,
}

/// Applies spice and fat preferences to the ingredient shares of a portion.
///
/// Shares are redistributed, never created: the sum of the shares going in
/// equals the sum coming out, so portion weights stay within the ceiling.
#[derive(Debug, Clone)]
pub struct ContextCalibrator<'a> {
    config: &'a EngineConfig,
    context: ContextSettings,
}

impl<'a> ContextCalibrator<'a> {
    pub fn new(config: &'a EngineConfig, context: ContextSettings) -> Self {
        Self { config, context }
    }

    pub fn context(&self) -> ContextSettings {
        self.context
    }

    /// Classify an ingredient category. Fat keywords win over spice keywords.
    pub fn classify(&self, ingredient_category: &str) -> IngredientClass {
        let category = ingredient_category.to_lowercase();
        let hit = |keywords: &[String]| keywords.iter().any(|k| category.contains(&k.to_lowercase()));

        if hit(self.config.fat_keywords.as_slice()) {
            IngredientClass::Fat
        } else if hit(self.config.spice_keywords.as_slice()) {
            IngredientClass::Spice
        } else {
            IngredientClass::Neutral
        }
    }

    /// Calibrated shares, in the same order as `shares`.
    pub fn calibrate(&self, shares: &[(IngredientClass, f64)]) -> Vec<f64> {
        let classes: Vec<IngredientClass> = shares.iter().map(|(c, _)| *c).collect();
        let mut out: Vec<f64> = shares.iter().map(|(_, s)| *s).collect();

        self.shift_spice(&classes, &mut out);
        if self.context.fat_boost {
            self.boost_fat(&classes, &mut out);
        }
        out
    }

    /// Move weight between spice and neutral ingredients.
    fn shift_spice(&self, classes: &[IngredientClass], shares: &mut [f64]) {
        let mult = self.config.spice_multiplier(self.context.spice_index);
        if (mult - 1.0).abs() < f64::EPSILON {
            return;
        }

        let spice = class_sum(classes, shares, |c| c == IngredientClass::Spice);
        let neutral = class_sum(classes, shares, |c| c == IngredientClass::Neutral);
        if spice <= 0.0 || neutral <= 0.0 {
            return;
        }

        let pool = spice + neutral;
        let mut target = spice * mult;
        if target > pool {
            tracing::warn!(spice, neutral, mult, "spice shift clamped to available neutral weight");
            target = pool;
        }

        scale_class(classes, shares, |c| c == IngredientClass::Spice, target / spice);
        scale_class(
            classes,
            shares,
            |c| c == IngredientClass::Neutral,
            (pool - target) / neutral,
        );
    }

    /// Grow the fat share, funded proportionally by everything else.
    fn boost_fat(&self, classes: &[IngredientClass], shares: &mut [f64]) {
        let fat = class_sum(classes, shares, |c| c == IngredientClass::Fat);
        let other = class_sum(classes, shares, |c| c != IngredientClass::Fat);
        if fat <= 0.0 || other <= 0.0 {
            return;
        }

        let pool = fat + other;
        let mut target = fat * (1.0 + self.config.fat_boost_pct / 100.0);
        if target > pool {
            tracing::warn!(fat, other, "fat boost clamped to the whole portion");
            target = pool;
        }

        scale_class(classes, shares, |c| c == IngredientClass::Fat, target / fat);
        scale_class(
            classes,
            shares,
            |c| c != IngredientClass::Fat,
            (pool - target) / other,
        );
    }
}

fn class_sum(
    classes: &[IngredientClass],
    shares: &[f64],
    pick: impl Fn(IngredientClass) -> bool,
) -> f64 {
    classes
        .iter()
        .zip(shares)
        .filter(|(c, _)| pick(**c))
        .map(|(_, s)| *s)
        .sum()
}

fn scale_class(
    classes: &[IngredientClass],
    shares: &mut [f64],
    pick: impl Fn(IngredientClass) -> bool,
    factor: f64,
) {
    for (class, share) in classes.iter().zip(shares.iter_mut()) {
        if pick(*class) {
            *share *= factor;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProfileType, SpiceIndex};

    fn context(spice: SpiceIndex, fat_boost: bool) -> ContextSettings {
        ContextSettings {
            profile_type: ProfileType::Urban,
            spice_index: spice,
            fat_boost,
        }
    }

    fn shares() -> Vec<(IngredientClass, f64)> {
        vec![
            (IngredientClass::Neutral, 0.6),
            (IngredientClass::Fat, 0.2),
            (IngredientClass::Spice, 0.1),
            (IngredientClass::Neutral, 0.1),
        ]
    }

    #[test]
    fn test_classify() {
        let config = EngineConfig::default();
        let calibrator = ContextCalibrator::new(&config, ContextSettings::default());
        assert_eq!(calibrator.classify("Ghee & Oils"), IngredientClass::Fat);
        assert_eq!(calibrator.classify("Whole Spices"), IngredientClass::Spice);
        assert_eq!(calibrator.classify("Red Chilli Powder"), IngredientClass::Spice);
        assert_eq!(calibrator.classify("Pulses"), IngredientClass::Neutral);
    }

    #[test]
    fn test_neutral_context_is_identity() {
        let config = EngineConfig::default();
        let calibrator = ContextCalibrator::new(&config, context(SpiceIndex::Medium, false));
        let out = calibrator.calibrate(&shares());
        assert_eq!(out, vec![0.6, 0.2, 0.1, 0.1]);
    }

    #[test]
    fn test_fat_boost_fifteen_percent() {
        let config = EngineConfig::default();
        let calibrator = ContextCalibrator::new(&config, context(SpiceIndex::Medium, true));
        let out = calibrator.calibrate(&shares());

        assert!((out[1] - 0.23).abs() < 1e-12);
        let total: f64 = out.iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
        // Non-fat shares shrink by the same factor.
        assert!((out[0] / out[3] - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_high_spice_takes_from_neutral_only() {
        let config = EngineConfig::default();
        let calibrator = ContextCalibrator::new(&config, context(SpiceIndex::High, false));
        let out = calibrator.calibrate(&shares());

        assert!((out[2] - 0.125).abs() < 1e-12);
        assert!((out[1] - 0.2).abs() < 1e-12);
        let total: f64 = out.iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_fat_only_portion_unchanged() {
        let config = EngineConfig::default();
        let calibrator = ContextCalibrator::new(&config, context(SpiceIndex::High, true));
        let out = calibrator.calibrate(&[(IngredientClass::Fat, 1.0)]);
        assert_eq!(out, vec![1.0]);
    }
}
