use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CaterError, Result};
use crate::models::{ProfileType, SpiceIndex};
use crate::planner::constants::*;

/// Menu category keyword and the share weight it earns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeight {
    pub keyword: String,
    pub weight: f64,
}

/// One slot of the JIT cooking schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSlot {
    /// Whole percent of the indent cooked in this batch.
    pub percentage: u32,
    /// Minutes after event start.
    pub offset_minutes: i64,
    /// Held back until consumption variance crosses the threshold.
    #[serde(default)]
    pub gated: bool,
}

/// Runtime-configurable engine parameters.
///
/// Every field falls back to its documented default when absent from the
/// config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub capacity_grams: f64,
    pub min_portion_grams: f64,
    pub category_weights: Vec<CategoryWeight>,
    pub default_category_weight: f64,
    pub profile_exponents: BTreeMap<ProfileType, f64>,
    pub fat_boost_pct: f64,
    pub fat_keywords: Vec<String>,
    pub spice_keywords: Vec<String>,
    pub spice_multipliers: BTreeMap<SpiceIndex, f64>,
    pub default_piece_grams: f64,
    pub batch_schedule: Vec<BatchSlot>,
    pub variance_threshold_pct: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            capacity_grams: DEFAULT_CAPACITY_GRAMS,
            min_portion_grams: DEFAULT_MIN_PORTION_GRAMS,
            category_weights: DEFAULT_CATEGORY_WEIGHTS
                .iter()
                .map(|(keyword, weight)| CategoryWeight {
                    keyword: keyword.to_string(),
                    weight: *weight,
                })
                .collect(),
            default_category_weight: DEFAULT_CATEGORY_WEIGHT,
            profile_exponents: [ProfileType::Urban, ProfileType::Rural]
                .into_iter()
                .map(|p| (p, profile_exponent(p)))
                .collect(),
            fat_boost_pct: DEFAULT_FAT_BOOST_PCT,
            fat_keywords: DEFAULT_FAT_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            spice_keywords: DEFAULT_SPICE_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            spice_multipliers: [SpiceIndex::Low, SpiceIndex::Medium, SpiceIndex::High]
                .into_iter()
                .map(|s| (s, spice_multiplier(s)))
                .collect(),
            default_piece_grams: DEFAULT_PIECE_GRAMS,
            batch_schedule: DEFAULT_BATCH_SCHEDULE
                .iter()
                .map(|(percentage, offset_minutes, gated)| BatchSlot {
                    percentage: *percentage,
                    offset_minutes: *offset_minutes,
                    gated: *gated,
                })
                .collect(),
            variance_threshold_pct: DEFAULT_VARIANCE_THRESHOLD_PCT,
        }
    }
}

impl EngineConfig {
    /// Load and validate a config from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => {
                let config = Self::load(p)?;
                tracing::info!(path = %p.display(), "loaded engine config");
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        fn positive(label: &str, value: f64) -> Result<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(CaterError::InvalidInput(format!(
                    "{} must be positive, got {}",
                    label, value
                )))
            }
        }

        positive("capacity_grams", self.capacity_grams)?;
        positive("default_category_weight", self.default_category_weight)?;
        positive("default_piece_grams", self.default_piece_grams)?;

        if !(0.0..self.capacity_grams).contains(&self.min_portion_grams) {
            return Err(CaterError::InvalidInput(format!(
                "min_portion_grams must be in [0, capacity), got {}",
                self.min_portion_grams
            )));
        }
        for cw in &self.category_weights {
            positive(&format!("category weight '{}'", cw.keyword), cw.weight)?;
        }
        for (profile, exponent) in &self.profile_exponents {
            positive(&format!("{} exponent", profile), *exponent)?;
        }
        for (spice, mult) in &self.spice_multipliers {
            positive(&format!("{} spice multiplier", spice), *mult)?;
        }
        if !(self.fat_boost_pct.is_finite() && self.fat_boost_pct >= 0.0) {
            return Err(CaterError::InvalidInput(format!(
                "fat_boost_pct must be non-negative, got {}",
                self.fat_boost_pct
            )));
        }
        if !(self.variance_threshold_pct.is_finite() && self.variance_threshold_pct >= 0.0) {
            return Err(CaterError::InvalidInput(format!(
                "variance_threshold_pct must be non-negative, got {}",
                self.variance_threshold_pct
            )));
        }

        self.validate_schedule()
    }

    /// Percentages sum to exactly 100 and only the final slot may be gated.
    pub fn validate_schedule(&self) -> Result<()> {
        if self.batch_schedule.is_empty() {
            return Err(CaterError::InvalidInput(
                "batch_schedule must have at least one batch".to_string(),
            ));
        }
        if self.batch_schedule.iter().any(|slot| slot.percentage == 0) {
            return Err(CaterError::InvalidInput(
                "every batch must cook a non-zero percentage".to_string(),
            ));
        }

        let total: u32 = self.batch_schedule.iter().map(|s| s.percentage).sum();
        if total != 100 {
            return Err(CaterError::InvalidInput(format!(
                "batch_schedule percentages must sum to 100, got {}",
                total
            )));
        }

        let last = self.batch_schedule.len() - 1;
        if let Some(pos) = self.batch_schedule.iter().position(|s| s.gated) {
            if pos != last {
                return Err(CaterError::InvalidInput(
                    "only the final batch may be trigger-gated".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Share weight for a menu category, by first matching keyword.
    pub fn category_weight(&self, category: &str) -> f64 {
        let category = category.to_lowercase();
        self.category_weights
            .iter()
            .find(|cw| category.contains(&cw.keyword.to_lowercase()))
            .map(|cw| cw.weight)
            .unwrap_or(self.default_category_weight)
    }

    pub fn profile_exponent(&self, profile: ProfileType) -> f64 {
        self.profile_exponents.get(&profile).copied().unwrap_or(1.0)
    }

    pub fn spice_multiplier(&self, spice: SpiceIndex) -> f64 {
        self.spice_multipliers.get(&spice).copied().unwrap_or(1.0)
    }
}
