use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{CaterError, Result};
use crate::models::MenuItemId;

pub type EventId = u64;

/// Attendee headcounts for an event.
///
/// Counts are signed so that bad input can be represented and rejected
/// instead of wrapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemographicProfile {
    pub male: i64,
    pub female: i64,
    pub child: i64,
}

impl DemographicProfile {
    pub fn new(male: i64, female: i64, child: i64) -> Self {
        Self {
            male,
            female,
            child,
        }
    }

    pub fn total_headcount(&self) -> i64 {
        self.male + self.female + self.child
    }

    /// Reject negative counts.
    pub fn validate(&self) -> Result<()> {
        for (label, count) in [
            ("male", self.male),
            ("female", self.female),
            ("child", self.child),
        ] {
            if count < 0 {
                return Err(CaterError::InvalidInput(format!(
                    "{} count must be non-negative, got {}",
                    label, count
                )));
            }
        }
        Ok(())
    }
}

/// Regional profile of the crowd.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
pub enum ProfileType {
    /// Favors variety: many evenly sized small portions.
    #[default]
    Urban,
    /// Favors volume: fewer, larger portions of the heavy categories.
    Rural,
}

impl fmt::Display for ProfileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileType::Urban => write!(f, "Urban"),
            ProfileType::Rural => write!(f, "Rural"),
        }
    }
}

impl FromStr for ProfileType {
    type Err = CaterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "urban" => Ok(ProfileType::Urban),
            "rural" => Ok(ProfileType::Rural),
            other => Err(CaterError::InvalidInput(format!(
                "unknown profile type '{}', expected Urban or Rural",
                other
            ))),
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
pub enum SpiceIndex {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for SpiceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpiceIndex::Low => write!(f, "Low"),
            SpiceIndex::Medium => write!(f, "Medium"),
            SpiceIndex::High => write!(f, "High"),
        }
    }
}

impl FromStr for SpiceIndex {
    type Err = CaterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(SpiceIndex::Low),
            "medium" => Ok(SpiceIndex::Medium),
            "high" => Ok(SpiceIndex::High),
            other => Err(CaterError::InvalidInput(format!(
                "unknown spice index '{}', expected Low, Medium or High",
                other
            ))),
        }
    }
}

/// Regional and culinary context. Only ingredient-level multipliers and
/// portion weighting depend on it, never the metabolic load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSettings {
    pub profile_type: ProfileType,
    pub spice_index: SpiceIndex,
    #[serde(default)]
    pub fat_boost: bool,
}

/// A catering event. The engine only ever reads a clone of this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub venue: String,
    pub date: NaiveDateTime,
    pub demographics: DemographicProfile,
    #[serde(default)]
    pub context: ContextSettings,
    #[serde(default)]
    pub menu_item_ids: Vec<MenuItemId>,
}

impl Event {
    /// Selected menu item ids with duplicates removed, first occurrence kept.
    pub fn selection(&self) -> Vec<MenuItemId> {
        dedup_ids(&self.menu_item_ids)
    }
}

/// Remove duplicate ids while keeping first-appearance order.
pub fn dedup_ids(ids: &[MenuItemId]) -> Vec<MenuItemId> {
    let mut seen = std::collections::HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_headcount() {
        let profile = DemographicProfile::new(300, 250, 50);
        assert_eq!(profile.total_headcount(), 600);
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_negative_count_rejected() {
        let profile = DemographicProfile::new(10, -1, 0);
        assert!(matches!(profile.validate(), Err(CaterError::InvalidInput(_))));
    }

    #[test]
    fn test_profile_type_parse_case_insensitive() {
        assert_eq!("RURAL".parse::<ProfileType>().unwrap(), ProfileType::Rural);
        assert_eq!(" urban ".parse::<ProfileType>().unwrap(), ProfileType::Urban);
        assert!("suburban".parse::<ProfileType>().is_err());
    }

    #[test]
    fn test_selection_dedups_in_order() {
        assert_eq!(dedup_ids(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
    }
}
