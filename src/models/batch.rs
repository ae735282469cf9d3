use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{IndentLine, MenuItemId};

/// Kitchen status of a cooking batch. Transitions only move forward one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BatchStatus {
    #[default]
    Pending,
    Cooking,
    Ready,
    Served,
}

impl BatchStatus {
    /// The only status this one may move to, `None` once served.
    pub fn next(&self) -> Option<BatchStatus> {
        match self {
            BatchStatus::Pending => Some(BatchStatus::Cooking),
            BatchStatus::Cooking => Some(BatchStatus::Ready),
            BatchStatus::Ready => Some(BatchStatus::Served),
            BatchStatus::Served => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }

    pub fn is_started(&self) -> bool {
        *self != BatchStatus::Pending
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BatchStatus::Pending => "Pending",
            BatchStatus::Cooking => "Cooking",
            BatchStatus::Ready => "Ready",
            BatchStatus::Served => "Served",
        };
        f.write_str(s)
    }
}

/// Release gate for a conditional batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriggerCondition {
    /// Consumption variance (percent) that must be exceeded before cooking.
    pub variance_threshold_pct: f64,
}

/// A time-phased share of the indent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub id: u32,
    pub name: String,
    pub percentage_of_total: u32,
    /// Minutes after event start.
    pub offset_minutes: i64,
    pub status: BatchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_condition: Option<TriggerCondition>,
    pub item_names: Vec<String>,
    #[serde(default)]
    pub menu_item_ids: Vec<MenuItemId>,
    #[serde(rename = "items")]
    pub lines: Vec<IndentLine>,
}

impl Batch {
    pub fn fraction(&self) -> f64 {
        f64::from(self.percentage_of_total) / 100.0
    }

    pub fn is_gated(&self) -> bool {
        self.trigger_condition.is_some()
    }

    /// Kitchen display label, e.g. "T-0 (Start)" or "T+2hr (Trigger)".
    pub fn time_label(&self) -> String {
        let base = if self.offset_minutes == 0 {
            "T-0 (Start)".to_string()
        } else if self.offset_minutes % 60 == 0 {
            format!("T+{}hr", self.offset_minutes / 60)
        } else {
            format!("T+{}min", self.offset_minutes)
        };
        if self.is_gated() {
            format!("{} (Trigger)", base)
        } else {
            base
        }
    }
}
