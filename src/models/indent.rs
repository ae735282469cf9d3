use serde::{Deserialize, Serialize};

use crate::models::{IngredientId, MenuItemId, Unit};

/// One procurement line of the bill of materials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndentLine {
    #[serde(rename = "id")]
    pub ingredient_id: IngredientId,
    pub name: String,
    pub category: String,
    pub quantity: f64,
    pub unit: Unit,
}

/// The computed bill of materials for one event calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indent {
    /// Per-person stomach ceiling used, in grams.
    pub capacity: f64,

    /// Unrounded metabolic load the quantities were scaled by.
    pub metabolic_load: f64,

    pub total_items: usize,

    /// Menu item names in allocation order.
    pub menu_items: Vec<String>,

    /// Menu item ids, parallel to `menu_items`.
    #[serde(default)]
    pub menu_item_ids: Vec<MenuItemId>,

    /// Edible weight per person implied by the indent, in grams.
    pub per_person_grams: f64,

    /// Density-trap scale-down applied to full recipe portions (1.0 = none).
    pub scale_factor: f64,

    #[serde(rename = "indent")]
    pub lines: Vec<IndentLine>,
}

impl Indent {
    pub fn line(&self, ingredient_id: IngredientId) -> Option<&IndentLine> {
        self.lines.iter().find(|l| l.ingredient_id == ingredient_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether the implied per-person weight stays within the ceiling.
    pub fn within_ceiling(&self) -> bool {
        self.per_person_grams <= self.capacity * (1.0 + 1e-9)
    }
}
