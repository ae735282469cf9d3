use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CaterError, Result};

pub type MenuItemId = u32;
pub type IngredientId = u32;

/// Procurement unit declared for an ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Unit {
    Kilogram,
    Gram,
    Litre,
    Millilitre,
    /// Discrete items (eggs, packets). Weight per piece comes from the ingredient.
    Piece,
}

impl Unit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Kilogram => "kg",
            Unit::Gram => "g",
            Unit::Litre => "l",
            Unit::Millilitre => "ml",
            Unit::Piece => "pcs",
        }
    }

    /// Grams in one of this unit. Volumes assume 1 ml weighs 1 g.
    pub fn grams_per_unit(&self, piece_grams: f64) -> f64 {
        match self {
            Unit::Kilogram | Unit::Litre => 1000.0,
            Unit::Gram | Unit::Millilitre => 1.0,
            Unit::Piece => piece_grams,
        }
    }

    /// Decimal places kept when rounding quantities in this unit.
    pub fn decimals(&self) -> i32 {
        match self {
            Unit::Piece => 0,
            _ => 3,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Unit {
    type Err = CaterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "kg" | "kgs" | "kilogram" | "kilograms" => Ok(Unit::Kilogram),
            "g" | "gm" | "gms" | "gram" | "grams" => Ok(Unit::Gram),
            "l" | "ltr" | "litre" | "liter" | "litres" | "liters" => Ok(Unit::Litre),
            "ml" | "millilitre" | "milliliter" => Ok(Unit::Millilitre),
            "pcs" | "pc" | "piece" | "pieces" | "nos" | "no" | "unit" | "units" | "packet"
            | "packets" => Ok(Unit::Piece),
            other => Err(CaterError::InvalidCatalog(format!(
                "unrecognised unit '{}'",
                other
            ))),
        }
    }
}

impl TryFrom<String> for Unit {
    type Error = CaterError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        unit.symbol().to_string()
    }
}

/// A stock item the kitchen procures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    pub category: String,
    pub unit: Unit,

    #[serde(default)]
    pub stock_qty: f64,

    /// Weight of one piece, only meaningful for `Unit::Piece`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grams_per_unit: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regional_name: Option<String>,
}

impl Ingredient {
    /// Convert a gram amount into this ingredient's declared unit.
    pub fn from_grams(&self, grams: f64, default_piece_grams: f64) -> f64 {
        let per_unit = self
            .unit
            .grams_per_unit(self.grams_per_unit.unwrap_or(default_piece_grams));
        grams / per_unit
    }
}

/// One ingredient of a recipe, per person at full portion size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeLine {
    pub ingredient_id: IngredientId,
    pub grams: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub name: String,
    pub category: String,

    #[serde(default)]
    pub sub_category: String,

    #[serde(default)]
    pub diet_type: String,

    #[serde(default)]
    pub recipe: Vec<RecipeLine>,
}

impl MenuItem {
    /// Per-person weight of one full, unconstrained portion.
    pub fn full_portion_grams(&self) -> f64 {
        self.recipe.iter().map(|line| line.grams).sum()
    }

    /// Each ingredient's share of the full portion, in recipe order.
    ///
    /// Repeated ingredient ids are merged into their first position.
    pub fn recipe_fractions(&self) -> Vec<(IngredientId, f64)> {
        let total = self.full_portion_grams();
        if total <= 0.0 {
            return Vec::new();
        }

        let mut fractions: Vec<(IngredientId, f64)> = Vec::with_capacity(self.recipe.len());
        for line in &self.recipe {
            match fractions.iter_mut().find(|(id, _)| *id == line.ingredient_id) {
                Some((_, share)) => *share += line.grams / total,
                None => fractions.push((line.ingredient_id, line.grams / total)),
            }
        }
        fractions
    }

    /// Case-insensitive substring match on name or category.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term) || self.category.to_lowercase().contains(&term)
    }

    pub fn is_valid(&self) -> bool {
        !self.recipe.is_empty() && self.recipe.iter().all(|line| line.grams > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curry() -> MenuItem {
        MenuItem {
            id: 1,
            name: "Chicken Curry".to_string(),
            category: "Non-Veg Main Course".to_string(),
            sub_category: "Curry".to_string(),
            diet_type: "Non-Veg".to_string(),
            recipe: vec![
                RecipeLine {
                    ingredient_id: 10,
                    grams: 150.0,
                },
                RecipeLine {
                    ingredient_id: 11,
                    grams: 30.0,
                },
                RecipeLine {
                    ingredient_id: 10,
                    grams: 20.0,
                },
            ],
        }
    }

    #[test]
    fn test_unit_parse_aliases() {
        assert_eq!("KG".parse::<Unit>().unwrap(), Unit::Kilogram);
        assert_eq!("Litre".parse::<Unit>().unwrap(), Unit::Litre);
        assert_eq!("Nos".parse::<Unit>().unwrap(), Unit::Piece);
        assert!("bushel".parse::<Unit>().is_err());
    }

    #[test]
    fn test_unit_serde_as_symbol() {
        let json = serde_json::to_string(&Unit::Kilogram).unwrap();
        assert_eq!(json, "\"kg\"");
        let unit: Unit = serde_json::from_str("\"Kgs\"").unwrap();
        assert_eq!(unit, Unit::Kilogram);
    }

    #[test]
    fn test_recipe_fractions_merge_duplicates() {
        let item = curry();
        assert!((item.full_portion_grams() - 200.0).abs() < 1e-9);

        let fractions = item.recipe_fractions();
        assert_eq!(fractions.len(), 2);
        assert_eq!(fractions[0].0, 10);
        assert!((fractions[0].1 - 0.85).abs() < 1e-9);
        assert!((fractions[1].1 - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_matches_name_or_category() {
        let item = curry();
        assert!(item.matches("chicken"));
        assert!(item.matches("MAIN"));
        assert!(!item.matches("dessert"));
    }

    #[test]
    fn test_piece_conversion() {
        let egg = Ingredient {
            id: 5,
            name: "Egg".to_string(),
            category: "Dairy & Eggs".to_string(),
            unit: Unit::Piece,
            stock_qty: 0.0,
            grams_per_unit: Some(60.0),
            regional_name: None,
        };
        assert!((egg.from_grams(300.0, 50.0) - 5.0).abs() < 1e-9);
    }
}
