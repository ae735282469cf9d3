use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;

use crate::error::{CaterError, Result};
use crate::models::{Ingredient, IngredientId, MenuItem, MenuItemId};

/// Minimum Jaro-Winkler score for a "did you mean" suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// On-disk shape of the catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub menu_items: Vec<MenuItem>,
}

/// Menu items and ingredients, indexed by id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    ingredients: HashMap<IngredientId, Ingredient>,
    menu_items: Vec<MenuItem>,
    menu_index: HashMap<MenuItemId, usize>,
}

impl Catalog {
    /// Build a catalog. Repeated ids keep the last occurrence; menu items
    /// keep the position of their first occurrence.
    pub fn new(ingredients: Vec<Ingredient>, menu_items: Vec<MenuItem>) -> Self {
        let ingredients = ingredients.into_iter().map(|i| (i.id, i)).collect();

        let mut items: Vec<MenuItem> = Vec::with_capacity(menu_items.len());
        let mut menu_index = HashMap::new();
        for item in menu_items {
            match menu_index.get(&item.id) {
                Some(&pos) => items[pos] = item,
                None => {
                    menu_index.insert(item.id, items.len());
                    items.push(item);
                }
            }
        }

        Self {
            ingredients,
            menu_items: items,
            menu_index,
        }
    }

    pub fn from_file(file: CatalogFile) -> Self {
        Self::new(file.ingredients, file.menu_items)
    }

    pub fn to_file(&self) -> CatalogFile {
        CatalogFile {
            ingredients: self.all_ingredients().into_iter().cloned().collect(),
            menu_items: self.menu_items.clone(),
        }
    }

    pub fn ingredient(&self, id: IngredientId) -> Result<&Ingredient> {
        self.ingredients
            .get(&id)
            .ok_or(CaterError::UnknownIngredient(id))
    }

    pub fn menu_item(&self, id: MenuItemId) -> Result<&MenuItem> {
        self.menu_index
            .get(&id)
            .map(|&pos| &self.menu_items[pos])
            .ok_or(CaterError::UnknownMenuItem(id))
    }

    /// Resolve a selection of ids, preserving order.
    pub fn menu_items_for(&self, ids: &[MenuItemId]) -> Result<Vec<&MenuItem>> {
        ids.iter().map(|id| self.menu_item(*id)).collect()
    }

    pub fn all_menu_items(&self) -> &[MenuItem] {
        &self.menu_items
    }

    /// All ingredients sorted by id.
    pub fn all_ingredients(&self) -> Vec<&Ingredient> {
        let mut all: Vec<&Ingredient> = self.ingredients.values().collect();
        all.sort_by_key(|i| i.id);
        all
    }

    /// Case-insensitive substring search over menu item name and category.
    pub fn search(&self, term: &str) -> Vec<&MenuItem> {
        let term = term.trim();
        if term.is_empty() {
            return self.menu_items.iter().collect();
        }
        self.menu_items.iter().filter(|m| m.matches(term)).collect()
    }

    /// Look up a menu item by exact name (case-insensitive).
    ///
    /// On a miss the error carries the closest name, if any is close enough.
    pub fn find_menu_item(&self, name: &str) -> Result<&MenuItem> {
        let wanted = name.trim().to_lowercase();
        if let Some(item) = self
            .menu_items
            .iter()
            .find(|m| m.name.to_lowercase() == wanted)
        {
            return Ok(item);
        }

        let message = match self.suggest(name) {
            Some(item) => format!("'{}' (did you mean '{}'?)", name, item.name),
            None => format!("'{}'", name),
        };
        Err(CaterError::MenuItemNotFound(message))
    }

    /// Closest menu item by Jaro-Winkler similarity.
    pub fn suggest(&self, name: &str) -> Option<&MenuItem> {
        let wanted = name.trim().to_lowercase();
        self.menu_items
            .iter()
            .map(|m| (m, jaro_winkler(&m.name.to_lowercase(), &wanted)))
            .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(m, _)| m)
    }

    /// Every recipe line must point at a known ingredient, and piece
    /// weights must be positive.
    pub fn check_integrity(&self) -> Result<()> {
        for ingredient in self.ingredients.values() {
            if let Some(grams) = ingredient.grams_per_unit {
                if !(grams.is_finite() && grams > 0.0) {
                    return Err(CaterError::InvalidCatalog(format!(
                        "ingredient '{}' ({}) has a non-positive piece weight of {} g",
                        ingredient.name, ingredient.id, grams
                    )));
                }
            }
        }
        for item in &self.menu_items {
            for line in &item.recipe {
                if !self.ingredients.contains_key(&line.ingredient_id) {
                    tracing::error!(
                        menu_item = %item.name,
                        ingredient_id = line.ingredient_id,
                        "recipe references unknown ingredient"
                    );
                    return Err(CaterError::UnknownIngredient(line.ingredient_id));
                }
            }
        }
        Ok(())
    }

    pub fn menu_len(&self) -> usize {
        self.menu_items.len()
    }

    pub fn ingredient_len(&self) -> usize {
        self.ingredients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.menu_items.is_empty() && self.ingredients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RecipeLine, Unit};

    fn sample_catalog() -> Catalog {
        let ingredients = vec![
            Ingredient {
                id: 101,
                name: "Basmati Rice".to_string(),
                category: "Grains".to_string(),
                unit: Unit::Kilogram,
                stock_qty: 50.0,
                grams_per_unit: None,
                regional_name: None,
            },
            Ingredient {
                id: 102,
                name: "Toor Dal".to_string(),
                category: "Pulses".to_string(),
                unit: Unit::Kilogram,
                stock_qty: 20.0,
                grams_per_unit: None,
                regional_name: Some("Arhar".to_string()),
            },
        ];
        let menu_items = vec![
            MenuItem {
                id: 1,
                name: "Jeera Rice".to_string(),
                category: "Rice".to_string(),
                sub_category: "Pulao".to_string(),
                diet_type: "Veg".to_string(),
                recipe: vec![RecipeLine {
                    ingredient_id: 101,
                    grams: 120.0,
                }],
            },
            MenuItem {
                id: 2,
                name: "Dal Tadka".to_string(),
                category: "Veg Main Course".to_string(),
                sub_category: "Dal".to_string(),
                diet_type: "Veg".to_string(),
                recipe: vec![RecipeLine {
                    ingredient_id: 102,
                    grams: 60.0,
                }],
            },
        ];
        Catalog::new(ingredients, menu_items)
    }

    #[test]
    fn test_lookups() {
        let catalog = sample_catalog();
        assert_eq!(catalog.menu_item(2).unwrap().name, "Dal Tadka");
        assert!(matches!(catalog.menu_item(9), Err(CaterError::UnknownMenuItem(9))));
        assert!(matches!(
            catalog.ingredient(999),
            Err(CaterError::UnknownIngredient(999))
        ));
    }

    #[test]
    fn test_search_case_insensitive() {
        let catalog = sample_catalog();
        let hits = catalog.search("RICE");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);

        // Category matches count too.
        assert_eq!(catalog.search("main").len(), 1);
        assert_eq!(catalog.search("").len(), 2);
    }

    #[test]
    fn test_find_menu_item_suggests() {
        let catalog = sample_catalog();
        assert_eq!(catalog.find_menu_item("dal tadka").unwrap().id, 2);

        let err = catalog.find_menu_item("Dal Tadkaa").unwrap_err();
        assert!(err.to_string().contains("did you mean 'Dal Tadka'"));
    }

    #[test]
    fn test_duplicate_ids_last_wins_in_place() {
        let mut catalog = sample_catalog().to_file();
        let mut replacement = catalog.menu_items[0].clone();
        replacement.name = "Ghee Rice".to_string();
        catalog.menu_items.push(replacement);

        let catalog = Catalog::from_file(catalog);
        assert_eq!(catalog.menu_len(), 2);
        assert_eq!(catalog.all_menu_items()[0].name, "Ghee Rice");
    }

    #[test]
    fn test_integrity_check() {
        let catalog = sample_catalog();
        assert!(catalog.check_integrity().is_ok());

        let mut file = catalog.to_file();
        file.menu_items[0].recipe.push(RecipeLine {
            ingredient_id: 555,
            grams: 5.0,
        });
        let broken = Catalog::from_file(file);
        assert!(matches!(
            broken.check_integrity(),
            Err(CaterError::UnknownIngredient(555))
        ));
    }

    #[test]
    fn test_integrity_rejects_bad_piece_weight() {
        for grams in [0.0, -40.0, f64::NAN] {
            let mut file = sample_catalog().to_file();
            file.ingredients[0].grams_per_unit = Some(grams);
            let broken = Catalog::from_file(file);
            assert!(matches!(
                broken.check_integrity(),
                Err(CaterError::InvalidCatalog(_))
            ));
        }
    }
}
