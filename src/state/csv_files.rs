//! CSV ingestion of inventory and recipe sheets, and indent export.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Indent, Ingredient, IngredientId, MenuItem, MenuItemId, RecipeLine, Unit};
use crate::state::catalog::Catalog;

#[derive(Debug, Deserialize)]
struct InventoryRow {
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Item ID")]
    item_id: IngredientId,
    #[serde(rename = "Item Name")]
    item_name: String,
    #[serde(rename = "Regional Name", default)]
    regional_name: Option<String>,
    #[serde(rename = "Unit")]
    unit: String,
    #[serde(rename = "Stock Quantity", default)]
    stock_quantity: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RecipeRow {
    #[serde(rename = "Menu Item ID")]
    menu_item_id: MenuItemId,
    #[serde(rename = "Menu Category")]
    menu_category: String,
    #[serde(rename = "Menu Sub-Category", default)]
    menu_sub_category: Option<String>,
    #[serde(rename = "Menu Item Name")]
    menu_item_name: String,
    #[serde(rename = "Ingredient ID", default)]
    ingredient_id: Option<String>,
    #[serde(rename = "Quantity")]
    quantity: f64,
    #[serde(rename = "Unit")]
    unit: String,
}

#[derive(Debug, Serialize)]
struct IndentRow<'a> {
    #[serde(rename = "Ingredient ID")]
    ingredient_id: IngredientId,
    #[serde(rename = "Ingredient")]
    name: &'a str,
    #[serde(rename = "Category")]
    category: &'a str,
    #[serde(rename = "Quantity")]
    quantity: f64,
    #[serde(rename = "Unit")]
    unit: &'a str,
}

/// Read the inventory sheet. Malformed rows are skipped; the first row for
/// an id wins.
pub fn import_inventory<P: AsRef<Path>>(path: P) -> Result<Vec<Ingredient>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut ingredients: Vec<Ingredient> = Vec::new();

    for (idx, row) in reader.deserialize::<InventoryRow>().enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!(row = idx + 2, error = %e, "skipping inventory row");
                continue;
            }
        };
        if ingredients.iter().any(|i| i.id == row.item_id) {
            continue;
        }
        let unit: Unit = match row.unit.parse() {
            Ok(unit) => unit,
            Err(e) => {
                tracing::warn!(id = row.item_id, error = %e, "skipping inventory row");
                continue;
            }
        };

        ingredients.push(Ingredient {
            id: row.item_id,
            name: row.item_name.trim().to_string(),
            category: row.category.trim().to_string(),
            unit,
            stock_qty: row.stock_quantity.unwrap_or(0.0),
            grams_per_unit: None,
            regional_name: row
                .regional_name
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        });
    }

    tracing::info!(ingredients = ingredients.len(), "imported inventory");
    Ok(ingredients)
}

/// Read the recipe sheet against known ingredients.
///
/// Each menu item takes its name and category from its first row. Recipe
/// rows with a missing, non-numeric or unknown ingredient id are skipped.
/// Quantities are converted to grams per person.
pub fn import_recipes<P: AsRef<Path>>(
    path: P,
    ingredients: &[Ingredient],
    default_piece_grams: f64,
) -> Result<Vec<MenuItem>> {
    let known: HashMap<IngredientId, &Ingredient> = ingredients.iter().map(|i| (i.id, i)).collect();
    let mut reader = csv::Reader::from_path(path)?;
    let mut items: Vec<MenuItem> = Vec::new();
    let mut positions: HashMap<MenuItemId, usize> = HashMap::new();

    for (idx, row) in reader.deserialize::<RecipeRow>().enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!(row = idx + 2, error = %e, "skipping recipe row");
                continue;
            }
        };

        let pos = *positions.entry(row.menu_item_id).or_insert_with(|| {
            items.push(MenuItem {
                id: row.menu_item_id,
                name: row.menu_item_name.trim().to_string(),
                category: row.menu_category.trim().to_string(),
                sub_category: row.menu_sub_category.clone().unwrap_or_default(),
                diet_type: diet_type(&row.menu_category).to_string(),
                recipe: Vec::new(),
            });
            items.len() - 1
        });

        let raw_id = row.ingredient_id.as_deref().unwrap_or("").trim();
        let Ok(ingredient_id) = raw_id.parse::<IngredientId>() else {
            tracing::debug!(menu_item = row.menu_item_id, raw_id, "recipe row without ingredient id");
            continue;
        };
        let Some(ingredient) = known.get(&ingredient_id) else {
            tracing::warn!(
                menu_item = row.menu_item_id,
                ingredient = ingredient_id,
                "recipe references ingredient missing from inventory"
            );
            continue;
        };
        let unit: Unit = match row.unit.parse() {
            Ok(unit) => unit,
            Err(e) => {
                tracing::warn!(menu_item = row.menu_item_id, error = %e, "skipping recipe row");
                continue;
            }
        };

        let item = &mut items[pos];
        if item.recipe.iter().any(|l| l.ingredient_id == ingredient_id) {
            continue;
        }
        let piece_grams = ingredient.grams_per_unit.unwrap_or(default_piece_grams);
        item.recipe.push(RecipeLine {
            ingredient_id,
            grams: row.quantity * unit.grams_per_unit(piece_grams),
        });
    }

    tracing::info!(menu_items = items.len(), "imported recipes");
    Ok(items)
}

/// Build a catalog from the two sheets.
pub fn import_catalog<P: AsRef<Path>, Q: AsRef<Path>>(
    inventory: P,
    recipes: Q,
    default_piece_grams: f64,
) -> Result<Catalog> {
    let ingredients = import_inventory(inventory)?;
    let menu_items = import_recipes(recipes, &ingredients, default_piece_grams)?;
    Ok(Catalog::new(ingredients, menu_items))
}

/// Write indent lines as a procurement sheet.
pub fn export_indent<P: AsRef<Path>>(path: P, indent: &Indent) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for line in &indent.lines {
        writer.serialize(IndentRow {
            ingredient_id: line.ingredient_id,
            name: &line.name,
            category: &line.category,
            quantity: line.quantity,
            unit: line.unit.symbol(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

fn diet_type(menu_category: &str) -> &'static str {
    if menu_category.contains("Non-Veg") {
        "Non-Veg"
    } else {
        "Veg"
    }
}
