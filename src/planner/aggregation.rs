use std::collections::HashMap;

use crate::config::EngineConfig;
use crate::error::{CaterError, Result};
use crate::models::{ContextSettings, Indent, IndentLine, IngredientId};
use crate::planner::allocation::Allocation;
use crate::planner::calibration::{ContextCalibrator, IngredientClass};
use crate::state::Catalog;

/// Round half-to-even at `decimals` places.
///
/// Keeps repeated recomputation of procurement quantities from drifting
/// upward on exact halves.
pub fn round_half_even(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Expands allocated portions through recipes into the bill of materials.
#[derive(Debug)]
pub struct IngredientAggregator<'a> {
    catalog: &'a Catalog,
    config: &'a EngineConfig,
    calibrator: ContextCalibrator<'a>,
}

impl<'a> IngredientAggregator<'a> {
    pub fn new(catalog: &'a Catalog, config: &'a EngineConfig, context: ContextSettings) -> Self {
        Self {
            catalog,
            config,
            calibrator: ContextCalibrator::new(config, context),
        }
    }

    /// Build the indent for `allocation` scaled by `load`.
    ///
    /// Per ingredient: `share * portion_grams * load`, where `share` is the
    /// ingredient's calibrated fraction of its recipe. Totals are summed by
    /// ingredient id in order of first appearance.
    pub fn aggregate(&self, allocation: &Allocation, load: f64) -> Result<Indent> {
        if allocation.portions.is_empty() {
            return Err(CaterError::EmptySelection);
        }
        if !load.is_finite() || load < 0.0 {
            return Err(CaterError::InvalidInput(format!(
                "metabolic load must be a non-negative number, got {}",
                load
            )));
        }

        let mut order: Vec<IngredientId> = Vec::new();
        let mut grams: HashMap<IngredientId, f64> = HashMap::new();
        let mut per_person_grams = 0.0;

        for portion in &allocation.portions {
            let item = self.catalog.menu_item(portion.menu_item_id)?;
            let fractions = item.recipe_fractions();

            let mut classified: Vec<(IngredientClass, f64)> = Vec::with_capacity(fractions.len());
            for (ingredient_id, share) in &fractions {
                let ingredient = self.catalog.ingredient(*ingredient_id)?;
                classified.push((self.calibrator.classify(&ingredient.category), *share));
            }
            let calibrated = self.calibrator.calibrate(&classified);

            for ((ingredient_id, _), share) in fractions.iter().zip(calibrated) {
                let per_person = share * portion.grams;
                per_person_grams += per_person;

                let total = grams.entry(*ingredient_id).or_insert_with(|| {
                    order.push(*ingredient_id);
                    0.0
                });
                *total += per_person * load;
            }
        }

        if per_person_grams > allocation.capacity_grams * (1.0 + 1e-9) {
            return Err(CaterError::InvalidInput(format!(
                "allocation implies {:.1} g per person, above the {:.1} g ceiling",
                per_person_grams, allocation.capacity_grams
            )));
        }

        let mut lines = Vec::with_capacity(order.len());
        for ingredient_id in order {
            let ingredient = self.catalog.ingredient(ingredient_id)?;
            let raw = ingredient.from_grams(grams[&ingredient_id], self.config.default_piece_grams);
            lines.push(IndentLine {
                ingredient_id,
                name: ingredient.name.clone(),
                category: ingredient.category.clone(),
                quantity: round_half_even(raw, ingredient.unit.decimals()),
                unit: ingredient.unit,
            });
        }

        tracing::debug!(
            lines = lines.len(),
            per_person_grams,
            load,
            "aggregated indent"
        );

        Ok(Indent {
            capacity: allocation.capacity_grams,
            metabolic_load: load,
            total_items: allocation.portions.len(),
            menu_items: allocation.portions.iter().map(|p| p.name.clone()).collect(),
            menu_item_ids: allocation.portions.iter().map(|p| p.menu_item_id).collect(),
            per_person_grams,
            scale_factor: allocation.scale_factor,
            lines,
        })
    }
}
