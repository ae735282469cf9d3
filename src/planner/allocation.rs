use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::{CaterError, Result};
use crate::models::{ContextSettings, MenuItem, MenuItemId, ProfileType};

/// Turns a menu category weight into the weight actually used to share
/// the stomach ceiling. One strategy per crowd profile.
pub trait WeightingStrategy: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn shape(&self, category_weight: f64) -> f64;
}

/// `weight ^ exponent`. Exponents below 1.0 even out portions, above 1.0
/// concentrate weight in the heavy categories.
#[derive(Debug, Clone)]
pub struct PowerWeighting {
    name: String,
    exponent: f64,
}

impl PowerWeighting {
    pub fn new(name: impl Into<String>, exponent: f64) -> Self {
        Self {
            name: name.into(),
            exponent,
        }
    }
}

impl WeightingStrategy for PowerWeighting {
    fn name(&self) -> &str {
        &self.name
    }

    fn shape(&self, category_weight: f64) -> f64 {
        category_weight.powf(self.exponent)
    }
}

/// Profile type -> weighting strategy.
#[derive(Debug)]
pub struct StrategyTable {
    strategies: BTreeMap<ProfileType, Box<dyn WeightingStrategy>>,
    fallback: PowerWeighting,
}

impl StrategyTable {
    /// Power strategies for every profile listed in the config.
    pub fn from_config(config: &EngineConfig) -> Self {
        let mut table = Self {
            strategies: BTreeMap::new(),
            fallback: PowerWeighting::new("linear", 1.0),
        };
        for (profile, exponent) in &config.profile_exponents {
            table.register(
                *profile,
                Box::new(PowerWeighting::new(profile.to_string().to_lowercase(), *exponent)),
            );
        }
        table
    }

    pub fn register(&mut self, profile: ProfileType, strategy: Box<dyn WeightingStrategy>) {
        self.strategies.insert(profile, strategy);
    }

    /// Strategy for a profile, linear weighting if none is registered.
    pub fn get(&self, profile: ProfileType) -> &dyn WeightingStrategy {
        match self.strategies.get(&profile) {
            Some(strategy) => strategy.as_ref(),
            None => &self.fallback,
        }
    }
}

/// Per-person portion weight given to one menu item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Portion {
    pub menu_item_id: MenuItemId,
    pub name: String,
    pub category: String,
    pub grams: f64,
    /// Weight of the unconstrained recipe portion.
    pub full_portion_grams: f64,
}

/// Result of distributing the stomach ceiling across a menu.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    pub capacity_grams: f64,
    pub strategy: String,
    pub portions: Vec<Portion>,
    /// Sum of full recipe portions before any scale-down.
    pub full_portion_total: f64,
    /// `capacity / full_portion_total` when the menu would overflow, else 1.0.
    pub scale_factor: f64,
}

impl Allocation {
    pub fn total_grams(&self) -> f64 {
        self.portions.iter().map(|p| p.grams).sum()
    }

    pub fn portion(&self, menu_item_id: MenuItemId) -> Option<&Portion> {
        self.portions.iter().find(|p| p.menu_item_id == menu_item_id)
    }

    /// Whether full recipe portions had to be scaled down to fit.
    pub fn density_trap(&self) -> bool {
        self.scale_factor < 1.0
    }
}

/// Enforces the stomach ceiling across a menu selection.
#[derive(Debug)]
pub struct CapacityAllocator<'a> {
    config: &'a EngineConfig,
    strategies: StrategyTable,
}

impl<'a> CapacityAllocator<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self {
            config,
            strategies: StrategyTable::from_config(config),
        }
    }

    pub fn with_strategies(config: &'a EngineConfig, strategies: StrategyTable) -> Self {
        Self { config, strategies }
    }

    /// Distribute `capacity_grams` across `items`.
    ///
    /// Each item receives `capacity * shaped_weight / total_shaped_weight`,
    /// so the portions always sum to the ceiling and adding an item can only
    /// shrink the others.
    pub fn allocate(
        &self,
        load: f64,
        items: &[&MenuItem],
        context: &ContextSettings,
    ) -> Result<Allocation> {
        if items.is_empty() {
            return Err(CaterError::EmptySelection);
        }
        if !load.is_finite() || load < 0.0 {
            return Err(CaterError::InvalidInput(format!(
                "metabolic load must be a non-negative number, got {}",
                load
            )));
        }
        if let Some(item) = items.iter().find(|i| !i.is_valid()) {
            return Err(CaterError::InvalidCatalog(format!(
                "menu item '{}' ({}) has no usable recipe",
                item.name, item.id
            )));
        }

        let capacity = self.config.capacity_grams;
        let strategy = self.strategies.get(context.profile_type);

        let shaped: Vec<f64> = items
            .iter()
            .map(|item| strategy.shape(self.config.category_weight(&item.category)))
            .collect();
        let total_shaped: f64 = shaped.iter().sum();

        let portions: Vec<Portion> = items
            .iter()
            .zip(&shaped)
            .map(|(item, weight)| Portion {
                menu_item_id: item.id,
                name: item.name.clone(),
                category: item.category.clone(),
                grams: capacity * weight / total_shaped,
                full_portion_grams: item.full_portion_grams(),
            })
            .collect();

        let full_portion_total: f64 = portions.iter().map(|p| p.full_portion_grams).sum();
        let scale_factor = if full_portion_total > capacity {
            capacity / full_portion_total
        } else {
            1.0
        };
        if scale_factor < 1.0 {
            tracing::info!(
                full_portion_total,
                capacity,
                scale_factor,
                "density trap: full portions scaled down to fit the ceiling"
            );
        }

        let unviable: Vec<String> = portions
            .iter()
            .filter(|p| p.grams < self.config.min_portion_grams)
            .map(|p| p.name.clone())
            .collect();
        if unviable.len() == portions.len() {
            return Err(CaterError::CapacityExceeded { dropped: unviable });
        }
        if !unviable.is_empty() {
            tracing::warn!(
                items = %unviable.join(", "),
                min_portion = self.config.min_portion_grams,
                "portions below the viable floor"
            );
        }

        tracing::debug!(
            strategy = strategy.name(),
            items = portions.len(),
            load,
            "allocated capacity"
        );

        Ok(Allocation {
            capacity_grams: capacity,
            strategy: strategy.name().to_string(),
            portions,
            full_portion_total,
            scale_factor,
        })
    }
}
