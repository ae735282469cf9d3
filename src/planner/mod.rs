pub mod aggregation;
pub mod allocation;
pub mod calibration;
pub mod constants;
pub mod load;
pub mod scheduling;

pub use aggregation::{round_half_even, IngredientAggregator};
pub use allocation::{
    Allocation, CapacityAllocator, Portion, PowerWeighting, StrategyTable, WeightingStrategy,
};
pub use calibration::{ContextCalibrator, IngredientClass};
pub use constants::*;
pub use load::{compute_load, display_load};
pub use scheduling::{
    advance, averted_waste, consumption_variance, evaluate_trigger, reconcile, transition,
    ConsumptionTelemetry, FixedVariance, JitBatchScheduler, ServingsTelemetry, TriggerOutcome,
};

use crate::config::EngineConfig;
use crate::error::{CaterError, Result};
use crate::models::{Batch, Event, Indent};
use crate::state::Catalog;

/// Everything one calculation produces for an event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventPlan {
    pub allocation: Allocation,
    pub indent: Indent,
    pub batches: Vec<Batch>,
}

/// Compute the allocation and indent for an event snapshot.
///
/// Load -> capacity allocation -> ingredient aggregation.
pub fn calculate_allocation_and_indent(
    event: &Event,
    catalog: &Catalog,
    config: &EngineConfig,
) -> Result<(Allocation, Indent)> {
    let load = compute_load(&event.demographics)?;

    let selection = event.selection();
    if selection.is_empty() {
        return Err(CaterError::EmptySelection);
    }
    let items = catalog.menu_items_for(&selection)?;

    let allocation = CapacityAllocator::new(config).allocate(load, &items, &event.context)?;
    let indent = IngredientAggregator::new(catalog, config, event.context)
        .aggregate(&allocation, load)?;

    tracing::info!(
        event = event.id,
        load = display_load(load),
        items = indent.total_items,
        lines = indent.lines.len(),
        "calculated indent"
    );
    Ok((allocation, indent))
}

/// Compute the indent for an event snapshot.
pub fn calculate_indent(event: &Event, catalog: &Catalog, config: &EngineConfig) -> Result<Indent> {
    calculate_allocation_and_indent(event, catalog, config).map(|(_, indent)| indent)
}

/// Compute the indent and its JIT batch plan.
pub fn plan_event(event: &Event, catalog: &Catalog, config: &EngineConfig) -> Result<EventPlan> {
    let (allocation, indent) = calculate_allocation_and_indent(event, catalog, config)?;
    let batches = JitBatchScheduler::new(config).schedule(&indent)?;
    Ok(EventPlan {
        allocation,
        indent,
        batches,
    })
}
