use std::collections::{HashMap, HashSet};

use crate::config::EngineConfig;
use crate::error::{CaterError, Result};
use crate::models::{
    Batch, BatchStatus, IngredientId, Indent, IndentLine, MenuItemId, TriggerCondition,
};
use crate::planner::aggregation::round_half_even;

/// External source of live consumption figures.
pub trait ConsumptionTelemetry {
    /// Signed variance in percent, positive when guests eat more than projected.
    fn consumption_variance_pct(&self) -> f64;
}

/// A variance reading supplied directly (kitchen display, manual entry).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedVariance(pub f64);

impl ConsumptionTelemetry for FixedVariance {
    fn consumption_variance_pct(&self) -> f64 {
        self.0
    }
}

/// Servings counted so far against servings projected from earlier batches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServingsTelemetry {
    pub actual_servings: f64,
    pub projected_servings: f64,
}

impl ConsumptionTelemetry for ServingsTelemetry {
    fn consumption_variance_pct(&self) -> f64 {
        consumption_variance(self.actual_servings, self.projected_servings)
    }
}

/// `(actual - projected) / projected * 100`.
pub fn consumption_variance(actual: f64, projected: f64) -> f64 {
    if projected <= 0.0 {
        return if actual > 0.0 { f64::INFINITY } else { 0.0 };
    }
    (actual - projected) / projected * 100.0
}

/// What happened when a gated batch was checked against telemetry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriggerOutcome {
    Released { variance: f64 },
    Held { variance: f64 },
}

/// Splits an indent into time-phased cooking batches.
#[derive(Debug, Clone)]
pub struct JitBatchScheduler<'a> {
    config: &'a EngineConfig,
}

impl<'a> JitBatchScheduler<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// One batch per schedule slot. Every slot but the last gets its rounded
    /// share of each indent line; the last takes the remainder so batch
    /// quantities add back up to the indent.
    pub fn schedule(&self, indent: &Indent) -> Result<Vec<Batch>> {
        if indent.is_empty() {
            return Err(CaterError::EmptySelection);
        }
        self.config.validate_schedule()?;

        let slots = &self.config.batch_schedule;
        let last = slots.len() - 1;
        let mut assigned: Vec<f64> = vec![0.0; indent.lines.len()];
        let mut batches = Vec::with_capacity(slots.len());

        for (idx, slot) in slots.iter().enumerate() {
            let lines: Vec<IndentLine> = indent
                .lines
                .iter()
                .zip(assigned.iter_mut())
                .map(|(line, so_far)| {
                    let decimals = line.unit.decimals();
                    let quantity = if idx == last {
                        round_half_even((line.quantity - *so_far).max(0.0), decimals)
                    } else {
                        round_half_even(
                            line.quantity * f64::from(slot.percentage) / 100.0,
                            decimals,
                        )
                    };
                    *so_far += quantity;
                    IndentLine {
                        quantity,
                        ..line.clone()
                    }
                })
                .collect();

            let id = idx as u32 + 1;
            batches.push(Batch {
                id,
                name: format!("Batch {}", id),
                percentage_of_total: slot.percentage,
                offset_minutes: slot.offset_minutes,
                status: BatchStatus::Pending,
                trigger_condition: slot.gated.then_some(TriggerCondition {
                    variance_threshold_pct: self.config.variance_threshold_pct,
                }),
                item_names: indent.menu_items.clone(),
                menu_item_ids: indent.menu_item_ids.clone(),
                lines,
            });
        }

        tracing::debug!(batches = batches.len(), "scheduled JIT batches");
        Ok(batches)
    }
}

/// Check a gated, pending batch against telemetry and release it when the
/// variance is strictly above its threshold. `None` for any other batch.
pub fn evaluate_trigger(
    batch: &mut Batch,
    telemetry: &dyn ConsumptionTelemetry,
) -> Option<TriggerOutcome> {
    let condition = batch.trigger_condition?;
    if batch.status != BatchStatus::Pending {
        return None;
    }

    let variance = telemetry.consumption_variance_pct();
    let outcome = if variance > condition.variance_threshold_pct {
        batch.status = BatchStatus::Cooking;
        TriggerOutcome::Released { variance }
    } else {
        TriggerOutcome::Held { variance }
    };

    tracing::info!(
        batch = batch.id,
        variance,
        threshold = condition.variance_threshold_pct,
        ?outcome,
        "evaluated batch trigger"
    );
    Some(outcome)
}

/// Move a batch one step forward.
///
/// A gated batch leaves Pending only when the trigger condition holds.
pub fn advance(batch: &mut Batch, telemetry: &dyn ConsumptionTelemetry) -> Result<BatchStatus> {
    let next = batch.status.next().ok_or(CaterError::InvalidTransition {
        batch_id: batch.id,
        from: batch.status,
        to: batch.status,
    })?;

    if batch.status == BatchStatus::Pending {
        if let Some(condition) = batch.trigger_condition {
            let variance = telemetry.consumption_variance_pct();
            if variance <= condition.variance_threshold_pct {
                return Err(CaterError::TriggerNotMet {
                    batch_id: batch.id,
                    variance,
                    threshold: condition.variance_threshold_pct,
                });
            }
        }
    }

    tracing::info!(batch = batch.id, from = %batch.status, to = %next, "batch advanced");
    batch.status = next;
    Ok(next)
}

/// Move a batch to `to`, which must be the immediate next status.
pub fn transition(
    batch: &mut Batch,
    to: BatchStatus,
    telemetry: &dyn ConsumptionTelemetry,
) -> Result<()> {
    if batch.status.next() != Some(to) {
        return Err(CaterError::InvalidTransition {
            batch_id: batch.id,
            from: batch.status,
            to,
        });
    }
    advance(batch, telemetry).map(|_| ())
}

/// Lines of gated batches that were never released.
pub fn averted_waste(batches: &[Batch]) -> Vec<IndentLine> {
    batches
        .iter()
        .filter(|b| b.is_gated() && b.status == BatchStatus::Pending)
        .flat_map(|b| b.lines.iter().cloned())
        .collect()
}

/// Merge a freshly computed batch plan with the one the kitchen is working
/// from.
///
/// Statuses carry forward by position when the menu item set is unchanged.
/// Batches already past Pending keep the lines they were started with. What
/// is left of each indent line is split over the pending batches by their
/// percentages, the last pending batch taking the rounding remainder, so
/// batch totals still match the new indent.
pub fn reconcile(previous: &[Batch], mut next: Vec<Batch>) -> Result<Vec<Batch>> {
    let started: Vec<(usize, &Batch)> = previous
        .iter()
        .enumerate()
        .filter(|(_, b)| b.status.is_started())
        .collect();
    if started.is_empty() {
        return Ok(next);
    }

    let item_set = |batches: &[Batch]| -> HashSet<MenuItemId> {
        batches
            .first()
            .map(|b| b.menu_item_ids.iter().copied().collect())
            .unwrap_or_default()
    };
    let items_changed = item_set(previous) != item_set(next.as_slice());

    for (idx, old) in &started {
        let conflict = |reason: &str| CaterError::ScheduleReconciliationConflict {
            batch_id: old.id,
            status: old.status,
            reason: reason.to_string(),
        };

        if items_changed {
            return Err(conflict("menu item set changed"));
        }
        match next.get(*idx) {
            None => return Err(conflict("batch no longer scheduled")),
            Some(new) if new.percentage_of_total != old.percentage_of_total => {
                return Err(conflict("batch percentage changed"));
            }
            Some(_) => {}
        }
    }

    let mut totals: HashMap<IngredientId, f64> = HashMap::new();
    for line in next.iter().flat_map(|b| &b.lines) {
        *totals.entry(line.ingredient_id).or_default() += line.quantity;
    }

    for (idx, old) in started {
        let new = &mut next[idx];
        new.status = old.status;
        new.lines = old.lines.clone();
        tracing::info!(batch = new.id, status = %new.status, "carried batch status forward");
    }
    redistribute_pending(&mut next, &totals)?;
    Ok(next)
}

/// Quantities within this distance of zero count as zero.
const QUANTITY_EPSILON: f64 = 1e-9;

fn redistribute_pending(batches: &mut [Batch], totals: &HashMap<IngredientId, f64>) -> Result<()> {
    let pending: Vec<usize> = batches
        .iter()
        .enumerate()
        .filter(|(_, b)| !b.status.is_started())
        .map(|(idx, _)| idx)
        .collect();
    let pending_pct: u32 = pending.iter().map(|&idx| batches[idx].percentage_of_total).sum();

    let mut cooked: HashMap<IngredientId, f64> = HashMap::new();
    let mut last_started: Option<(u32, BatchStatus)> = None;
    for batch in batches.iter().filter(|b| b.status.is_started()) {
        for line in &batch.lines {
            *cooked.entry(line.ingredient_id).or_default() += line.quantity;
        }
        last_started = Some((batch.id, batch.status));
    }

    let mut remaining: HashMap<IngredientId, f64> = HashMap::new();
    for (ingredient_id, done) in &cooked {
        if !totals.contains_key(ingredient_id) && *done > QUANTITY_EPSILON {
            return Err(started_conflict(
                last_started,
                "started batches exceed recomputed indent",
            ));
        }
    }
    for (ingredient_id, total) in totals {
        let left = total - cooked.get(ingredient_id).copied().unwrap_or(0.0);
        if left < -QUANTITY_EPSILON {
            return Err(started_conflict(
                last_started,
                "started batches exceed recomputed indent",
            ));
        }
        if pending.is_empty() && left > QUANTITY_EPSILON {
            return Err(started_conflict(
                last_started,
                "every batch started, nothing left to absorb the recomputed indent",
            ));
        }
        remaining.insert(*ingredient_id, left.max(0.0));
    }

    let Some((&last, rest)) = pending.split_last() else {
        return Ok(());
    };
    let mut assigned: HashMap<IngredientId, f64> = HashMap::new();
    for &idx in rest {
        let share = f64::from(batches[idx].percentage_of_total) / f64::from(pending_pct);
        for line in &mut batches[idx].lines {
            let left = remaining.get(&line.ingredient_id).copied().unwrap_or(0.0);
            let so_far = assigned.entry(line.ingredient_id).or_default();
            let quantity = round_half_even(left * share, line.unit.decimals()).min(left - *so_far);
            line.quantity = quantity.max(0.0);
            *so_far += line.quantity;
        }
    }
    for line in &mut batches[last].lines {
        let left = remaining.get(&line.ingredient_id).copied().unwrap_or(0.0);
        let so_far = assigned.get(&line.ingredient_id).copied().unwrap_or(0.0);
        line.quantity = round_half_even((left - so_far).max(0.0), line.unit.decimals());
    }
    Ok(())
}

fn started_conflict(batch: Option<(u32, BatchStatus)>, reason: &str) -> CaterError {
    let (batch_id, status) = batch.unwrap_or((0, BatchStatus::Cooking));
    CaterError::ScheduleReconciliationConflict {
        batch_id,
        status,
        reason: reason.to_string(),
    }
}
