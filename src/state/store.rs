use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CaterError, Result};
use crate::models::{Batch, EventId, Indent};
use crate::planner::scheduling::{self, ConsumptionTelemetry, TriggerOutcome};

/// One complete calculation result for an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSet {
    pub event_id: EventId,
    pub revision: u64,
    pub calculated_at: DateTime<Utc>,
    pub indent: Indent,
    pub batches: Vec<Batch>,
}

impl PlanSet {
    pub fn batch(&self, batch_id: u32) -> Option<&Batch> {
        self.batches.iter().find(|b| b.id == batch_id)
    }
}

/// Latest plan per event.
///
/// Plans are replaced whole: readers get either the previous or the new
/// `Arc<PlanSet>`, never a half-written one.
#[derive(Debug, Default)]
pub struct PlanStore {
    plans: RwLock<HashMap<EventId, Arc<PlanSet>>>,
}

impl PlanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_plans(plans: Vec<PlanSet>) -> Self {
        Self {
            plans: RwLock::new(
                plans
                    .into_iter()
                    .map(|p| (p.event_id, Arc::new(p)))
                    .collect(),
            ),
        }
    }

    pub fn latest(&self, event_id: EventId) -> Option<Arc<PlanSet>> {
        self.plans
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&event_id)
            .cloned()
    }

    /// Publish a recomputed plan, reconciled against the current one.
    ///
    /// A result computed before the stored plan is rejected as stale.
    pub fn publish(
        &self,
        event_id: EventId,
        calculated_at: DateTime<Utc>,
        indent: Indent,
        batches: Vec<Batch>,
    ) -> Result<Arc<PlanSet>> {
        let mut plans = self.plans.write().unwrap_or_else(PoisonError::into_inner);

        let (revision, batches) = match plans.get(&event_id) {
            Some(current) if current.calculated_at > calculated_at => {
                tracing::warn!(
                    event = event_id,
                    stale = %calculated_at,
                    current = %current.calculated_at,
                    "rejected stale recompute"
                );
                return Err(CaterError::StalePlan {
                    event_id,
                    calculated_at,
                    current: current.calculated_at,
                });
            }
            Some(current) => (
                current.revision + 1,
                scheduling::reconcile(&current.batches, batches)?,
            ),
            None => (1, batches),
        };

        let plan = Arc::new(PlanSet {
            event_id,
            revision,
            calculated_at,
            indent,
            batches,
        });
        plans.insert(event_id, Arc::clone(&plan));
        tracing::info!(event = event_id, revision, "published plan");
        Ok(plan)
    }

    /// Apply `update` to a copy of the event's plan and swap it in.
    fn modify<T>(
        &self,
        event_id: EventId,
        update: impl FnOnce(&mut PlanSet) -> Result<T>,
    ) -> Result<(Arc<PlanSet>, T)> {
        let mut plans = self.plans.write().unwrap_or_else(PoisonError::into_inner);
        let current = plans
            .get(&event_id)
            .ok_or(CaterError::UnknownEvent(event_id))?;

        let mut next = PlanSet::clone(current);
        let value = update(&mut next)?;

        let next = Arc::new(next);
        plans.insert(event_id, Arc::clone(&next));
        Ok((next, value))
    }

    /// Move one batch a step forward (kitchen action).
    pub fn advance_batch(
        &self,
        event_id: EventId,
        batch_id: u32,
        telemetry: &dyn ConsumptionTelemetry,
    ) -> Result<Arc<PlanSet>> {
        self.modify(event_id, |plan| {
            let batch = plan
                .batches
                .iter_mut()
                .find(|b| b.id == batch_id)
                .ok_or_else(|| {
                    CaterError::InvalidInput(format!(
                        "event {} has no batch {}",
                        event_id, batch_id
                    ))
                })?;
            scheduling::advance(batch, telemetry)
        })
        .map(|(plan, _)| plan)
    }

    /// Check every gated batch of the event against telemetry.
    pub fn evaluate_triggers(
        &self,
        event_id: EventId,
        telemetry: &dyn ConsumptionTelemetry,
    ) -> Result<(Arc<PlanSet>, Vec<(u32, TriggerOutcome)>)> {
        self.modify(event_id, |plan| {
            Ok(plan
                .batches
                .iter_mut()
                .filter_map(|b| scheduling::evaluate_trigger(b, telemetry).map(|o| (b.id, o)))
                .collect())
        })
    }

    /// Copies of all plans, ordered by event id.
    pub fn snapshot(&self) -> Vec<PlanSet> {
        let plans = self.plans.read().unwrap_or_else(PoisonError::into_inner);
        let mut all: Vec<PlanSet> = plans.values().map(|p| PlanSet::clone(p)).collect();
        all.sort_by_key(|p| p.event_id);
        all
    }
}
