//! Boundary types for the event and indent endpoints, and the service that
//! answers them.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{CaterError, Result};
use crate::models::event::dedup_ids;
use crate::models::{
    ContextSettings, DemographicProfile, Event, EventId, IndentLine, MenuItemId, ProfileType,
    SpiceIndex,
};
use crate::planner::{self, Allocation, ConsumptionTelemetry, TriggerOutcome};
use crate::state::{Catalog, EventBook, PlanSet, PlanStore};

/// `POST /events` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    pub date: NaiveDateTime,
    pub venue: String,
    pub pax_male: i64,
    pub pax_female: i64,
    pub pax_child: i64,
    pub profile_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spice_index: Option<String>,
    #[serde(default)]
    pub fat_boost: bool,
    #[serde(default)]
    pub menu_item_ids: Vec<MenuItemId>,
}

impl CreateEventRequest {
    /// Validate the payload into an event with no id yet.
    pub fn into_event(self) -> Result<Event> {
        let profile_type: ProfileType = self.profile_type.parse()?;
        let spice_index = match self.spice_index.as_deref() {
            Some(s) => s.parse()?,
            None => SpiceIndex::default(),
        };
        let demographics = DemographicProfile::new(self.pax_male, self.pax_female, self.pax_child);
        demographics.validate()?;

        Ok(Event {
            id: 0,
            name: self.name,
            venue: self.venue,
            date: self.date,
            demographics,
            context: ContextSettings {
                profile_type,
                spice_index,
                fat_boost: self.fat_boost,
            },
            menu_item_ids: self.menu_item_ids,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateEventResponse {
    pub id: EventId,
}

/// `POST /calculate-indent` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculateIndentRequest {
    pub event_id: EventId,
    pub menu_item_ids: Vec<MenuItemId>,
}

/// Grams per person granted to one menu item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortionView {
    pub menu_item_id: MenuItemId,
    pub name: String,
    pub grams: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculateIndentResponse {
    pub capacity: f64,
    pub total_items: usize,
    pub scale_factor: f64,
    pub portion_per_item: Vec<PortionView>,
    pub indent: Vec<IndentLine>,
    pub revision: u64,
}

/// Catalog, events and published plans behind one handle.
///
/// Each calculation works on a cloned event snapshot, so concurrent
/// requests never see a half-edited event.
#[derive(Debug)]
pub struct IndentService {
    catalog: Catalog,
    config: EngineConfig,
    events: Mutex<EventBook>,
    plans: PlanStore,
}

impl IndentService {
    pub fn new(catalog: Catalog, config: EngineConfig, events: EventBook, plans: PlanStore) -> Self {
        Self {
            catalog,
            config,
            events: Mutex::new(events),
            plans,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn plans(&self) -> &PlanStore {
        &self.plans
    }

    pub fn create_event(&self, request: CreateEventRequest) -> Result<CreateEventResponse> {
        let event = request.into_event()?;
        for id in &event.menu_item_ids {
            self.catalog.menu_item(*id)?;
        }
        let id = self.lock_events().create(event)?;
        Ok(CreateEventResponse { id })
    }

    pub fn event(&self, id: EventId) -> Result<Event> {
        self.lock_events().get(id).cloned()
    }

    pub fn events(&self) -> Vec<Event> {
        self.lock_events().to_events()
    }

    /// Compute and publish the plan for an event with the given selection.
    ///
    /// The selection is stored on the event only once the plan is published.
    pub fn calculate(
        &self,
        event_id: EventId,
        menu_item_ids: &[MenuItemId],
    ) -> Result<(Allocation, Arc<PlanSet>)> {
        let calculated_at = Utc::now();
        let mut snapshot = self.event(event_id)?;
        snapshot.menu_item_ids = dedup_ids(menu_item_ids);

        let plan = planner::plan_event(&snapshot, &self.catalog, &self.config)?;
        let published = self
            .plans
            .publish(snapshot.id, calculated_at, plan.indent, plan.batches)?;
        self.lock_events().set_selection(event_id, &snapshot.menu_item_ids)?;
        Ok((plan.allocation, published))
    }

    pub fn calculate_indent(
        &self,
        request: CalculateIndentRequest,
    ) -> Result<CalculateIndentResponse> {
        let (allocation, published) = self.calculate(request.event_id, &request.menu_item_ids)?;

        Ok(CalculateIndentResponse {
            capacity: allocation.capacity_grams,
            total_items: published.indent.total_items,
            scale_factor: allocation.scale_factor,
            portion_per_item: allocation
                .portions
                .iter()
                .map(|p| PortionView {
                    menu_item_id: p.menu_item_id,
                    name: p.name.clone(),
                    grams: p.grams,
                })
                .collect(),
            indent: published.indent.lines.clone(),
            revision: published.revision,
        })
    }

    /// Latest published plan for an event.
    pub fn plan(&self, event_id: EventId) -> Result<Arc<PlanSet>> {
        self.lock_events().get(event_id)?;
        self.plans.latest(event_id).ok_or_else(|| {
            CaterError::InvalidInput(format!("no indent calculated for event {}", event_id))
        })
    }

    pub fn advance_batch(
        &self,
        event_id: EventId,
        batch_id: u32,
        telemetry: &dyn ConsumptionTelemetry,
    ) -> Result<Arc<PlanSet>> {
        self.plan(event_id)?;
        self.plans.advance_batch(event_id, batch_id, telemetry)
    }

    pub fn evaluate_triggers(
        &self,
        event_id: EventId,
        telemetry: &dyn ConsumptionTelemetry,
    ) -> Result<Vec<(u32, TriggerOutcome)>> {
        self.plan(event_id)?;
        self.plans
            .evaluate_triggers(event_id, telemetry)
            .map(|(_, outcomes)| outcomes)
    }

    /// Lines held back by unreleased gated batches.
    pub fn averted_waste(&self, event_id: EventId) -> Result<Vec<IndentLine>> {
        Ok(planner::averted_waste(&self.plan(event_id)?.batches))
    }

    fn lock_events(&self) -> std::sync::MutexGuard<'_, EventBook> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Ingredient, MenuItem, RecipeLine, Unit};

    fn request(profile: &str) -> CreateEventRequest {
        serde_json::from_value(serde_json::json!({
            "name": "Sangeet",
            "date": "2026-12-01T19:30:00",
            "venue": "Banquet 2",
            "pax_male": 40,
            "pax_female": 40,
            "pax_child": 10,
            "profile_type": profile,
            "menu_item_ids": [1, 2]
        }))
        .unwrap()
    }

    #[test]
    fn test_request_into_event() {
        let event = request("rural").into_event().unwrap();
        assert_eq!(event.context.profile_type, ProfileType::Rural);
        assert_eq!(event.context.spice_index, SpiceIndex::Medium);
        assert_eq!(event.demographics.total_headcount(), 90);
    }

    #[test]
    fn test_request_rejects_unknown_profile() {
        assert!(matches!(
            request("suburban").into_event(),
            Err(CaterError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_failed_calculation_keeps_selection() {
        let catalog = Catalog::new(
            vec![Ingredient {
                id: 1,
                name: "Basmati Rice".to_string(),
                category: "Grains".to_string(),
                unit: Unit::Kilogram,
                stock_qty: 0.0,
                grams_per_unit: None,
                regional_name: None,
            }],
            vec![MenuItem {
                id: 1,
                name: "Jeera Rice".to_string(),
                category: "Rice".to_string(),
                sub_category: String::new(),
                diet_type: "Veg".to_string(),
                recipe: vec![RecipeLine {
                    ingredient_id: 1,
                    grams: 150.0,
                }],
            }],
        );
        let service = IndentService::new(
            catalog,
            EngineConfig::default(),
            EventBook::default(),
            PlanStore::new(),
        );
        let mut payload = request("urban");
        payload.menu_item_ids = vec![1];
        let id = service.create_event(payload).unwrap().id;

        let err = service
            .calculate_indent(CalculateIndentRequest {
                event_id: id,
                menu_item_ids: vec![999],
            })
            .unwrap_err();
        assert!(matches!(err, CaterError::UnknownMenuItem(999)));
        assert!(matches!(service.calculate(id, &[]), Err(CaterError::EmptySelection)));
        assert_eq!(service.event(id).unwrap().menu_item_ids, vec![1]);
        assert!(service.plans().latest(id).is_none());

        service.calculate(id, &[1, 1]).unwrap();
        assert_eq!(service.event(id).unwrap().menu_item_ids, vec![1]);
    }

    #[test]
    fn test_unknown_event_is_404() {
        let service = IndentService::new(
            Catalog::default(),
            EngineConfig::default(),
            EventBook::default(),
            PlanStore::new(),
        );
        let err = service
            .calculate_indent(CalculateIndentRequest {
                event_id: 42,
                menu_item_ids: vec![1],
            })
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }
}
