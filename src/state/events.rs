use std::collections::BTreeMap;

use crate::error::{CaterError, Result};
use crate::models::{Event, EventId, MenuItemId};
use crate::models::event::dedup_ids;

/// Saved events keyed by id.
#[derive(Debug, Clone, Default)]
pub struct EventBook {
    events: BTreeMap<EventId, Event>,
}

impl EventBook {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events: events.into_iter().map(|e| (e.id, e)).collect(),
        }
    }

    fn next_id(&self) -> EventId {
        self.events.keys().next_back().map(|id| id + 1).unwrap_or(1)
    }

    /// Store a new event under the next free id and return that id.
    ///
    /// The incoming `id` is ignored.
    pub fn create(&mut self, mut event: Event) -> Result<EventId> {
        event.demographics.validate()?;
        if event.name.trim().is_empty() {
            return Err(CaterError::InvalidInput("event name must not be empty".to_string()));
        }

        event.id = self.next_id();
        event.menu_item_ids = dedup_ids(&event.menu_item_ids);
        let id = event.id;
        self.events.insert(id, event);

        tracing::info!(event = id, "created event");
        Ok(id)
    }

    pub fn get(&self, id: EventId) -> Result<&Event> {
        self.events.get(&id).ok_or(CaterError::UnknownEvent(id))
    }

    /// Replace an event's menu selection.
    pub fn set_selection(&mut self, id: EventId, menu_item_ids: &[MenuItemId]) -> Result<()> {
        let event = self
            .events
            .get_mut(&id)
            .ok_or(CaterError::UnknownEvent(id))?;
        event.menu_item_ids = dedup_ids(menu_item_ids);
        Ok(())
    }

    /// Events in id order.
    pub fn list(&self) -> Vec<&Event> {
        self.events.values().collect()
    }

    pub fn to_events(&self) -> Vec<Event> {
        self.events.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
