use thiserror::Error;

use crate::models::{BatchStatus, EventId, IngredientId, MenuItemId};

#[derive(Debug, Error)]
pub enum CaterError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No menu items selected")]
    EmptySelection,

    #[error("Unknown ingredient id: {0}")]
    UnknownIngredient(IngredientId),

    #[error("Unknown menu item id: {0}")]
    UnknownMenuItem(MenuItemId),

    #[error("Menu item not found: {0}")]
    MenuItemNotFound(String),

    #[error("Unknown event id: {0}")]
    UnknownEvent(EventId),

    #[error("Capacity exceeded, no item can receive a viable portion. Dropped: {}", .dropped.join(", "))]
    CapacityExceeded { dropped: Vec<String> },

    #[error("Batch {batch_id} is {status}; recompute would overwrite it ({reason})")]
    ScheduleReconciliationConflict {
        batch_id: u32,
        status: BatchStatus,
        reason: String,
    },

    #[error("Plan for event {event_id} computed at {calculated_at} is older than the stored plan ({current})")]
    StalePlan {
        event_id: EventId,
        calculated_at: chrono::DateTime<chrono::Utc>,
        current: chrono::DateTime<chrono::Utc>,
    },

    #[error("Batch {batch_id} cannot move from {from} to {to}")]
    InvalidTransition {
        batch_id: u32,
        from: BatchStatus,
        to: BatchStatus,
    },

    #[error("Batch {batch_id} trigger not met: variance {variance:.1}% <= threshold {threshold:.1}%")]
    TriggerNotMet {
        batch_id: u32,
        variance: f64,
        threshold: f64,
    },

    #[error("Catalog integrity error: {0}")]
    InvalidCatalog(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl CaterError {
    /// HTTP-style status code for the calling layer.
    pub fn status_code(&self) -> u16 {
        match self {
            CaterError::UnknownEvent(_)
            | CaterError::UnknownMenuItem(_)
            | CaterError::MenuItemNotFound(_) => 404,
            CaterError::ScheduleReconciliationConflict { .. }
            | CaterError::StalePlan { .. }
            | CaterError::InvalidTransition { .. }
            | CaterError::TriggerNotMet { .. } => 409,
            CaterError::InvalidInput(_)
            | CaterError::EmptySelection
            | CaterError::CapacityExceeded { .. } => 422,
            CaterError::UnknownIngredient(_)
            | CaterError::InvalidCatalog(_)
            | CaterError::Io(_)
            | CaterError::Json(_)
            | CaterError::Prompt(_)
            | CaterError::Csv(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, CaterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_exceeded_lists_dropped_items() {
        let err = CaterError::CapacityExceeded {
            dropped: vec!["Dal".to_string(), "Rice".to_string()],
        };
        assert!(err.to_string().ends_with("Dropped: Dal, Rice"));
        assert_eq!(err.status_code(), 422);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(CaterError::UnknownEvent(7).status_code(), 404);
        assert_eq!(CaterError::UnknownIngredient(101).status_code(), 500);
        let conflict = CaterError::ScheduleReconciliationConflict {
            batch_id: 1,
            status: BatchStatus::Cooking,
            reason: "menu changed".to_string(),
        };
        assert_eq!(conflict.status_code(), 409);
    }
}
