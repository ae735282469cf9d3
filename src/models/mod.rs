pub mod batch;
pub mod event;
pub mod indent;
pub mod menu;

pub use batch::{Batch, BatchStatus, TriggerCondition};
pub use event::{ContextSettings, DemographicProfile, Event, EventId, ProfileType, SpiceIndex};
pub use indent::{Indent, IndentLine};
pub use menu::{Ingredient, IngredientId, MenuItem, MenuItemId, RecipeLine, Unit};
