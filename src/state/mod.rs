mod catalog;
mod csv_files;
mod events;
mod persistence;
mod store;

pub use catalog::{Catalog, CatalogFile};
pub use csv_files::{export_indent, import_catalog, import_inventory, import_recipes};
pub use events::EventBook;
pub use persistence::{
    load_catalog, load_events, load_plans, save_catalog, save_events, save_plans,
};
pub use store::{PlanSet, PlanStore};
