use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::models::Event;
use crate::state::catalog::{Catalog, CatalogFile};
use crate::state::store::PlanSet;

/// Load a catalog from a JSON file.
///
/// Duplicate ids collapse to their last occurrence.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Catalog> {
    let content = fs::read_to_string(path)?;
    let file: CatalogFile = serde_json::from_str(&content)?;
    let catalog = Catalog::from_file(file);
    tracing::debug!(
        menu_items = catalog.menu_len(),
        ingredients = catalog.ingredient_len(),
        "loaded catalog"
    );
    Ok(catalog)
}

pub fn save_catalog<P: AsRef<Path>>(path: P, catalog: &Catalog) -> Result<()> {
    write_json(path.as_ref(), &catalog.to_file())
}

/// Load saved events. A missing file means no events yet.
pub fn load_events<P: AsRef<Path>>(path: P) -> Result<Vec<Event>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_events<P: AsRef<Path>>(path: P, events: &[Event]) -> Result<()> {
    write_json(path.as_ref(), &events)
}

/// Load published plans. A missing file means nothing calculated yet.
pub fn load_plans<P: AsRef<Path>>(path: P) -> Result<Vec<PlanSet>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_plans<P: AsRef<Path>>(path: P, plans: &[PlanSet]) -> Result<()> {
    write_json(path.as_ref(), &plans)
}

// Write to a sibling temp file, then rename over the target.
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
