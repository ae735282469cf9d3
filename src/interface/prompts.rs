use chrono::NaiveDateTime;
use dialoguer::{Confirm, Input, Select};
use strsim::jaro_winkler;

use crate::error::{CaterError, Result};
use crate::models::{ContextSettings, DemographicProfile, MenuItem, MenuItemId, ProfileType, SpiceIndex};
use crate::state::Catalog;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Prompt for a non-empty line of text.
pub fn prompt_text(prompt: &str, default: Option<&str>) -> Result<String> {
    let mut input = Input::<String>::new().with_prompt(prompt);
    if let Some(default) = default {
        input = input.default(default.to_string());
    }
    let value = input.interact_text()?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(CaterError::InvalidInput(format!("{} must not be empty", prompt)));
    }
    Ok(value)
}

/// Prompt for the event start, `YYYY-MM-DD HH:MM`.
pub fn prompt_date() -> Result<NaiveDateTime> {
    let input: String = Input::new()
        .with_prompt("Event start (YYYY-MM-DD HH:MM)")
        .interact_text()?;

    parse_date(&input)
}

pub fn parse_date(input: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|_| CaterError::InvalidInput(format!("Invalid date '{}'", input.trim())))
}

fn prompt_count(prompt: &str) -> Result<i64> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .default("0".to_string())
        .interact_text()?;

    let count: i64 = input
        .trim()
        .parse()
        .map_err(|_| CaterError::InvalidInput("Invalid number".to_string()))?;
    if count < 0 {
        return Err(CaterError::InvalidInput(
            "Headcount must not be negative".to_string(),
        ));
    }
    Ok(count)
}

/// Prompt for the three headcounts.
pub fn prompt_demographics() -> Result<DemographicProfile> {
    let male = prompt_count("Adult men expected")?;
    let female = prompt_count("Adult women expected")?;
    let child = prompt_count("Children expected")?;
    Ok(DemographicProfile::new(male, female, child))
}

/// Prompt for the regional and culinary context.
pub fn prompt_context() -> Result<ContextSettings> {
    let profiles = [ProfileType::Urban, ProfileType::Rural];
    let profile = Select::new()
        .with_prompt("Guest profile")
        .items(&["Urban (variety, smaller portions)", "Rural (volume, heavier mains)"])
        .default(0)
        .interact()?;

    let spices = [SpiceIndex::Low, SpiceIndex::Medium, SpiceIndex::High];
    let spice = Select::new()
        .with_prompt("Spice level")
        .items(&["Low", "Medium", "High"])
        .default(1)
        .interact()?;

    let fat_boost = prompt_yes_no("Boost ghee and oil for this crowd?", false)?;

    Ok(ContextSettings {
        profile_type: profiles[profile],
        spice_index: spices[spice],
        fat_boost,
    })
}

/// Pick menu items by name, with fuzzy matching.
pub fn prompt_menu_items(catalog: &Catalog) -> Result<Vec<MenuItemId>> {
    let mut selected: Vec<MenuItemId> = Vec::new();

    loop {
        let input: String = Input::new()
            .with_prompt("Add a menu item (or press Enter to finish)")
            .allow_empty(true)
            .interact_text()?;

        let input = input.trim();
        if input.is_empty() {
            break;
        }

        if let Ok(item) = catalog.find_menu_item(input) {
            add(&mut selected, item);
            continue;
        }

        let needle = input.to_lowercase();
        let mut candidates: Vec<(&MenuItem, f64)> = catalog
            .all_menu_items()
            .iter()
            .map(|m| (m, jaro_winkler(&m.name.to_lowercase(), &needle)))
            .filter(|(_, score)| *score > 0.7)
            .collect();
        candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        match candidates.as_slice() {
            [] => println!("No menu item matches '{}'", input),
            [(item, _)] => {
                if prompt_yes_no(&format!("Did you mean '{}'?", item.name), true)? {
                    add(&mut selected, item);
                }
            }
            many => {
                let options: Vec<&MenuItem> = many.iter().take(5).map(|(m, _)| *m).collect();
                let mut labels: Vec<String> = options
                    .iter()
                    .map(|m| format!("{} ({})", m.name, m.category))
                    .collect();
                labels.push("None of these".to_string());

                let choice = Select::new()
                    .with_prompt("Which did you mean?")
                    .items(&labels)
                    .default(0)
                    .interact()?;
                if let Some(item) = options.get(choice) {
                    add(&mut selected, item);
                }
            }
        }
    }

    Ok(selected)
}

fn add(selected: &mut Vec<MenuItemId>, item: &MenuItem) {
    if selected.contains(&item.id) {
        println!("Already selected: {}", item.name);
    } else {
        selected.push(item.id);
        println!("Added: {}", item.name);
    }
}

/// Prompt for yes/no confirmation.
pub fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        let date = parse_date(" 2026-03-01 18:45 ").unwrap();
        assert_eq!(date.format("%H:%M").to_string(), "18:45");
        assert!(parse_date("tomorrow").is_err());
    }
}
