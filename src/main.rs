use clap::Parser;
use std::path::Path;

use intelli_cater_rs::api::{CreateEventRequest, IndentService};
use intelli_cater_rs::cli::{Cli, Command, EventAction};
use intelli_cater_rs::config::EngineConfig;
use intelli_cater_rs::error::Result;
use intelli_cater_rs::interface::{
    display_averted_waste, display_batches, display_events, display_indent, display_menu,
    parse_date, prompt_context, prompt_date, prompt_demographics, prompt_menu_items, prompt_text,
};
use intelli_cater_rs::logging;
use intelli_cater_rs::models::{
    ContextSettings, DemographicProfile, EventId, MenuItemId, ProfileType, SpiceIndex,
};
use intelli_cater_rs::planner::FixedVariance;
use intelli_cater_rs::state::{
    export_indent, import_catalog, load_catalog, load_events, load_plans, save_catalog,
    save_events, save_plans, EventBook, PlanStore,
};

fn main() {
    logging::init();
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = EngineConfig::load_or_default(cli.config.as_deref().map(Path::new))?;

    match cli.command {
        Command::Menu { ref term } => cmd_menu(&cli, term.as_deref().unwrap_or("")),
        Command::Import {
            ref inventory,
            ref recipes,
            ref out,
        } => cmd_import(
            inventory,
            recipes,
            out.as_deref().unwrap_or(&cli.catalog),
            &config,
        ),
        Command::Event {
            action: EventAction::List,
        } => cmd_event_list(&cli),
        Command::Event {
            action:
                EventAction::Create {
                    ref name,
                    ref venue,
                    ref date,
                    male,
                    female,
                    child,
                    profile,
                    spice,
                    fat_boost,
                    ref items,
                },
        } => {
            let draft = EventDraft {
                name: name.clone(),
                venue: venue.clone(),
                date: date.clone(),
                male,
                female,
                child,
                profile,
                spice,
                fat_boost,
                items: items.clone(),
            };
            cmd_event_create(&cli, config, draft)
        }
        Command::Indent { event_id, ref csv } => cmd_indent(&cli, config, event_id, csv.as_deref()),
        Command::Plan { event_id } => cmd_plan(&cli, config, event_id),
        Command::Advance {
            event_id,
            batch_id,
            variance,
        } => cmd_advance(&cli, config, event_id, batch_id, variance),
        Command::Waste { event_id } => cmd_waste(&cli, config, event_id),
    }
}

/// Event fields given on the command line; the rest are prompted for.
struct EventDraft {
    name: Option<String>,
    venue: Option<String>,
    date: Option<String>,
    male: Option<i64>,
    female: Option<i64>,
    child: Option<i64>,
    profile: Option<ProfileType>,
    spice: Option<SpiceIndex>,
    fat_boost: bool,
    items: Vec<MenuItemId>,
}

fn open_service(cli: &Cli, config: EngineConfig) -> Result<IndentService> {
    let catalog = load_catalog(&cli.catalog)?;
    catalog.check_integrity()?;
    let events = EventBook::new(load_events(&cli.events)?);
    let plans = PlanStore::from_plans(load_plans(&cli.plans)?);
    Ok(IndentService::new(catalog, config, events, plans))
}

fn save_service(cli: &Cli, service: &IndentService) -> Result<()> {
    save_events(&cli.events, &service.events())?;
    save_plans(&cli.plans, &service.plans().snapshot())
}

/// Search the menu.
fn cmd_menu(cli: &Cli, term: &str) -> Result<()> {
    let catalog = load_catalog(&cli.catalog)?;
    let items = catalog.search(term);

    let title = if term.trim().is_empty() {
        "Menu".to_string()
    } else {
        format!("Menu matching '{}'", term.trim())
    };
    display_menu(&items, &title);

    if items.is_empty() {
        if let Some(item) = catalog.suggest(term) {
            println!("Did you mean '{}'?", item.name);
        }
    }
    Ok(())
}

/// Build the catalog from CSV sheets.
fn cmd_import(inventory: &str, recipes: &str, out: &str, config: &EngineConfig) -> Result<()> {
    let catalog = import_catalog(inventory, recipes, config.default_piece_grams)?;
    catalog.check_integrity()?;
    save_catalog(out, &catalog)?;

    println!(
        "Imported {} ingredients and {} menu items into {}",
        catalog.ingredient_len(),
        catalog.menu_len(),
        out
    );
    let empty = catalog
        .all_menu_items()
        .iter()
        .filter(|m| m.recipe.is_empty())
        .count();
    if empty > 0 {
        println!("{} menu items have no linked ingredients and cannot be planned.", empty);
    }
    Ok(())
}

fn cmd_event_list(cli: &Cli) -> Result<()> {
    display_events(&load_events(&cli.events)?);
    Ok(())
}

/// Create an event from flags, prompting for anything missing.
fn cmd_event_create(cli: &Cli, config: EngineConfig, draft: EventDraft) -> Result<()> {
    let service = open_service(cli, config)?;

    let name = match draft.name {
        Some(name) => name,
        None => prompt_text("Event name", None)?,
    };
    let venue = match draft.venue {
        Some(venue) => venue,
        None => prompt_text("Venue", None)?,
    };
    let date = match draft.date {
        Some(date) => parse_date(&date)?,
        None => prompt_date()?,
    };

    let demographics = match (draft.male, draft.female, draft.child) {
        (None, None, None) => prompt_demographics()?,
        (male, female, child) => DemographicProfile::new(
            male.unwrap_or(0),
            female.unwrap_or(0),
            child.unwrap_or(0),
        ),
    };

    let mut context = match draft.profile {
        Some(profile_type) => ContextSettings {
            profile_type,
            ..ContextSettings::default()
        },
        None => prompt_context()?,
    };
    if let Some(spice) = draft.spice {
        context.spice_index = spice;
    }
    context.fat_boost |= draft.fat_boost;

    let menu_item_ids = if draft.items.is_empty() {
        prompt_menu_items(service.catalog())?
    } else {
        draft.items
    };

    let response = service.create_event(CreateEventRequest {
        name,
        date,
        venue,
        pax_male: demographics.male,
        pax_female: demographics.female,
        pax_child: demographics.child,
        profile_type: context.profile_type.to_string(),
        spice_index: Some(context.spice_index.to_string()),
        fat_boost: context.fat_boost,
        menu_item_ids,
    })?;
    save_service(cli, &service)?;

    println!("Created event #{}", response.id);
    Ok(())
}

/// Calculate and publish the indent for an event.
fn cmd_indent(cli: &Cli, config: EngineConfig, event_id: EventId, csv: Option<&str>) -> Result<()> {
    let service = open_service(cli, config)?;
    let event = service.event(event_id)?;

    let (allocation, plan) = service.calculate(event_id, &event.menu_item_ids)?;
    save_service(cli, &service)?;

    display_indent(&event, Some(&allocation), &plan.indent);
    println!("Plan revision {}", plan.revision);

    if let Some(path) = csv {
        export_indent(path, &plan.indent)?;
        println!("Indent written to {}", path);
    }
    Ok(())
}

/// Show the JIT batches of the latest plan.
fn cmd_plan(cli: &Cli, config: EngineConfig, event_id: EventId) -> Result<()> {
    let service = open_service(cli, config)?;
    let event = service.event(event_id)?;
    let plan = service.plan(event_id)?;

    println!(
        "{} | revision {} | calculated {}",
        event.name,
        plan.revision,
        plan.calculated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    display_batches(&plan.batches);
    Ok(())
}

/// Move a batch forward.
fn cmd_advance(
    cli: &Cli,
    config: EngineConfig,
    event_id: EventId,
    batch_id: u32,
    variance: f64,
) -> Result<()> {
    let service = open_service(cli, config)?;
    let plan = service.advance_batch(event_id, batch_id, &FixedVariance(variance))?;
    save_service(cli, &service)?;

    if let Some(batch) = plan.batch(batch_id) {
        println!("{} is now {}", batch.name, batch.status);
    }
    Ok(())
}

/// Show the lines never cooked because the gated batch stayed held.
fn cmd_waste(cli: &Cli, config: EngineConfig, event_id: EventId) -> Result<()> {
    let service = open_service(cli, config)?;
    display_averted_waste(&service.averted_waste(event_id)?);
    Ok(())
}
