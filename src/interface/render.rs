use crate::models::{Batch, Event, Indent, IndentLine, MenuItem};
use crate::planner::{display_load, Allocation};

/// Display menu items in a compact table.
pub fn display_menu(items: &[&MenuItem], title: &str) {
    if items.is_empty() {
        println!("{}: (none)", title);
        return;
    }

    println!();
    println!("=== {} ({} items) ===", title, items.len());
    println!();

    let width = items.iter().map(|i| i.name.len()).max().unwrap_or(10);
    for item in items {
        println!(
            "  {:>5}  {:<width$}  {} / {} ({})",
            item.id,
            item.name,
            item.category,
            item.sub_category,
            item.diet_type,
            width = width
        );
    }
    println!();
}

pub fn display_events(events: &[Event]) {
    if events.is_empty() {
        println!("No events yet. Use 'event create' to add one.");
        return;
    }

    println!();
    for event in events {
        println!(
            "  #{:<4} {} @ {} on {} | pax {} (M {} / F {} / C {}) | {} {} spice{} | {} items",
            event.id,
            event.name,
            event.venue,
            event.date.format("%Y-%m-%d %H:%M"),
            event.demographics.total_headcount(),
            event.demographics.male,
            event.demographics.female,
            event.demographics.child,
            event.context.profile_type,
            event.context.spice_index,
            if event.context.fat_boost { " +fat" } else { "" },
            event.menu_item_ids.len()
        );
    }
    println!();
}

/// Display portions and the ingredient indent for an event.
pub fn display_indent(event: &Event, allocation: Option<&Allocation>, indent: &Indent) {
    println!();
    println!("=== Indent: {} ===", event.name);
    println!();
    println!(
        "Metabolic load: {} adult equivalents | Capacity: {:.0} g/person",
        display_load(indent.metabolic_load),
        indent.capacity
    );

    if let Some(allocation) = allocation {
        if allocation.density_trap() {
            println!(
                "Density trap: recipes scaled by {:.3} to fit the stomach ceiling",
                allocation.scale_factor
            );
        }
        println!();
        println!("--- Portions ({}, per person) ---", allocation.strategy);
        let width = allocation
            .portions
            .iter()
            .map(|p| p.name.len())
            .max()
            .unwrap_or(10);
        for portion in &allocation.portions {
            println!(
                "  {:<width$}  {:>7.1} g",
                portion.name,
                portion.grams,
                width = width
            );
        }
    }

    println!();
    println!("--- Ingredients ---");
    display_lines(&indent.lines);
    println!();
    println!(
        "Total items: {} | Per person: {:.1} g",
        indent.total_items, indent.per_person_grams
    );
    println!();
}

/// Display the JIT cooking batches.
pub fn display_batches(batches: &[Batch]) {
    for batch in batches {
        println!();
        let gate = batch
            .trigger_condition
            .map(|t| format!(" | releases above +{:.1}% consumption", t.variance_threshold_pct))
            .unwrap_or_default();
        println!(
            "=== {} ({}%) {} [{}]{} ===",
            batch.name,
            batch.percentage_of_total,
            batch.time_label(),
            batch.status,
            gate
        );
        display_lines(&batch.lines);
    }
    println!();
}

/// Display what was never cooked because the final batch stayed held.
pub fn display_averted_waste(lines: &[IndentLine]) {
    if lines.is_empty() {
        println!("No averted waste: every batch was released.");
        return;
    }
    println!();
    println!("=== Averted waste ===");
    display_lines(lines);
    println!();
}

fn display_lines(lines: &[IndentLine]) {
    let width = lines.iter().map(|l| l.name.len()).max().unwrap_or(10);
    for line in lines {
        println!(
            "  {:>5}  {:<width$}  {:>10.prec$} {:<3}  {}",
            line.ingredient_id,
            line.name,
            line.quantity,
            line.unit.symbol(),
            line.category,
            width = width,
            prec = line.unit.decimals() as usize
        );
    }
}
