use std::thread;

use intelli_cater_rs::api::{CalculateIndentRequest, CreateEventRequest, IndentService};
use intelli_cater_rs::config::EngineConfig;
use intelli_cater_rs::error::CaterError;
use intelli_cater_rs::logging;
use intelli_cater_rs::models::{BatchStatus, Ingredient, IngredientId, MenuItem, RecipeLine, Unit};
use intelli_cater_rs::planner::{FixedVariance, ServingsTelemetry, TriggerOutcome};
use intelli_cater_rs::state::{load_plans, save_plans, Catalog, EventBook, PlanStore};

fn ingredient(id: IngredientId, name: &str, category: &str, unit: Unit) -> Ingredient {
    Ingredient {
        id,
        name: name.to_string(),
        category: category.to_string(),
        unit,
        stock_qty: 0.0,
        grams_per_unit: None,
        regional_name: None,
    }
}

fn recipe(lines: &[(IngredientId, f64)]) -> Vec<RecipeLine> {
    lines
        .iter()
        .map(|(ingredient_id, grams)| RecipeLine {
            ingredient_id: *ingredient_id,
            grams: *grams,
        })
        .collect()
}

fn service() -> IndentService {
    let catalog = Catalog::new(
        vec![
            ingredient(1, "Basmati Rice", "Grains", Unit::Kilogram),
            ingredient(2, "Ghee", "Ghee & Oils", Unit::Litre),
            ingredient(3, "Chicken", "Meat", Unit::Kilogram),
            ingredient(4, "Kashmiri Chilli", "Spices & Masala", Unit::Kilogram),
            ingredient(5, "Milk", "Dairy", Unit::Litre),
        ],
        vec![
            MenuItem {
                id: 1,
                name: "Chicken Biryani".to_string(),
                category: "Non-Veg Biryani".to_string(),
                sub_category: "Rice".to_string(),
                diet_type: "Non-Veg".to_string(),
                recipe: recipe(&[(1, 150.0), (3, 120.0), (2, 15.0), (4, 4.0)]),
            },
            MenuItem {
                id: 2,
                name: "Kheer".to_string(),
                category: "Dessert".to_string(),
                sub_category: "Sweets".to_string(),
                diet_type: "Veg".to_string(),
                recipe: recipe(&[(5, 120.0), (1, 20.0)]),
            },
        ],
    );
    IndentService::new(catalog, EngineConfig::default(), EventBook::default(), PlanStore::new())
}

fn create_request(items: Vec<u32>) -> CreateEventRequest {
    serde_json::from_value(serde_json::json!({
        "name": "Eid Dinner",
        "date": "2026-03-20T20:00:00",
        "venue": "Community Hall",
        "pax_male": 300,
        "pax_female": 250,
        "pax_child": 50,
        "profile_type": "Urban",
        "menu_item_ids": items
    }))
    .unwrap()
}

#[test]
fn test_create_and_calculate() {
    logging::init_test();
    let service = service();

    let created = service.create_event(create_request(vec![1, 2])).unwrap();
    assert_eq!(created.id, 1);

    let response = service
        .calculate_indent(CalculateIndentRequest {
            event_id: created.id,
            menu_item_ids: vec![1, 2],
        })
        .unwrap();
    assert_eq!(response.capacity, 1000.0);
    assert_eq!(response.total_items, 2);
    assert_eq!(response.revision, 1);
    assert_eq!(response.indent.len(), 5);
    let portions: f64 = response.portion_per_item.iter().map(|p| p.grams).sum();
    assert!((portions - 1000.0).abs() < 1e-6);

    let json = serde_json::to_value(&response).unwrap();
    assert!(json["indent"][0].get("id").is_some());
    assert!(json["indent"][0].get("quantity").is_some());

    let plan = service.plan(created.id).unwrap();
    assert_eq!(plan.batches.len(), 3);
    assert!(plan.batches[2].is_gated());
}

#[test]
fn test_create_rejects_unknown_menu_item() {
    let service = service();
    let err = service.create_event(create_request(vec![1, 77])).unwrap_err();
    assert!(matches!(err, CaterError::UnknownMenuItem(77)));
    assert!(service.events().is_empty());
}

#[test]
fn test_kitchen_flow_and_reconciliation() {
    let service = service();
    let id = service.create_event(create_request(vec![1])).unwrap().id;
    service.calculate(id, &[1]).unwrap();

    let telemetry = FixedVariance(0.0);
    service.advance_batch(id, 1, &telemetry).unwrap();
    let plan = service.advance_batch(id, 1, &telemetry).unwrap();
    assert_eq!(plan.batches[0].status, BatchStatus::Ready);

    // Same menu: status survives the recompute.
    let (_, plan) = service.calculate(id, &[1]).unwrap();
    assert_eq!(plan.revision, 2);
    assert_eq!(plan.batches[0].status, BatchStatus::Ready);

    // Changed menu while a batch is in flight: surfaced, not overwritten.
    let err = service.calculate(id, &[1, 2]).unwrap_err();
    assert_eq!(err.status_code(), 409);
    assert_eq!(service.plan(id).unwrap().revision, 2);

    // The gated batch waits for consumption to run ahead of projection.
    let held = service
        .evaluate_triggers(
            id,
            &ServingsTelemetry {
                actual_servings: 306.3,
                projected_servings: 300.0,
            },
        )
        .unwrap();
    assert!(matches!(held[0], (3, TriggerOutcome::Held { .. })));
    assert_eq!(service.averted_waste(id).unwrap().len(), 4);

    assert!(matches!(
        service.advance_batch(id, 3, &FixedVariance(4.0)),
        Err(CaterError::TriggerNotMet { .. })
    ));
    service.advance_batch(id, 3, &FixedVariance(6.0)).unwrap();
    assert!(service.averted_waste(id).unwrap().is_empty());
}

#[test]
fn test_concurrent_recomputes_publish_whole_plans() {
    let service = service();
    let id = service.create_event(create_request(vec![1, 2])).unwrap().id;
    service.calculate(id, &[1, 2]).unwrap();

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..10 {
                    match service.calculate(id, &[1, 2]) {
                        Ok(_) | Err(CaterError::StalePlan { .. }) => {}
                        Err(e) => panic!("unexpected error: {}", e),
                    }
                }
            });
        }
        for _ in 0..2 {
            s.spawn(|| {
                for _ in 0..20 {
                    let plan = service.plan(id).unwrap();
                    assert_eq!(plan.batches.len(), 3);
                    for (idx, line) in plan.indent.lines.iter().enumerate() {
                        let total: f64 = plan.batches.iter().map(|b| b.lines[idx].quantity).sum();
                        assert!((total - line.quantity).abs() < 1e-6);
                    }
                }
            });
        }
    });

    assert!(service.plan(id).unwrap().revision >= 2);
}

#[test]
fn test_plans_survive_save_and_load() {
    let service = service();
    let id = service.create_event(create_request(vec![2])).unwrap().id;
    service.calculate(id, &[2]).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plans.json");
    let before = service.plans().snapshot();
    save_plans(&path, &before).unwrap();

    let after = load_plans(&path).unwrap();
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].calculated_at, before[0].calculated_at);
    assert_eq!(after[0].batches.len(), before[0].batches.len());
    for (a, b) in after[0].indent.lines.iter().zip(&before[0].indent.lines) {
        assert_eq!(a.ingredient_id, b.ingredient_id);
        assert!((a.quantity - b.quantity).abs() < 1e-9);
    }

    let store = PlanStore::from_plans(after);
    assert_eq!(store.latest(id).unwrap().revision, 1);
}
