//! End-to-end checks against a small JSON dataset.

use assembly_planner::prelude::*;

const DATASET: &str = r#"{
    "version": "1.0.0",
    "recipes": {
        "widget": {
            "category": "crafting",
            "time": 1,
            "ingredients": [
                { "name": "a", "amount": 1 },
                { "name": "b", "amount": 2 }
            ],
            "results": [{ "name": "widget", "amount": 1 }]
        },
        "make-x": {
            "ingredients": [{ "name": "y", "amount": 1 }],
            "results": [{ "name": "x" }]
        },
        "make-y": {
            "ingredients": [{ "name": "x", "amount": 1 }],
            "results": [{ "name": "y" }]
        }
    },
    "items": {
        "widget": { "displayName": "Widget" }
    }
}"#;

fn index() -> RecipeIndex {
    RecipeIndex::from_dataset(Dataset::from_json_str(DATASET).expect("dataset"))
}

#[test]
fn test_reference_widget_numbers() {
    let index = index();

    let tree = build_tree(&index, "widget", 10.0, DEFAULT_TREE_DEPTH).expect("tree");
    assert_eq!(tree.machines_needed, 8.0);
    assert_eq!(tree.display_name, "Widget");

    let demand = compute_aggregate_demand(&index, "widget", 10.0).expect("demand");
    let rates: Vec<(&str, f64)> = demand.iter().map(|e| (e.item.as_str(), e.rate)).collect();
    assert_eq!(rates, vec![("b", 20.0), ("a", 10.0)]);
}

#[test]
fn test_cycle_contributes_one_level() {
    let index = index();
    let demand = compute_aggregate_demand(&index, "x", 3.0).expect("demand");
    let rates: Vec<(&str, f64)> = demand.iter().map(|e| (e.item.as_str(), e.rate)).collect();
    assert_eq!(rates, vec![("x", 3.0), ("y", 3.0)]);
}

#[test]
fn test_not_found_only_at_top_level() {
    let index = index();
    assert_eq!(
        compute_aggregate_demand(&index, "a", 1.0),
        Err(PlannerError::not_found("a"))
    );
    assert!(build_table(&index, "widget", 1.0).is_ok());
}

#[test]
fn test_json_shapes() {
    let index = index();

    let table = build_table(&index, "widget", 1.0).expect("table");
    let json = serde_json::to_value(&table).expect("serialize");
    assert_eq!(json["rawMaterials"]["b"], serde_json::json!(2.0));
    assert_eq!(
        json["items"]["a"]["consumedBy"]["widget"],
        serde_json::json!(1.0)
    );

    let graph = build_item_subgraph(&index, "x", 1);
    let json = serde_json::to_value(&graph).expect("serialize");
    let relationships: Vec<_> = json["edges"]
        .as_array()
        .expect("edges")
        .iter()
        .map(|e| e["relationship"].as_str().unwrap_or_default().to_string())
        .collect();
    assert!(relationships.contains(&"produces".to_string()));
    assert!(relationships.contains(&"consumedBy".to_string()));
    assert_eq!(json["nodes"][0]["id"], serde_json::json!("item:x"));
}
