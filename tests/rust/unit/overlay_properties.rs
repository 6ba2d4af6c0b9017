//! Hide/filter/search overlay contract.

use std::collections::HashSet;

use schemascope::graph::builder::build_record_graph;
use schemascope::graph::{GraphInstance, GraphKind, TableColorRegistry};
use schemascope::provider::models::Row;
use schemascope::schema_catalog::TableShape;
use serde_json::json;

use super::support::{catalog_row, orders_customers};
use schemascope::schema_catalog::SchemaModel;

fn entity_rows(value: serde_json::Value) -> Vec<Row> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect()
}

/// id -> order_id -> product_id chain for one row.
fn line_item_graph() -> (GraphInstance, SchemaModel) {
    let schema = SchemaModel::load(vec![
        catalog_row("line_items", "id", true, None),
        catalog_row("line_items", "order_id", false, Some(("orders", "id"))),
        catalog_row("line_items", "product_id", false, Some(("products", "id"))),
    ]);
    let rows = entity_rows(json!([{"id": 1, "order_id": 10, "product_id": 77}]));
    let mut colors = TableColorRegistry::new();
    let graph = GraphInstance::from_payload(
        GraphKind::Record,
        1,
        build_record_graph(&rows, "line_items", TableShape::Entity, &schema, &mut colors),
    );
    (graph, schema)
}

#[test]
fn hiding_a_node_hides_exactly_its_incident_edges() {
    let (mut graph, _) = line_item_graph();
    // middle node touches both edges
    graph.hide_node("line_items:order_id:10");

    let hidden_edges: Vec<_> = graph
        .edges()
        .iter()
        .filter(|e| graph.edge_hidden(&e.id))
        .collect();
    assert_eq!(hidden_edges.len(), 2);
}

#[test]
fn unhide_releases_only_the_same_actions_claim() {
    let (mut graph, _) = line_item_graph();
    let first_edge = graph.edges()[0].id.clone();

    graph.hide_node("line_items:id:1");
    graph.hide_node("line_items:order_id:10");

    // the first edge is claimed by both endpoints
    graph.unhide_node("line_items:id:1");
    assert!(
        graph.edge_hidden(&first_edge),
        "edge hidden via the other endpoint must stay hidden"
    );

    graph.unhide_node("line_items:order_id:10");
    assert!(!graph.edge_hidden(&first_edge));
}

#[test]
fn unchecking_all_fk_columns_empties_the_graph_view() {
    let (mut graph, _) = line_item_graph();
    graph.apply_fk_filter(&HashSet::new());

    assert!(graph.edges().iter().all(|e| !graph.edge_visible(&e.id)));
    assert!(graph.nodes().iter().all(|n| !graph.node_visible(&n.id)));
}

#[test]
fn rechecking_brings_the_view_back() {
    let (mut graph, _) = line_item_graph();
    graph.apply_fk_filter(&HashSet::new());

    let checked: HashSet<String> =
        ["order_id".to_string(), "product_id".to_string()].into_iter().collect();
    graph.apply_fk_filter(&checked);

    assert!(graph.edges().iter().all(|e| graph.edge_visible(&e.id)));
    assert!(graph.nodes().iter().all(|n| graph.node_visible(&n.id)));
}

#[test]
fn hidden_list_tracks_the_hidden_set_sorted_by_label() {
    let (mut graph, _) = line_item_graph();
    graph.hide_node("line_items:product_id:77");
    graph.hide_node("line_items:id:1");

    let labels: Vec<String> = graph
        .hidden_items()
        .into_iter()
        .map(|item| item.label)
        .collect();
    assert_eq!(labels, vec!["id: 1".to_string(), "product_id: 77".to_string()]);

    // one-click unhide through the list entry
    let items = graph.hidden_items();
    graph.unhide_node(&items[0].id);
    assert_eq!(graph.hidden_items().len(), 1);
}

#[test]
fn search_matches_schema_nodes_and_clears_on_empty_query() {
    let schema = orders_customers();
    let mut graph = GraphInstance::from_payload(
        GraphKind::Schema,
        1,
        schemascope::graph::builder::build_schema_graph(&schema),
    );

    let matched = graph.search_highlight("customer");
    assert!(matched.contains(&"customers".to_string()));
    assert!(matched.contains(&"orders.customer_id".to_string()));

    let cleared = graph.search_highlight("");
    assert!(cleared.is_empty());
    assert!(!graph.node_searched("customers"));
}
