//! Identity, idempotence and frontier properties of the graph engine.

use schemascope::graph::builder::{build_schema_graph, build_table_focus_graph};
use schemascope::graph::expansion::{expand_table_node, ExpansionOutcome};
use schemascope::graph::identity::{column_node_id, record_node_id};
use schemascope::graph::{EdgeKind, GraphInstance, GraphKind, NodeKind};
use serde_json::json;

use super::support::{catalog_row, orders_customers};
use schemascope::schema_catalog::SchemaModel;

#[test]
fn identical_inputs_always_collide() {
    // two rows mentioning the same column produce one node id
    let schema = SchemaModel::load(vec![
        catalog_row("orders", "customer_id", false, Some(("customers", "id"))),
        catalog_row("orders", "customer_id", false, None),
    ]);
    let graph = GraphInstance::from_payload(GraphKind::Schema, 1, build_schema_graph(&schema));
    let id = column_node_id("orders", "customer_id");
    assert_eq!(
        graph.nodes().iter().filter(|n| n.id == id).count(),
        1,
        "same (table, column) must never yield two nodes"
    );
    assert_eq!(
        record_node_id("orders", "customer_id", &json!(7)),
        record_node_id("orders", "customer_id", &json!(7))
    );
}

#[test]
fn building_twice_changes_nothing() {
    let schema = orders_customers();
    let mut graph = GraphInstance::from_payload(GraphKind::Schema, 1, build_schema_graph(&schema));
    let before = (graph.node_count(), graph.edge_count());

    graph.merge(build_schema_graph(&schema));

    assert_eq!((graph.node_count(), graph.edge_count()), before);
}

#[test]
fn schema_graph_has_exactly_one_fk_edge() {
    let schema = orders_customers();
    let graph = GraphInstance::from_payload(GraphKind::Schema, 1, build_schema_graph(&schema));

    let fk_edges: Vec<_> = graph
        .edges()
        .iter()
        .filter(|e| e.kind == EdgeKind::ForeignKey)
        .collect();
    assert_eq!(fk_edges.len(), 1);
    assert_eq!(fk_edges[0].source, "orders.customer_id");
    assert_eq!(fk_edges[0].target, "customers.id");
}

#[test]
fn customers_is_never_duplicated_across_focus_expansion() {
    let schema = orders_customers();
    let mut graph = GraphInstance::from_payload(
        GraphKind::TableFocus,
        1,
        build_table_focus_graph("orders", &schema).unwrap(),
    );
    // reached as an external stub first
    assert_eq!(
        graph.nodes().iter().filter(|n| n.id == "customers").count(),
        1
    );

    expand_table_node(&mut graph, "customers", &schema).unwrap();

    // expansion upgraded the stub in place; still exactly one node
    assert_eq!(
        graph.nodes().iter().filter(|n| n.id == "customers").count(),
        1
    );
    assert_eq!(graph.node("customers").unwrap().kind, NodeKind::Table);
}

#[test]
fn expanding_twice_equals_expanding_once() {
    let schema = orders_customers();
    let mut graph = GraphInstance::from_payload(
        GraphKind::TableFocus,
        1,
        build_table_focus_graph("orders", &schema).unwrap(),
    );

    let first = expand_table_node(&mut graph, "customers", &schema).unwrap();
    assert!(matches!(first, ExpansionOutcome::Applied(_)));
    let counts = (graph.node_count(), graph.edge_count());

    let second = expand_table_node(&mut graph, "customers", &schema).unwrap();
    assert_eq!(second, ExpansionOutcome::AlreadyExpanded);
    assert_eq!((graph.node_count(), graph.edge_count()), counts);
}

#[test]
fn stub_tables_always_carry_a_key_column() {
    // events references a table that flags no primary key at all
    let schema = SchemaModel::load(vec![
        catalog_row("audit_log", "entry_id", false, None),
        catalog_row("events", "id", true, None),
        catalog_row("events", "log_id", false, Some(("audit_log", "entry_id"))),
    ]);
    let graph = GraphInstance::from_payload(
        GraphKind::TableFocus,
        1,
        build_table_focus_graph("events", &schema).unwrap(),
    );

    // the FK edge has a real target column, synthesized from the reference
    assert!(graph.contains_node("audit_log.entry_id"));
    let fk_edge = graph
        .edges()
        .iter()
        .find(|e| e.kind == EdgeKind::ForeignKey)
        .unwrap();
    assert_eq!(fk_edge.target, "audit_log.entry_id");
}
