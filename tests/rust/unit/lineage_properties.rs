//! Lineage tracing contract: clear-then-apply, direction classes, and
//! independent pk/fk annotations.

use schemascope::graph::builder::build_schema_graph;
use schemascope::graph::identity::edge_id;
use schemascope::graph::lineage::trace_lineage;
use schemascope::graph::{EdgeKind, GraphInstance, GraphKind};

use super::support::catalog_row;
use schemascope::schema_catalog::SchemaModel;

/// customers <- orders <- shipments
fn chain_schema() -> SchemaModel {
    SchemaModel::load(vec![
        catalog_row("customers", "id", true, None),
        catalog_row("orders", "id", true, None),
        catalog_row("orders", "customer_id", false, Some(("customers", "id"))),
        catalog_row("shipments", "id", true, None),
        catalog_row("shipments", "order_id", false, Some(("orders", "id"))),
    ])
}

fn graph_for(schema: &SchemaModel) -> GraphInstance {
    GraphInstance::from_payload(GraphKind::Schema, 1, build_schema_graph(schema))
}

#[test]
fn tracing_b_leaves_nothing_of_a() {
    let schema = chain_schema();
    let mut graph = graph_for(&schema);

    trace_lineage(
        &mut graph,
        &schema,
        "orders",
        &["id".to_string(), "customer_id".to_string()],
        "a",
    );
    let marked_for_a: Vec<String> = graph
        .nodes()
        .iter()
        .filter(|n| graph.node_lineage(&n.id).any())
        .map(|n| n.id.clone())
        .collect();
    assert!(!marked_for_a.is_empty());

    trace_lineage(&mut graph, &schema, "customers", &["name".to_string()], "b");

    // zero nodes still carry highlights belonging to the first trace
    for id in marked_for_a {
        let marks = graph.node_lineage(&id);
        let expected_for_b = id == "customers" || id == "customers.name";
        assert_eq!(
            marks.any(),
            expected_for_b,
            "node {} kept a stale highlight",
            id
        );
    }
}

#[test]
fn upstream_and_downstream_use_distinct_classes() {
    let schema = chain_schema();
    let mut graph = graph_for(&schema);

    trace_lineage(
        &mut graph,
        &schema,
        "orders",
        &["id".to_string(), "customer_id".to_string()],
        "row",
    );

    // FK column reaches up; the target carries ONLY the upstream class
    let up = graph.node_lineage("customers.id");
    assert!(up.upstream && !up.downstream);

    // PK column is referenced from below; the source carries ONLY downstream
    let down = graph.node_lineage("shipments.order_id");
    assert!(down.downstream && !down.upstream);

    let up_edge = edge_id("orders.customer_id", "customers.id", EdgeKind::ForeignKey);
    let down_edge = edge_id("shipments.order_id", "orders.id", EdgeKind::ForeignKey);
    assert!(graph.edge_lineage(&up_edge).upstream);
    assert!(graph.edge_lineage(&down_edge).downstream);
}

#[test]
fn pk_and_fk_annotations_never_overwrite_each_other() {
    // parts.id is a PK that also references catalogs.id
    let schema = SchemaModel::load(vec![
        catalog_row("catalogs", "id", true, None),
        catalog_row("parts", "id", true, Some(("catalogs", "id"))),
        catalog_row("stock", "part_id", false, Some(("parts", "id"))),
    ]);
    let mut graph = graph_for(&schema);

    trace_lineage(&mut graph, &schema, "parts", &["id".to_string()], "id=1");

    assert!(graph.node_lineage("parts.id").record);
    assert!(graph.node_lineage("catalogs.id").upstream);
    assert!(graph.node_lineage("stock.part_id").downstream);
}

#[test]
fn table_node_is_highlighted_with_the_record() {
    let schema = chain_schema();
    let mut graph = graph_for(&schema);
    trace_lineage(&mut graph, &schema, "orders", &["id".to_string()], "row");
    assert!(graph.node_lineage("orders").table);
}
