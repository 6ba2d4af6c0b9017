//! Full session flows against the JSON fixture provider.

use std::sync::Arc;

use schemascope::config::ExplorerConfig;
use schemascope::graph::{GraphKind, NodeKind};
use schemascope::provider::fixture::FixtureProvider;
use schemascope::{ActionOutcome, Activation, ContextAction, Explorer};
use serde_json::json;

use super::support::fixture_json;

async fn session() -> Explorer {
    let config = ExplorerConfig::default();
    let provider = FixtureProvider::from_json_str(&fixture_json(), &config).unwrap();
    Explorer::connect(Arc::new(provider), config).await.unwrap()
}

#[tokio::test]
async fn schema_graph_covers_the_whole_catalog() {
    let explorer = session().await;
    let graph = explorer.schema_graph();

    for table in ["customers", "orders", "shipments", "dataflows"] {
        assert!(graph.contains_node(table), "missing table node {}", table);
    }
    assert!(graph.contains_node("orders.customer_id"));
    assert!(graph.contains_node("shipments.order_id"));
}

#[tokio::test]
async fn drill_down_then_expand_neighbor() {
    let mut explorer = session().await;

    explorer
        .on_node_activate(GraphKind::Schema, "shipments")
        .await
        .unwrap();
    let focus = explorer.focus_graph().unwrap();
    assert_eq!(focus.node("orders").unwrap().kind, NodeKind::ExternalTable);

    explorer
        .on_node_activate(GraphKind::TableFocus, "orders")
        .await
        .unwrap();
    let focus = explorer.focus_graph().unwrap();
    assert_eq!(focus.node("orders").unwrap().kind, NodeKind::Table);
    // expanding orders pulled in its own neighbor as a new stub
    assert_eq!(
        focus.node("customers").unwrap().kind,
        NodeKind::ExternalTable
    );
}

#[tokio::test]
async fn record_graph_grows_cumulatively_without_losing_state() {
    let mut explorer = session().await;
    explorer
        .open_record_graph("customers", "id", &json!(1))
        .await
        .unwrap();

    explorer
        .on_node_activate(GraphKind::Record, "customers:id:1")
        .await
        .unwrap();
    let after_first = explorer.record_graph().unwrap().node_count();
    assert!(explorer.record_graph().unwrap().contains_node("orders:id:10"));

    // expand one of the appended order records; shipment rows join in
    explorer
        .on_node_activate(GraphKind::Record, "orders:id:10")
        .await
        .unwrap();
    let record = explorer.record_graph().unwrap();
    assert!(record.contains_node("shipments:id:100"));
    assert!(record.node_count() > after_first);
    // earlier state survived the growth
    assert!(record.contains_node("customers:id:1"));
    assert!(record.contains_node("orders:id:11"));
}

#[tokio::test]
async fn double_activation_is_a_noop() {
    let mut explorer = session().await;
    explorer
        .open_record_graph("customers", "id", &json!(1))
        .await
        .unwrap();

    let first = explorer
        .on_node_activate(GraphKind::Record, "customers:id:1")
        .await
        .unwrap();
    assert!(matches!(first, Activation::Expanded(_)));
    let counts = {
        let g = explorer.record_graph().unwrap();
        (g.node_count(), g.edge_count())
    };

    let second = explorer
        .on_node_activate(GraphKind::Record, "customers:id:1")
        .await
        .unwrap();
    assert!(matches!(second, Activation::NoOp));
    let g = explorer.record_graph().unwrap();
    assert_eq!((g.node_count(), g.edge_count()), counts);
}

#[tokio::test]
async fn joined_rows_flow_table_builds_a_flow_graph() {
    let mut explorer = session().await;
    let outcome = explorer
        .on_node_context_action(
            GraphKind::Schema,
            "dataflows",
            ContextAction::ShowJoinedRows,
        )
        .await
        .unwrap();
    let ActionOutcome::RecordGraphBuilt { shape, .. } = outcome else {
        panic!("expected a record graph build");
    };
    assert_eq!(shape, schemascope::schema_catalog::TableShape::Flow);

    let graph = explorer.record_graph().unwrap();
    assert!(graph.contains_node("ingest"));
    assert!(graph.contains_node("warehouse"));
    assert!(graph.contains_edge("flow:df-1"));
}

#[tokio::test]
async fn flow_endpoint_expansion_reaches_new_endpoints() {
    let mut explorer = session().await;
    explorer.open_flow_graph("ingest").await.unwrap();
    let before = explorer.record_graph().unwrap().node_count();

    explorer
        .on_node_activate(GraphKind::Flow, "warehouse")
        .await
        .unwrap();
    let graph = explorer.record_graph().unwrap();
    assert!(graph.contains_node("reporting"));
    assert!(graph.contains_edge("flow:df-2"));
    assert_eq!(graph.node_count(), before + 1);
}

#[tokio::test]
async fn top_rows_action_returns_query_and_rows() {
    let mut explorer = session().await;
    let outcome = explorer
        .on_node_context_action(GraphKind::Schema, "orders", ContextAction::ShowTopRows)
        .await
        .unwrap();
    let ActionOutcome::Rows { query, rows } = outcome else {
        panic!("expected rows");
    };
    assert!(query.contains("orders"));
    assert_eq!(rows.len(), 3);
}

#[tokio::test]
async fn hide_toggle_through_context_action_updates_hidden_list() {
    let mut explorer = session().await;
    explorer
        .on_node_context_action(GraphKind::Schema, "orders", ContextAction::ShowJoinedRows)
        .await
        .unwrap();

    let outcome = explorer
        .on_node_context_action(
            GraphKind::Record,
            "orders:id:10",
            ContextAction::ToggleHidden,
        )
        .await
        .unwrap();
    let ActionOutcome::HiddenToggled { hidden, hidden_items } = outcome else {
        panic!("expected hidden toggle");
    };
    assert!(hidden);
    assert_eq!(hidden_items.len(), 1);

    assert!(explorer.unhide(GraphKind::Record, "orders:id:10"));
    assert!(explorer.hidden_items(GraphKind::Record).is_empty());
}

#[tokio::test]
async fn keyword_search_feeds_lineage_highlighting() {
    let mut explorer = session().await;
    let matches = explorer.search_records("globex").await.unwrap();
    assert_eq!(matches.len(), 1);
    let hit = matches[0].clone();
    assert_eq!(hit.table, "customers");

    explorer.trace_record_lineage(&hit.table, &hit.matching_columns, &hit.row_id);
    let graph = explorer.schema_graph();
    assert!(graph.node_lineage("customers").table);
    assert!(graph.node_lineage("customers.name").record);
}

#[tokio::test]
async fn render_projection_reflects_overlay_state() {
    let mut explorer = session().await;
    explorer.on_search_query("customer");
    let projection = explorer.render(GraphKind::Schema).unwrap();

    let customers = projection
        .nodes
        .iter()
        .find(|n| n.id == "customers")
        .unwrap();
    assert!(customers.classes.contains(&"highlight-search".to_string()));
    assert!(customers.visible);

    let fk_edge = projection
        .edges
        .iter()
        .find(|e| e.source == "orders.customer_id")
        .unwrap();
    assert!(fk_edge.classes.contains(&"foreign-key".to_string()));
}
