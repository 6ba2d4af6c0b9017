//! Shared fixture document for the integration flows.

use serde_json::json;

/// A small commerce schema: customers, orders, shipments and a flow
/// table between systems.
pub fn fixture_json() -> String {
    json!({
        "schema": [
            {"owner": "public", "table_name": "customers", "column_name": "id",
             "data_type": "integer", "is_primary_key": true, "is_foreign_key": false},
            {"owner": "public", "table_name": "customers", "column_name": "name",
             "data_type": "text", "is_primary_key": false, "is_foreign_key": false},
            {"owner": "public", "table_name": "orders", "column_name": "id",
             "data_type": "integer", "is_primary_key": true, "is_foreign_key": false},
            {"owner": "public", "table_name": "orders", "column_name": "customer_id",
             "data_type": "integer", "is_primary_key": false, "is_foreign_key": true,
             "foreign_table": "customers", "foreign_column": "id"},
            {"owner": "public", "table_name": "shipments", "column_name": "id",
             "data_type": "integer", "is_primary_key": true, "is_foreign_key": false},
            {"owner": "public", "table_name": "shipments", "column_name": "order_id",
             "data_type": "integer", "is_primary_key": false, "is_foreign_key": true,
             "foreign_table": "orders", "foreign_column": "id"},
            {"owner": "public", "table_name": "dataflows", "column_name": "source_id",
             "data_type": "text", "is_primary_key": false, "is_foreign_key": false},
            {"owner": "public", "table_name": "dataflows", "column_name": "destination_id",
             "data_type": "text", "is_primary_key": false, "is_foreign_key": false},
            {"owner": "public", "table_name": "dataflows", "column_name": "dataflow_id",
             "data_type": "text", "is_primary_key": false, "is_foreign_key": false},
            {"owner": "public", "table_name": "dataflows", "column_name": "ETL_method",
             "data_type": "text", "is_primary_key": false, "is_foreign_key": false}
        ],
        "tables": {
            "customers": {"rows": [
                {"id": 1, "name": "Acme"},
                {"id": 2, "name": "Globex"}
            ]},
            "orders": {"rows": [
                {"id": 10, "customer_id": 1},
                {"id": 11, "customer_id": 1},
                {"id": 12, "customer_id": 2}
            ]},
            "shipments": {"rows": [
                {"id": 100, "order_id": 10}
            ]},
            "dataflows": {"rows": [
                {"source_id": "ingest", "destination_id": "warehouse",
                 "dataflow_id": "df-1", "ETL_method": "batch"},
                {"source_id": "warehouse", "destination_id": "reporting",
                 "dataflow_id": "df-2", "ETL_method": "stream"}
            ]}
        },
        "flows": [
            {"source_id": "ingest", "destination_id": "warehouse", "dataflow_id": "df-1",
             "ETL_method": "batch", "source_node_type": "processing",
             "dest_node_type": "dataset"},
            {"source_id": "warehouse", "destination_id": "reporting", "dataflow_id": "df-2",
             "ETL_method": "stream", "source_node_type": "dataset",
             "dest_node_type": "user"}
        ]
    })
    .to_string()
}
