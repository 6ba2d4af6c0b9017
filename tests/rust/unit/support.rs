//! Shared catalog fixtures for the test suites.

use schemascope::provider::models::RawColumnRow;
use schemascope::schema_catalog::SchemaModel;

pub fn catalog_row(
    table: &str,
    column: &str,
    pk: bool,
    fk: Option<(&str, &str)>,
) -> RawColumnRow {
    RawColumnRow {
        owner: Some("public".to_string()),
        table_name: Some(table.to_string()),
        column_name: Some(column.to_string()),
        data_type: Some("integer".to_string()),
        is_primary_key: pk,
        is_foreign_key: fk.is_some(),
        foreign_table: fk.map(|(t, _)| t.to_string()),
        foreign_column: fk.map(|(_, c)| c.to_string()),
    }
}

/// customers (id PK) <- orders (customer_id FK)
pub fn orders_customers() -> SchemaModel {
    SchemaModel::load(vec![
        catalog_row("customers", "id", true, None),
        catalog_row("customers", "name", false, None),
        catalog_row("orders", "id", true, None),
        catalog_row("orders", "customer_id", false, Some(("customers", "id"))),
    ])
}
