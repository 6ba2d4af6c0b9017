pub mod classification;
pub mod column_descriptor;
pub mod errors;
pub mod schema_model;

// Re-export commonly used types
pub use classification::{classify_rows, TableShape};
pub use column_descriptor::{ColumnDescriptor, KeyRole};
pub use errors::SchemaCatalogError;
pub use schema_model::{ForeignKeyRef, SchemaModel};
