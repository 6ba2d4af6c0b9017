//! Schemascope - a database-schema exploration engine
//!
//! This crate turns flat schema/row result sets into interactive,
//! incrementally expandable graphs:
//! - Schema catalog model with PK/FK indices
//! - Graph builders (schema, table focus, record/lineage, flow)
//! - In-place expansion engine with an at-most-once frontier
//! - Record lineage tracing and a highlight/visibility overlay
//!
//! The HTTP/SQL layer and the rendering engine are external
//! collaborators: data comes in through the async provider traits in
//! [`provider`], and graphs go out as render-ready projections from
//! [`graph::render`].

pub mod config;
pub mod explorer;
pub mod graph;
pub mod provider;
pub mod schema_catalog;

pub use explorer::{Activation, ActionOutcome, ContextAction, Explorer, ExplorerError};
