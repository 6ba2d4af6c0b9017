//! Unit test suite
//!
//! Property-level tests for the graph engine, run against the public
//! API. Session-level flows live in the integration suite.

mod classification_properties;
mod graph_properties;
mod lineage_properties;
mod overlay_properties;

pub mod support;
