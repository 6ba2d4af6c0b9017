//! Stable per-table color assignment
//!
//! Record graphs color nodes by their table of origin. Assignments are
//! first-come from a fixed palette and never change for the lifetime of
//! the registry, so a table keeps its color across any number of
//! expansions.

use std::collections::HashMap;

const PALETTE: [&str; 7] = [
    "#FFB6C1", "#ADD8E6", "#90EE90", "#FFD700", "#FFA07A", "#BA55D3", "#87CEEB",
];

#[derive(Debug, Default)]
pub struct TableColorRegistry {
    assigned: HashMap<String, &'static str>,
    next: usize,
}

impl TableColorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color_for(&mut self, table: &str) -> &'static str {
        if let Some(color) = self.assigned.get(table) {
            return color;
        }
        let color = PALETTE[self.next % PALETTE.len()];
        self.next += 1;
        self.assigned.insert(table.to_string(), color);
        color
    }
}
