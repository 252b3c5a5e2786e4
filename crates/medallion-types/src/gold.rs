//! Gold query results carried from the silver store to gold targets.

use serde::{Deserialize, Serialize};

/// Result column: name plus the PostgreSQL type the query produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldColumn {
    pub name: String,
    /// Type name as reported by the server (e.g. `numeric`, `int8`, `date`).
    pub pg_type: String,
}

/// A materialized gold result set. Values are text so the set can be
/// replayed into any target that accepts a cast from text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldResult {
    pub columns: Vec<GoldColumn>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl GoldResult {
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
