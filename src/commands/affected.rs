//! Result type shared by the write commands.

use serde::Serialize;

use crate::output::Outputable;

/// Rows changed by an insert, update or delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AffectedResult {
    pub operation: &'static str,
    pub table: String,
    pub affected: u64,
}

impl AffectedResult {
    pub fn new(operation: &'static str, table: impl Into<String>, affected: u64) -> Self {
        Self {
            operation,
            table: table.into(),
            affected,
        }
    }
}

impl Outputable for AffectedResult {
    fn to_table(&self) -> String {
        let noun = if self.affected == 1 { "row" } else { "rows" };
        format!("{}: {} {} affected in {}", self.operation, self.affected, noun, self.table)
    }
}
