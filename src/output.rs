//! Output formatting for command results.
//!
//! Supports two output formats: table (human-readable) and JSON.

use clap::ValueEnum;
use serde::Serialize;

use crate::db::Row;

/// Output format for command results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Trait for types that can be formatted for output
pub trait Outputable: Serialize {
    /// Format as a human-readable table
    fn to_table(&self) -> String;

    /// Format according to the specified output format
    fn format(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Table => self.to_table(),
            OutputFormat::Json => serde_json::to_string_pretty(self).unwrap_or_default(),
        }
    }
}

/// Render rows as an aligned text table.
///
/// Columns come from the first row; cells are left-aligned and padded to the
/// widest value in each column.
pub fn render_rows(rows: &[Row]) -> String {
    let Some(first) = rows.first() else {
        return "(no rows)".to_string();
    };

    let headers: Vec<&str> = first.columns().collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.values().map(|v| v.to_string()).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let format_line = |values: Vec<&str>| -> String {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let width = widths.get(i).copied().unwrap_or(0);
                format!("{:<width$}", v, width = width)
            })
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 3);
    lines.push(format_line(headers.clone()));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in &cells {
        lines.push(format_line(row.iter().map(String::as_str).collect()));
    }
    lines.push(String::new());
    lines.push(format!("({} row{})", rows.len(), if rows.len() == 1 { "" } else { "s" }));
    lines.join("\n")
}
