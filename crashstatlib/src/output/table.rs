//! Table-ready data structures for report output.
//!
//! This module provides `ReportTable`, a presentation-ready data structure
//! that can be directly consumed by templates or serialized to JSON.
//!
//! The data flow is:
//! 1. Cleaned `Dataset`
//! 2. Result `Table` (counted, grouped, summarised)
//! 3. `ReportTable` (formatted strings for display)
//!
//! ReportTable is a pure presentation layer - it only formats cells, no
//! filtering or grouping logic.

use serde::{Deserialize, Serialize};

use crate::data::{Table, Value, MISSING_TEXT};

/// Default number of decimals for non-integer numbers.
pub const DEFAULT_PRECISION: usize = 2;

/// A single row in the table (data row or footer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    /// Row label (group key values, or the row number)
    pub label: String,
    /// Remaining cells, as display strings
    pub values: Vec<String>,
}

/// Table-ready report data.
///
/// Templates iterate over headers/rows/footer - no computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTable {
    /// Optional title (e.g., "Speed by district")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Column headers: [label_header, value1, value2, ...]
    pub headers: Vec<String>,
    /// Data rows
    pub rows: Vec<TableRow>,
    /// Summary row ("Total (N groups)")
    pub footer: TableRow,
}

impl ReportTable {
    /// Format a table whose first `label_columns` columns are group keys.
    ///
    /// Key values are joined with " / " into the row label. With zero
    /// label columns every column is a value and rows are numbered.
    pub fn from_table(table: &Table, label_columns: usize) -> Self {
        Self::with_precision(table, label_columns, DEFAULT_PRECISION)
    }

    pub fn with_precision(table: &Table, label_columns: usize, precision: usize) -> Self {
        let label_columns = label_columns.min(table.column_count());
        let columns = table.columns();

        let label_header = if label_columns == 0 {
            "#".to_string()
        } else {
            columns[..label_columns].join(" / ")
        };
        let mut headers = vec![label_header];
        headers.extend(columns[label_columns..].iter().cloned());

        let rows: Vec<TableRow> = table
            .rows()
            .enumerate()
            .map(|(i, row)| {
                let (keys, values) = row.values().split_at(label_columns);
                let label = if label_columns == 0 {
                    (i + 1).to_string()
                } else {
                    keys.iter()
                        .map(|v| format_cell(v, precision))
                        .collect::<Vec<_>>()
                        .join(" / ")
                };
                TableRow {
                    label,
                    values: values.iter().map(|v| format_cell(v, precision)).collect(),
                }
            })
            .collect();

        let footer = TableRow {
            label: footer_label(label_columns, rows.len()),
            values: vec![String::new(); headers.len() - 1],
        };

        ReportTable {
            title: None,
            headers,
            rows,
            footer,
        }
    }

    /// A one-row table holding a single count.
    pub fn scalar(label: impl Into<String>, value: usize) -> Self {
        ReportTable {
            title: None,
            headers: vec![String::new(), "Count".to_string()],
            rows: vec![TableRow {
                label: label.into(),
                values: vec![value.to_string()],
            }],
            footer: TableRow {
                label: String::new(),
                values: vec![String::new()],
            },
        }
    }

    /// Append a labelled count to a [`scalar`](Self::scalar) table.
    pub fn with_row(mut self, label: impl Into<String>, value: usize) -> Self {
        self.rows.push(TableRow {
            label: label.into(),
            values: vec![value.to_string()],
        });
        self
    }

    /// Set the title.
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

fn footer_label(label_columns: usize, rows: usize) -> String {
    let unit = match (label_columns, rows) {
        (0, 1) => "row",
        (0, _) => "rows",
        (_, 1) => "group",
        _ => "groups",
    };
    format!("Total ({} {})", rows, unit)
}

/// Display form of a cell: integers without decimals, other numbers to
/// `precision` places, dates as ISO, missing as `NA`.
pub fn format_cell(value: &Value, precision: usize) -> String {
    match value {
        Value::Text(s) => s.clone(),
        Value::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{:.0}", v),
        Value::Number(v) => format!("{:.prec$}", v, prec = precision),
        Value::Date(d) => d.format("%Y-%m-%d").to_string(),
        Value::Missing => MISSING_TEXT.to_string(),
    }
}
