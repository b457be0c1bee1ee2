//! Per-column type inference for freshly loaded cells.
//!
//! Loaders produce [`RawCell`]s; a column becomes numeric or date only when
//! every non-empty cell agrees, otherwise the whole column is text. A
//! numeric column containing the sentinel `x` therefore loads as text and
//! must be coerced after the sentinel is replaced.

use chrono::NaiveDate;

use crate::data::{format_number, parse_date, parse_number, Value, MISSING_TEXT};

/// A cell as decoded by a loader, before column typing.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl RawCell {
    /// Classify a CSV field. Empty and `NA` are missing.
    pub fn from_field(field: &str) -> RawCell {
        let trimmed = field.trim();
        if trimmed.is_empty() || trimmed == MISSING_TEXT {
            RawCell::Empty
        } else if let Some(v) = parse_number(trimmed) {
            RawCell::Number(v)
        } else if let Some(d) = parse_date(trimmed) {
            RawCell::Date(d)
        } else {
            RawCell::Text(field.to_string())
        }
    }

    fn into_text(self) -> Value {
        match self {
            RawCell::Empty => Value::Missing,
            RawCell::Text(s) => Value::Text(s),
            RawCell::Number(v) => Value::Text(format_number(v)),
            RawCell::Date(d) => Value::Text(d.format("%Y-%m-%d").to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Inferred {
    Empty,
    Number,
    Date,
    Text,
}

fn infer(cells: impl Iterator<Item = RawCell>) -> Inferred {
    let mut kind = Inferred::Empty;
    for cell in cells {
        let this = match cell {
            RawCell::Empty => continue,
            RawCell::Number(_) => Inferred::Number,
            RawCell::Date(_) => Inferred::Date,
            RawCell::Text(_) => return Inferred::Text,
        };
        kind = match kind {
            Inferred::Empty => this,
            k if k == this => k,
            _ => return Inferred::Text,
        };
    }
    kind
}

/// Type each column and convert raw rows to values.
pub fn type_columns(width: usize, rows: Vec<Vec<RawCell>>) -> Vec<Vec<Value>> {
    let kinds: Vec<Inferred> = (0..width)
        .map(|col| {
            infer(
                rows.iter()
                    .map(|row| row.get(col).cloned().unwrap_or(RawCell::Empty)),
            )
        })
        .collect();

    rows.into_iter()
        .map(|mut row| {
            row.resize(width, RawCell::Empty);
            row.into_iter()
                .zip(&kinds)
                .map(|(cell, kind)| match (kind, cell) {
                    (_, RawCell::Empty) => Value::Missing,
                    (Inferred::Number, RawCell::Number(v)) => Value::Number(v),
                    (Inferred::Date, RawCell::Date(d)) => Value::Date(d),
                    (_, cell) => cell.into_text(),
                })
                .collect()
        })
        .collect()
}
