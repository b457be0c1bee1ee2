//! CSV export of result tables.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::data::{format_number, Table, Value, MISSING_TEXT};
use crate::Result;

/// Text form of a cell in CSV output.
pub fn csv_field(value: &Value) -> String {
    match value {
        Value::Text(s) => s.clone(),
        Value::Number(v) => format_number(*v),
        Value::Date(d) => d.format("%Y-%m-%d").to_string(),
        Value::Missing => MISSING_TEXT.to_string(),
    }
}

/// Write a table as CSV: one header row with the column names as-is,
/// then one record per row, no index column.
///
/// CSV carries no cell types, so reloading with [`crate::source::load`]
/// is lossy for text: a text cell reading `NA` comes back missing, and a
/// column whose text cells all look like numbers or dates is re-typed.
pub fn write_csv_to<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(table.columns())?;
    for row in table.rows() {
        wtr.write_record(row.values().iter().map(csv_field))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write a table to a CSV file, replacing any existing file.
pub fn write_csv(table: &Table, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_csv_to(table, file)?;
    info!(
        path = %path.display(),
        rows = table.row_count(),
        "wrote csv"
    );
    Ok(())
}
