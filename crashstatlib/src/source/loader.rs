//! Loading workbooks and CSV files into a [`Dataset`].

use std::path::Path;

use calamine::{open_workbook_auto, Data, DataType, Reader};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::data::{Dataset, Schema};
use crate::error::CrashstatError;
use crate::Result;

use super::infer::{type_columns, RawCell};

/// Source file format, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceFormat {
    /// Any workbook calamine can open (xlsx, xlsm, xlsb, xls, ods)
    Workbook,
    /// Comma-separated values with a header row
    Csv,
}

impl SourceFormat {
    /// Detect the format of a path from its extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "xla" | "ods" => Ok(SourceFormat::Workbook),
            "csv" => Ok(SourceFormat::Csv),
            _ => Err(CrashstatError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Options for loading a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Sheet to read, 1-based (ignored for CSV)
    pub sheet: usize,
    /// Override extension-based format detection
    pub format: Option<SourceFormat>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            sheet: 1,
            format: None,
        }
    }
}

impl LoadOptions {
    /// Create new default options (first sheet, format from extension).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the 1-based sheet index.
    pub fn sheet(mut self, index: usize) -> Self {
        self.sheet = index;
        self
    }

    /// Force a source format.
    pub fn format(mut self, format: SourceFormat) -> Self {
        self.format = Some(format);
        self
    }
}

/// Load a dataset from a workbook or CSV file.
///
/// The first row is the header. Date cells in workbooks load as dates;
/// CSV columns whose cells all parse as dates do too.
pub fn load(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Dataset> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(CrashstatError::FileNotFound(path.to_path_buf()));
    }

    let format = match options.format {
        Some(format) => format,
        None => SourceFormat::from_path(path)?,
    };

    let (header, rows) = match format {
        SourceFormat::Workbook => read_workbook(path, options.sheet)?,
        SourceFormat::Csv => read_csv(path)?,
    };

    let schema = Schema::new(header)?;
    let values = type_columns(schema.len(), rows);
    let dataset = Dataset::from_parts(schema, values);
    info!(
        path = %path.display(),
        rows = dataset.row_count(),
        columns = dataset.column_count(),
        "loaded dataset"
    );
    Ok(dataset)
}

fn workbook_error(path: &Path, err: impl std::fmt::Display) -> CrashstatError {
    CrashstatError::Workbook {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn header_name(index: usize, text: String) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        format!("column_{}", index + 1)
    } else {
        trimmed.to_string()
    }
}

fn read_workbook(path: &Path, sheet: usize) -> Result<(Vec<String>, Vec<Vec<RawCell>>)> {
    let mut workbook = open_workbook_auto(path).map_err(|e| workbook_error(path, e))?;
    let available = workbook.sheet_names().len();
    if sheet == 0 || sheet > available {
        return Err(CrashstatError::SheetNotFound {
            path: path.to_path_buf(),
            index: sheet,
            available,
        });
    }

    let range = workbook
        .worksheet_range_at(sheet - 1)
        .ok_or_else(|| CrashstatError::SheetNotFound {
            path: path.to_path_buf(),
            index: sheet,
            available,
        })?
        .map_err(|e| workbook_error(path, e))?;
    debug!(sheet, size = ?range.get_size(), "read worksheet");

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| CrashstatError::EmptySheet(path.to_path_buf()))?
        .iter()
        .enumerate()
        .map(|(i, cell)| header_name(i, cell.to_string()))
        .collect();
    let body = rows
        .map(|row| row.iter().map(raw_from_workbook).collect())
        .collect();
    Ok((header, body))
}

fn raw_from_workbook(cell: &Data) -> RawCell {
    match cell {
        Data::Empty | Data::Error(_) => RawCell::Empty,
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::Float(f) if f.is_finite() => RawCell::Number(*f),
        Data::Float(_) => RawCell::Empty,
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed == crate::data::MISSING_TEXT {
                RawCell::Empty
            } else {
                RawCell::Text(s.clone())
            }
        }
        Data::Bool(b) => RawCell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_date() {
            Some(date) => RawCell::Date(date),
            None => RawCell::Text(cell.to_string()),
        },
        Data::DurationIso(s) => RawCell::Text(s.clone()),
    }
}

fn read_csv(path: &Path) -> Result<(Vec<String>, Vec<Vec<RawCell>>)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let header: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, name)| header_name(i, name.to_string()))
        .collect();
    if header.is_empty() {
        return Err(CrashstatError::EmptySheet(path.to_path_buf()));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(RawCell::from_field).collect());
    }
    Ok((header, rows))
}
