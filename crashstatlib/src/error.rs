//! Error types for crashstatlib

use std::path::PathBuf;
use thiserror::Error;

use crate::data::Schema;

/// Errors that can occur while loading, cleaning or summarising a dataset.
///
/// Values that fail type coercion are not errors: they become missing
/// cells. Everything here is structural and aborts the current query.
#[derive(Error, Debug)]
pub enum CrashstatError {
    /// Source file does not exist
    #[error("file does not exist: {0}")]
    FileNotFound(PathBuf),

    /// Extension is not a known workbook or CSV format
    #[error("unsupported file format '{path}': expected .xlsx, .xlsm, .xlsb, .xls, .ods or .csv")]
    UnsupportedFormat { path: PathBuf },

    /// Workbook could not be opened or decoded
    #[error("failed to read workbook '{path}': {message}")]
    Workbook { path: PathBuf, message: String },

    /// Requested sheet is not in the workbook (1-based)
    #[error("sheet {index} not found in '{path}' ({available} sheets available)")]
    SheetNotFound {
        path: PathBuf,
        index: usize,
        available: usize,
    },

    /// Sheet or file has no header row
    #[error("no header row in '{0}'")]
    EmptySheet(PathBuf),

    /// CSV parse or write failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Column name not present in the dataset
    #[error("unknown column '{name}'")]
    UnknownColumn { name: String },

    /// Column name already present in the dataset
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    /// Bucket boundaries are not strictly increasing or too few
    #[error("invalid breaks {breaks:?}: {message}")]
    InvalidBreaks { breaks: Vec<f64>, message: String },

    /// A resolved query was applied to a dataset with different columns
    #[error("query was resolved against columns {expected:?} but the dataset has {actual:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    /// Custom bucket labels do not match the number of intervals
    #[error("expected {expected} bucket labels, got {actual}")]
    InvalidLabels { expected: usize, actual: usize },

    /// A filter condition could not be parsed
    #[error("invalid condition '{input}': {message}")]
    InvalidCondition { input: String, message: String },

    /// An aggregation spec could not be parsed
    #[error("invalid aggregation '{input}': {message}")]
    InvalidAggregation { input: String, message: String },

    /// Report configuration could not be read
    #[error("invalid configuration: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CrashstatError {
    /// Shorthand for an unknown column reference.
    pub fn unknown_column(name: impl Into<String>) -> Self {
        CrashstatError::UnknownColumn { name: name.into() }
    }

    /// Mismatch between the schema a query was resolved against and the
    /// schema it is run on.
    pub fn schema_mismatch(expected: &Schema, actual: &Schema) -> Self {
        CrashstatError::SchemaMismatch {
            expected: expected.names().to_vec(),
            actual: actual.names().to_vec(),
        }
    }

    /// Whether this error came from reading the source file.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            CrashstatError::FileNotFound(_)
                | CrashstatError::UnsupportedFormat { .. }
                | CrashstatError::Workbook { .. }
                | CrashstatError::SheetNotFound { .. }
                | CrashstatError::EmptySheet(_)
                | CrashstatError::Csv(_)
                | CrashstatError::Io(_)
        )
    }
}
