//! # crashstatlib
//!
//! Descriptive statistics over a spreadsheet of road-crash records.
//!
//! ## Overview
//!
//! The library is a linear pipeline. Every stage takes its input by value
//! (or by reference, for queries) and returns a new value, so there is no
//! shared mutable state:
//!
//! - **source**: load a workbook (`.xlsx`, `.xls`, `.ods`, ...) or CSV into a `Dataset`
//! - **data**: replace the `x` sentinel, rename columns, coerce types,
//!   bucketize and derive columns
//! - **query**: count rows and group/summarise with mean, sd, min, max, ...
//! - **output**: format result tables for display and write them as CSV
//! - **report**: the fixed crash report, driven by a `ReportConfig`
//!
//! Column references are resolved against the dataset schema before any
//! row is touched; an unknown column is an error, never a silent empty
//! result. Cells that fail type coercion become missing.
//!
//! ## Example
//!
//! ```rust
//! use crashstatlib::{group_summarise, ColumnType, Dataset, Reducer, SummariseSpec, Value};
//!
//! let raw = Dataset::new(
//!     ["District", "speed"],
//!     vec![
//!         vec![Value::text("Metro"), Value::text("60")],
//!         vec![Value::text("Rural"), Value::text("x")],
//!         vec![Value::text("Metro"), Value::text("80")],
//!     ],
//! )
//! .unwrap();
//!
//! let clean = raw
//!     .replace_sentinel("x")
//!     .coerce_types([("speed", ColumnType::Number)])
//!     .unwrap();
//!
//! let spec = SummariseSpec::new()
//!     .group_by("District")
//!     .aggregate("mean_speed", Reducer::Mean, "speed");
//! let table = group_summarise(&clean, &spec).unwrap();
//!
//! assert_eq!(table.row_count(), 2);
//! assert_eq!(table.row(0).unwrap().values()[1], Value::Number(70.0));
//! assert!(table.row(1).unwrap().values()[1].is_missing());
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod output;
pub mod query;
pub mod report;
pub mod source;

pub use config::ReportConfig;
pub use data::{Buckets, ColumnId, ColumnType, CrashColumn, Dataset, Row, Schema, Table, Value};
pub use error::CrashstatError;
pub use output::{write_csv, write_csv_to, ReportTable, TableRow};
pub use query::{
    count, count_filtered, count_where, group_summarise, Aggregation, ConditionSpec, Filter,
    GroupOrder, OrderDirection, Ordering, Reducer, SummariseSpec,
};
pub use report::{alcohol_in_system, clean, CrashReport, ReportRun};
pub use source::{load, LoadOptions, SourceFormat};

/// Result type for crashstatlib operations
pub type Result<T> = std::result::Result<T, CrashstatError>;
