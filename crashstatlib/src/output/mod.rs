//! Output formatting: present result tables for display and export.
//!
//! This module handles the fourth and final stage of the pipeline -
//! formatting query results. It provides:
//!
//! - **ReportTable**: Table-ready data structure with headers, rows, and footer
//! - **TableRow**: Individual row with label and formatted values
//! - **CSV**: `write_csv` / `write_csv_to` for result tables
//!
//! ReportTable is a pure presentation layer - it only formats data into strings.
//! All filtering, grouping and reduction happens in the query stage.
//!
//! ## Example
//!
//! ```rust,ignore
//! use crashstatlib::output::{write_csv, ReportTable};
//!
//! let table = ReportTable::from_table(&speed_by_district, 1);
//! // table.headers: ["District", "mean_speed", "sd_speed"]
//! // table.rows: [TableRow { label: "Metro", values: ["62.50", "9.57"] }]
//! // table.footer: TableRow { label: "Total (3 groups)", ... }
//! write_csv(&speed_by_district, "speed_by_district.csv")?;
//! ```

pub mod csv;
pub mod table;

pub use self::csv::{csv_field, write_csv, write_csv_to};
pub use table::{format_cell, ReportTable, TableRow, DEFAULT_PRECISION};
