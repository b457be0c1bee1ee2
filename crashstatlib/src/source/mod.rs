//! Source loading: read a workbook or CSV export into a dataset.
//!
//! This module handles the first stage of the pipeline - turning a file on
//! disk into an in-memory [`Dataset`](crate::data::Dataset). It provides:
//!
//! - **Loading**: `load` with `LoadOptions` (1-based sheet, format override)
//! - **Type inference**: per-column number/date/text detection
//!
//! ## Example
//!
//! ```rust,ignore
//! use crashstatlib::source::{load, LoadOptions};
//!
//! let raw = load("crashes.xlsx", &LoadOptions::new().sheet(1))?;
//! println!("{} rows", raw.row_count());
//! ```

pub mod infer;
pub mod loader;

pub use infer::RawCell;
pub use loader::{load, LoadOptions, SourceFormat};
