//! Data model and cleaning: the dataset and the transformations applied to it.
//!
//! This module handles the second stage of the pipeline - holding loaded
//! records in memory and cleaning them. It provides:
//!
//! - **Values**: `Value` cells (text, number, date, missing) and `ColumnType`
//! - **Schema**: validated column handles (`ColumnId`) and the well-known
//!   `CrashColumn` names
//! - **Dataset**: rows of cells, with filtering, selection and `head`
//! - **Transformations**: sentinel replacement, renaming, type coercion,
//!   derived columns and bucketizing
//!
//! ## Example
//!
//! ```rust,ignore
//! use crashstatlib::data::{Buckets, ColumnType};
//!
//! let clean = raw
//!     .replace_sentinel("x")
//!     .coerce_types([("Age", ColumnType::Number)])?
//!     .bucketize("Age", &Buckets::new(vec![0.0, 18.0, 60.0, 120.0])?, "age_range")?;
//! ```

pub mod bucket;
pub mod column;
pub mod dataset;
pub mod schema;
pub mod transform;
pub mod value;

pub use bucket::Buckets;
pub use column::CrashColumn;
pub use dataset::{Dataset, Row, Table};
pub use schema::{ColumnId, Schema};
pub use value::{format_number, parse_date, parse_number, ColumnType, Value, MISSING_TEXT};
