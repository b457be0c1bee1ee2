//! Cleaning transformations.
//!
//! Each method consumes a [`Dataset`] and returns the transformed one, so
//! the cleaning stage is a straight chain:
//!
//! ```rust
//! use crashstatlib::{ColumnType, Dataset, Value};
//!
//! let raw = Dataset::new(
//!     ["Age", "#.deceased"],
//!     vec![
//!         vec![Value::text("34"), Value::text("0")],
//!         vec![Value::text("x"), Value::text("1")],
//!     ],
//! )
//! .unwrap();
//!
//! let clean = raw
//!     .replace_sentinel("x")
//!     .rename_columns([("#.deceased", "no.deceased")])
//!     .unwrap()
//!     .coerce_types([("Age", ColumnType::Number), ("no.deceased", ColumnType::Number)])
//!     .unwrap();
//!
//! let age = clean.column("Age").unwrap();
//! assert_eq!(clean.value(0, age), Some(&Value::Number(34.0)));
//! assert_eq!(clean.value(1, age), Some(&Value::Missing));
//! ```

use tracing::{debug, warn};

use crate::Result;

use super::bucket::Buckets;
use super::dataset::{Dataset, Row};
use super::value::{ColumnType, Value};

impl Dataset {
    /// Replace text cells exactly equal to `sentinel` with missing.
    pub fn replace_sentinel(self, sentinel: &str) -> Dataset {
        let (schema, mut rows) = self.into_parts();
        let mut replaced = 0usize;
        for cell in rows.iter_mut().flatten() {
            if matches!(cell, Value::Text(s) if *s == sentinel) {
                *cell = Value::Missing;
                replaced += 1;
            }
        }
        debug!(sentinel, replaced, "replaced sentinel values");
        Dataset::from_parts(schema, rows)
    }

    /// Rename columns. Every source name must exist and no target may
    /// collide with another column.
    pub fn rename_columns<I, F, T>(self, mapping: I) -> Result<Dataset>
    where
        I: IntoIterator<Item = (F, T)>,
        F: AsRef<str>,
        T: Into<String>,
    {
        let (mut schema, rows) = self.into_parts();
        for (from, to) in mapping {
            let id = schema.resolve(from.as_ref())?;
            let to = to.into();
            if schema.name(id) == to {
                continue;
            }
            if schema.contains(&to) {
                return Err(crate::CrashstatError::DuplicateColumn(to));
            }
            debug!(from = from.as_ref(), to = %to, "renamed column");
            schema.rename(id, to);
        }
        Ok(Dataset::from_parts(schema, rows))
    }

    /// Convert named columns to the given types.
    ///
    /// Cells that cannot be converted become missing; the count of such
    /// cells is logged per column.
    pub fn coerce_types<I, S>(self, mapping: I) -> Result<Dataset>
    where
        I: IntoIterator<Item = (S, ColumnType)>,
        S: AsRef<str>,
    {
        let targets = mapping
            .into_iter()
            .map(|(name, ty)| self.column(name).map(|id| (id, ty)))
            .collect::<Result<Vec<_>>>()?;

        let (schema, mut rows) = self.into_parts();
        for (id, ty) in targets {
            let mut degraded = 0usize;
            for row in rows.iter_mut() {
                let cell = &mut row[id.index()];
                let converted = cell.coerce(ty);
                if converted.is_missing() && !cell.is_missing() {
                    degraded += 1;
                }
                *cell = converted;
            }
            if degraded > 0 {
                warn!(
                    column = schema.name(id),
                    to = %ty,
                    degraded,
                    "values could not be converted and were set to missing"
                );
            } else {
                debug!(column = schema.name(id), to = %ty, "coerced column");
            }
        }
        Ok(Dataset::from_parts(schema, rows))
    }

    /// Append a column computed from each row.
    pub fn derive_column<F>(self, name: impl Into<String>, f: F) -> Result<Dataset>
    where
        F: Fn(&Row<'_>) -> Value,
    {
        let derived: Vec<Value> = self.rows().map(|row| f(&row)).collect();
        let (mut schema, mut rows) = self.into_parts();
        let id = schema.push(name)?;
        for (row, value) in rows.iter_mut().zip(derived) {
            row.push(value);
        }
        debug!(column = schema.name(id), "derived column");
        Ok(Dataset::from_parts(schema, rows))
    }

    /// Append a category column holding the bucket label of `column`.
    ///
    /// Missing, non-numeric and out-of-range cells get a missing label.
    pub fn bucketize(
        self,
        column: impl AsRef<str>,
        buckets: &Buckets,
        into: impl Into<String>,
    ) -> Result<Dataset> {
        let source = self.column(column)?;
        self.derive_column(into, |row| {
            row.get(source)
                .as_number()
                .and_then(|v| buckets.label_for(v))
                .map(Value::text)
                .unwrap_or(Value::Missing)
        })
    }
}
