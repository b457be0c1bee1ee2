//! The in-memory dataset: a schema plus rows of cells.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::Result;

use super::schema::{ColumnId, Schema};
use super::value::Value;

/// Rectangular table of [`Value`]s with named columns.
///
/// Transformations consume the dataset and return a new one, so a pipeline
/// reads as a chain of calls with no shared mutable state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    schema: Schema,
    rows: Vec<Vec<Value>>,
}

/// Result of a group/summarise query; same shape as a dataset.
pub type Table = Dataset;

/// Borrowed view of one row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    schema: &'a Schema,
    values: &'a [Value],
}

impl<'a> Row<'a> {
    /// Cell for a resolved column.
    pub fn get(&self, column: ColumnId) -> &'a Value {
        &self.values[column.index()]
    }

    /// Cell by column name.
    pub fn get_by_name(&self, name: impl AsRef<str>) -> Result<&'a Value> {
        let id = self.schema.resolve(name)?;
        Ok(self.get(id))
    }

    pub fn values(&self) -> &'a [Value] {
        self.values
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }
}

impl Dataset {
    /// Create a dataset. Rows are padded with missing (or truncated) to the
    /// header width.
    pub fn new<I, S>(columns: I, rows: Vec<Vec<Value>>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let schema = Schema::new(columns)?;
        Ok(Self::from_parts(schema, rows))
    }

    pub(crate) fn from_parts(schema: Schema, mut rows: Vec<Vec<Value>>) -> Self {
        let width = schema.len();
        for row in &mut rows {
            row.resize(width, Value::Missing);
        }
        Dataset { schema, rows }
    }

    pub(crate) fn into_parts(self) -> (Schema, Vec<Vec<Value>>) {
        (self.schema, self.rows)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn columns(&self) -> &[String] {
        self.schema.names()
    }

    /// Resolve a column name against this dataset's schema.
    pub fn column(&self, name: impl AsRef<str>) -> Result<ColumnId> {
        self.schema.resolve(name)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.schema.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|values| Row {
            schema: &self.schema,
            values,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        self.rows.iter().map(move |values| Row {
            schema: &self.schema,
            values,
        })
    }

    /// All cells of one column, in row order.
    pub fn column_values(&self, column: ColumnId) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().map(move |row| &row[column.index()])
    }

    /// Cell at a row and column, if the row exists.
    pub fn value(&self, row: usize, column: ColumnId) -> Option<&Value> {
        self.rows.get(row).map(|r| &r[column.index()])
    }

    /// Rows accepted by a predicate, as a new dataset with the same columns.
    pub fn filter<F>(&self, predicate: F) -> Dataset
    where
        F: Fn(&Row<'_>) -> bool,
    {
        let rows = self
            .rows()
            .filter(|row| predicate(row))
            .map(|row| row.values().to_vec())
            .collect();
        Dataset {
            schema: self.schema.clone(),
            rows,
        }
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> Dataset {
        Dataset {
            schema: self.schema.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Keep only the named columns, in the given order.
    pub fn select<I, S>(&self, names: I) -> Result<Dataset>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids = self.schema.resolve_all(names)?;
        let schema = Schema::new(ids.iter().map(|id| self.schema.name(*id).to_string()))?;
        let rows = self
            .rows
            .iter()
            .map(|row| ids.iter().map(|id| row[id.index()].clone()).collect())
            .collect();
        Ok(Dataset { schema, rows })
    }
}

/// Serializes as `{"columns": [...], "rows": [[...], ...]}`.
impl Serialize for Dataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("columns", self.schema.names())?;
        map.serialize_entry("rows", &self.rows)?;
        map.end()
    }
}
