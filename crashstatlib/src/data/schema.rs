//! Column names and validated column handles.
//!
//! Columns are never addressed by raw index or by an unchecked string once a
//! query is built. A name is resolved against a [`Schema`] exactly once,
//! producing a [`ColumnId`]; an unknown name fails right there with
//! [`CrashstatError::UnknownColumn`].

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::CrashstatError;
use crate::Result;

/// Handle to a column of a specific schema.
///
/// Only obtainable through [`Schema::resolve`] (or the dataset helpers
/// built on it), so holding one means the column existed at resolution time.
/// The handle is positional: row accessors index with it directly, while
/// resolved queries (`ResolvedSummarise`, `Filter`) keep their schema and
/// reject datasets with any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnId(usize);

impl ColumnId {
    /// Position of the column within its schema.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Ordered, duplicate-free set of column names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<String>,
}

impl Schema {
    /// Build a schema, rejecting duplicate names.
    pub fn new<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut seen = HashSet::new();
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(CrashstatError::DuplicateColumn(name.clone()));
            }
        }
        Ok(Schema { columns })
    }

    /// Resolve a column name to a handle.
    pub fn resolve(&self, name: impl AsRef<str>) -> Result<ColumnId> {
        let name = name.as_ref();
        self.columns
            .iter()
            .position(|c| c == name)
            .map(ColumnId)
            .ok_or_else(|| CrashstatError::unknown_column(name))
    }

    /// Resolve several names, failing on the first unknown one.
    pub fn resolve_all<I, S>(&self, names: I) -> Result<Vec<ColumnId>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names.into_iter().map(|n| self.resolve(n)).collect()
    }

    pub fn contains(&self, name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        self.columns.iter().any(|c| c == name)
    }

    /// Name of a resolved column.
    pub fn name(&self, id: ColumnId) -> &str {
        &self.columns[id.0]
    }

    pub fn names(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub(crate) fn rename(&mut self, id: ColumnId, to: String) {
        self.columns[id.0] = to;
    }

    /// Append a column, rejecting a name already present.
    pub(crate) fn push(&mut self, name: impl Into<String>) -> Result<ColumnId> {
        let name = name.into();
        if self.contains(&name) {
            return Err(CrashstatError::DuplicateColumn(name));
        }
        self.columns.push(name);
        Ok(ColumnId(self.columns.len() - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_and_unknown() {
        let schema = Schema::new(["Age", "District"]).unwrap();
        assert_eq!(schema.resolve("District").unwrap().index(), 1);
        let err = schema.resolve("Speed").unwrap_err();
        assert!(matches!(err, CrashstatError::UnknownColumn { ref name } if name == "Speed"));
    }

    #[test]
    fn test_duplicate_rejected() {
        let err = Schema::new(["Age", "Age"]).unwrap_err();
        assert!(matches!(err, CrashstatError::DuplicateColumn(ref n) if n == "Age"));
    }

    #[test]
    fn test_resolve_all_stops_on_unknown() {
        let schema = Schema::new(["a", "b"]).unwrap();
        assert_eq!(schema.resolve_all(["b", "a"]).unwrap().len(), 2);
        assert!(schema.resolve_all(["a", "c"]).is_err());
    }

    #[test]
    fn test_push_rejects_existing() {
        let mut schema = Schema::new(["a"]).unwrap();
        assert_eq!(schema.push("b").unwrap().index(), 1);
        assert!(schema.push("a").is_err());
    }
}
