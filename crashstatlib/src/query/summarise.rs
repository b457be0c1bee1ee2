//! Counting and group/summarise.
//!
//! A summary partitions rows by the distinct combination of key columns
//! (missing keys form their own group) and reduces each partition to one
//! output row: the key values followed by one column per aggregation.
//!
//! The data pipeline is:
//! 1. Cleaned `Dataset`
//! 2. `SummariseSpec` resolved against its schema (unknown columns fail here)
//! 3. `Table` with one row per group

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::data::{ColumnId, Dataset, Row, Schema, Table, Value};
use crate::error::CrashstatError;
use crate::Result;

use super::options::{Aggregation, GroupOrder, OrderDirection, Ordering, Reducer};

/// Number of rows in a dataset.
pub fn count(dataset: &Dataset) -> usize {
    dataset.row_count()
}

/// Number of rows accepted by a predicate.
pub fn count_where<F>(dataset: &Dataset, predicate: F) -> usize
where
    F: Fn(&Row<'_>) -> bool,
{
    dataset.rows().filter(|row| predicate(row)).count()
}

/// Description of a group/summarise query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummariseSpec {
    /// Group key columns, in output order
    pub keys: Vec<String>,
    /// Output aggregations, in output order
    pub aggregations: Vec<Aggregation>,
    /// Row ordering
    pub ordering: Ordering,
}

impl SummariseSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a group key.
    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.keys.push(column.into());
        self
    }

    /// Add `name = reducer(column)`.
    pub fn aggregate(
        mut self,
        name: impl Into<String>,
        reducer: Reducer,
        column: impl Into<String>,
    ) -> Self {
        self.aggregations
            .push(Aggregation::new(name, reducer, column));
        self
    }

    /// Add a per-group row count.
    pub fn count(mut self, name: impl Into<String>) -> Self {
        self.aggregations.push(Aggregation::count(name));
        self
    }

    /// Add a pre-built aggregation.
    pub fn with(mut self, aggregation: Aggregation) -> Self {
        self.aggregations.push(aggregation);
        self
    }

    /// Set row ordering.
    pub fn ordering(mut self, ordering: Ordering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Bind every referenced column to `schema` and validate output names.
    pub fn resolve(&self, schema: &Schema) -> Result<ResolvedSummarise> {
        let keys = schema.resolve_all(&self.keys)?;
        let aggregations = self
            .aggregations
            .iter()
            .map(|agg| {
                let column = match (&agg.column, agg.reducer.needs_column()) {
                    (Some(name), true) => Some(schema.resolve(name)?),
                    (None, true) => {
                        return Err(CrashstatError::InvalidAggregation {
                            input: agg.name.clone(),
                            message: format!("{} needs a column", agg.reducer.name()),
                        })
                    }
                    (_, false) => None,
                };
                Ok((agg.name.clone(), column, agg.reducer))
            })
            .collect::<Result<Vec<_>>>()?;

        let output = Schema::new(
            keys.iter()
                .map(|id| schema.name(*id).to_string())
                .chain(aggregations.iter().map(|(name, _, _)| name.clone())),
        )?;

        Ok(ResolvedSummarise {
            input: schema.clone(),
            keys,
            aggregations,
            ordering: self.ordering,
            output,
        })
    }
}

/// A summary bound to one schema; produced by [`SummariseSpec::resolve`].
#[derive(Debug, Clone)]
pub struct ResolvedSummarise {
    input: Schema,
    keys: Vec<ColumnId>,
    aggregations: Vec<(String, Option<ColumnId>, Reducer)>,
    ordering: Ordering,
    output: Schema,
}

/// Hashable form of a key cell. Numbers compare by bit pattern with
/// `-0.0` folded into `0.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyPart {
    Text(String),
    Number(u64),
    Date(chrono::NaiveDate),
    Missing,
}

impl From<&Value> for KeyPart {
    fn from(value: &Value) -> Self {
        match value {
            Value::Text(s) => KeyPart::Text(s.clone()),
            Value::Number(v) => KeyPart::Number(if *v == 0.0 { 0 } else { v.to_bits() }),
            Value::Date(d) => KeyPart::Date(*d),
            Value::Missing => KeyPart::Missing,
        }
    }
}

struct Group<'a> {
    key: Vec<Value>,
    rows: Vec<Row<'a>>,
}

impl ResolvedSummarise {
    /// Run the summary over a dataset with the schema it was resolved against.
    ///
    /// Any other dataset fails with [`CrashstatError::SchemaMismatch`].
    pub fn run(&self, dataset: &Dataset) -> Result<Table> {
        if dataset.schema() != &self.input {
            return Err(CrashstatError::schema_mismatch(&self.input, dataset.schema()));
        }

        let mut index: HashMap<Vec<KeyPart>, usize> = HashMap::new();
        let mut groups: Vec<Group<'_>> = Vec::new();

        for row in dataset.rows() {
            let key: Vec<KeyPart> = self.keys.iter().map(|id| row.get(*id).into()).collect();
            let slot = *index.entry(key).or_insert_with(|| {
                groups.push(Group {
                    key: self.keys.iter().map(|id| row.get(*id).clone()).collect(),
                    rows: Vec::new(),
                });
                groups.len() - 1
            });
            groups[slot].rows.push(row);
        }

        if self.ordering.by == GroupOrder::Sorted {
            groups.sort_by(|a, b| {
                a.key
                    .iter()
                    .zip(&b.key)
                    .map(|(x, y)| x.sort_cmp(y))
                    .find(|o| o.is_ne())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        if self.ordering.direction == OrderDirection::Descending {
            groups.reverse();
        }

        let rows: Vec<Vec<Value>> = groups
            .into_iter()
            .map(|group| {
                let mut out = group.key;
                for (_, column, reducer) in &self.aggregations {
                    out.push(reduce_group(*reducer, *column, &group.rows));
                }
                out
            })
            .collect();

        debug!(
            groups = rows.len(),
            input_rows = dataset.row_count(),
            "summarised dataset"
        );
        Ok(Dataset::from_parts(self.output.clone(), rows))
    }
}

/// Partition `dataset` by `spec.keys` and reduce each group.
///
/// Column references are validated before any row is touched.
pub fn group_summarise(dataset: &Dataset, spec: &SummariseSpec) -> Result<Table> {
    spec.resolve(dataset.schema())?.run(dataset)
}

fn reduce_group(reducer: Reducer, column: Option<ColumnId>, rows: &[Row<'_>]) -> Value {
    let values: Vec<f64> = match column {
        Some(id) => rows.iter().filter_map(|r| r.get(id).as_number()).collect(),
        None => Vec::new(),
    };
    reduce(reducer, &values, rows.len())
}

/// Apply a reducer to the non-missing numeric values of a group of
/// `group_len` rows.
pub fn reduce(reducer: Reducer, values: &[f64], group_len: usize) -> Value {
    let n = values.len();
    match reducer {
        Reducer::Count => Value::Number(group_len as f64),
        Reducer::Sum => Value::number(values.iter().sum()),
        Reducer::Mean if n > 0 => Value::number(mean(values)),
        Reducer::StdDev if n > 1 => {
            let m = mean(values);
            let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
            Value::number((ss / (n - 1) as f64).sqrt())
        }
        Reducer::Min if n > 0 => Value::number(values.iter().copied().fold(f64::INFINITY, f64::min)),
        Reducer::Max if n > 0 => {
            Value::number(values.iter().copied().fold(f64::NEG_INFINITY, f64::max))
        }
        Reducer::Median if n > 0 => {
            let mut sorted = values.to_vec();
            sorted.sort_by(f64::total_cmp);
            let mid = n / 2;
            if n % 2 == 0 {
                Value::number((sorted[mid - 1] + sorted[mid]) / 2.0)
            } else {
                Value::number(sorted[mid])
            }
        }
        _ => Value::Missing,
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn districts() -> Dataset {
        Dataset::new(
            ["District", "speed"],
            vec![
                vec![Value::text("Rural"), Value::Number(100.0)],
                vec![Value::text("Metro"), Value::Number(50.0)],
                vec![Value::text("Coast"), Value::Number(80.0)],
                vec![Value::text("Metro"), Value::Number(70.0)],
                vec![Value::text("Rural"), Value::Missing],
                vec![Value::text("Rural"), Value::Number(110.0)],
            ],
        )
        .unwrap()
    }

    fn speed_spec() -> SummariseSpec {
        SummariseSpec::new()
            .group_by("District")
            .aggregate("mean_speed", Reducer::Mean, "speed")
            .aggregate("sd_speed", Reducer::StdDev, "speed")
    }

    fn column(table: &Table, name: &str) -> Vec<Value> {
        let id = table.column(name).unwrap();
        table.column_values(id).cloned().collect()
    }

    #[test]
    fn test_count() {
        let ds = districts();
        assert_eq!(count(&ds), 6);
        let speed = ds.column("speed").unwrap();
        assert_eq!(
            count_where(&ds, |r| r.get(speed).as_number().is_some_and(|s| s > 75.0)),
            3
        );
        assert_eq!(count_where(&ds, |_| true), count(&ds));
    }

    #[test]
    fn test_three_districts_sorted() {
        let table = group_summarise(&districts(), &speed_spec()).unwrap();
        assert_eq!(table.row_count(), 3);
        assert_eq!(
            table.columns(),
            &["District", "mean_speed", "sd_speed"]
        );
        assert_eq!(
            column(&table, "District"),
            vec![
                Value::text("Coast"),
                Value::text("Metro"),
                Value::text("Rural")
            ]
        );
    }

    #[test]
    fn test_three_districts_first_seen() {
        let spec = speed_spec().ordering(Ordering::first_seen());
        let table = group_summarise(&districts(), &spec).unwrap();
        assert_eq!(
            column(&table, "District"),
            vec![
                Value::text("Rural"),
                Value::text("Metro"),
                Value::text("Coast")
            ]
        );
    }

    #[test]
    fn test_descending() {
        let spec = speed_spec().ordering(Ordering::sorted().descending());
        let table = group_summarise(&districts(), &spec).unwrap();
        assert_eq!(column(&table, "District")[0], Value::text("Rural"));
    }

    #[test]
    fn test_mean_and_sd_ignore_missing() {
        let table = group_summarise(&districts(), &speed_spec()).unwrap();
        let means = column(&table, "mean_speed");
        let sds = column(&table, "sd_speed");

        // Coast: single value
        assert_eq!(means[0], Value::Number(80.0));
        assert!(sds[0].is_missing());

        // Metro: 50, 70
        assert_eq!(means[1], Value::Number(60.0));
        let sd = sds[1].as_number().unwrap();
        assert!((sd - 200f64.sqrt()).abs() < 1e-9);

        // Rural: 100, NA, 110
        assert_eq!(means[2], Value::Number(105.0));
    }

    #[test]
    fn test_counts_sum_to_rows() {
        let spec = SummariseSpec::new().group_by("District").count("n");
        let ds = districts();
        let table = group_summarise(&ds, &spec).unwrap();
        let total: f64 = column(&table, "n")
            .iter()
            .filter_map(|v| v.as_number())
            .sum();
        assert_eq!(total as usize, ds.row_count());
    }

    #[test]
    fn test_missing_key_forms_group_last() {
        let ds = Dataset::new(
            ["Gender", "Age"],
            vec![
                vec![Value::Missing, Value::Number(40.0)],
                vec![Value::text("M"), Value::Number(20.0)],
                vec![Value::text("F"), Value::Number(30.0)],
                vec![Value::Missing, Value::Number(50.0)],
            ],
        )
        .unwrap();
        let spec = SummariseSpec::new()
            .group_by("Gender")
            .count("n")
            .aggregate("mean_age", Reducer::Mean, "Age");
        let table = group_summarise(&ds, &spec).unwrap();
        assert_eq!(table.row_count(), 3);
        let keys = column(&table, "Gender");
        assert!(keys[2].is_missing());
        assert_eq!(column(&table, "n")[2], Value::Number(2.0));
        assert_eq!(column(&table, "mean_age")[2], Value::Number(45.0));
    }

    #[test]
    fn test_multiple_keys() {
        let ds = Dataset::new(
            ["District", "Gender"],
            vec![
                vec![Value::text("Metro"), Value::text("M")],
                vec![Value::text("Metro"), Value::text("F")],
                vec![Value::text("Metro"), Value::text("M")],
                vec![Value::text("Rural"), Value::text("M")],
            ],
        )
        .unwrap();
        let spec = SummariseSpec::new()
            .group_by("District")
            .group_by("Gender")
            .count("n");
        let table = group_summarise(&ds, &spec).unwrap();
        assert_eq!(table.row_count(), 3);
        let first = table.row(0).unwrap();
        assert_eq!(
            first.values(),
            &[Value::text("Metro"), Value::text("F"), Value::Number(1.0)]
        );
    }

    #[test]
    fn test_no_keys_is_single_row() {
        let spec = SummariseSpec::new()
            .count("n")
            .aggregate("max_speed", Reducer::Max, "speed");
        let table = group_summarise(&districts(), &spec).unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(column(&table, "max_speed")[0], Value::Number(110.0));
    }

    #[test]
    fn test_unknown_columns_fail_before_running() {
        let spec = SummariseSpec::new().group_by("Region").count("n");
        assert!(matches!(
            group_summarise(&districts(), &spec),
            Err(CrashstatError::UnknownColumn { .. })
        ));
        let spec = SummariseSpec::new()
            .group_by("District")
            .aggregate("m", Reducer::Mean, "Speed");
        assert!(group_summarise(&districts(), &spec).is_err());
    }

    #[test]
    fn test_resolved_summary_rejects_other_schema() {
        let wide = Dataset::new(
            ["a", "b", "District"],
            vec![vec![Value::Missing, Value::Missing, Value::text("Metro")]],
        )
        .unwrap();
        let resolved = SummariseSpec::new()
            .group_by("District")
            .count("n")
            .resolve(wide.schema())
            .unwrap();
        assert_eq!(resolved.run(&wide).unwrap().row_count(), 1);

        let narrow = Dataset::new(["District"], vec![vec![Value::text("Metro")]]).unwrap();
        let err = resolved.run(&narrow).unwrap_err();
        assert!(matches!(
            err,
            CrashstatError::SchemaMismatch { ref expected, ref actual }
                if expected.len() == 3 && actual == &["District"]
        ));
    }

    #[test]
    fn test_output_name_collision() {
        let spec = SummariseSpec::new().group_by("District").count("District");
        assert!(matches!(
            group_summarise(&districts(), &spec),
            Err(CrashstatError::DuplicateColumn(_))
        ));
    }

    #[test]
    fn test_reduce() {
        let values = [3.0, 1.0, 4.0, 1.0, 5.0];
        assert_eq!(reduce(Reducer::Min, &values, 5), Value::Number(1.0));
        assert_eq!(reduce(Reducer::Max, &values, 5), Value::Number(5.0));
        assert_eq!(reduce(Reducer::Sum, &values, 5), Value::Number(14.0));
        assert_eq!(reduce(Reducer::Median, &values, 5), Value::Number(3.0));
        assert_eq!(
            reduce(Reducer::Median, &[1.0, 2.0, 3.0, 4.0], 4),
            Value::Number(2.5)
        );
        assert_eq!(reduce(Reducer::Count, &[], 7), Value::Number(7.0));
        assert!(reduce(Reducer::Mean, &[], 3).is_missing());
        assert!(reduce(Reducer::Min, &[], 3).is_missing());
        assert_eq!(reduce(Reducer::Sum, &[], 3), Value::Number(0.0));
    }
}
