//! Query processing: filter, count, group and summarise.
//!
//! This module handles the third stage of the pipeline - turning a cleaned
//! dataset into result tables. It provides:
//!
//! - **Options**: reducers, aggregations and ordering (`Reducer`, `Aggregation`, `Ordering`)
//! - **Conditions**: `column OP value` row filters (`ConditionSpec`, `Filter`)
//! - **Summarise**: `count`, `count_where` and `group_summarise`
//!
//! ## Example
//!
//! ```rust,ignore
//! use crashstatlib::query::{group_summarise, Reducer, SummariseSpec};
//!
//! let spec = SummariseSpec::new()
//!     .group_by("District")
//!     .aggregate("mean_speed", Reducer::Mean, "speed")
//!     .aggregate("sd_speed", Reducer::StdDev, "speed");
//! let table = group_summarise(&clean, &spec)?;
//! ```

pub mod condition;
pub mod options;
pub mod summarise;

pub use condition::{CompareOp, Condition, ConditionSpec, Filter, Operand};
pub use options::{Aggregation, GroupOrder, OrderDirection, Ordering, Reducer};
pub use summarise::{count, count_where, group_summarise, reduce, ResolvedSummarise, SummariseSpec};

use crate::data::Dataset;
use crate::Result;

/// Number of rows matching every condition of `filter`.
///
/// Fails if `filter` was resolved against a different schema.
pub fn count_filtered(dataset: &Dataset, filter: &Filter) -> Result<usize> {
    filter.check(dataset.schema())?;
    Ok(count_where(dataset, |row| filter.matches(row)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Value;

    /// 99 rows: 20 aged 61..=80, 9 missing, 70 aged 60 or under.
    fn ages() -> Dataset {
        let rows = (0..99)
            .map(|i| match i {
                0..=19 => vec![Value::Number(61.0 + i as f64)],
                20..=28 => vec![Value::Missing],
                _ => vec![Value::Number((i % 60 + 1) as f64)],
            })
            .collect();
        Dataset::new(["Age"], rows).unwrap()
    }

    #[test]
    fn test_count_older_than_60() {
        let ds = ages();
        let specs = vec!["Age>60".parse::<ConditionSpec>().unwrap()];
        let filter = Filter::resolve(&specs, ds.schema()).unwrap();
        assert_eq!(count_filtered(&ds, &filter).unwrap(), 20);
        assert_eq!(count(&ds), 99);
    }

    #[test]
    fn test_filtered_count_never_exceeds_total() {
        let ds = ages();
        for expr in ["Age>0", "Age<=30", "Age=NA", "Age!=NA", "Age=1000"] {
            let specs = vec![expr.parse::<ConditionSpec>().unwrap()];
            let filter = Filter::resolve(&specs, ds.schema()).unwrap();
            assert!(count_filtered(&ds, &filter).unwrap() <= count(&ds));
        }
    }

    #[test]
    fn test_missing_and_present_partition_rows() {
        let ds = ages();
        let filter = |expr: &str| {
            let spec: ConditionSpec = expr.parse().unwrap();
            Filter::resolve(&[spec], ds.schema()).unwrap()
        };
        let na = count_filtered(&ds, &filter("Age=NA")).unwrap();
        let present = count_filtered(&ds, &filter("Age!=NA")).unwrap();
        assert_eq!(na, 9);
        assert_eq!(na + present, count(&ds));
    }

    #[test]
    fn test_empty_filter_counts_everything() {
        let ds = ages();
        assert_eq!(count_filtered(&ds, &Filter::new()).unwrap(), 99);
    }
}
