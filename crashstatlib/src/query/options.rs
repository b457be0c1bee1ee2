//! Query options: reducers, aggregations and group ordering.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::CrashstatError;
use crate::Result;

/// Reduction applied to the values of one column within a group.
///
/// Every reducer except `Count` ignores missing and non-numeric cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reducer {
    /// Number of rows in the group (missing included)
    Count,
    /// Arithmetic mean
    Mean,
    /// Sample standard deviation (n - 1)
    StdDev,
    /// Smallest value
    Min,
    /// Largest value
    Max,
    /// Sum of values
    Sum,
    /// Median value
    Median,
}

impl Reducer {
    /// Whether the reducer reads a column at all.
    pub fn needs_column(self) -> bool {
        !matches!(self, Reducer::Count)
    }

    pub fn name(self) -> &'static str {
        match self {
            Reducer::Count => "count",
            Reducer::Mean => "mean",
            Reducer::StdDev => "sd",
            Reducer::Min => "min",
            Reducer::Max => "max",
            Reducer::Sum => "sum",
            Reducer::Median => "median",
        }
    }
}

impl FromStr for Reducer {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "count" | "n" => Ok(Reducer::Count),
            "mean" | "avg" => Ok(Reducer::Mean),
            "sd" | "std" | "stddev" => Ok(Reducer::StdDev),
            "min" => Ok(Reducer::Min),
            "max" => Ok(Reducer::Max),
            "sum" => Ok(Reducer::Sum),
            "median" => Ok(Reducer::Median),
            _ => Err(format!("Unknown reducer: {}", s)),
        }
    }
}

/// One output column of a summary: `name = reducer(column)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregation {
    /// Output column name
    pub name: String,
    /// Input column (unused by `Count`)
    pub column: Option<String>,
    /// Reduction to apply
    pub reducer: Reducer,
}

impl Aggregation {
    pub fn new(name: impl Into<String>, reducer: Reducer, column: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column: Some(column.into()),
            reducer,
        }
    }

    /// Row count per group.
    pub fn count(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column: None,
            reducer: Reducer::Count,
        }
    }
}

/// Parses `name=reducer(column)`, or `name=count()` / `name=n` for counts.
impl FromStr for Aggregation {
    type Err = CrashstatError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |message: &str| CrashstatError::InvalidAggregation {
            input: s.to_string(),
            message: message.to_string(),
        };

        let (name, expr) = s
            .split_once('=')
            .ok_or_else(|| invalid("expected NAME=REDUCER(COLUMN)"))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(invalid("output name is empty"));
        }

        let expr = expr.trim();
        let (reducer, column) = match expr.split_once('(') {
            Some((reducer, rest)) => {
                let column = rest
                    .strip_suffix(')')
                    .ok_or_else(|| invalid("missing closing parenthesis"))?
                    .trim();
                (reducer.trim(), column)
            }
            None => (expr, ""),
        };
        let reducer = Reducer::from_str(reducer).map_err(|e| invalid(&e))?;

        if reducer.needs_column() {
            if column.is_empty() {
                return Err(invalid("reducer needs a column"));
            }
            Ok(Aggregation::new(name, reducer, column))
        } else {
            Ok(Aggregation::count(name))
        }
    }
}

/// How summary rows are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupOrder {
    /// By group key values (numbers, dates, text; missing last)
    #[default]
    Sorted,
    /// In the order each group is first encountered
    FirstSeen,
}

impl FromStr for GroupOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sorted" | "key" | "sort" => Ok(GroupOrder::Sorted),
            "first-seen" | "first" | "appearance" => Ok(GroupOrder::FirstSeen),
            _ => Err(format!("Unknown group order: {}", s)),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderDirection {
    /// Ascending (A-Z, smallest first)
    #[default]
    Ascending,
    /// Descending (Z-A, largest first)
    Descending,
}

/// Ordering configuration for summary rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ordering {
    /// Ordering policy
    pub by: GroupOrder,
    /// Sort direction
    pub direction: OrderDirection,
}

impl Ordering {
    /// Sorted by group keys, ascending (default)
    pub fn sorted() -> Self {
        Self::default()
    }

    /// First-encounter order
    pub fn first_seen() -> Self {
        Self {
            by: GroupOrder::FirstSeen,
            direction: OrderDirection::Ascending,
        }
    }

    /// Set sort direction to ascending
    pub fn ascending(mut self) -> Self {
        self.direction = OrderDirection::Ascending;
        self
    }

    /// Set sort direction to descending
    pub fn descending(mut self) -> Self {
        self.direction = OrderDirection::Descending;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reducer_from_str() {
        assert_eq!(Reducer::from_str("mean").unwrap(), Reducer::Mean);
        assert_eq!(Reducer::from_str("SD").unwrap(), Reducer::StdDev);
        assert_eq!(Reducer::from_str("n").unwrap(), Reducer::Count);
        assert_eq!(Reducer::from_str("median").unwrap(), Reducer::Median);
        assert!(Reducer::from_str("mode").is_err());
    }

    #[test]
    fn test_aggregation_from_str() {
        let agg = Aggregation::from_str("mean_speed=mean(speed)").unwrap();
        assert_eq!(agg, Aggregation::new("mean_speed", Reducer::Mean, "speed"));

        let agg = Aggregation::from_str(" sd_speed = sd( speed ) ").unwrap();
        assert_eq!(agg, Aggregation::new("sd_speed", Reducer::StdDev, "speed"));

        assert_eq!(
            Aggregation::from_str("n=count()").unwrap(),
            Aggregation::count("n")
        );
        assert_eq!(Aggregation::from_str("n=n").unwrap(), Aggregation::count("n"));
    }

    #[test]
    fn test_aggregation_from_str_errors() {
        assert!(Aggregation::from_str("mean(speed)").is_err());
        assert!(Aggregation::from_str("=mean(speed)").is_err());
        assert!(Aggregation::from_str("m=mean()").is_err());
        assert!(Aggregation::from_str("m=mean(speed").is_err());
        assert!(Aggregation::from_str("m=mode(speed)").is_err());
    }

    #[test]
    fn test_ordering_default() {
        let ordering = Ordering::default();
        assert_eq!(ordering.by, GroupOrder::Sorted);
        assert_eq!(ordering.direction, OrderDirection::Ascending);
    }

    #[test]
    fn test_ordering_builder() {
        let ordering = Ordering::first_seen().descending();
        assert_eq!(ordering.by, GroupOrder::FirstSeen);
        assert_eq!(ordering.direction, OrderDirection::Descending);
    }

    #[test]
    fn test_group_order_from_str() {
        assert_eq!(GroupOrder::from_str("sorted").unwrap(), GroupOrder::Sorted);
        assert_eq!(
            GroupOrder::from_str("first-seen").unwrap(),
            GroupOrder::FirstSeen
        );
        assert!(GroupOrder::from_str("random").is_err());
    }
}
