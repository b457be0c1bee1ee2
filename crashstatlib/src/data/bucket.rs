//! Numeric range buckets (`cut`).

use serde::{Deserialize, Serialize};

use crate::error::CrashstatError;
use crate::Result;

use super::value::format_number;

/// Half-open intervals `(breaks[i], breaks[i+1]]` with a label each.
///
/// Deserializing goes through the same validation as [`Buckets::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BucketsDef")]
pub struct Buckets {
    breaks: Vec<f64>,
    labels: Vec<String>,
}

/// Unvalidated serde form of [`Buckets`]; labels are optional.
#[derive(Deserialize)]
struct BucketsDef {
    breaks: Vec<f64>,
    #[serde(default)]
    labels: Option<Vec<String>>,
}

impl TryFrom<BucketsDef> for Buckets {
    type Error = CrashstatError;

    fn try_from(def: BucketsDef) -> Result<Self> {
        let buckets = Buckets::new(def.breaks)?;
        match def.labels {
            Some(labels) => buckets.with_labels(labels),
            None => Ok(buckets),
        }
    }
}

impl Buckets {
    /// Build buckets from strictly increasing, finite boundaries.
    ///
    /// Labels default to `(lo,hi]`.
    pub fn new(breaks: Vec<f64>) -> Result<Self> {
        if breaks.len() < 2 {
            return Err(CrashstatError::InvalidBreaks {
                breaks,
                message: "at least two boundaries are required".to_string(),
            });
        }
        if breaks.iter().any(|b| !b.is_finite()) {
            return Err(CrashstatError::InvalidBreaks {
                breaks,
                message: "boundaries must be finite".to_string(),
            });
        }
        if breaks.windows(2).any(|w| w[0] >= w[1]) {
            return Err(CrashstatError::InvalidBreaks {
                breaks,
                message: "boundaries must be strictly increasing".to_string(),
            });
        }

        let labels = breaks
            .windows(2)
            .map(|w| format!("({},{}]", format_number(w[0]), format_number(w[1])))
            .collect();
        Ok(Buckets { breaks, labels })
    }

    /// Replace the default labels, one per interval.
    pub fn with_labels<I, S>(mut self, labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.len() != self.labels.len() {
            return Err(CrashstatError::InvalidLabels {
                expected: self.labels.len(),
                actual: labels.len(),
            });
        }
        self.labels = labels;
        Ok(self)
    }

    pub fn breaks(&self) -> &[f64] {
        &self.breaks
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Index of the interval containing `value`, if any.
    pub fn interval_of(&self, value: f64) -> Option<usize> {
        if !value.is_finite() {
            return None;
        }
        // first upper bound >= value; lower bound must be strictly below
        let upper = self.breaks[1..].partition_point(|&hi| hi < value);
        if upper >= self.labels.len() {
            return None;
        }
        (value > self.breaks[upper]).then_some(upper)
    }

    /// Label of the interval containing `value`, if any.
    pub fn label_for(&self, value: f64) -> Option<&str> {
        self.interval_of(value).map(|i| self.labels[i].as_str())
    }
}
