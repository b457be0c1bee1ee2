//! Cell values and column types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// Date formats recognised when text is parsed as a date.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];

/// Text written for a missing value in text output (CSV, tables).
pub const MISSING_TEXT: &str = "NA";

/// A single cell.
///
/// Serializes untagged: text and dates as strings, numbers as numbers,
/// missing as `null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Free text or a category label
    Text(String),
    /// Numeric value (always finite when produced by this crate)
    Number(f64),
    /// Calendar date
    Date(NaiveDate),
    /// No value
    #[default]
    Missing,
}

impl Value {
    /// Create a text cell
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Create a number cell; non-finite input becomes missing
    pub fn number(v: f64) -> Self {
        if v.is_finite() {
            Value::Number(v)
        } else {
            Value::Missing
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// The type of this cell, or `None` when missing.
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            Value::Text(_) => Some(ColumnType::Text),
            Value::Number(_) => Some(ColumnType::Number),
            Value::Date(_) => Some(ColumnType::Date),
            Value::Missing => None,
        }
    }

    /// Convert to the given type. Conversions that cannot succeed yield missing.
    pub fn coerce(&self, to: ColumnType) -> Value {
        match (self, to) {
            (Value::Missing, _) => Value::Missing,
            (Value::Text(_), ColumnType::Text)
            | (Value::Number(_), ColumnType::Number)
            | (Value::Date(_), ColumnType::Date) => self.clone(),
            (Value::Text(s), ColumnType::Number) => {
                parse_number(s).map(Value::Number).unwrap_or(Value::Missing)
            }
            (Value::Text(s), ColumnType::Date) => {
                parse_date(s).map(Value::Date).unwrap_or(Value::Missing)
            }
            (Value::Number(v), ColumnType::Text) => Value::Text(format_number(*v)),
            (Value::Date(d), ColumnType::Text) => Value::Text(d.format("%Y-%m-%d").to_string()),
            (Value::Number(_), ColumnType::Date) | (Value::Date(_), ColumnType::Number) => {
                Value::Missing
            }
        }
    }

    /// Ordering used for sorted group output: numbers, then dates, then
    /// text, with missing always last.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        fn rank(v: &Value) -> u8 {
            match v {
                Value::Number(_) => 0,
                Value::Date(_) => 1,
                Value::Text(_) => 2,
                Value::Missing => 3,
            }
        }
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.total_cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Text(s) => f.pad(s),
            Value::Number(v) => f.pad(&format_number(*v)),
            Value::Date(d) => f.pad(&d.format("%Y-%m-%d").to_string()),
            Value::Missing => f.pad(MISSING_TEXT),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::number(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Missing)
    }
}

/// Target type for column coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Number,
    Date,
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "string" | "character" | "category" => Ok(ColumnType::Text),
            "number" | "numeric" | "float" | "double" => Ok(ColumnType::Number),
            "date" => Ok(ColumnType::Date),
            _ => Err(format!("Unknown column type: {}", s)),
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ColumnType::Text => "text",
            ColumnType::Number => "number",
            ColumnType::Date => "date",
        };
        f.write_str(s)
    }
}

/// Parse trimmed text as a finite number.
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse trimmed text as a date in one of the recognised formats.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Shortest text form of a number that parses back to the same value.
pub fn format_number(v: f64) -> String {
    if v == 0.0 {
        // avoid "-0"
        return "0".to_string();
    }
    v.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_text_to_number() {
        assert_eq!(Value::text("42").coerce(ColumnType::Number), Value::Number(42.0));
        assert_eq!(Value::text(" 0.08 ").coerce(ColumnType::Number), Value::Number(0.08));
        assert_eq!(Value::text("x").coerce(ColumnType::Number), Value::Missing);
        assert_eq!(Value::text("inf").coerce(ColumnType::Number), Value::Missing);
    }

    #[test]
    fn test_coerce_number_to_text() {
        assert_eq!(Value::Number(3.0).coerce(ColumnType::Text), Value::text("3"));
        assert_eq!(Value::Number(2.5).coerce(ColumnType::Text), Value::text("2.5"));
    }

    #[test]
    fn test_coerce_text_to_date() {
        let expected = NaiveDate::from_ymd_opt(2021, 3, 14).unwrap();
        assert_eq!(
            Value::text("2021-03-14").coerce(ColumnType::Date),
            Value::Date(expected)
        );
        assert_eq!(
            Value::text("14/03/2021").coerce(ColumnType::Date),
            Value::Date(expected)
        );
        assert_eq!(Value::text("soon").coerce(ColumnType::Date), Value::Missing);
    }

    #[test]
    fn test_missing_stays_missing() {
        for ty in [ColumnType::Text, ColumnType::Number, ColumnType::Date] {
            assert_eq!(Value::Missing.coerce(ty), Value::Missing);
        }
    }

    #[test]
    fn test_number_rejects_non_finite() {
        assert_eq!(Value::number(f64::NAN), Value::Missing);
        assert_eq!(Value::number(1.5), Value::Number(1.5));
    }

    #[test]
    fn test_sort_cmp_missing_last() {
        let mut values = vec![
            Value::Missing,
            Value::text("b"),
            Value::text("a"),
            Value::Missing,
        ];
        values.sort_by(|a, b| a.sort_cmp(b));
        assert_eq!(values[0], Value::text("a"));
        assert_eq!(values[1], Value::text("b"));
        assert!(values[2].is_missing());
        assert!(values[3].is_missing());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Missing.to_string(), "NA");
        assert_eq!(Value::Number(-0.0).to_string(), "0");
        assert_eq!(format!("{:>4}", Value::text("ab")), "  ab");
    }

    #[test]
    fn test_column_type_from_str() {
        assert_eq!(ColumnType::from_str("numeric").unwrap(), ColumnType::Number);
        assert_eq!(ColumnType::from_str("Text").unwrap(), ColumnType::Text);
        assert_eq!(ColumnType::from_str("date").unwrap(), ColumnType::Date);
        assert!(ColumnType::from_str("blob").is_err());
    }
}
