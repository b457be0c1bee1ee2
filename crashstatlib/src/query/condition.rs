//! Row filters written as `column OP value`.
//!
//! Conditions are parsed from text (`Age>60`, `District=Metro`,
//! `Blood.alcohol!=NA`) into a [`ConditionSpec`], then resolved against a
//! schema into a [`Condition`] that can test rows. Comparisons against a
//! missing cell are false, except the explicit `=NA` / `!=NA` checks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

use crate::data::{
    parse_date, parse_number, ColumnId, Dataset, Row, Schema, Value, MISSING_TEXT,
};
use crate::error::CrashstatError;
use crate::Result;

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CompareOp {
    fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
        }
    }

    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Ge => ordering != Ordering::Less,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Le => ordering != Ordering::Greater,
        }
    }
}

/// Right-hand side of a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    Number(f64),
    Date(NaiveDate),
    Text(String),
    /// `NA`: tests for missing cells
    Missing,
}

impl Operand {
    fn parse(s: &str) -> Operand {
        let s = s.trim();
        if s == MISSING_TEXT {
            return Operand::Missing;
        }
        if let Some(v) = parse_number(s) {
            return Operand::Number(v);
        }
        if let Some(d) = parse_date(s) {
            return Operand::Date(d);
        }
        let unquoted = s
            .strip_prefix('"')
            .and_then(|t| t.strip_suffix('"'))
            .or_else(|| s.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')))
            .unwrap_or(s);
        Operand::Text(unquoted.to_string())
    }
}

/// A parsed but unresolved condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSpec {
    pub column: String,
    pub op: CompareOp,
    pub operand: Operand,
}

impl ConditionSpec {
    pub fn new(column: impl Into<String>, op: CompareOp, operand: Operand) -> Self {
        Self {
            column: column.into(),
            op,
            operand,
        }
    }

    /// Resolve the column against a schema.
    pub fn resolve(&self, schema: &Schema) -> Result<Condition> {
        Ok(Condition {
            column: schema.resolve(&self.column)?,
            op: self.op,
            operand: self.operand.clone(),
        })
    }
}

impl std::fmt::Display for ConditionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let operand = match &self.operand {
            Operand::Number(v) => crate::data::format_number(*v),
            Operand::Date(d) => d.format("%Y-%m-%d").to_string(),
            Operand::Text(s) => s.clone(),
            Operand::Missing => MISSING_TEXT.to_string(),
        };
        write!(f, "{}{}{}", self.column, self.op.symbol(), operand)
    }
}

impl FromStr for ConditionSpec {
    type Err = CrashstatError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |message: &str| CrashstatError::InvalidCondition {
            input: s.to_string(),
            message: message.to_string(),
        };

        let pos = s
            .find(['<', '>', '=', '!'])
            .ok_or_else(|| invalid("expected one of =, !=, >, >=, <, <="))?;
        let column = s[..pos].trim();
        let rest = &s[pos..];

        let (op, len) = if rest.starts_with(">=") {
            (CompareOp::Ge, 2)
        } else if rest.starts_with("<=") {
            (CompareOp::Le, 2)
        } else if rest.starts_with("!=") {
            (CompareOp::Ne, 2)
        } else if rest.starts_with("==") {
            (CompareOp::Eq, 2)
        } else if rest.starts_with('=') {
            (CompareOp::Eq, 1)
        } else if rest.starts_with('>') {
            (CompareOp::Gt, 1)
        } else if rest.starts_with('<') {
            (CompareOp::Lt, 1)
        } else {
            return Err(invalid("'!' must be followed by '='"));
        };

        if column.is_empty() {
            return Err(invalid("column name is empty"));
        }
        let operand = rest[len..].trim();
        if operand.is_empty() {
            return Err(invalid("value is empty"));
        }

        let operand = Operand::parse(operand);
        if operand == Operand::Missing && !matches!(op, CompareOp::Eq | CompareOp::Ne) {
            return Err(invalid("NA can only be compared with = or !="));
        }
        Ok(ConditionSpec::new(column, op, operand))
    }
}

/// A condition bound to a column of a specific schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    column: ColumnId,
    op: CompareOp,
    operand: Operand,
}

impl Condition {
    /// Test a row of the schema the condition was resolved against.
    pub(crate) fn matches(&self, row: &Row<'_>) -> bool {
        let cell = row.get(self.column);
        let ordering = match (&self.operand, cell) {
            (Operand::Missing, cell) => {
                return match self.op {
                    CompareOp::Eq => cell.is_missing(),
                    _ => !cell.is_missing(),
                };
            }
            (_, Value::Missing) => return false,
            (Operand::Number(want), Value::Number(have)) => have.total_cmp(want),
            (Operand::Date(want), Value::Date(have)) => have.cmp(want),
            (Operand::Text(want), Value::Text(have)) => have.as_str().cmp(want.as_str()),
            // "District=2" against a text column compares the text form
            (Operand::Number(want), Value::Text(have)) => {
                have.as_str().cmp(crate::data::format_number(*want).as_str())
            }
            _ => return false,
        };
        self.op.accepts(ordering)
    }
}

/// Conjunction of conditions; an empty filter accepts every row.
///
/// A non-empty filter remembers the schema it was resolved against and
/// refuses datasets with any other.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    schema: Option<Schema>,
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a list of condition specs against a schema.
    pub fn resolve(specs: &[ConditionSpec], schema: &Schema) -> Result<Self> {
        let conditions = specs
            .iter()
            .map(|spec| spec.resolve(schema))
            .collect::<Result<Vec<_>>>()?;
        Ok(Filter {
            schema: Some(schema.clone()),
            conditions,
        })
    }

    /// Fail unless `schema` is the one this filter was resolved against.
    pub fn check(&self, schema: &Schema) -> Result<()> {
        match &self.schema {
            Some(expected) if expected != schema => {
                Err(CrashstatError::schema_mismatch(expected, schema))
            }
            _ => Ok(()),
        }
    }

    /// Keep the rows of `dataset` that match.
    pub fn apply(&self, dataset: &Dataset) -> Result<Dataset> {
        self.check(dataset.schema())?;
        Ok(dataset.filter(|row| self.matches(row)))
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub(crate) fn matches(&self, row: &Row<'_>) -> bool {
        self.conditions.iter().all(|c| c.matches(row))
    }
}
