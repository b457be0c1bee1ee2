//! Report configuration.
//!
//! Every field has a default matching the standard crash workbook, so an
//! empty TOML file (or none at all) yields the stock report.
//!
//! ```toml
//! sentinel = "x"
//! sheet = 1
//! numeric_columns = ["Age", "speed"]
//! date_columns = ["Date.of.crash"]
//! age_breaks = [0, 18, 65, 120]
//! output_file = "speed.csv"
//!
//! [renames]
//! "#.deceased" = "no.deceased"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::data::{Buckets, CrashColumn};
use crate::error::CrashstatError;
use crate::Result;

/// Settings for the cleaning recipe and the fixed report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Text that marks a missing value in the source
    pub sentinel: String,
    /// 1-based sheet index
    pub sheet: usize,
    /// Source column name to cleaned column name
    pub renames: BTreeMap<String, String>,
    /// Columns coerced to numbers
    pub numeric_columns: Vec<String>,
    /// Columns coerced to text
    pub text_columns: Vec<String>,
    /// Columns coerced to dates
    pub date_columns: Vec<String>,
    /// Boundaries for the age-range buckets
    pub age_breaks: Vec<f64>,
    /// Optional labels, one per age interval
    pub age_labels: Option<Vec<String>>,
    /// File name of the speed-by-district CSV
    pub output_file: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        let renames = [CrashColumn::Deceased, CrashColumn::VehiclesInvolved]
            .into_iter()
            .map(|c| (c.source_name().to_string(), c.name().to_string()))
            .collect();
        let numeric_columns = [
            CrashColumn::Age,
            CrashColumn::BloodAlcohol,
            CrashColumn::Speed,
            CrashColumn::Deceased,
            CrashColumn::VehiclesInvolved,
            CrashColumn::Year,
        ]
        .iter()
        .map(|c| c.name().to_string())
        .collect();
        let text_columns = [
            CrashColumn::Gender,
            CrashColumn::District,
            CrashColumn::DayOfWeek,
        ]
        .iter()
        .map(|c| c.name().to_string())
        .collect();
        let date_columns = vec![CrashColumn::DateOfCrash.name().to_string()];

        ReportConfig {
            sentinel: "x".to_string(),
            sheet: 1,
            renames,
            numeric_columns,
            text_columns,
            date_columns,
            age_breaks: vec![0.0, 18.0, 25.0, 40.0, 60.0, 120.0],
            age_labels: None,
            output_file: "speed_by_district.csv".to_string(),
        }
    }
}

impl ReportConfig {
    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| CrashstatError::Config(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            CrashstatError::Config(format!("failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Age buckets built from `age_breaks` and `age_labels`.
    pub fn age_buckets(&self) -> Result<Buckets> {
        let buckets = Buckets::new(self.age_breaks.clone())?;
        match &self.age_labels {
            Some(labels) => buckets.with_labels(labels.iter().cloned()),
            None => Ok(buckets),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = ReportConfig::default();
        assert_eq!(config.sentinel, "x");
        assert_eq!(config.sheet, 1);
        assert_eq!(
            config.renames.get("#.deceased").map(String::as_str),
            Some("no.deceased")
        );
        assert_eq!(
            config.renames.get("#.vehicles.involved").map(String::as_str),
            Some("no.vehicles.involved")
        );
        assert!(config.numeric_columns.iter().any(|c| c == "Blood.alcohol"));
        assert!(config.text_columns.iter().any(|c| c == "Day.of.Week"));
        assert_eq!(config.date_columns, vec!["Date.of.crash"]);
        assert_eq!(config.output_file, "speed_by_district.csv");
        assert_eq!(config.age_buckets().unwrap().labels().len(), 5);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(
            ReportConfig::from_toml_str("").unwrap(),
            ReportConfig::default()
        );
    }

    #[test]
    fn test_partial_toml() {
        let config = ReportConfig::from_toml_str(
            r##"
            sentinel = "?"
            age_breaks = [0, 30, 120]
            age_labels = ["young", "old"]

            [renames]
            "#.deceased" = "deaths"
            "##,
        )
        .unwrap();
        assert_eq!(config.sentinel, "?");
        assert_eq!(config.renames.len(), 1);
        assert_eq!(config.output_file, "speed_by_district.csv");
        let buckets = config.age_buckets().unwrap();
        assert_eq!(buckets.label_for(45.0), Some("old"));
    }

    #[test]
    fn test_bad_labels() {
        let config = ReportConfig::from_toml_str(
            "age_breaks = [0, 30, 120]\nage_labels = [\"only-one\"]\n",
        )
        .unwrap();
        assert!(matches!(
            config.age_buckets(),
            Err(CrashstatError::InvalidLabels { .. })
        ));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            ReportConfig::from_toml_str("sheet = \"one\""),
            Err(CrashstatError::Config(_))
        ));
    }

    #[test]
    fn test_load_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "sheet = 2").unwrap();
        let config = ReportConfig::load(file.path()).unwrap();
        assert_eq!(config.sheet, 2);
        assert!(ReportConfig::load("/nonexistent/report.toml").is_err());
    }
}
