//! The crash report: the standard cleaning recipe plus a fixed set of
//! descriptive queries.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::ReportConfig;
use crate::data::{Buckets, ColumnType, CrashColumn, Dataset, Table, Value};
use crate::output::write_csv;
use crate::query::{count, count_where, group_summarise, Reducer, SummariseSpec};
use crate::source::{load, LoadOptions};
use crate::Result;

/// `"yes"` when blood alcohol is above zero, `"no"` when it is zero,
/// missing otherwise.
pub fn alcohol_in_system(blood_alcohol: &Value) -> Value {
    match blood_alcohol.as_number() {
        Some(v) if v > 0.0 => Value::text("yes"),
        Some(v) if v == 0.0 => Value::text("no"),
        _ => Value::Missing,
    }
}

/// Apply the cleaning recipe: sentinel replacement, renames, coercion.
///
/// Renames and coercions naming a column the source does not have are
/// skipped, so a trimmed export still cleans. Queries that need the
/// column fail later with an unknown-column error.
pub fn clean(raw: Dataset, config: &ReportConfig) -> Result<Dataset> {
    let ds = raw.replace_sentinel(&config.sentinel);

    let renames: Vec<(&String, &String)> = config
        .renames
        .iter()
        .filter(|(from, _)| ds.schema().contains(from))
        .collect();
    let ds = ds.rename_columns(renames)?;

    let present = |name: &&String| ds.schema().contains(name);
    let coercions: Vec<(String, ColumnType)> = config
        .numeric_columns
        .iter()
        .filter(present)
        .map(|c| (c.clone(), ColumnType::Number))
        .chain(
            config
                .text_columns
                .iter()
                .filter(present)
                .map(|c| (c.clone(), ColumnType::Text)),
        )
        .chain(
            config
                .date_columns
                .iter()
                .filter(present)
                .map(|c| (c.clone(), ColumnType::Date)),
        )
        .collect();
    let ds = ds.coerce_types(coercions)?;

    debug!(
        rows = ds.row_count(),
        columns = ds.column_count(),
        "cleaned dataset"
    );
    Ok(ds)
}

/// Results of the fixed report.
#[derive(Debug, Clone, Serialize)]
pub struct CrashReport {
    /// Number of records
    pub rows: usize,
    /// Records with Age > 60
    pub older_than_60: usize,
    /// Age statistics per gender
    pub age_by_gender: Table,
    /// Deaths per day of week
    pub deceased_by_day: Table,
    /// Record count and mean speed per age range
    pub age_ranges: Table,
    /// Record count per alcohol_in_system value
    pub alcohol_in_system: Table,
    /// Mean and standard deviation of speed per district
    pub speed_by_district: Table,
}

impl CrashReport {
    /// Run every report query over a cleaned dataset.
    pub fn build(clean: &Dataset, config: &ReportConfig) -> Result<Self> {
        let age = clean.column(CrashColumn::Age)?;
        let older_than_60 =
            count_where(clean, |row| row.get(age).as_number().is_some_and(|a| a > 60.0));

        let age_by_gender = group_summarise(
            clean,
            &SummariseSpec::new()
                .group_by(CrashColumn::Gender.name())
                .count("n")
                .aggregate("mean_age", Reducer::Mean, CrashColumn::Age.name())
                .aggregate("sd_age", Reducer::StdDev, CrashColumn::Age.name())
                .aggregate("min_age", Reducer::Min, CrashColumn::Age.name())
                .aggregate("max_age", Reducer::Max, CrashColumn::Age.name()),
        )?;

        let deceased_by_day = group_summarise(
            clean,
            &SummariseSpec::new()
                .group_by(CrashColumn::DayOfWeek.name())
                .count("n")
                .aggregate("deceased", Reducer::Sum, CrashColumn::Deceased.name())
                .aggregate("mean_deceased", Reducer::Mean, CrashColumn::Deceased.name()),
        )?;

        let age_ranges = age_ranges(clean, &config.age_buckets()?)?;

        let alcohol = clean.column(CrashColumn::BloodAlcohol)?;
        let with_alcohol = clean
            .clone()
            .derive_column(CrashColumn::AlcoholInSystem.name(), |row| {
                alcohol_in_system(row.get(alcohol))
            })?;
        let alcohol_in_system = group_summarise(
            &with_alcohol,
            &SummariseSpec::new()
                .group_by(CrashColumn::AlcoholInSystem.name())
                .count("n"),
        )?;

        let speed_by_district = speed_by_district(clean)?;

        Ok(CrashReport {
            rows: count(clean),
            older_than_60,
            age_by_gender,
            deceased_by_day,
            age_ranges,
            alcohol_in_system,
            speed_by_district,
        })
    }
}

/// Mean and sample standard deviation of speed per district, sorted by
/// district name.
pub fn speed_by_district(clean: &Dataset) -> Result<Table> {
    group_summarise(
        clean,
        &SummariseSpec::new()
            .group_by(CrashColumn::District.name())
            .aggregate("mean_speed", Reducer::Mean, CrashColumn::Speed.name())
            .aggregate("sd_speed", Reducer::StdDev, CrashColumn::Speed.name()),
    )
}

/// Bucketize Age and summarise per bucket, rows in interval order.
fn age_ranges(clean: &Dataset, buckets: &Buckets) -> Result<Table> {
    let bucketed = clean.clone().bucketize(
        CrashColumn::Age,
        buckets,
        CrashColumn::AgeRange.name(),
    )?;
    let table = group_summarise(
        &bucketed,
        &SummariseSpec::new()
            .group_by(CrashColumn::AgeRange.name())
            .count("n")
            .aggregate("mean_speed", Reducer::Mean, CrashColumn::Speed.name()),
    )?;

    let position = |v: &Value| {
        v.as_text()
            .and_then(|label| buckets.labels().iter().position(|l| l == label))
            .unwrap_or(usize::MAX)
    };
    let (schema, mut rows) = table.into_parts();
    rows.sort_by_key(|row| position(&row[0]));
    Ok(Dataset::from_parts(schema, rows))
}

/// Where a report run wrote its CSV.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRun {
    pub report: CrashReport,
    pub csv_path: PathBuf,
}

/// Load, clean, build the report and write the speed-by-district CSV
/// into `out_dir`.
pub fn run(
    path: impl AsRef<Path>,
    config: &ReportConfig,
    out_dir: impl AsRef<Path>,
) -> Result<ReportRun> {
    let raw = load(path, &LoadOptions::new().sheet(config.sheet))?;
    let clean = clean(raw, config)?;
    let report = CrashReport::build(&clean, config)?;

    let csv_path = out_dir.as_ref().join(&config.output_file);
    write_csv(&report.speed_by_district, &csv_path)?;
    info!(
        rows = report.rows,
        districts = report.speed_by_district.row_count(),
        "report complete"
    );
    Ok(ReportRun { report, csv_path })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CrashstatError;
    use std::fs;
    use tempfile::tempdir;

    const CRASHES: &str = "\
Date.of.crash,Age,Gender,District,Day.of.Week,Blood.alcohol,speed,#.deceased,#.vehicles.involved,year
2019-01-04,34,M,Metro,Friday,0,60,0,2,2019
2019-02-10,x,F,Rural,Sunday,0.08,100,1,1,2019
2019-03-15,71,M,Coast,Friday,x,80,0,3,2019
2019-04-01,65,F,Metro,Monday,0.12,70,2,2,2019
2019-05-22,19,x,Rural,Sunday,0,110,x,1,2019
2020-06-30,45,F,Metro,Tuesday,0,x,0,2,2020
";

    fn raw() -> Dataset {
        let dir = tempdir().unwrap();
        let path = dir.path().join("crashes.csv");
        fs::write(&path, CRASHES).unwrap();
        load(&path, &LoadOptions::new()).unwrap()
    }

    fn cleaned() -> Dataset {
        clean(raw(), &ReportConfig::default()).unwrap()
    }

    #[test]
    fn test_alcohol_in_system() {
        assert_eq!(alcohol_in_system(&Value::Number(0.0)), Value::text("no"));
        assert_eq!(alcohol_in_system(&Value::Number(0.08)), Value::text("yes"));
        assert!(alcohol_in_system(&Value::Missing).is_missing());
        assert!(alcohol_in_system(&Value::text("x")).is_missing());
    }

    #[test]
    fn test_clean_renames_and_coerces() {
        let ds = cleaned();
        assert!(ds.schema().contains("no.deceased"));
        assert!(!ds.schema().contains("#.deceased"));
        assert!(ds.schema().contains("no.vehicles.involved"));

        let age = ds.column(CrashColumn::Age).unwrap();
        assert_eq!(ds.value(0, age), Some(&Value::Number(34.0)));
        assert!(ds.value(1, age).unwrap().is_missing());

        // no text cell is the sentinel
        assert!(ds
            .rows()
            .flat_map(|r| r.values().iter())
            .all(|v| v.as_text() != Some("x")));
    }

    #[test]
    fn test_clean_coerces_dates_after_sentinel() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dates.csv");
        fs::write(&path, "Date.of.crash,Age\n2019-01-04,34\nx,40\n").unwrap();
        let raw = load(&path, &LoadOptions::new()).unwrap();

        let ds = clean(raw, &ReportConfig::default()).unwrap();
        let date = ds.column(CrashColumn::DateOfCrash).unwrap();
        assert_eq!(
            ds.value(0, date),
            Some(&Value::Date(
                chrono::NaiveDate::from_ymd_opt(2019, 1, 4).unwrap()
            ))
        );
        assert!(ds.value(1, date).unwrap().is_missing());
    }

    #[test]
    fn test_clean_keeps_dates_in_full_export() {
        let ds = cleaned();
        let date = ds.column(CrashColumn::DateOfCrash).unwrap();
        assert!(ds.rows().all(|r| r.get(date).as_date().is_some()));
    }

    #[test]
    fn test_clean_skips_absent_columns() {
        let ds = Dataset::new(["Age"], vec![vec![Value::text("40")]]).unwrap();
        let ds = clean(ds, &ReportConfig::default()).unwrap();
        assert_eq!(ds.columns(), &["Age"]);
        assert_eq!(ds.row(0).unwrap().values(), &[Value::Number(40.0)]);
    }

    #[test]
    fn test_build_report() {
        let ds = cleaned();
        let report = CrashReport::build(&ds, &ReportConfig::default()).unwrap();
        assert_eq!(report.rows, 6);
        assert_eq!(report.older_than_60, 2);

        // Coast, Metro, Rural
        assert_eq!(report.speed_by_district.row_count(), 3);
        let metro = report.speed_by_district.row(1).unwrap();
        assert_eq!(metro.values()[0], Value::text("Metro"));
        assert_eq!(metro.values()[1], Value::Number(65.0));
        assert!(report.speed_by_district.row(0).unwrap().values()[2].is_missing());

        // no, yes, missing
        let alcohol = &report.alcohol_in_system;
        assert_eq!(alcohol.row_count(), 3);
        assert_eq!(alcohol.row(0).unwrap().values()[1], Value::Number(3.0));
        assert_eq!(alcohol.row(1).unwrap().values()[1], Value::Number(2.0));
        assert!(alcohol.row(2).unwrap().values()[0].is_missing());

        // Gender groups: F, M, missing
        assert_eq!(report.age_by_gender.row_count(), 3);
        assert_eq!(report.deceased_by_day.row_count(), 4);
    }

    #[test]
    fn test_age_ranges_in_interval_order() {
        let ds = cleaned();
        let report = CrashReport::build(&ds, &ReportConfig::default()).unwrap();
        let labels: Vec<Value> = report
            .age_ranges
            .rows()
            .map(|r| r.values()[0].clone())
            .collect();
        assert_eq!(
            labels,
            vec![
                Value::text("(18,25]"),
                Value::text("(25,40]"),
                Value::text("(40,60]"),
                Value::text("(60,120]"),
                Value::Missing,
            ]
        );
    }

    #[test]
    fn test_build_requires_crash_columns() {
        let ds = Dataset::new(["Age"], vec![vec![Value::Number(40.0)]]).unwrap();
        assert!(matches!(
            CrashReport::build(&ds, &ReportConfig::default()),
            Err(CrashstatError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn test_run_writes_csv() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("crashes.csv");
        fs::write(&input, CRASHES).unwrap();

        let run = run(&input, &ReportConfig::default(), dir.path()).unwrap();
        assert_eq!(run.csv_path, dir.path().join("speed_by_district.csv"));

        let written = fs::read_to_string(&run.csv_path).unwrap();
        let mut lines = written.lines();
        assert_eq!(lines.next(), Some("District,mean_speed,sd_speed"));
        assert_eq!(lines.next(), Some("Coast,80,NA"));
        assert_eq!(written.lines().count(), 4);
    }
}
