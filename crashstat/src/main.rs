//! # crashstat
//!
//! A CLI for descriptive statistics over road-crash spreadsheets.
//!
//! ## Overview
//!
//! crashstat is built on top of crashstatlib. Every subcommand loads the
//! workbook (or CSV export), applies the standard cleaning recipe (the `x`
//! sentinel becomes missing, `#.` columns are renamed, numeric columns are
//! coerced) and then answers one question about it.
//!
//! ## Usage
//!
//! ```bash
//! # Full report, writes speed_by_district.csv into ./out
//! crashstat report crashes.xlsx --out-dir out
//!
//! # Count records matching conditions (ANDed)
//! crashstat count crashes.xlsx --where "Age>60" --where "District=Metro"
//!
//! # Ad hoc group/summarise
//! crashstat summarise crashes.xlsx --by District --agg "mean_speed=mean(speed)" --agg "n=count()"
//!
//! # First rows after cleaning, as JSON
//! crashstat head crashes.xlsx -n 5 --output json
//! ```

mod logging;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use crashstatlib::{
    clean, count, count_filtered, group_summarise, load, report, write_csv, Aggregation,
    ConditionSpec, Dataset, Filter, GroupOrder, LoadOptions, Ordering, ReportConfig, ReportTable,
    SummariseSpec, Value,
};
use serde_json::json;
use tracing::debug;

use render::{render_result, render_table, OutputMode};

fn path_arg() -> Arg {
    Arg::new("path")
        .help("Workbook (.xlsx, .xls, .ods, ...) or CSV file")
        .required(true)
        .value_parser(value_parser!(PathBuf))
}

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .value_parser(value_parser!(PathBuf))
        .help("TOML file overriding the cleaning and report settings")
}

fn sheet_arg() -> Arg {
    Arg::new("sheet")
        .short('s')
        .long("sheet")
        .value_parser(value_parser!(usize))
        .help("Sheet to read, 1-based (defaults to the config value, 1)")
}

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("crashstat")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Arthur Debert")
        .about("Descriptive statistics over road-crash spreadsheets")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .global(true)
                .value_parser(["table", "json", "csv"])
                .default_value("table")
                .help("Output format"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("Log progress to stderr (-v info, -vv debug)"),
        )
        .subcommand(
            Command::new("report")
                .about("Run the full crash report and write speed_by_district.csv")
                .arg(path_arg())
                .arg(config_arg())
                .arg(sheet_arg())
                .arg(
                    Arg::new("out-dir")
                        .short('d')
                        .long("out-dir")
                        .value_parser(value_parser!(PathBuf))
                        .default_value(".")
                        .help("Directory for the CSV output"),
                ),
        )
        .subcommand(
            Command::new("count")
                .about("Count records after cleaning")
                .arg(path_arg())
                .arg(config_arg())
                .arg(sheet_arg())
                .arg(
                    Arg::new("where")
                        .short('w')
                        .long("where")
                        .action(ArgAction::Append)
                        .help("Condition like Age>60, District=Metro, Blood.alcohol!=NA (repeatable)"),
                ),
        )
        .subcommand(
            Command::new("summarise")
                .visible_alias("summarize")
                .about("Group records and reduce each group")
                .arg(path_arg())
                .arg(config_arg())
                .arg(sheet_arg())
                .arg(
                    Arg::new("by")
                        .short('b')
                        .long("by")
                        .value_delimiter(',')
                        .action(ArgAction::Append)
                        .help("Group key columns (comma-separated)"),
                )
                .arg(
                    Arg::new("agg")
                        .short('a')
                        .long("agg")
                        .action(ArgAction::Append)
                        .required(true)
                        .help("Aggregation NAME=REDUCER(COLUMN): count, mean, sd, min, max, sum, median"),
                )
                .arg(
                    Arg::new("where")
                        .short('w')
                        .long("where")
                        .action(ArgAction::Append)
                        .help("Only summarise records matching the condition (repeatable)"),
                )
                .arg(
                    Arg::new("order")
                        .long("order")
                        .value_parser(["sorted", "first-seen"])
                        .default_value("sorted")
                        .help("Group ordering"),
                )
                .arg(
                    Arg::new("desc")
                        .long("desc")
                        .action(ArgAction::SetTrue)
                        .help("Reverse the group order"),
                )
                .arg(
                    Arg::new("csv")
                        .long("csv")
                        .value_parser(value_parser!(PathBuf))
                        .help("Also write the result to this CSV file"),
                ),
        )
        .subcommand(
            Command::new("head")
                .about("Show the first records after cleaning")
                .arg(path_arg())
                .arg(config_arg())
                .arg(sheet_arg())
                .arg(
                    Arg::new("lines")
                        .short('n')
                        .long("lines")
                        .value_parser(value_parser!(usize))
                        .default_value("10")
                        .help("Number of records"),
                ),
        )
}

/// Read `--config` (or defaults), applying `--sheet` on top.
fn load_config(matches: &ArgMatches) -> anyhow::Result<ReportConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => ReportConfig::load(path)?,
        None => ReportConfig::default(),
    };
    if let Some(sheet) = matches.get_one::<usize>("sheet") {
        config.sheet = *sheet;
    }
    Ok(config)
}

/// Load the source file and apply the cleaning recipe.
fn load_clean(matches: &ArgMatches, config: &ReportConfig) -> anyhow::Result<Dataset> {
    let path = matches
        .get_one::<PathBuf>("path")
        .context("missing input path")?;
    let raw = load(path, &LoadOptions::new().sheet(config.sheet))?;
    Ok(clean(raw, config)?)
}

/// Parse and resolve `--where` conditions against the cleaned dataset.
fn build_filter(matches: &ArgMatches, dataset: &Dataset) -> anyhow::Result<(Filter, Vec<String>)> {
    let exprs: Vec<String> = matches
        .get_many::<String>("where")
        .map(|v| v.cloned().collect())
        .unwrap_or_default();
    let specs = exprs
        .iter()
        .map(|e| e.parse::<ConditionSpec>())
        .collect::<Result<Vec<_>, _>>()?;
    let filter = Filter::resolve(&specs, dataset.schema())?;
    Ok((filter, specs.iter().map(|s| s.to_string()).collect()))
}

/// Handler for report command
fn report_handler(matches: &ArgMatches, mode: OutputMode) -> anyhow::Result<String> {
    let config = load_config(matches)?;
    let path = matches
        .get_one::<PathBuf>("path")
        .context("missing input path")?;
    let out_dir = matches
        .get_one::<PathBuf>("out-dir")
        .context("missing output directory")?;

    let run = report::run(path, &config, out_dir)?;
    let report = &run.report;

    match mode {
        OutputMode::Json => Ok(serde_json::to_string_pretty(&run)?),
        OutputMode::Csv => render_result(&report.speed_by_district, 1, None, mode),
        OutputMode::Table => {
            let mut out = String::new();
            out.push_str(&render_table(
                &ReportTable::scalar("Records", report.rows)
                    .with_row("Age > 60", report.older_than_60)
                    .titled("Summary"),
            )?);
            let sections = [
                ("Age by gender", &report.age_by_gender),
                ("Deceased by day of week", &report.deceased_by_day),
                ("Age ranges", &report.age_ranges),
                ("Alcohol in system", &report.alcohol_in_system),
                ("Speed by district", &report.speed_by_district),
            ];
            for (title, table) in sections {
                out.push_str("\n\n");
                out.push_str(&render_result(table, 1, Some(title), mode)?);
            }
            out.push_str(&format!("\n\nWrote {}", run.csv_path.display()));
            Ok(out)
        }
    }
}

/// Handler for count command
fn count_handler(matches: &ArgMatches, mode: OutputMode) -> anyhow::Result<String> {
    let config = load_config(matches)?;
    let dataset = load_clean(matches, &config)?;
    let (filter, conditions) = build_filter(matches, &dataset)?;

    let total = count(&dataset);
    let matched = count_filtered(&dataset, &filter)?;
    debug!(total, matched, "counted records");

    let label = if conditions.is_empty() {
        "All records".to_string()
    } else {
        conditions.join(" AND ")
    };

    match mode {
        OutputMode::Json => Ok(serde_json::to_string_pretty(&json!({
            "conditions": conditions,
            "count": matched,
            "total": total,
        }))?),
        OutputMode::Csv => {
            let table = Dataset::new(
                ["conditions", "count", "total"],
                vec![vec![
                    Value::text(label),
                    Value::Number(matched as f64),
                    Value::Number(total as f64),
                ]],
            )?;
            render_result(&table, 0, None, mode)
        }
        OutputMode::Table => render_table(&ReportTable::scalar(label, matched)),
    }
}

/// Handler for summarise command
fn summarise_handler(matches: &ArgMatches, mode: OutputMode) -> anyhow::Result<String> {
    let config = load_config(matches)?;
    let dataset = load_clean(matches, &config)?;
    let (filter, _) = build_filter(matches, &dataset)?;
    let dataset = if filter.is_empty() {
        dataset
    } else {
        filter.apply(&dataset)?
    };

    let mut spec = SummariseSpec::new();
    if let Some(keys) = matches.get_many::<String>("by") {
        for key in keys {
            spec = spec.group_by(key.trim());
        }
    }
    if let Some(aggs) = matches.get_many::<String>("agg") {
        for agg in aggs {
            spec = spec.with(agg.parse::<Aggregation>()?);
        }
    }

    let order = matches
        .get_one::<String>("order")
        .map(|s| s.parse::<GroupOrder>())
        .transpose()
        .map_err(anyhow::Error::msg)?
        .unwrap_or_default();
    let mut ordering = Ordering {
        by: order,
        ..Ordering::default()
    };
    if matches.get_flag("desc") {
        ordering = ordering.descending();
    }
    spec = spec.ordering(ordering);

    let table = group_summarise(&dataset, &spec)?;

    if let Some(csv_path) = matches.get_one::<PathBuf>("csv") {
        write_csv(&table, csv_path)?;
    }

    render_result(&table, spec.keys.len(), None, mode)
}

/// Handler for head command
fn head_handler(matches: &ArgMatches, mode: OutputMode) -> anyhow::Result<String> {
    let config = load_config(matches)?;
    let dataset = load_clean(matches, &config)?;
    let n = matches.get_one::<usize>("lines").copied().unwrap_or(10);
    render_result(&dataset.head(n), 0, None, mode)
}

fn run(matches: &ArgMatches) -> anyhow::Result<String> {
    let mode = OutputMode::from_arg(
        matches
            .get_one::<String>("output")
            .map(|s| s.as_str())
            .unwrap_or("table"),
    );

    match matches.subcommand() {
        Some(("report", sub)) => report_handler(sub, mode),
        Some(("count", sub)) => count_handler(sub, mode),
        Some(("summarise", sub)) => summarise_handler(sub, mode),
        Some(("head", sub)) => head_handler(sub, mode),
        _ => Err(anyhow::anyhow!("no subcommand given")),
    }
}

fn main() -> ExitCode {
    let matches = build_command().get_matches();
    logging::init_logging(matches.get_count("verbose"));

    match run(&matches) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output.trim_end());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
