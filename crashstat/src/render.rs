//! Template rendering for CLI output using outstanding

use console::{measure_text_width, pad_str, Alignment, Style};
use crashstatlib::{write_csv_to, ReportTable, Table};
use outstanding::Theme;
use serde::Serialize;

/// Include template at compile time
const REPORT_TABLE_TEMPLATE: &str = include_str!("../templates/report_table.jinja");

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Table,
    Json,
    Csv,
}

impl OutputMode {
    pub fn from_arg(s: &str) -> Self {
        match s {
            "json" => OutputMode::Json,
            "csv" => OutputMode::Csv,
            _ => OutputMode::Table,
        }
    }
}

/// Row data for template rendering (pre-formatted)
#[derive(Debug, Serialize)]
struct TemplateRow {
    /// Pre-padded label (left-aligned)
    name: String,
    /// Pre-padded cells (right-aligned)
    cells: Vec<String>,
}

/// Data context for the report table template
#[derive(Debug, Serialize)]
struct TableContext {
    title: Option<String>,
    /// Pre-padded label column header
    name_header: String,
    /// Pre-padded value column headers
    columns: Vec<String>,
    /// Separator line (dashes)
    separator: String,
    rows: Vec<TemplateRow>,
    total: TemplateRow,
}

/// Create the theme with styles
fn create_theme() -> Theme {
    Theme::new().add("title", Style::new().bold())
}

fn to_template_row(
    label: &str,
    cells: &[String],
    name_width: usize,
    widths: &[usize],
) -> TemplateRow {
    TemplateRow {
        name: pad_str(label, name_width, Alignment::Left, None).into_owned(),
        cells: cells
            .iter()
            .zip(widths)
            .map(|(cell, w)| pad_str(cell, *w, Alignment::Right, None).into_owned())
            .collect(),
    }
}

fn build_context(table: &ReportTable) -> TableContext {
    let name_width = table
        .rows
        .iter()
        .map(|r| measure_text_width(&r.label))
        .chain([
            measure_text_width(&table.headers[0]),
            measure_text_width(&table.footer.label),
        ])
        .max()
        .unwrap_or(0)
        + 2;

    let widths: Vec<usize> = table.headers[1..]
        .iter()
        .enumerate()
        .map(|(i, header)| {
            table
                .rows
                .iter()
                .filter_map(|r| r.values.get(i))
                .map(|v| measure_text_width(v))
                .chain([measure_text_width(header), 6])
                .max()
                .unwrap_or(6)
        })
        .collect();

    let columns = table.headers[1..]
        .iter()
        .zip(&widths)
        .map(|(h, w)| pad_str(h, *w, Alignment::Right, None).into_owned())
        .collect();
    let separator = "-".repeat(name_width + widths.iter().map(|w| w + 1).sum::<usize>());

    TableContext {
        title: table.title.clone(),
        name_header: pad_str(&table.headers[0], name_width, Alignment::Left, None).into_owned(),
        columns,
        separator,
        rows: table
            .rows
            .iter()
            .map(|r| to_template_row(&r.label, &r.values, name_width, &widths))
            .collect(),
        total: to_template_row(&table.footer.label, &table.footer.values, name_width, &widths),
    }
}

/// Render a presentation table to text.
pub fn render_table(table: &ReportTable) -> anyhow::Result<String> {
    let context = serde_json::to_value(build_context(table))?;
    let theme = create_theme();
    outstanding::render(REPORT_TABLE_TEMPLATE, &context, &theme)
        .map_err(|e| anyhow::anyhow!("failed to render table: {e}"))
}

/// Render a result table in the requested mode.
///
/// `label_columns` leading columns become the row label in table mode.
pub fn render_result(
    table: &Table,
    label_columns: usize,
    title: Option<&str>,
    mode: OutputMode,
) -> anyhow::Result<String> {
    match mode {
        OutputMode::Json => Ok(serde_json::to_string_pretty(table)?),
        OutputMode::Csv => {
            let mut buf = Vec::new();
            write_csv_to(table, &mut buf)?;
            Ok(String::from_utf8(buf)?)
        }
        OutputMode::Table => {
            let mut presentation = ReportTable::from_table(table, label_columns);
            if let Some(title) = title {
                presentation = presentation.titled(title);
            }
            render_table(&presentation)
        }
    }
}
