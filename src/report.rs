//! Human-readable and JSON renderings of a [`DataSetComparison`].
//!
//! The comparison types carry no formatting; this is the layer the CLI uses
//! to turn them into output.

use std::borrow::Cow;
use std::fmt::Write as _;

use anyhow::Result;
use itertools::Itertools;

use crate::{
    comparison::{DataSetComparison, TableComparison},
    row::Row,
    value::Value,
};

pub fn render_json(comparison: &DataSetComparison) -> Result<String> {
    Ok(serde_json::to_string_pretty(comparison)?)
}

pub fn render_text(comparison: &DataSetComparison) -> String {
    let mut output = String::new();
    for table in comparison.tables() {
        render_table_comparison(&mut output, table);
    }
    let failed = comparison.failed_tables().count();
    if failed == 0 {
        let _ = writeln!(output, "Data set matches ({} table(s))", comparison.len());
    } else {
        let _ = writeln!(
            output,
            "Data set does not match: {failed} of {} table(s) differ",
            comparison.len()
        );
    }
    output
}

fn render_table_comparison(output: &mut String, table: &TableComparison) {
    let marker = if table.is_match() { "✓" } else { "✗" };
    let _ = writeln!(output, "{marker} {}", table.qualified_table_name());
    if table.is_match() {
        return;
    }

    if table.is_expected_no_more_records_but_found_more() {
        let _ = writeln!(output, "  expected no more records but found more:");
        for row in table.unexpected_rows() {
            let _ = writeln!(output, "    {}", describe_row(row));
        }
    }
    for row in table.missing_rows() {
        let _ = writeln!(output, "  missing row: {}", describe_row(row));
    }
    for row in table.rows_that_should_not_have_matched() {
        let _ = writeln!(output, "  row should not exist: {}", describe_row(row));
    }
    for comparison in table.best_row_comparisons() {
        let expected = &table.expected_rows()[comparison.expected_index()];
        let _ = writeln!(output, "  closest match for {}:", describe_row(expected));
        if !comparison.unused_primary_key_columns().is_empty() {
            let _ = writeln!(
                output,
                "    unresolved primary key column(s): {}",
                comparison.unused_primary_key_columns().join(", ")
            );
        }
        if comparison.column_differences().is_empty() {
            continue;
        }
        let headers = ["column", "expected", "actual"].map(str::to_string);
        let rows = comparison
            .column_differences()
            .iter()
            .map(|difference| {
                vec![
                    difference.column.clone(),
                    difference.expected.as_display(),
                    difference
                        .actual
                        .as_ref()
                        .map_or_else(|| "<absent>".to_string(), Value::as_display),
                ]
            })
            .collect::<Vec<_>>();
        for line in render_grid(&headers, &rows).lines() {
            let _ = writeln!(output, "    {line}");
        }
    }
}

fn describe_row(row: &Row) -> String {
    let cells = row
        .columns()
        .iter()
        .map(|column| format!("{}={}", column.name, column.value))
        .join(", ");
    format!("{{{cells}}}")
}

/// Aligned plain-text grid with a dashed separator under the header.
pub fn render_grid(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(sanitize_cell(cell).chars().count());
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_line(headers, &widths));
    let separator = widths
        .iter()
        .map(|w| "-".repeat((*w).max(3)))
        .collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_line(&separator, &widths));
    for row in rows {
        let _ = writeln!(output, "{}", format_line(row, &widths));
    }
    output
}

fn format_line(values: &[String], widths: &[usize]) -> String {
    values
        .iter()
        .zip(widths)
        .map(|(value, width)| {
            let cell = sanitize_cell(value);
            let padding = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(padding))
        })
        .join("  ")
        .trim_end()
        .to_string()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
