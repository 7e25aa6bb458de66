//! Plain-text rendering for the CLI: aligned tables of accepted rows and
//! catalog listings, plus one-line match summaries.

use std::{borrow::Cow, fmt::Write as _};

use itertools::Itertools;

use crate::{catalog::Catalog, matcher::MatchResult, validate::InsertRow};

const NULL_MARKER: &str = "∅";

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let column_count = headers.len();
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(display_width(cell));
        }
    }
    for width in &mut widths {
        *width = (*width).max(3);
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths));
    let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&rule, &widths));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

/// Renders up to `limit` insert rows; blank values show as `∅`.
pub fn render_insert_rows(rows: &[InsertRow], limit: usize) -> String {
    let Some(first) = rows.first() else {
        return String::new();
    };
    let headers = first
        .column_names()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let body = rows
        .iter()
        .take(limit)
        .map(|row| {
            std::iter::once(row.project_id.clone())
                .chain(row.values().iter().map(|(_, value)| {
                    value
                        .as_ref()
                        .map(|v| v.as_display())
                        .unwrap_or_else(|| NULL_MARKER.to_string())
                }))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    render_table(&headers, &body)
}

pub fn render_catalog(catalog: &Catalog) -> String {
    let headers = ["table", "column", "type", "required"]
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>();
    let rows = catalog
        .tables()
        .iter()
        .flat_map(|table| {
            table.columns.iter().map(move |column| {
                vec![
                    table.name.clone(),
                    column.name.clone(),
                    column.column_type.to_string(),
                    if column.required { "yes" } else { "" }.to_string(),
                ]
            })
        })
        .collect::<Vec<_>>();
    render_table(&headers, &rows)
}

pub fn describe_match(result: &MatchResult<'_>) -> String {
    match result.table {
        None => "No matching table (0 headers matched); choose a table with --table".to_string(),
        Some(table) if result.missing_required.is_empty() => format!(
            "Matched table '{}' ({} header(s) matched)",
            table.name, result.match_count
        ),
        Some(table) => format!(
            "Matched table '{}' ({} header(s) matched); missing required column(s): {}",
            table.name,
            result.match_count,
            result.missing_required.iter().join(", ")
        ),
    }
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let line = values
        .iter()
        .zip(widths)
        .map(|(value, width)| {
            let sanitized = sanitize_cell(value);
            let padding = width.saturating_sub(display_width(&sanitized));
            format!("{sanitized}{}", " ".repeat(padding))
        })
        .join("  ");
    line.trim_end().to_string()
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
