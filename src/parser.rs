//! Tabular parser: turns uploaded delimited text into a header list plus one
//! [`ParsedRow`] per non-blank data row.
//!
//! The first non-blank record is the header row. Header cells are trimmed and
//! blank header cells are dropped together with every cell positioned under
//! them. Blank cells (empty or whitespace only) become `None`, so a missing
//! value and a blank one look the same downstream. Rows where every kept cell
//! is blank are dropped.

use std::collections::BTreeMap;

use encoding_rs::Encoding;
use log::debug;

use crate::{
    error::{ImportError, ImportResult},
    io_utils,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    /// 1-based line of the record in the source file.
    pub line: u64,
    cells: BTreeMap<String, Option<String>>,
}

impl ParsedRow {
    pub fn new(line: u64, cells: BTreeMap<String, Option<String>>) -> Self {
        Self { line, cells }
    }

    /// Value under `header`, `None` when blank or absent.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells.get(header).and_then(|value| value.as_deref())
    }

    pub fn cells(&self) -> &BTreeMap<String, Option<String>> {
        &self.cells
    }

    fn is_blank(&self) -> bool {
        self.cells.values().all(Option::is_none)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSheet {
    pub headers: Vec<String>,
    pub rows: Vec<ParsedRow>,
}

impl ParsedSheet {
    /// Renders the sheet back to CSV; blank cells are written as empty fields.
    pub fn to_csv_string(&self, delimiter: u8) -> ImportResult<String> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(
                self.headers
                    .iter()
                    .map(|header| row.get(header).unwrap_or_default()),
            )?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|err| ImportError::Csv(csv::Error::from(err.into_error())))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Parses raw upload bytes after checking the declared content type.
pub fn parse_bytes(
    bytes: &[u8],
    content_type: &str,
    encoding: &'static Encoding,
    delimiter: u8,
) -> ImportResult<ParsedSheet> {
    io_utils::ensure_tabular(content_type)?;
    let text = io_utils::decode_bytes(bytes, encoding)?;
    parse_str(&text, delimiter)
}

pub fn parse_str(content: &str, delimiter: u8) -> ImportResult<ParsedSheet> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = io_utils::open_csv_reader(content.as_bytes(), delimiter);
    let mut layout: Option<Vec<(usize, String)>> = None;
    let mut rows = Vec::new();
    let mut blank_rows = 0usize;

    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let Some(columns) = layout.as_ref() else {
            let header = header_layout(&record);
            if !header.is_empty() {
                layout = Some(header);
            }
            continue;
        };

        let mut cells = BTreeMap::new();
        for (idx, name) in columns {
            let value = record.get(*idx).and_then(normalize_cell);
            cells.insert(name.clone(), value);
        }
        let row = ParsedRow::new(line, cells);
        if row.is_blank() {
            blank_rows += 1;
            continue;
        }
        rows.push(row);
    }

    let Some(columns) = layout else {
        return Err(ImportError::EmptyInput);
    };
    debug!(
        "Parsed {} header(s) and {} row(s); dropped {} blank row(s)",
        columns.len(),
        rows.len(),
        blank_rows
    );
    Ok(ParsedSheet {
        headers: columns.into_iter().map(|(_, name)| name).collect(),
        rows,
    })
}

/// Kept header positions. Blank headers are dropped; a repeated header keeps
/// its first position only.
fn header_layout(record: &csv::StringRecord) -> Vec<(usize, String)> {
    let mut columns: Vec<(usize, String)> = Vec::new();
    for (idx, cell) in record.iter().enumerate() {
        let name = cell.trim();
        if name.is_empty() || columns.iter().any(|(_, existing)| existing == name) {
            continue;
        }
        columns.push((idx, name.to_string()));
    }
    columns
}

fn normalize_cell(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
