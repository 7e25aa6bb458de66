//! I/O helpers shared by the parser, the CLI, and the JSON writer.
//!
//! - **Content-type gate**: only delimited text is accepted for import.
//! - **Encoding**: input decoding via `encoding_rs`, defaulting to UTF-8.
//! - **Reader construction**: a headerless, flexible `csv` reader so the
//!   parser can decide which row is the header itself.
//! - **stdin/stdout**: the `-` path convention routes through standard streams.

use std::{
    fs::File,
    io::{BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};

use crate::error::{ImportError, ImportResult};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';

const TABULAR_CONTENT_TYPES: &[&str] = &[
    "text/csv",
    "application/csv",
    "text/comma-separated-values",
    "text/plain",
    "application/vnd.ms-excel",
];

const TABULAR_EXTENSIONS: &[&str] = &["csv", "txt"];

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

/// Accepts a MIME type (parameters such as `; charset=utf-8` are ignored) or a
/// file name with a delimited-text extension.
pub fn ensure_tabular(content_type: &str) -> ImportResult<()> {
    let trimmed = content_type.trim();
    let mime = trimmed
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if TABULAR_CONTENT_TYPES.contains(&mime.as_str()) {
        return Ok(());
    }
    let extension = Path::new(trimmed)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    if let Some(ext) = extension
        && TABULAR_EXTENSIONS.contains(&ext.as_str())
    {
        return Ok(());
    }
    Err(ImportError::UnsupportedContentType {
        content_type: trimmed.to_string(),
    })
}

/// Content type reported for a file chosen from disk.
pub fn content_type_for_path(path: &Path) -> String {
    if is_dash(path) {
        "text/csv".to_string()
    } else {
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> ImportResult<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(ImportError::Decode {
            encoding: encoding.name().to_string(),
        })
    } else {
        Ok(text.into_owned())
    }
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    if is_dash(path) {
        std::io::stdin()
            .lock()
            .read_to_end(&mut buffer)
            .context("Reading input from stdin")?;
    } else {
        File::open(path)
            .with_context(|| format!("Opening input file {path:?}"))?
            .read_to_end(&mut buffer)
            .with_context(|| format!("Reading input file {path:?}"))?;
    }
    Ok(buffer)
}

pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(std::io::stdout()),
    };
    Ok(writer)
}
