//! Table matcher: picks the catalog table whose column names overlap most with
//! the uploaded headers.
//!
//! Matching is exact and case-sensitive. The first table to reach the highest
//! overlap wins ties, and a table with zero overlap is never selected.

use std::collections::HashSet;

use log::debug;

use crate::catalog::{Catalog, SchemaTable};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult<'a> {
    pub table: Option<&'a SchemaTable>,
    pub match_count: usize,
    /// Required columns of the selected table absent from the headers,
    /// excluding system-managed columns. Informational only.
    pub missing_required: Vec<String>,
}

impl MatchResult<'_> {
    pub fn is_match(&self) -> bool {
        self.table.is_some()
    }

    pub fn has_required_columns(&self) -> bool {
        self.table.is_some() && self.missing_required.is_empty()
    }

    pub fn table_name(&self) -> Option<&str> {
        self.table.map(|t| t.name.as_str())
    }
}

/// Number of headers equal to a column name of `table`.
pub fn match_count(headers: &[String], table: &SchemaTable) -> usize {
    headers
        .iter()
        .filter(|header| table.has_column(header))
        .count()
}

pub fn match_table<'a>(headers: &[String], catalog: &'a Catalog) -> MatchResult<'a> {
    let mut best: Option<&SchemaTable> = None;
    let mut best_count = 0usize;
    for table in catalog.tables() {
        let count = match_count(headers, table);
        debug!("Table '{}' matches {} header(s)", table.name, count);
        if count > best_count {
            best = Some(table);
            best_count = count;
        }
    }
    let missing_required = best
        .map(|table| missing_required_columns(headers, table))
        .unwrap_or_default();
    MatchResult {
        table: best,
        match_count: best_count,
        missing_required,
    }
}

/// Builds a result for a table chosen by the user instead of the matcher.
pub fn evaluate_table<'a>(headers: &[String], table: &'a SchemaTable) -> MatchResult<'a> {
    MatchResult {
        table: Some(table),
        match_count: match_count(headers, table),
        missing_required: missing_required_columns(headers, table),
    }
}

pub fn missing_required_columns(headers: &[String], table: &SchemaTable) -> Vec<String> {
    let present = headers.iter().map(String::as_str).collect::<HashSet<_>>();
    let mut missing = table
        .required_import_columns()
        .filter(|c| !present.contains(c.name.as_str()))
        .map(|c| c.name.clone())
        .collect::<Vec<_>>();
    missing.sort();
    missing
}
