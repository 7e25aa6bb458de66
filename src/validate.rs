//! Row validator and coercer.
//!
//! Turns parsed rows into [`InsertRow`]s for one destination table. Every
//! importable column is coerced to its declared type; a row is kept only when
//! each required column coerced to a value. Rejected rows are counted, never
//! repaired. `project_id` is stamped from the caller's project context and
//! `id`/`created_at` are never emitted.

use log::debug;
use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::{
    catalog::{PROJECT_ID_COLUMN, SchemaTable},
    data::{Value, coerce},
    error::{ImportError, ImportResult},
    parser::ParsedRow,
};

/// A row ready for the bulk write. Columns keep schema order, `project_id`
/// first.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertRow {
    pub project_id: String,
    values: Vec<(String, Option<Value>)>,
}

impl InsertRow {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .and_then(|(_, value)| value.as_ref())
    }

    pub fn contains_column(&self, column: &str) -> bool {
        column == PROJECT_ID_COLUMN || self.values.iter().any(|(name, _)| name == column)
    }

    pub fn values(&self) -> &[(String, Option<Value>)] {
        &self.values
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(PROJECT_ID_COLUMN).chain(self.values.iter().map(|(n, _)| n.as_str()))
    }
}

impl Serialize for InsertRow {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        map.serialize_entry(PROJECT_ID_COLUMN, &self.project_id)?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    pub line: u64,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub table: String,
    pub rows: Vec<InsertRow>,
    pub skipped: Vec<SkippedRow>,
    /// Non-blank cells that could not be coerced and became null.
    pub degraded_cells: usize,
}

impl ValidationReport {
    pub fn accepted_count(&self) -> usize {
        self.rows.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Blank project ids count as absent.
pub fn require_project_id(project_id: Option<&str>) -> ImportResult<&str> {
    project_id
        .filter(|id| !id.trim().is_empty())
        .ok_or(ImportError::MissingProjectContext)
}

pub fn validate_rows(
    table: &SchemaTable,
    rows: &[ParsedRow],
    project_id: Option<&str>,
) -> ImportResult<ValidationReport> {
    let project_id = require_project_id(project_id)?;
    let mut accepted = Vec::with_capacity(rows.len());
    let mut skipped = Vec::new();
    let mut degraded_cells = 0usize;

    for row in rows {
        let mut values = Vec::new();
        let mut missing = Vec::new();
        for column in table.importable_columns() {
            let raw = row.get(&column.name);
            let value = coerce(raw, column.column_type);
            if raw.is_some() && value.is_none() {
                degraded_cells += 1;
                debug!(
                    "Line {}: '{}' is not a valid {} value for '{}'",
                    row.line,
                    raw.unwrap_or_default(),
                    column.column_type,
                    column.name
                );
            }
            if column.required && value.is_none() {
                missing.push(column.name.clone());
            }
            values.push((column.name.clone(), value));
        }

        if missing.is_empty() {
            accepted.push(InsertRow {
                project_id: project_id.to_string(),
                values,
            });
        } else {
            debug!(
                "Skipping line {}: missing required column(s) {}",
                row.line,
                missing.join(", ")
            );
            skipped.push(SkippedRow {
                line: row.line,
                missing,
            });
        }
    }

    Ok(ValidationReport {
        table: table.name.clone(),
        rows: accepted,
        skipped,
        degraded_cells,
    })
}
