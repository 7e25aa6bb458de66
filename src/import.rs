//! Import pipeline: parse, match, validate, then a single bulk write.
//!
//! The catalog and the project id are supplied by the caller; nothing here
//! reads global state. A failed write leaves no resumable state behind, so a
//! retry starts again from the raw file.

use encoding_rs::{Encoding, UTF_8};
use log::{info, warn};

use crate::{
    catalog::{Catalog, SchemaTable},
    error::{ImportError, ImportResult},
    io_utils::DEFAULT_CSV_DELIMITER,
    matcher::{self, MatchResult},
    parser::{self, ParsedSheet},
    validate::{self, ValidationReport},
    writer::BulkWriter,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPlan<'a> {
    pub matched: MatchResult<'a>,
    /// True when the destination was chosen by the user rather than matched.
    pub manual: bool,
}

impl<'a> ImportPlan<'a> {
    pub fn table(&self) -> ImportResult<&'a SchemaTable> {
        self.matched.table.ok_or(ImportError::NoTableMatched)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    pub table: String,
    pub match_count: usize,
    pub accepted: usize,
    pub skipped: usize,
    pub degraded_cells: usize,
    pub written: bool,
}

#[derive(Debug, Clone)]
pub struct Importer<'a> {
    catalog: &'a Catalog,
    project_id: Option<String>,
    encoding: &'static Encoding,
    delimiter: u8,
}

impl<'a> Importer<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            project_id: None,
            encoding: UTF_8,
            delimiter: DEFAULT_CSV_DELIMITER,
        }
    }

    pub fn with_project(mut self, project_id: Option<String>) -> Self {
        self.project_id = project_id;
        self
    }

    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn parse(&self, bytes: &[u8], content_type: &str) -> ImportResult<ParsedSheet> {
        parser::parse_bytes(bytes, content_type, self.encoding, self.delimiter)
    }

    /// Resolves the destination. A manual choice must name a catalog table;
    /// otherwise the matcher decides, and no match is not an error here.
    pub fn plan(
        &self,
        sheet: &ParsedSheet,
        table_override: Option<&str>,
    ) -> ImportResult<ImportPlan<'a>> {
        let plan = match table_override {
            Some(name) => ImportPlan {
                matched: matcher::evaluate_table(&sheet.headers, self.catalog.require(name)?),
                manual: true,
            },
            None => ImportPlan {
                matched: matcher::match_table(&sheet.headers, self.catalog),
                manual: false,
            },
        };
        match plan.matched.table_name() {
            Some(name) if !plan.matched.missing_required.is_empty() => warn!(
                "Table '{}' is missing required column(s): {}",
                name,
                plan.matched.missing_required.join(", ")
            ),
            Some(_) => {}
            None => warn!("No catalog table matches the file headers"),
        }
        Ok(plan)
    }

    pub fn validate(
        &self,
        sheet: &ParsedSheet,
        plan: &ImportPlan<'a>,
    ) -> ImportResult<ValidationReport> {
        let project_id = validate::require_project_id(self.project_id.as_deref())?;
        let table = plan.table()?;
        validate::validate_rows(table, &sheet.rows, Some(project_id))
    }

    /// Runs the whole pipeline over a parsed sheet and writes the accepted
    /// rows in one call. An empty accepted set is not written.
    pub fn execute<W>(
        &self,
        sheet: &ParsedSheet,
        table_override: Option<&str>,
        writer: &mut W,
    ) -> ImportResult<ImportOutcome>
    where
        W: BulkWriter + ?Sized,
    {
        validate::require_project_id(self.project_id.as_deref())?;
        let plan = self.plan(sheet, table_override)?;
        let report = self.validate(sheet, &plan)?;
        info!(
            "Validated {} row(s) for '{}': {} accepted, {} skipped",
            sheet.rows.len(),
            report.table,
            report.accepted_count(),
            report.skipped_count()
        );
        let written = !report.rows.is_empty();
        if written {
            writer.insert(&report.table, &report.rows)?;
            info!(
                "Inserted {} row(s) into '{}'",
                report.accepted_count(),
                report.table
            );
        }
        Ok(ImportOutcome {
            table: report.table.clone(),
            match_count: plan.matched.match_count,
            accepted: report.accepted_count(),
            skipped: report.skipped_count(),
            degraded_cells: report.degraded_cells,
            written,
        })
    }
}
