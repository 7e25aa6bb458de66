#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use production_import::catalog::{Catalog, ColumnSpec, ColumnType, SchemaTable};
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

/// Catalog with the `invoices` layout used throughout the import scenarios.
pub fn invoice_catalog() -> Catalog {
    Catalog::from_tables(vec![
        SchemaTable::new(
            "crew",
            vec![
                ColumnSpec::new("id", ColumnType::BigInt, false),
                ColumnSpec::new("project_id", ColumnType::String, true),
                ColumnSpec::new("name", ColumnType::String, true),
                ColumnSpec::new("status", ColumnType::String, false),
            ],
        ),
        SchemaTable::new(
            "invoices",
            vec![
                ColumnSpec::new("id", ColumnType::BigInt, false),
                ColumnSpec::new("project_id", ColumnType::String, true),
                ColumnSpec::new("vendor", ColumnType::String, true),
                ColumnSpec::new("amount", ColumnType::Numeric, true),
                ColumnSpec::new("status", ColumnType::String, false),
                ColumnSpec::new("date_issued", ColumnType::Date, true),
                ColumnSpec::new("created_at", ColumnType::TimestampTz, false),
            ],
        ),
    ])
    .expect("valid catalog")
}

pub const INVOICE_CATALOG_YAML: &str = "\
tables:
  - name: crew
    columns:
      - { name: id, type: bigint }
      - { name: project_id, type: string, required: true }
      - { name: name, type: string, required: true }
      - { name: status, type: string }
  - name: invoices
    columns:
      - { name: id, type: bigint }
      - { name: project_id, type: string, required: true }
      - { name: vendor, type: string, required: true }
      - { name: amount, type: numeric, required: true }
      - { name: status, type: string }
      - { name: date_issued, type: date, required: true }
      - { name: created_at, type: timestamp with time zone }
";
