//! Schema catalog: the destination tables an uploaded sheet can be imported
//! into.
//!
//! The catalog is static configuration. It is either compiled in
//! ([`Catalog::builtin`]) or loaded from YAML ([`Catalog::load`]) and is never
//! mutated after construction. Table names are unique within a catalog and
//! column names are unique within a table; both are enforced on load.
//!
//! Three column names are managed by the system rather than the file:
//! `project_id` is stamped from the selected project, while `id` and
//! `created_at` are never read from or written by the importer.

use std::{collections::HashSet, fmt, fs::File, io::BufReader, path::Path, str::FromStr};

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::error::{ImportError, ImportResult};

pub const ID_COLUMN: &str = "id";
pub const PROJECT_ID_COLUMN: &str = "project_id";
pub const CREATED_AT_COLUMN: &str = "created_at";

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.yml");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    String,
    Integer,
    BigInt,
    Numeric,
    Date,
    Timestamp,
    TimestampTz,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Integer => "integer",
            ColumnType::BigInt => "bigint",
            ColumnType::Numeric => "numeric",
            ColumnType::Date => "date",
            ColumnType::Timestamp => "timestamp",
            ColumnType::TimestampTz => "timestamptz",
        }
    }

    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            ColumnType::Date | ColumnType::Timestamp | ColumnType::TimestampTz
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = ImportError;

    fn from_str(value: &str) -> ImportResult<Self> {
        let normalized = value
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_lowercase();
        match normalized.as_str() {
            "string" | "text" | "varchar" => Ok(ColumnType::String),
            "integer" | "int" | "int4" => Ok(ColumnType::Integer),
            "bigint" | "int8" => Ok(ColumnType::BigInt),
            "numeric" | "decimal" | "float" | "double precision" => Ok(ColumnType::Numeric),
            "date" => Ok(ColumnType::Date),
            "timestamp" | "timestamp without time zone" => Ok(ColumnType::Timestamp),
            "timestamptz" | "timestamp with time zone" => Ok(ColumnType::TimestampTz),
            _ => Err(ImportError::Catalog(format!(
                "unknown column type '{value}'"
            ))),
        }
    }
}

impl Serialize for ColumnType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ColumnType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        ColumnType::from_str(&raw).map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default)]
    pub required: bool,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, column_type: ColumnType, required: bool) -> Self {
        Self {
            name: name.into(),
            column_type,
            required,
        }
    }

    /// `id`, `project_id` and `created_at` are never taken from the file.
    pub fn is_system_managed(&self) -> bool {
        matches!(
            self.name.as_str(),
            ID_COLUMN | PROJECT_ID_COLUMN | CREATED_AT_COLUMN
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaTable {
    pub name: String,
    pub columns: Vec<ColumnSpec>,
}

impl SchemaTable {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnSpec>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Columns whose values come from the uploaded file, in display order.
    pub fn importable_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter().filter(|c| !c.is_system_managed())
    }

    pub fn required_import_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.importable_columns().filter(|c| c.required)
    }

    fn ensure_unique_columns(&self) -> ImportResult<()> {
        if self.name.trim().is_empty() {
            return Err(ImportError::Catalog("table name cannot be empty".into()));
        }
        let mut seen = HashSet::new();
        for column in &self.columns {
            if column.name.trim().is_empty() {
                return Err(ImportError::Catalog(format!(
                    "table '{}' has a column with an empty name",
                    self.name
                )));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(ImportError::Catalog(format!(
                    "duplicate column '{}' in table '{}'",
                    column.name, self.name
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    tables: Vec<SchemaTable>,
}

#[derive(Deserialize)]
struct CatalogDocument {
    tables: Vec<SchemaTable>,
}

impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let document = CatalogDocument::deserialize(deserializer)?;
        Catalog::from_tables(document.tables).map_err(de::Error::custom)
    }
}

impl Catalog {
    pub fn from_tables(tables: Vec<SchemaTable>) -> ImportResult<Self> {
        let mut names = HashSet::new();
        for table in &tables {
            table.ensure_unique_columns()?;
            if !names.insert(table.name.as_str()) {
                return Err(ImportError::Catalog(format!(
                    "duplicate table '{}'",
                    table.name
                )));
            }
        }
        Ok(Self { tables })
    }

    /// Destination tables of the production dashboard.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_CATALOG).context("Loading built-in catalog")
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Parsing catalog YAML")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening catalog file {path:?}"))?;
        let reader = BufReader::new(file);
        serde_yaml::from_reader(reader)
            .with_context(|| format!("Parsing catalog YAML from {path:?}"))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file =
            File::create(path).with_context(|| format!("Creating catalog file {path:?}"))?;
        serde_yaml::to_writer(file, self).context("Writing catalog YAML")
    }

    pub fn tables(&self) -> &[SchemaTable] {
        &self.tables
    }

    pub fn get(&self, name: &str) -> Option<&SchemaTable> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn require(&self, name: &str) -> ImportResult<&SchemaTable> {
        self.get(name).ok_or_else(|| ImportError::UnknownTable {
            name: name.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
