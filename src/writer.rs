//! Bulk-write seam. The importer hands the full batch to a [`BulkWriter`]
//! exactly once per import; retries and partial commits are the writer's
//! concern.

use std::{io::Write, path::PathBuf};

use serde::Serialize;

use crate::{
    error::{ImportError, ImportResult},
    io_utils,
    validate::InsertRow,
};

pub trait BulkWriter {
    fn insert(&mut self, table: &str, rows: &[InsertRow]) -> ImportResult<()>;
}

#[derive(Serialize)]
struct InsertPayload<'a> {
    table: &'a str,
    rows: &'a [InsertRow],
}

/// Writes the batch as one JSON document, `{ "table": .., "rows": [..] }`.
/// `-` or no path writes to stdout.
#[derive(Debug, Clone)]
pub struct JsonFileWriter {
    path: Option<PathBuf>,
    pretty: bool,
}

impl JsonFileWriter {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            pretty: false,
        }
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    fn write_payload(&self, payload: &InsertPayload<'_>) -> anyhow::Result<()> {
        let mut output = io_utils::open_output(self.path.as_deref())?;
        if self.pretty {
            serde_json::to_writer_pretty(&mut output, payload)?;
        } else {
            serde_json::to_writer(&mut output, payload)?;
        }
        writeln!(output)?;
        output.flush()?;
        Ok(())
    }
}

impl BulkWriter for JsonFileWriter {
    fn insert(&mut self, table: &str, rows: &[InsertRow]) -> ImportResult<()> {
        let payload = InsertPayload { table, rows };
        self.write_payload(&payload)
            .map_err(|err| ImportError::BackendWrite {
                table: table.to_string(),
                message: format!("{err:#}"),
            })
    }
}

/// Keeps every batch in memory; useful when embedding the importer.
#[derive(Debug, Default, Clone)]
pub struct MemoryWriter {
    pub batches: Vec<(String, Vec<InsertRow>)>,
}

impl BulkWriter for MemoryWriter {
    fn insert(&mut self, table: &str, rows: &[InsertRow]) -> ImportResult<()> {
        self.batches.push((table.to_string(), rows.to_vec()));
        Ok(())
    }
}
