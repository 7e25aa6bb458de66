pub mod catalog;
pub mod cli;
pub mod data;
pub mod error;
pub mod import;
pub mod io_utils;
pub mod matcher;
pub mod parser;
pub mod preview;
pub mod validate;
pub mod writer;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info, warn};

use crate::{
    catalog::Catalog,
    cli::{CatalogSource, Cli, Commands, InputArgs},
    import::Importer,
    parser::ParsedSheet,
    writer::JsonFileWriter,
};

pub use catalog::{ColumnSpec, ColumnType, SchemaTable};
pub use error::{ImportError, ImportResult};
pub use matcher::{MatchResult, match_table};
pub use parser::ParsedRow;
pub use validate::{InsertRow, ValidationReport, validate_rows};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("production_import", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Catalog(args) => handle_catalog(&args),
        Commands::Match(args) => handle_match(&args),
        Commands::Check(args) => handle_check(&args),
        Commands::Import(args) => handle_import(&args),
    }
}

fn load_catalog(source: &CatalogSource) -> Result<Catalog> {
    match &source.catalog {
        Some(path) => {
            Catalog::load(path).with_context(|| format!("Loading catalog from {path:?}"))
        }
        None => Catalog::builtin(),
    }
}

fn importer_for<'a>(catalog: &'a Catalog, input: &InputArgs) -> Result<Importer<'a>> {
    let encoding = io_utils::resolve_encoding(input.input_encoding.as_deref())?;
    let mut importer = Importer::new(catalog).with_encoding(encoding);
    if let Some(delimiter) = input.delimiter {
        importer = importer.with_delimiter(delimiter);
    }
    Ok(importer)
}

fn read_sheet(importer: &Importer<'_>, input: &InputArgs) -> Result<ParsedSheet> {
    info!(
        "Reading '{}' (delimiter '{}')",
        input.input.display(),
        printable_delimiter(input.delimiter.unwrap_or(io_utils::DEFAULT_CSV_DELIMITER))
    );
    let bytes = io_utils::read_input(&input.input)?;
    let content_type = input
        .content_type
        .clone()
        .unwrap_or_else(|| io_utils::content_type_for_path(&input.input));
    let sheet = importer
        .parse(&bytes, &content_type)
        .with_context(|| format!("Parsing {:?}", input.input))?;
    info!(
        "Parsed {} header(s) and {} row(s)",
        sheet.headers.len(),
        sheet.rows.len()
    );
    Ok(sheet)
}

fn handle_catalog(args: &cli::CatalogArgs) -> Result<()> {
    let catalog = load_catalog(&args.source)?;
    match &args.output {
        Some(path) => {
            catalog
                .save(path)
                .with_context(|| format!("Writing catalog to {path:?}"))?;
            info!("Catalog with {} table(s) written to {:?}", catalog.len(), path);
        }
        None => print!("{}", preview::render_catalog(&catalog)),
    }
    Ok(())
}

fn handle_match(args: &cli::MatchArgs) -> Result<()> {
    let catalog = load_catalog(&args.source)?;
    let importer = importer_for(&catalog, &args.input)?;
    let sheet = read_sheet(&importer, &args.input)?;
    let plan = importer.plan(&sheet, None)?;
    println!("{}", preview::describe_match(&plan.matched));
    Ok(())
}

fn handle_check(args: &cli::CheckArgs) -> Result<()> {
    let catalog = load_catalog(&args.source)?;
    let importer = importer_for(&catalog, &args.input)?.with_project(args.target.project.clone());
    let sheet = read_sheet(&importer, &args.input)?;
    let plan = importer.plan(&sheet, args.target.table.as_deref())?;
    println!("{}", preview::describe_match(&plan.matched));
    let report = importer.validate(&sheet, &plan)?;
    println!(
        "{} row(s) accepted, {} row(s) skipped",
        report.accepted_count(),
        report.skipped_count()
    );
    for skipped in &report.skipped {
        println!(
            "  line {}: missing {}",
            skipped.line,
            skipped.missing.join(", ")
        );
    }
    if report.degraded_cells > 0 {
        warn!(
            "{} cell(s) could not be converted and were left empty",
            report.degraded_cells
        );
    }
    if args.preview > 0 {
        print!("{}", preview::render_insert_rows(&report.rows, args.preview));
    }
    Ok(())
}

fn handle_import(args: &cli::ImportArgs) -> Result<()> {
    let catalog = load_catalog(&args.source)?;
    let importer = importer_for(&catalog, &args.input)?.with_project(args.target.project.clone());
    let sheet = read_sheet(&importer, &args.input)?;
    let mut writer = JsonFileWriter::new(args.output.clone()).pretty(args.pretty);
    let outcome = importer
        .execute(&sheet, args.target.table.as_deref(), &mut writer)
        .with_context(|| format!("Importing {:?}", args.input.input))?;
    info!(
        "Import into '{}' finished: {} row(s) accepted, {} row(s) skipped",
        outcome.table, outcome.accepted, outcome.skipped
    );
    if !outcome.written {
        warn!("No rows passed validation; nothing was written");
    }
    Ok(())
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}
