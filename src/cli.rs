use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Import spreadsheets into production tables",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the destination tables and their columns
    Catalog(CatalogArgs),
    /// Report which destination table a CSV file's headers match
    Match(MatchArgs),
    /// Validate rows against the destination table without writing anything
    Check(CheckArgs),
    /// Validate rows and write the accepted batch
    Import(ImportArgs),
}

#[derive(Debug, Args)]
pub struct CatalogSource {
    /// Catalog YAML file (defaults to the built-in production catalog)
    #[arg(short = 'c', long = "catalog")]
    pub catalog: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Input CSV file (`-` for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Declared content type of the upload (defaults to the file name)
    #[arg(long = "content-type")]
    pub content_type: Option<String>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct CatalogArgs {
    #[command(flatten)]
    pub source: CatalogSource,
    /// Write the catalog as YAML to this path instead of listing it
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct MatchArgs {
    #[command(flatten)]
    pub source: CatalogSource,
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Destination table, overriding the header match
    #[arg(short = 't', long = "table")]
    pub table: Option<String>,
    /// Project id stamped onto every imported row
    #[arg(short = 'p', long = "project", env = "PRODUCTION_PROJECT_ID")]
    pub project: Option<String>,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub source: CatalogSource,
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub target: TargetArgs,
    /// Number of accepted rows to preview
    #[arg(long, default_value_t = 10)]
    pub preview: usize,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    #[command(flatten)]
    pub source: CatalogSource,
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub target: TargetArgs,
    /// Destination for the JSON insert batch (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Pretty-print the JSON batch
    #[arg(long)]
    pub pretty: bool,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\\t" => Ok(b'\t'),
        "comma" => Ok(b','),
        "semicolon" => Ok(b';'),
        "pipe" => Ok(b'|'),
        other if other.len() == 1 && other.is_ascii() => Ok(other.as_bytes()[0]),
        other => Err(format!(
            "Delimiter '{other}' must be a single ASCII character or one of tab, comma, semicolon, pipe"
        )),
    }
}
