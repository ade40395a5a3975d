//! tabingest - Read CSV/XLS/XLSX import files as rows

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tabingest::config::{Config, OutputFormat};
use tabingest::output::render_to_stdout;
use tabingest::{read_path, read_with_format, ErrorKind, FormatTag, ImportError};

/// Read a CSV, XLS or XLSX import file and print its data rows
#[derive(Parser, Debug)]
#[command(name = "tabingest")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// File to read
    file: PathBuf,

    /// Read the file as this format (csv, xls, xlsx) instead of using its extension
    #[arg(long)]
    format: Option<FormatTag>,

    /// Output format (json, terminal)
    #[arg(short, long, default_value = "json")]
    output: OutputFormat,

    /// Print JSON on a single line
    #[arg(long)]
    compact: bool,

    /// Print at most this many rows
    #[arg(short = 'n', long)]
    limit: Option<usize>,

    /// Log parsing details to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            match e.downcast_ref::<ImportError>().map(ImportError::kind) {
                Some(ErrorKind::EmptyResult) => ExitCode::from(1),
                _ => ExitCode::from(2),
            }
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::new(cli.file)
        .with_output_format(cli.output)
        .with_pretty(!cli.compact);
    if let Some(format) = cli.format {
        config = config.with_format(format);
    }
    if let Some(limit) = cli.limit {
        config = config.with_limit(limit);
    }

    let (format, rows) = match config.format {
        Some(format) => {
            let file = File::open(&config.input)
                .with_context(|| format!("Failed to open file: {}", config.input.display()))?;
            let rows = read_with_format(format, BufReader::new(file))
                .with_context(|| format!("Failed to read file: {}", config.input.display()))?;
            (format, rows)
        }
        None => {
            let rows = read_path(&config.input)
                .with_context(|| format!("Failed to read file: {}", config.input.display()))?;
            // read_path only succeeds for recognized extensions
            let format = FormatTag::from_file_name(&config.file_name())
                .context("File has no recognized extension")?;
            (format, rows)
        }
    };

    tracing::info!(rows = rows.len(), %format, "Read import file");

    let shown = match config.limit {
        Some(limit) => &rows.rows()[..limit.min(rows.len())],
        None => rows.rows(),
    };

    render_to_stdout(
        shown,
        &config.input,
        format,
        config.output_format,
        config.pretty,
    )
}
