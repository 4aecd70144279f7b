//! Trial Flux CLI - Command-line interface for Trial Flux
//!
//! Commands:
//! - batch: Process every export in a directory
//! - process: Process a single export (file or stdin)
//! - inspect: Show how an export is parsed
//! - compare: Compare the leading rows of two exports

use clap::{ArgAction, Parser, Subcommand};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use trial_flux::adapters::{source_for_path, DelimitedSource, TabularSource};
use trial_flux::compare::{compare_rows, ComparisonReport, DEFAULT_COMPARE_ROWS};
use trial_flux::{process_source, BatchConfig, BatchProcessor, BatchReport, FileStatus, VERSION};

/// Trial Flux - Clean recognition experiment exports and summarize conditions
#[derive(Parser)]
#[command(name = "trial-flux")]
#[command(version = VERSION)]
#[command(about = "Clean recognition experiment exports and summarize conditions", long_about = None)]
struct Cli {
    /// More log output (repeat for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every export in a directory
    Batch {
        /// Directory containing CSV/TSV exports
        #[arg(default_value = ".", env = "TRIAL_FLUX_INPUT_DIR")]
        dir: PathBuf,

        /// Output directory (default: <DIR>/adapted)
        #[arg(short, long, env = "TRIAL_FLUX_OUTPUT_DIR")]
        output_dir: Option<PathBuf>,

        /// Process files in parallel
        #[arg(long, env = "TRIAL_FLUX_PARALLEL")]
        parallel: bool,

        /// Include subdirectories
        #[arg(long, env = "TRIAL_FLUX_RECURSIVE")]
        recursive: bool,

        /// Print the batch report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Process a single export
    Process {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout, default: derived name in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the row count and first parsed row of an export
    Inspect {
        /// Input file path
        input: PathBuf,
    },

    /// Compare the leading rows of two exports
    Compare {
        left: PathBuf,
        right: PathBuf,

        /// Number of rows to compare
        #[arg(long, default_value_t = DEFAULT_COMPARE_ROWS)]
        rows: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), FluxCliError> {
    match cli.command {
        Commands::Batch {
            dir,
            output_dir,
            parallel,
            recursive,
            json,
        } => {
            let mut config = BatchConfig::new(dir)
                .with_parallel(parallel)
                .with_recursive(recursive);
            if let Some(output_dir) = output_dir {
                config = config.with_output_dir(output_dir);
            }
            cmd_batch(config, json)
        }

        Commands::Process { input, output } => cmd_process(&input, output.as_deref()),

        Commands::Inspect { input } => cmd_inspect(&input),

        Commands::Compare {
            left,
            right,
            rows,
            json,
        } => cmd_compare(&left, &right, rows, json),
    }
}

fn cmd_batch(config: BatchConfig, json: bool) -> Result<(), FluxCliError> {
    let report = BatchProcessor::new(config).run()?;

    if json {
        println!("{}", report.to_json()?);
    } else {
        print_batch_report(&report);
    }

    match report.failed() {
        0 => Ok(()),
        failed => Err(FluxCliError::BatchFailed(failed)),
    }
}

fn print_batch_report(report: &BatchReport) {
    println!("Batch Report");
    println!("============");
    println!("Input:   {}", report.input_dir.display());
    println!("Output:  {}", report.output_dir.display());
    println!("Written: {}", report.written());
    println!("Skipped: {}", report.skipped());
    println!("Failed:  {}", report.failed());

    if report.files.is_empty() {
        println!("\nNo CSV or TSV files found");
        return;
    }

    println!("\nFiles:");
    for file in &report.files {
        match &file.status {
            FileStatus::Written { output, stats } => println!(
                "  [OK]   {} -> {} ({} trials, {} rows removed)",
                file.input.display(),
                output.display(),
                stats.retained_trials,
                stats.removed_rows
            ),
            FileStatus::Skipped { reason } => {
                println!("  [SKIP] {}: {}", file.input.display(), reason)
            }
            FileStatus::Failed { error } => {
                println!("  [ERR]  {}: {}", file.input.display(), error)
            }
        }
    }
}

fn cmd_process(input: &Path, output: Option<&Path>) -> Result<(), FluxCliError> {
    let source = open_source(input)?;
    let processed = process_source(&*source)?;

    match output {
        Some(path) if path.to_string_lossy() == "-" => {
            write_document(&mut io::stdout(), &processed.document)?
        }
        Some(path) => fs::write(path, &processed.document)?,
        None => fs::write(&processed.output_name, &processed.document)?,
    }

    tracing::info!(
        trials = processed.stats.retained_trials,
        summary = processed.summary.is_some(),
        "processed {}",
        processed.input_name
    );
    Ok(())
}

/// Write a document as-is; documents carry no trailing newline
fn write_document<W: Write>(writer: &mut W, document: &str) -> io::Result<()> {
    writer.write_all(document.as_bytes())?;
    writer.flush()
}

fn cmd_inspect(input: &Path) -> Result<(), FluxCliError> {
    let rows = open_source(input)?.read_rows()?;

    println!("Rows: {}", rows.len());
    match rows.first() {
        Some(first) => println!("First row:\n{}", serde_json::to_string_pretty(first)?),
        None => println!("First row: (none)"),
    }
    Ok(())
}

fn cmd_compare(left: &Path, right: &Path, limit: usize, json: bool) -> Result<(), FluxCliError> {
    let left_rows = open_source(left)?.read_rows()?;
    let right_rows = open_source(right)?.read_rows()?;
    let report = compare_rows(&left_rows, &right_rows, limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_comparison(&report, limit);
    }

    if report.is_identical() {
        Ok(())
    } else {
        Err(FluxCliError::Differences(report.differences.len()))
    }
}

fn print_comparison(report: &ComparisonReport, limit: usize) {
    println!(
        "Left:  {} rows (of {})",
        report.compared_left, report.left_rows
    );
    println!(
        "Right: {} rows (of {})",
        report.compared_right, report.right_rows
    );

    if report.row_count_mismatch() {
        println!("\nWarning: row counts differ");
    }

    if report.differences.is_empty() {
        println!("\nThe first {} rows are identical", limit);
        return;
    }

    println!("\n{} differing rows:", report.differences.len());
    for diff in &report.differences {
        println!("\nRow {}:", diff.row);
        if diff.missing {
            println!("  missing in one file");
            continue;
        }
        for field in &diff.fields {
            println!("  {}", field.field);
            println!("    left:  {}", field.left.as_deref().unwrap_or("(missing)"));
            println!("    right: {}", field.right.as_deref().unwrap_or("(missing)"));
        }
    }
}

fn open_source(input: &Path) -> Result<Box<dyn TabularSource + Send + Sync>, FluxCliError> {
    if input.to_string_lossy() != "-" {
        return Ok(source_for_path(input)?);
    }

    if atty::is(atty::Stream::Stdin) {
        tracing::warn!("reading CSV from an interactive terminal, end input with Ctrl-D");
    }
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(Box::new(DelimitedSource::from_text("stdin.csv", buffer)))
}

// Error types

#[derive(Debug)]
enum FluxCliError {
    Io(io::Error),
    Process(trial_flux::ProcessError),
    Json(serde_json::Error),
    BatchFailed(usize),
    Differences(usize),
}

impl From<io::Error> for FluxCliError {
    fn from(e: io::Error) -> Self {
        FluxCliError::Io(e)
    }
}

impl From<trial_flux::ProcessError> for FluxCliError {
    fn from(e: trial_flux::ProcessError) -> Self {
        FluxCliError::Process(e)
    }
}

impl From<serde_json::Error> for FluxCliError {
    fn from(e: serde_json::Error) -> Self {
        FluxCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<FluxCliError> for CliError {
    fn from(e: FluxCliError) -> Self {
        match e {
            FluxCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            FluxCliError::Process(e) => {
                let hint = match &e {
                    trial_flux::ProcessError::EmptySource(_) => "Ensure the export contains data rows",
                    trial_flux::ProcessError::DegenerateDataset(_) => {
                        "Every presentation trial was filtered out"
                    }
                    trial_flux::ProcessError::UnsupportedFormat(_) => {
                        "Use a .csv, .tsv, .xlsx or .xls file"
                    }
                    trial_flux::ProcessError::Setup(_) => "Check the input and output directories",
                    _ => "Check the input file",
                };
                CliError {
                    code: "PROCESS_ERROR".to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            FluxCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            FluxCliError::BatchFailed(count) => CliError {
                code: "BATCH_FAILED".to_string(),
                message: format!("{} files failed to process", count),
                hint: Some("Review the batch report for details".to_string()),
            },
            FluxCliError::Differences(count) => CliError {
                code: "FILES_DIFFER".to_string(),
                message: format!("{} rows differ", count),
                hint: None,
            },
        }
    }
}
