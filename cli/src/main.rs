//! imgsan - JPEG import with dedup and metadata stripping
//!
//! Copies the images of a source tree into a library, skipping those
//! already imported and removing private metadata from the copies.

use clap::{Args, Parser, Subcommand, ValueEnum};
use imgsan::{
    Error as ImgsanError, ProgressCallback, Report, SanitizeOptions, TracingSink,
    progress_callback,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Value, json};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// imgsan - Deduplicate and sanitize JPEG imports
///
/// Usage:
///   imgsan sanitize SOURCE DEST
///   imgsan sanitize SOURCE DEST --worker 8 --hash-sample-size 1MiB
#[derive(Parser, Debug)]
#[command(name = "imgsan", version, about, long_about = None)]
struct Cli {
    /// Log per-file details (digests, ignored files)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Copy new images from SOURCE into DEST and strip their metadata
    Sanitize(SanitizeArgs),
    /// Print the version and exit
    Version,
}

#[derive(Args, Debug)]
struct SanitizeArgs {
    /// Directory scanned recursively for .jpg/.jpeg files
    source: PathBuf,

    /// Library directory (created if missing)
    dest: PathBuf,

    /// Number of files processed concurrently
    #[arg(short = 'w', long = "worker", default_value = "4", value_parser = parse_worker_count)]
    workers: usize,

    /// Hash only the first SIZE bytes of each file (e.g. 512KiB, 1MB, 2000)
    ///
    /// Files sharing that prefix are treated as duplicates.
    #[arg(long = "hash-sample-size", value_name = "SIZE", value_parser = parse_size)]
    hash_sample_size: Option<u64>,

    /// Do not preserve file timestamps
    #[arg(long)]
    no_times: bool,

    /// Do not preserve file permissions
    #[arg(long)]
    no_perms: bool,

    /// Do not call fsync after each file (faster but less safe)
    #[arg(long)]
    no_sync: bool,

    /// Descend into symlinked directories of the source tree
    #[arg(short = 'L', long)]
    follow_symlinks: bool,

    /// Disable progress bar
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    output: OutputMode,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
enum CliError {
    #[error("Source does not exist: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("Source is not a directory: {path}")]
    SourceNotDirectory { path: PathBuf },

    #[error("Failed to read source metadata: {path}: {source}")]
    SourceMetadata { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Run(ImgsanError),

    #[error("Interrupted: {not_started} image(s) were not processed")]
    Cancelled { not_started: u64 },

    #[error("Failed to serialize JSON output: {source}")]
    JsonSerialize { source: serde_json::Error },
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            Self::SourceNotFound { .. } | Self::SourceNotDirectory { .. } => 2,
            Self::Cancelled { .. } => 130,
            Self::SourceMetadata { .. } | Self::Run(_) | Self::JsonSerialize { .. } => 1,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let result = match cli.command {
        Command::Sanitize(args) => sanitize(args),
        Command::Version => {
            println!("imgsan {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    };

    if let Err(error) = result {
        match &error {
            CliError::Cancelled { .. } => tracing::warn!("{error}"),
            _ => eprintln!("error: {error}"),
        }
        std::process::exit(error.exit_code());
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the `--debug` switch.
fn init_logging(debug: bool) {
    let default_filter = if debug { "imgsan=debug" } else { "imgsan=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn sanitize(args: SanitizeArgs) -> CliResult<()> {
    match args.source.metadata() {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(CliError::SourceNotDirectory { path: args.source }),
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            return Err(CliError::SourceNotFound { path: args.source });
        }
        Err(source) => {
            return Err(CliError::SourceMetadata {
                path: args.source,
                source,
            });
        }
    }

    let mut options = build_options(&args);

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel_clone = cancel.clone();
        ctrlc::set_handler(move || {
            if cancel_clone.load(Ordering::Relaxed) {
                eprintln!("\nForce quit.");
                std::process::exit(130);
            }
            cancel_clone.store(true, Ordering::Relaxed);
            eprintln!(
                "\nCancelling... finishing in-flight images. Press Ctrl+C again to abort immediately."
            );
        })
        .ok();
    }
    options = options.with_cancel_token(cancel);

    let pb = if args.output == OutputMode::Human && !args.quiet {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner().template("{spinner:.green} {msg}");
        if let Ok(style) = style {
            pb.set_style(style);
            pb.enable_steady_tick(Duration::from_millis(100));
        }
        pb.set_message(format!("Scanning {}...", args.source.display()));
        options = options.with_progress(spinner_callback(pb.clone()));
        Some(pb)
    } else {
        None
    };

    let result = imgsan::run(&args.source, &args.dest, &options);

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    match result {
        Ok(report) => {
            emit_report(args.output, &report, None)?;
            if report.has_failures() {
                tracing::warn!("{} image(s) failed, see the errors above", report.failed);
            }
            Ok(())
        }
        Err(ImgsanError::Cancelled {
            report,
            not_started,
        }) => {
            // The partial counts are still shown before the run is reported as interrupted
            emit_report(args.output, &report, Some(not_started))?;
            Err(CliError::Cancelled { not_started })
        }
        Err(error) => Err(CliError::Run(error)),
    }
}

/// Drive the spinner from the pipeline's `(done, total)` updates.
fn spinner_callback(pb: ProgressBar) -> ProgressCallback {
    let position = progress_callback(pb.clone());
    Arc::new(move |done, total| {
        position(done, total);
        pb.set_message(format!("Sanitizing images {done}/{total}"));
    })
}

fn build_options(args: &SanitizeArgs) -> SanitizeOptions {
    let mut options = SanitizeOptions::default()
        .with_workers(args.workers)
        .with_log_sink(Arc::new(TracingSink));

    if let Some(limit) = args.hash_sample_size {
        options = options.with_sample_limit(limit);
    }
    if args.no_times {
        options = options.without_timestamps();
    }
    if args.no_perms {
        options = options.without_permissions();
    }
    if args.no_sync {
        options = options.without_fsync();
    }
    if args.follow_symlinks {
        options = options.with_follow_symlinks();
    }

    options
}

fn emit_report(mode: OutputMode, report: &Report, not_started: Option<u64>) -> CliResult<()> {
    match mode {
        OutputMode::Human => {
            print!("{}", render_table(report));
            if let Some(n) = not_started {
                println!("Not started: {n}");
            }
            println!("Completed in {:.2?}", report.duration);
            Ok(())
        }
        OutputMode::Json => print_json_value(&report_json(report, not_started)),
    }
}

fn render_table(report: &Report) -> String {
    let rows = [
        ("Copied files", report.copied),
        ("Ignored files", report.ignored),
        ("Failed files", report.failed),
    ];
    let label_width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
    let count_width = rows
        .iter()
        .map(|(_, n)| n.to_string().len())
        .max()
        .unwrap_or(1)
        .max("Count".len());

    let rule = format!("+-{}-+-{}-+\n", "-".repeat(label_width), "-".repeat(count_width));
    let mut out = String::new();
    out.push_str(&rule);
    out.push_str(&format!(
        "| {:<label_width$} | {:>count_width$} |\n",
        "Result", "Count"
    ));
    out.push_str(&rule);
    for (label, count) in rows {
        out.push_str(&format!(
            "| {label:<label_width$} | {count:>count_width$} |\n"
        ));
    }
    out.push_str(&rule);
    out
}

fn report_json(report: &Report, not_started: Option<u64>) -> Value {
    let mut value = json!({
        "schema_version": "1.0",
        "copied": report.copied,
        "ignored": report.ignored,
        "failed": report.failed,
        "duration_ms": u64::try_from(report.duration.as_millis()).unwrap_or(u64::MAX),
    });
    if let (Some(n), Some(obj)) = (not_started, value.as_object_mut()) {
        obj.insert("cancelled".to_owned(), Value::Bool(true));
        obj.insert("not_started".to_owned(), Value::Number(n.into()));
    }
    value
}

fn print_json_value(value: &Value) -> CliResult<()> {
    let serialized =
        serde_json::to_string(value).map_err(|source| CliError::JsonSerialize { source })?;
    println!("{serialized}");
    Ok(())
}

fn parse_worker_count(s: &str) -> Result<usize, String> {
    let n: usize = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid worker count: '{s}'"))?;
    if n == 0 {
        return Err("Worker count must be at least 1".to_owned());
    }
    Ok(n)
}

/// Parse a human-readable size string into bytes.
///
/// Decimal units (`K`, `KB`, `MB`, ...) are powers of 1000, binary units
/// (`KiB`, `MiB`, ...) powers of 1024.
///
/// Examples:
/// - "2000" -> Ok(2000)
/// - "1KB" -> Ok(1000)
/// - "1 KiB" -> Ok(1024)
/// - "1.5MB" -> Ok(1500000)
fn parse_size(size_str: &str) -> Result<u64, String> {
    let lowered = size_str.trim().to_lowercase();
    if lowered.is_empty() {
        return Err("Empty size".to_owned());
    }

    let (num_part, unit_part) = split_number_unit(&lowered);
    let num_part = num_part.trim();
    let unit_part = unit_part.trim();

    let num: f64 = num_part
        .parse()
        .map_err(|_| format!("Invalid number: '{num_part}'"))?;
    if !num.is_finite() || num < 0.0 {
        return Err(format!("Invalid size: '{size_str}'"));
    }

    let multiplier: u64 = match unit_part {
        "" | "b" | "byte" | "bytes" => 1,
        "kib" => 1 << 10,
        "mib" => 1 << 20,
        "gib" => 1 << 30,
        "tib" => 1 << 40,
        "pib" => 1 << 50,
        "eib" => 1 << 60,
        unit => match unit.chars().next() {
            Some('k') => 1_000,
            Some('m') => 1_000_000,
            Some('g') => 1_000_000_000,
            Some('t') => 1_000_000_000_000,
            Some('p') => 1_000_000_000_000_000,
            Some('e') => 1_000_000_000_000_000_000,
            _ => return Err(format!("Unknown unit: '{unit}'")),
        },
    };

    let bytes = num * multiplier as f64;
    if bytes > u64::MAX as f64 {
        return Err(format!("Size too large: '{size_str}'"));
    }
    Ok(bytes as u64)
}

/// Split a size string into number and unit parts
fn split_number_unit(s: &str) -> (&str, &str) {
    let idx = s
        .char_indices()
        .find(|(_, c)| c.is_alphabetic())
        .map(|(i, _)| i)
        .unwrap_or(s.len());

    (&s[..idx], &s[idx..])
}
