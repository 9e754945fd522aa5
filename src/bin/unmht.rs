use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use unmht::{
    AnalyticsOptions, ColorSpec, DebugSink, DirectorySink, GridOptions, NoopSink,
    RecordedDetections, ScanOptions, ScanOutcome, analyze, parse_clock, prime,
    write_entries_csv,
};

#[derive(Debug, Parser)]
#[command(
    name = "unmht",
    version,
    about = "Rebuild attendance entries from a scanned time-table"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Clean and crop a time-table image for OCR.
    Prime(PrimeArgs),
    /// Map recorded OCR output onto a time-table and report anomalies.
    Analyze(AnalyzeArgs),
}

#[derive(Debug, Args)]
struct GridArgs {
    /// Background colour (#rrggbb, #rrggbbaa, white, black).
    #[arg(long, default_value = "white")]
    background: String,

    /// Line colour (#rrggbb, #rrggbbaa, white, black).
    #[arg(long, default_value = "black")]
    foreground: String,

    /// Per-channel colour distance still treated as a match.
    #[arg(long, default_value_t = 32)]
    tolerance: u8,

    /// Arm length of the divider marker, centre included.
    #[arg(long, default_value_t = 5)]
    marker_arm: u32,

    /// Rows taller than this end row detection.
    #[arg(long, default_value_t = 50)]
    max_row_height: u32,
}

#[derive(Debug, Args)]
struct PrimeArgs {
    /// Input PNG path.
    #[arg(short, long)]
    input: PathBuf,

    /// Output path for the cleaned PNG.
    #[arg(short, long)]
    output: PathBuf,

    #[command(flatten)]
    grid: GridArgs,
}

#[derive(Debug, Args)]
struct AnalyzeArgs {
    /// Input PNG path.
    #[arg(short, long)]
    input: PathBuf,

    /// Recorded OCR response (DetectText JSON or a detection list).
    #[arg(long)]
    ocr: PathBuf,

    /// Identifier used in errors and debug artifact names.
    #[arg(long, default_value = "local")]
    id: String,

    /// Directory receiving debug artifacts when entries cannot be parsed.
    #[arg(long)]
    debug_dir: Option<PathBuf>,

    /// Write reconstructed entries as CSV.
    #[arg(long)]
    entries: Option<PathBuf>,

    /// Arrival time assumed when no row records one (HH:MM).
    #[arg(long, default_value = "09:00")]
    default_in: String,

    /// Leaving time assumed when no row records one (HH:MM).
    #[arg(long, default_value = "17:00")]
    default_out: String,

    /// Enable verbose warning output.
    #[arg(short, long)]
    verbose: bool,

    #[command(flatten)]
    grid: GridArgs,
}

fn parse_grid_options(args: &GridArgs) -> Result<GridOptions> {
    let background = ColorSpec::from_str(&args.background)
        .map_err(|error| anyhow!(error))
        .context("failed to parse --background")?;
    let foreground = ColorSpec::from_str(&args.foreground)
        .map_err(|error| anyhow!(error))
        .context("failed to parse --foreground")?;

    Ok(GridOptions {
        background,
        foreground,
        tolerance: args.tolerance,
        marker_arm: args.marker_arm,
        max_row_height: args.max_row_height,
        ..GridOptions::default()
    })
}

fn parse_scan_options(args: &AnalyzeArgs) -> Result<ScanOptions> {
    let default_in = parse_clock(&args.default_in)
        .map_err(|error| anyhow!(error))
        .context("failed to parse --default-in")?;
    let default_out = parse_clock(&args.default_out)
        .map_err(|error| anyhow!(error))
        .context("failed to parse --default-out")?;

    Ok(ScanOptions {
        grid: parse_grid_options(&args.grid)?,
        analytics: AnalyticsOptions {
            default_in,
            default_out,
            ..AnalyticsOptions::default()
        },
    })
}

fn run_prime(args: &PrimeArgs) -> Result<()> {
    let options = parse_grid_options(&args.grid)?;
    let image = image::open(&args.input)
        .with_context(|| format!("failed to decode '{}'", args.input.display()))?
        .to_rgba8();
    let primed = prime(&image, &options)
        .with_context(|| format!("failed to prime image '{}'", args.input.display()))?;

    std::fs::write(&args.output, &primed.png)
        .with_context(|| format!("failed to write '{}'", args.output.display()))?;
    println!("{}", serde_json::to_string_pretty(&primed.skeleton)?);
    Ok(())
}

fn run_analyze(args: &AnalyzeArgs) -> Result<ScanOutcome> {
    let options = parse_scan_options(args)?;
    let png = std::fs::read(&args.input)
        .with_context(|| format!("failed to read '{}'", args.input.display()))?;
    let detector = RecordedDetections::from_path(&args.ocr)
        .with_context(|| format!("failed to load OCR output '{}'", args.ocr.display()))?;

    let sink: Box<dyn DebugSink> = match &args.debug_dir {
        Some(dir) => Box::new(DirectorySink::new(dir)),
        None => Box::new(NoopSink),
    };

    let outcome = analyze(&args.id, &png, &detector, sink.as_ref(), &options)
        .with_context(|| format!("failed to analyze '{}'", args.input.display()))?;

    if let Some(path) = &args.entries {
        write_entries_csv(path, &outcome.entries)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
    }
    println!("{}", serde_json::to_string_pretty(&outcome.report)?);
    Ok(outcome)
}

fn log_outcome(outcome: &ScanOutcome, verbose: bool) {
    if outcome.warnings.is_empty() {
        return;
    }

    eprintln!("warning: {} issue(s) detected", outcome.warnings.len());
    if verbose {
        for warning in &outcome.warnings {
            eprintln!(
                "  - {:?} row={:?} count={:?}: {}",
                warning.code, warning.row, warning.count, warning.message
            );
        }
    }
}

fn main() -> ExitCode {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("unmht=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Prime(args) => match run_prime(&args) {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(1)
            }
        },
        Commands::Analyze(args) => match run_analyze(&args) {
            Ok(outcome) => {
                log_outcome(&outcome, args.verbose);
                if outcome.has_dated_rows() {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::from(2)
                }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(1)
            }
        },
    }
}
