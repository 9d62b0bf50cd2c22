//! pixlab - pixel transformations from the command line
//!
//! Thin front end over `pixlab-engine`: decodes files, builds requests,
//! writes results.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pixlab_engine::{Engine, EngineConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod io;

#[derive(Parser)]
#[command(name = "pixlab")]
#[command(author, version, about = "Stateless pixel transformation engine")]
#[command(long_about = "
Applies tone, geometric, compositing and channel operations to images.
Operation names accept legacy aliases (invert, log_contrast, channel_red, ...).

Examples:
  pixlab info photo.png
  pixlab apply photo.png -o out.png --op brightness -p factor=0.2
  pixlab apply photo.png -o out.png --op rotate -p angle=30 -p interpolation=bilinear
  pixlab apply a.png -o out.png --op merge --other b.png -p alpha=0.25
  pixlab pipeline photo.png -o out.png --ops steps.json
  pixlab histogram photo.png --json
  pixlab ops
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,

    /// Engine limits (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Display image information
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Apply a single operation
    #[command(visible_alias = "a")]
    Apply(ApplyArgs),

    /// Apply a list of operations read from JSON
    #[command(visible_alias = "p")]
    Pipeline(PipelineArgs),

    /// Per-channel 256-bin histogram
    #[command(visible_alias = "hist")]
    Histogram(HistogramArgs),

    /// List operation names and aliases
    Ops,
}

#[derive(Args)]
struct InfoArgs {
    /// Input image(s)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Second image and mask shared by `apply` and `pipeline`.
#[derive(Args)]
struct AuxArgs {
    /// Second image (merge)
    #[arg(long)]
    other: Option<PathBuf>,

    /// Single-channel per-pixel weight (merge with weight=mask)
    #[arg(long)]
    mask: Option<PathBuf>,
}

#[derive(Args)]
struct ApplyArgs {
    /// Input image
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// Operation name
    #[arg(long = "op")]
    operation: String,

    /// Parameter as key=value; values are read as JSON, else as a string
    #[arg(short, long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,

    #[command(flatten)]
    aux: AuxArgs,

    /// Print result metadata as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct PipelineArgs {
    /// Input image
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// JSON file: `{"operations": [...]}` or a bare array
    #[arg(long)]
    ops: PathBuf,

    #[command(flatten)]
    aux: AuxArgs,

    /// Print per-step metadata as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct HistogramArgs {
    /// Input image
    input: PathBuf,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_engine(path: Option<&PathBuf>) -> Result<Engine> {
    let config = match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => EngineConfig::default(),
    };
    Ok(Engine::new(config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let engine = load_engine(cli.config.as_ref())?;

    match cli.command {
        Commands::Info(args) => commands::info::run(args, cli.verbose),
        Commands::Apply(args) => commands::apply::run(&engine, args, cli.verbose),
        Commands::Pipeline(args) => commands::pipeline::run(&engine, args, cli.verbose),
        Commands::Histogram(args) => commands::histogram::run(&engine, args),
        Commands::Ops => {
            for name in pixlab_engine::catalogue::known_names() {
                println!("{name}");
            }
            Ok(())
        }
    }
}
