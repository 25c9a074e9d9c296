#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
//! `gbili` - build a GBILI graph from a feature matrix and a labeled set
//!
//! Usage:
//!   `gbili -f data.txt -l labels.txt`
//!   `gbili -f data.txt -l labels.txt -o graph.edgelist -1 5 -2 3 -t 8`
//!   `gbili -f data.csv -l labels.txt --format jsonl --index brute-force`

mod loader;
#[cfg(test)]
mod loader_tests;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use gbili_core::{write_edges, GbiliBuilder, GbiliConfig, IndexKind, OutputFormat};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "gbili")]
#[command(
    author,
    version,
    about = "GBILI - graph construction guided by labeled instances"
)]
struct Cli {
    /// Feature matrix file (one object per line)
    #[arg(short = 'f', long = "features")]
    features: PathBuf,

    /// Labeled object ids file (one id per line)
    #[arg(short = 'l', long = "labels")]
    labels: PathBuf,

    /// Output edge list [default: output/<features-stem>-gbili.edgelist]
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Nearest neighbors per object
    #[arg(short = '1', long)]
    k1: Option<usize>,

    /// Maximum edges per object
    #[arg(short = '2', long)]
    k2: Option<usize>,

    /// Worker threads (partitions)
    #[arg(short = 't', long = "threads")]
    threads: Option<usize>,

    /// Nearest-neighbor index
    #[arg(long, value_enum)]
    index: Option<IndexArg>,

    /// Edge list format
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Configuration file [default: gbili.toml]
    #[arg(short = 'c', long, env = "GBILI_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// CLI index option
#[derive(Debug, Clone, Copy, ValueEnum)]
enum IndexArg {
    KdTree,
    BruteForce,
}

impl From<IndexArg> for IndexKind {
    fn from(i: IndexArg) -> Self {
        match i {
            IndexArg::KdTree => IndexKind::KdTree,
            IndexArg::BruteForce => IndexKind::BruteForce,
        }
    }
}

/// CLI format option
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Jsonl,
}

impl From<FormatArg> for OutputFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Jsonl => OutputFormat::Jsonl,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    init_tracing(&cli, &config);

    let points = loader::read_features(&cli.features)?;
    let labeled = loader::read_labels(&cli.labels)?;
    tracing::info!(
        objects = points.len(),
        dimension = points.dimension(),
        labeled = labeled.len(),
        "input loaded"
    );

    let graph = GbiliBuilder::from_config(&config)
        .build(&points, &labeled)
        .context("Graph construction failed")?;

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.features));
    write_atomically(&output, config.output.format, &graph.edges)?;

    let stats = &graph.stats;
    println!(
        "{} edges from {} objects ({} labeled, {} partitions) written to {} in {:.2?}",
        stats.edges,
        stats.objects,
        stats.labeled,
        stats.partitions,
        output.display(),
        stats.index_build + stats.proximity + stats.selection
    );
    Ok(())
}

/// Layers CLI flags over file and environment configuration.
fn load_config(cli: &Cli) -> Result<GbiliConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            anyhow::ensure!(
                path.is_file(),
                "Configuration file not found: {}",
                path.display()
            );
            GbiliConfig::load_from_path(path)
        }
        None => GbiliConfig::load(),
    }
    .context("Failed to load configuration")?;

    if let Some(k1) = cli.k1 {
        config.graph.k1 = k1;
    }
    if let Some(k2) = cli.k2 {
        config.graph.k2 = k2;
    }
    if let Some(threads) = cli.threads {
        config.execution.workers = threads;
    }
    if let Some(index) = cli.index {
        config.index.kind = index.into();
    }
    if let Some(format) = cli.format {
        config.output.format = format.into();
    }
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn init_tracing(cli: &Cli, config: &GbiliConfig) {
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// `output/<stem>-gbili.edgelist` for a features file `<dir>/<stem>.<ext>`.
fn default_output_path(features: &Path) -> PathBuf {
    let stem = features
        .file_stem()
        .map_or_else(|| "graph".into(), |s| s.to_string_lossy());
    PathBuf::from("output").join(format!("{stem}-gbili.edgelist"))
}

/// Writes into a temporary file next to `path`, then renames it into place.
fn write_atomically(
    path: &Path,
    format: OutputFormat,
    edges: &[gbili_core::Edge],
) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    write_edges(format, &mut tmp, edges)
        .with_context(|| format!("Failed to write edge list {}", path.display()))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to persist edge list {}", path.display()))?;

    tracing::debug!(path = %path.display(), edges = edges.len(), "edge list written");
    Ok(())
}
