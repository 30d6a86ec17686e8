use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use parasplit::{
    collect_discovered_files, process_files_parallel, write_run_stats, ConfigOverrides, DiscoveryConfig,
    DocumentProcessor, RunOptions, SplitConfig,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

#[derive(Parser, Debug)]
#[command(name = "parasplit")]
#[command(about = "Split long paragraphs of EPUB and plain-text books by sentences")]
#[command(version)]
struct Args {
    /// Books to process: .epub/.txt files, directories, or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Split paragraphs longer than this many words
    #[arg(short = 'w', long, value_parser = clap::value_parser!(u64).range(1..))]
    max_words: Option<u64>,

    /// Merge adjacent paragraphs with the same class and style before splitting
    #[arg(short, long)]
    merge: bool,

    /// Keep a copy of each EPUB as <file>.bak before rewriting it
    #[arg(short, long)]
    backup: bool,

    /// JSON configuration file; command-line flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Abort on first error
    #[arg(long)]
    fail_fast: bool,

    /// Process everything but write nothing back
    #[arg(long)]
    dry_run: bool,

    /// Suppress console progress bars
    #[arg(long)]
    no_progress: bool,

    /// Stats output file path
    #[arg(long)]
    stats_out: Option<PathBuf>,

    /// Maximum number of books processed at once (defaults to CPU count)
    #[arg(long)]
    jobs: Option<usize>,

    #[arg(long, value_enum, default_value_t = LogFormat::Json)]
    log_format: LogFormat,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            max_words_per_paragraph: self.max_words.map(|w| w as usize),
            merge_before_splitting: self.merge.then_some(true),
            backup: self.backup.then_some(true),
        }
    }
}

fn init_logging(format: LogFormat, verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr);

    // WHY: structured JSON logging by default so batch runs can be post-processed
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_format, args.verbose);

    info!("Starting parasplit");
    info!(?args, "Parsed CLI arguments");

    // WHY: configuration errors must surface before any book is opened
    let config = SplitConfig::resolve(args.config.as_deref(), &args.overrides())
        .context("Invalid configuration")?;
    let processor = Arc::new(DocumentProcessor::new(config).context("Failed to build paragraph processor")?);

    let discovery_config = DiscoveryConfig {
        fail_fast: args.fail_fast,
    };
    let discovered_files = collect_discovered_files(&args.inputs, &discovery_config)
        .await
        .context("File discovery failed")?;

    if discovered_files.is_empty() {
        warn!("No books found in the given inputs");
    }

    let options = RunOptions {
        max_concurrency: args.jobs.unwrap_or_else(num_cpus::get),
        fail_fast: args.fail_fast,
        dry_run: args.dry_run,
        show_progress: !args.no_progress,
    };
    let run = process_files_parallel(discovered_files, processor, &options)
        .await
        .context("Aborted on first failure")?;

    if let Some(stats_out) = &args.stats_out {
        write_run_stats(stats_out, &run)
            .await
            .with_context(|| format!("Failed to write stats to {}", stats_out.display()))?;
    }

    println!(
        "parasplit v{}: {} books, {} rewritten, {} failed, {} paragraphs split into {}",
        env!("CARGO_PKG_VERSION"),
        run.files_total,
        run.files_rewritten,
        run.files_failed,
        run.totals.paragraphs_split,
        run.totals.paragraphs_produced
    );

    if run.has_failures() {
        anyhow::bail!("{} of {} books failed", run.files_failed, run.files_total);
    }
    Ok(())
}
