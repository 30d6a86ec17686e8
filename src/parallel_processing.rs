// WHY: Files are independent, so the run fans out across books while each book
// is processed start to finish on one blocking task

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::archive::process_epub;
use crate::discovery::{FileValidation, InputKind};
use crate::error::{Result, SplitError};
use crate::paragraphs::{DocumentProcessor, ProcessStats};
use crate::plain_text::process_text_file;

/// Processing status of one file
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// Changes were written back
    Rewritten,
    /// Nothing exceeded the threshold
    Unchanged,
    /// Changes were computed but not written
    DryRun,
    Failed,
}

/// Per-file processing statistics
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FileStats {
    pub path: String,
    pub kind: InputKind,
    pub status: FileStatus,
    #[serde(flatten)]
    pub paragraphs: ProcessStats,
    /// Markup members rewritten, for archives
    pub members_rewritten: Option<usize>,
    pub backup: Option<String>,
    pub processing_time_ms: u64,
    /// Error message if processing failed
    pub error: Option<String>,
}

/// Totals for a whole run, written by `--stats-out`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RunStats {
    pub files_total: usize,
    pub files_rewritten: usize,
    pub files_failed: usize,
    pub totals: ProcessStats,
    pub elapsed_ms: u64,
    pub files: Vec<FileStats>,
}

impl RunStats {
    pub fn has_failures(&self) -> bool {
        self.files_failed > 0
    }
}

/// Options controlling how a batch is driven
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub max_concurrency: usize,
    pub fail_fast: bool,
    pub dry_run: bool,
    pub show_progress: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_concurrency: num_cpus::get(),
            fail_fast: false,
            dry_run: false,
            show_progress: false,
        }
    }
}

/// Result of processing one book, before timing and status are attached
#[derive(Debug, Clone, Default)]
pub struct BookOutcome {
    pub stats: ProcessStats,
    pub written: bool,
    pub members_rewritten: Option<usize>,
    pub backup: Option<PathBuf>,
}

/// Process a single book synchronously, dispatching on its format
pub fn process_book(
    path: &Path,
    kind: InputKind,
    processor: &DocumentProcessor,
    dry_run: bool,
) -> Result<BookOutcome> {
    match kind {
        InputKind::Epub => {
            let report = process_epub(path, processor, dry_run)?;
            Ok(BookOutcome {
                stats: report.stats,
                written: report.written,
                members_rewritten: Some(report.members_rewritten),
                backup: report.backup,
            })
        }
        InputKind::PlainText => {
            let stats = process_text_file(path, processor, dry_run)?;
            Ok(BookOutcome {
                stats,
                written: stats.changed() && !dry_run,
                members_rewritten: None,
                backup: None,
            })
        }
    }
}

/// Progress bar that is a no-op when disabled
struct ProgressReporter {
    progress_bar: Option<ProgressBar>,
}

impl ProgressReporter {
    fn new(total_files: u64, enabled: bool) -> Self {
        if !enabled {
            return Self { progress_bar: None };
        }
        let pb = ProgressBar::new(total_files);
        let style = ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} books {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-");
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(100));
        Self { progress_bar: Some(pb) }
    }

    fn file_completed(&self, path: &str) {
        if let Some(pb) = &self.progress_bar {
            pb.set_message(path.to_string());
            pb.inc(1);
        }
    }

    fn finish(&self) {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message("done");
        }
    }
}

async fn process_one(
    file: FileValidation,
    processor: Arc<DocumentProcessor>,
    dry_run: bool,
) -> (FileStats, Option<SplitError>) {
    let start = Instant::now();
    let shown = file.path.display().to_string();
    let mut stats = FileStats {
        path: shown.clone(),
        kind: file.kind,
        status: FileStatus::Failed,
        paragraphs: ProcessStats::default(),
        members_rewritten: None,
        backup: None,
        processing_time_ms: 0,
        error: None,
    };

    let result = match file.error {
        Some(message) => Err(SplitError::io(&file.path, io::Error::new(io::ErrorKind::NotFound, message))),
        None => {
            let path = file.path.clone();
            let kind = file.kind;
            tokio::task::spawn_blocking(move || process_book(&path, kind, &processor, dry_run))
                .await
                .unwrap_or_else(|e| Err(SplitError::io(&file.path, io::Error::other(e))))
        }
    };
    stats.processing_time_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(outcome) => {
            stats.paragraphs = outcome.stats;
            stats.members_rewritten = outcome.members_rewritten;
            stats.backup = outcome.backup.map(|p| p.display().to_string());
            stats.status = if outcome.written {
                FileStatus::Rewritten
            } else if outcome.stats.changed() && dry_run {
                FileStatus::DryRun
            } else {
                FileStatus::Unchanged
            };
            info!(
                path = %shown,
                status = ?stats.status,
                split = outcome.stats.paragraphs_split,
                merged = outcome.stats.paragraphs_merged,
                "Processed book"
            );
            (stats, None)
        }
        Err(e) => {
            error!(path = %shown, "Failed to process book: {}", e);
            stats.error = Some(e.to_string());
            (stats, Some(e))
        }
    }
}

/// Process discovered books with bounded concurrency
///
/// With `fail_fast` the first failure is returned as an error once the books
/// already in flight have finished, and no further books are started; otherwise
/// failures are recorded in the returned stats. Per-file stats are reported in
/// input order.
pub async fn process_files_parallel(
    files: Vec<FileValidation>,
    processor: Arc<DocumentProcessor>,
    options: &RunOptions,
) -> Result<RunStats> {
    let run_start = Instant::now();
    let total = files.len();
    let concurrency = options.max_concurrency.max(1);
    info!("Processing {} books with concurrency {}", total, concurrency);

    let progress = ProgressReporter::new(total as u64, options.show_progress);
    let dry_run = options.dry_run;
    let aborted = AtomicBool::new(false);
    let mut results = stream::iter(files.into_iter().enumerate())
        .map(|(index, file)| {
            // Books pulled after an abort are skipped; books already started run to completion
            let skip = aborted.load(Ordering::SeqCst);
            let processor = Arc::clone(&processor);
            async move {
                if skip {
                    (index, None)
                } else {
                    (index, Some(process_one(file, processor, dry_run).await))
                }
            }
        })
        .buffer_unordered(concurrency);

    let mut collected: Vec<(usize, FileStats)> = Vec::with_capacity(total);
    let mut first_failure: Option<SplitError> = None;
    while let Some((index, outcome)) = results.next().await {
        let Some((file_stats, failure)) = outcome else {
            continue;
        };
        progress.file_completed(&file_stats.path);
        if let Some(e) = failure {
            if options.fail_fast && first_failure.is_none() {
                warn!("Aborting run after failure in {}, waiting for books in flight", file_stats.path);
                aborted.store(true, Ordering::SeqCst);
                first_failure = Some(e);
            }
        }
        collected.push((index, file_stats));
    }
    progress.finish();

    if let Some(e) = first_failure {
        return Err(e);
    }

    collected.sort_by_key(|(index, _)| *index);
    let mut run = RunStats {
        files_total: total,
        ..Default::default()
    };
    for (_, file_stats) in collected {
        match file_stats.status {
            FileStatus::Rewritten => run.files_rewritten += 1,
            FileStatus::Failed => run.files_failed += 1,
            FileStatus::Unchanged | FileStatus::DryRun => {}
        }
        run.totals.add(&file_stats.paragraphs);
        run.files.push(file_stats);
    }
    run.elapsed_ms = run_start.elapsed().as_millis() as u64;

    info!(
        files = run.files_total,
        rewritten = run.files_rewritten,
        failed = run.files_failed,
        paragraphs_split = run.totals.paragraphs_split,
        elapsed_ms = run.elapsed_ms,
        "Run complete"
    );
    Ok(run)
}

/// Write run statistics as pretty JSON
pub async fn write_run_stats(path: &Path, stats: &RunStats) -> Result<()> {
    let json = serde_json::to_string_pretty(stats)
        .map_err(|e| SplitError::io(path, io::Error::other(e)))?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| SplitError::io(path, e))?;
    info!("Run statistics written to {}", path.display());
    Ok(())
}
