use glob::glob;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{Result, SplitError};

/// Configuration for file discovery behavior
#[derive(Debug, Clone, Default)]
pub struct DiscoveryConfig {
    /// Whether to fail fast on first error or continue processing
    pub fail_fast: bool,
}

/// Book formats the processor understands, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Epub,
    PlainText,
}

impl InputKind {
    pub fn from_extension(extension: &str) -> Option<Self> {
        if extension.eq_ignore_ascii_case("epub") {
            Some(InputKind::Epub)
        } else if extension.eq_ignore_ascii_case("txt") {
            Some(InputKind::PlainText)
        } else {
            None
        }
    }

    /// Classify a top-level input, failing with `UnsupportedFormat` for anything else
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_extension(&extension).ok_or_else(|| SplitError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension,
        })
    }
}

/// Result of file discovery validation
#[derive(Debug, Clone)]
pub struct FileValidation {
    pub path: PathBuf,
    pub kind: InputKind,
    pub error: Option<String>,
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(InputKind::from_extension)
        .is_some()
}

/// Recursively collect `.epub`/`.txt` files under `root`, sorted for stable ordering
/// WHY: walkdir is blocking, so callers run this on the blocking pool
fn walk_directory(root: &Path, fail_fast: bool) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && is_supported(entry.path()) {
                    debug!("Found matching file: {}", entry.path().display());
                    found.push(entry.into_path());
                }
            }
            Err(e) => {
                let path = e.path().unwrap_or(root).to_path_buf();
                if fail_fast {
                    return Err(SplitError::io(path, io::Error::other(e)));
                }
                warn!("Directory traversal error (continuing): {}", e);
            }
        }
    }
    Ok(found)
}

fn expand_glob(pattern: &str, fail_fast: bool) -> Result<Vec<PathBuf>> {
    let paths = glob(pattern).map_err(|source| SplitError::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut found = Vec::new();
    for glob_result in paths {
        match glob_result {
            Ok(path) if path.is_file() && is_supported(&path) => found.push(path),
            Ok(path) => debug!("Pattern match skipped: {}", path.display()),
            Err(e) => {
                if fail_fast {
                    let path = e.path().to_path_buf();
                    return Err(SplitError::io(path, e.into_error()));
                }
                warn!("Glob iteration error (continuing): {}", e);
            }
        }
    }
    if found.is_empty() {
        warn!("Pattern matched no books: {}", pattern);
    }
    Ok(found)
}

async fn expand_input(input: &str, config: &DiscoveryConfig) -> Result<Vec<FileValidation>> {
    let path = PathBuf::from(input);

    match fs::metadata(&path).await {
        Ok(metadata) if metadata.is_dir() => {
            let fail_fast = config.fail_fast;
            let root = path.clone();
            let files = tokio::task::spawn_blocking(move || walk_directory(&root, fail_fast))
                .await
                .map_err(|e| SplitError::io(&path, io::Error::other(e)))??;
            info!("Found {} books under {}", files.len(), path.display());
            files.into_iter().map(validated).collect()
        }
        Ok(_) => Ok(vec![validated(path)?]),
        Err(_) if is_glob_pattern(input) => {
            let pattern = input.to_string();
            let fail_fast = config.fail_fast;
            let files = tokio::task::spawn_blocking(move || expand_glob(&pattern, fail_fast))
                .await
                .map_err(|e| SplitError::io(&path, io::Error::other(e)))??;
            files.into_iter().map(validated).collect()
        }
        Err(e) => {
            let kind = InputKind::from_path(&path)?;
            let error = format!("Cannot access file {}: {}", path.display(), e);
            warn!("{}", error);
            if config.fail_fast {
                return Err(SplitError::io(path, e));
            }
            Ok(vec![FileValidation {
                path,
                kind,
                error: Some(error),
            }])
        }
    }
}

fn validated(path: PathBuf) -> Result<FileValidation> {
    let kind = InputKind::from_path(&path)?;
    Ok(FileValidation {
        path,
        kind,
        error: None,
    })
}

/// Resolve files, directories and glob patterns into the list of books to process
///
/// Explicitly named files with an unknown extension fail with `UnsupportedFormat`;
/// directories and patterns only pick up `.epub` and `.txt` files. Each file
/// appears once, in first-seen order, however many spellings name it.
pub async fn collect_discovered_files(
    inputs: &[String],
    config: &DiscoveryConfig,
) -> Result<Vec<FileValidation>> {
    let mut files = Vec::new();
    let mut seen = HashSet::new();

    for input in inputs {
        for validation in expand_input(input, config).await? {
            // Missing files cannot be canonicalized and are keyed by their raw path
            let key = fs::canonicalize(&validation.path)
                .await
                .unwrap_or_else(|_| validation.path.clone());
            if seen.insert(key) {
                files.push(validation);
            } else {
                debug!("Skipping duplicate input: {}", validation.path.display());
            }
        }
    }

    let valid_count = files.iter().filter(|f| f.error.is_none()).count();
    let invalid_count = files.len() - valid_count;
    if invalid_count > 0 {
        warn!("Found {} files with validation issues", invalid_count);
    }
    info!("File discovery summary: {} valid, {} invalid", valid_count, invalid_count);

    Ok(files)
}
