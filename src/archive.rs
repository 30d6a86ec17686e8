// WHY: EPUB rewrite that touches only the markup members it changed
// Every other entry is copied raw, so images and fonts are never recompressed
// and `mimetype` keeps its first, stored position

use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{Result, SplitError};
use crate::paragraphs::{DocumentProcessor, ProcessStats};

/// Member extensions treated as (X)HTML
pub const MARKUP_EXTENSIONS: &[&str] = &["html", "htm", "xhtml", "xht"];

/// Suffix appended to the archive path for the pre-rewrite copy
pub const BACKUP_SUFFIX: &str = ".bak";

/// Upper bound on buffer space reserved from a member's declared size
const MAX_MEMBER_PREALLOCATION: u64 = 4 * 1024 * 1024;

/// Initial buffer capacity for a member; the declared size comes from the zip header and is not trusted
fn member_capacity(declared_size: u64) -> usize {
    declared_size.min(MAX_MEMBER_PREALLOCATION) as usize
}

/// One markup document inside a container, as seen by the processor
pub trait MarkupMember {
    fn name(&self) -> &str;
    fn read(&self) -> Result<String>;
    fn write(&mut self, content: String) -> Result<()>;
}

/// Run the processor over one member, writing back only when something changed
pub fn process_member<M: MarkupMember + ?Sized>(
    member: &mut M,
    processor: &DocumentProcessor,
) -> Result<ProcessStats> {
    let content = member.read()?;
    let (rewritten, stats) = processor.process_markup(&content);
    if stats.changed() {
        debug!(member = member.name(), ?stats, "Member rewritten");
        member.write(rewritten)?;
    }
    Ok(stats)
}

pub fn is_markup_member(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| MARKUP_EXTENSIONS.iter().any(|m| ext.eq_ignore_ascii_case(m)))
}

pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Markup entry held in memory between reading and repacking
#[derive(Debug)]
pub struct EpubMember {
    name: String,
    raw: Vec<u8>,
    compression: CompressionMethod,
    rewritten: Option<String>,
}

impl EpubMember {
    pub fn new(name: impl Into<String>, raw: Vec<u8>, compression: CompressionMethod) -> Self {
        Self {
            name: name.into(),
            raw,
            compression,
            rewritten: None,
        }
    }

    pub fn rewritten(&self) -> Option<&str> {
        self.rewritten.as_deref()
    }
}

impl MarkupMember for EpubMember {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> Result<String> {
        std::str::from_utf8(&self.raw)
            .map(str::to_owned)
            .map_err(|e| SplitError::io(&self.name, io::Error::new(io::ErrorKind::InvalidData, e)))
    }

    fn write(&mut self, content: String) -> Result<()> {
        self.rewritten = Some(content);
        Ok(())
    }
}

/// Per-archive outcome
#[derive(Debug, Default, Clone, Serialize)]
pub struct ArchiveReport {
    pub members_total: usize,
    pub markup_members: usize,
    pub members_rewritten: usize,
    pub members_skipped: usize,
    pub stats: ProcessStats,
    pub written: bool,
    pub backup: Option<PathBuf>,
}

/// Split paragraphs in every markup member of the EPUB at `path`, rewriting it in place
///
/// Nothing is written when no member changed or when `dry_run` is set.
pub fn process_epub(path: &Path, processor: &DocumentProcessor, dry_run: bool) -> Result<ArchiveReport> {
    let file = File::open(path).map_err(|e| SplitError::io(path, e))?;
    let mut archive = ZipArchive::new(BufReader::new(file)).map_err(|e| SplitError::zip(path, e))?;
    let mut report = ArchiveReport {
        members_total: archive.len(),
        ..Default::default()
    };

    // Index -> rewritten member
    let mut rewrites: Vec<Option<EpubMember>> = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|e| SplitError::zip(path, e))?;
        if entry.is_dir() || !is_markup_member(entry.name()) {
            rewrites.push(None);
            continue;
        }

        let mut raw = Vec::with_capacity(member_capacity(entry.size()));
        entry.read_to_end(&mut raw).map_err(|e| SplitError::io(path, e))?;
        let mut member = EpubMember::new(entry.name(), raw, entry.compression());
        drop(entry);
        report.markup_members += 1;

        match process_member(&mut member, processor) {
            Ok(stats) => report.stats.add(&stats),
            Err(e) if e.is_invalid_data() => {
                warn!(member = member.name(), "Skipping member that is not valid UTF-8");
                report.members_skipped += 1;
            }
            Err(e) => return Err(e),
        }

        if member.rewritten().is_some() {
            report.members_rewritten += 1;
            rewrites.push(Some(member));
        } else {
            rewrites.push(None);
        }
    }

    if report.members_rewritten == 0 || dry_run {
        info!(
            "{}: {} of {} markup members would change, archive left as is",
            path.display(),
            report.members_rewritten,
            report.markup_members
        );
        return Ok(report);
    }

    if processor.config().backup {
        let backup = backup_path(path);
        fs::copy(path, &backup).map_err(|e| SplitError::io(&backup, e))?;
        info!("Backup written to {}", backup.display());
        report.backup = Some(backup);
    }

    let temp_path = temp_sibling(path);
    if let Err(e) = repack(path, &temp_path, &mut archive, &rewrites) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }
    drop(archive);

    fs::rename(&temp_path, path).map_err(|e| SplitError::io(path, e))?;
    report.written = true;
    info!(
        "{}: rewrote {} members ({} paragraphs split)",
        path.display(),
        report.members_rewritten,
        report.stats.paragraphs_split
    );
    Ok(report)
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.parasplit-tmp"))
}

fn repack<R: Read + io::Seek>(
    path: &Path,
    temp_path: &Path,
    archive: &mut ZipArchive<R>,
    rewrites: &[Option<EpubMember>],
) -> Result<()> {
    let out = File::create(temp_path).map_err(|e| SplitError::io(temp_path, e))?;
    let mut writer = ZipWriter::new(BufWriter::new(out));

    for (index, rewrite) in rewrites.iter().enumerate() {
        match rewrite.as_ref().and_then(|m| m.rewritten().map(|content| (m, content))) {
            Some((member, content)) => {
                let options = SimpleFileOptions::default().compression_method(member.compression);
                writer
                    .start_file(member.name(), options)
                    .map_err(|e| SplitError::zip(temp_path, e))?;
                writer
                    .write_all(content.as_bytes())
                    .map_err(|e| SplitError::io(temp_path, e))?;
            }
            None => {
                let entry = archive.by_index_raw(index).map_err(|e| SplitError::zip(path, e))?;
                writer.raw_copy_file(entry).map_err(|e| SplitError::zip(temp_path, e))?;
            }
        }
    }

    let mut out = writer.finish().map_err(|e| SplitError::zip(temp_path, e))?;
    out.flush().map_err(|e| SplitError::io(temp_path, e))?;
    Ok(())
}
