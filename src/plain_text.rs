// WHY: Plain-text books have no markup, so every non-blank line is one paragraph

use std::fs;
use std::io;
use std::path::Path;
use tracing::info;

use crate::error::{Result, SplitError};
use crate::paragraphs::{DocumentProcessor, ProcessStats};

/// Split every over-threshold line of `content` into one line per sentence group
///
/// Lines keep their own ending (`\n` or `\r\n`) and leading indentation; the
/// last line gets no ending added if it had none.
pub fn split_text(content: &str, processor: &DocumentProcessor) -> (String, ProcessStats) {
    let splitter = processor.splitter();
    let mut stats = ProcessStats::default();
    let mut out = String::with_capacity(content.len() + content.len() / 8);

    for line in content.split_inclusive('\n') {
        let (body, ending) = split_line_ending(line);
        if body.trim().is_empty() {
            out.push_str(line);
            continue;
        }
        stats.paragraphs_seen += 1;

        let groups = if splitter.exceeds_threshold(body) {
            splitter.pack_sentences(body)
        } else {
            Vec::new()
        };
        if groups.len() < 2 {
            out.push_str(line);
            continue;
        }

        stats.paragraphs_split += 1;
        stats.paragraphs_produced += groups.len();
        let indent = &body[..body.len() - body.trim_start().len()];
        let separator = if ending.is_empty() { "\n" } else { ending };
        for (index, group) in groups.iter().enumerate() {
            if index > 0 {
                out.push_str(separator);
            }
            out.push_str(indent);
            out.push_str(group);
        }
        out.push_str(ending);
    }

    (out, stats)
}

fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

/// Rewrite the UTF-8 text file at `path` in place
pub fn process_text_file(path: &Path, processor: &DocumentProcessor, dry_run: bool) -> Result<ProcessStats> {
    let bytes = fs::read(path).map_err(|e| SplitError::io(path, e))?;
    let content = String::from_utf8(bytes)
        .map_err(|e| SplitError::io(path, io::Error::new(io::ErrorKind::InvalidData, e)))?;

    let (rewritten, stats) = split_text(&content, processor);
    if stats.changed() && !dry_run {
        fs::write(path, rewritten).map_err(|e| SplitError::io(path, e))?;
        info!("{}: split {} lines", path.display(), stats.paragraphs_split);
    }
    Ok(stats)
}
