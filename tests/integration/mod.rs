// Integration test utilities and common code
// WHY: Centralized utilities avoid duplication across integration tests

#![allow(dead_code)]

pub mod fixtures;

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const MIMETYPE: &[u8] = b"application/epub+zip";

pub const CONTAINER_XML: &str = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

/// Test fixture helper for creating temporary directories with books
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub root_path: PathBuf,
}

impl TestFixture {
    /// Create a new test fixture with temporary directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root_path = temp_dir.path().to_path_buf();

        Self { temp_dir, root_path }
    }

    fn prepare<P: AsRef<Path>>(&self, relative_path: P) -> PathBuf {
        let file_path = self.root_path.join(relative_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        file_path
    }

    /// Create a plain-text book with given content
    pub fn create_text_file<P: AsRef<Path>>(&self, relative_path: P, content: &str) -> PathBuf {
        let file_path = self.prepare(relative_path);
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    /// Create a minimal EPUB: stored mimetype first, container, a binary image, then the chapters
    pub fn create_epub<P: AsRef<Path>>(&self, relative_path: P, chapters: &[(&str, &str)]) -> PathBuf {
        let file_path = self.prepare(relative_path);
        let file = File::create(&file_path).expect("Failed to create epub");
        let mut zip = ZipWriter::new(file);
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file("mimetype", stored).unwrap();
        zip.write_all(MIMETYPE).unwrap();
        zip.start_file("META-INF/container.xml", deflated).unwrap();
        zip.write_all(CONTAINER_XML.as_bytes()).unwrap();
        zip.start_file("OEBPS/images/cover.jpg", stored).unwrap();
        zip.write_all(&cover_bytes()).unwrap();
        for (name, body) in chapters {
            zip.start_file(format!("OEBPS/{name}"), deflated).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().expect("Failed to finish epub");
        file_path
    }
}

/// Fake JPEG payload with bytes that are not valid UTF-8
pub fn cover_bytes() -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
    bytes.extend((0u8..=255).cycle().take(512));
    bytes
}

/// Entry names of an archive, in stored order
pub fn epub_entry_names(path: &Path) -> Vec<String> {
    let archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let names = archive.file_names().map(str::to_string).collect();
    names
}

/// Read one member of an archive
pub fn read_epub_member(path: &Path, name: &str) -> Vec<u8> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut out = Vec::new();
    entry.read_to_end(&mut out).unwrap();
    out
}

pub fn read_epub_chapter(path: &Path, name: &str) -> String {
    String::from_utf8(read_epub_member(path, &format!("OEBPS/{name}"))).unwrap()
}

/// Compare two strings line by line, providing detailed diff on mismatch
pub fn assert_golden_file(actual: &str, expected: &str, context: &str) {
    let actual_lines: Vec<&str> = actual.lines().collect();
    let expected_lines: Vec<&str> = expected.lines().collect();

    for (i, (actual_line, expected_line)) in actual_lines.iter().zip(expected_lines.iter()).enumerate() {
        if actual_line != expected_line {
            panic!(
                "{}: Line {} mismatch\nExpected: {}\nActual:   {}",
                context,
                i + 1,
                expected_line,
                actual_line
            );
        }
    }

    if actual_lines.len() != expected_lines.len() {
        panic!(
            "{}: Line count mismatch. Expected {} lines, got {} lines",
            context,
            expected_lines.len(),
            actual_lines.len()
        );
    }
    assert_eq!(actual, expected, "{context}: line endings differ");
}
