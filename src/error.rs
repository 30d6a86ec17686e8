// WHY: Typed failures for the library surface; the binary wraps these in anyhow context

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while reformatting a book
///
/// Tokenization and sentence segmentation never fail, so nothing here
/// describes malformed markup: an unterminated tag simply becomes a
/// trailing segment that is never split.
#[derive(Error, Debug)]
pub enum SplitError {
    /// Rejected before any file is opened
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Input is neither a plain-text file nor an EPUB archive
    #[error("Unsupported file type '{extension}': {}", path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Archive error in {}: {source}", path.display())]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Invalid input pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Failed to compile tokenizer pattern: {0}")]
    Regex(#[from] regex_automata::meta::BuildError),
}

impl SplitError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SplitError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn zip(path: impl Into<PathBuf>, source: zip::result::ZipError) -> Self {
        SplitError::Zip {
            path: path.into(),
            source,
        }
    }

    /// True for content that is not valid UTF-8
    pub fn is_invalid_data(&self) -> bool {
        matches!(self, SplitError::Io { source, .. } if source.kind() == std::io::ErrorKind::InvalidData)
    }
}

pub type Result<T> = std::result::Result<T, SplitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_path() {
        let err = SplitError::UnsupportedFormat {
            path: PathBuf::from("book.pdf"),
            extension: "pdf".to_string(),
        };
        assert_eq!(err.to_string(), "Unsupported file type 'pdf': book.pdf");

        let err = SplitError::io(
            "missing.epub",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("missing.epub"));
        assert!(err.to_string().contains("gone"));
    }
}
