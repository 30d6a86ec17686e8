pub mod archive;
pub mod config;
pub mod discovery;
pub mod error;
pub mod markup;
pub mod paragraphs;
pub mod parallel_processing;
pub mod plain_text;
pub mod sentence_detector;
pub mod tokenizer;

// Re-export main types for convenient access
pub use config::{ConfigOverrides, SplitConfig, DEFAULT_MAX_WORDS};
pub use error::{Result, SplitError};
pub use markup::{Document, Node, ParagraphElement};
pub use paragraphs::{merge_adjacent, DocumentProcessor, ParagraphSplitter, ProcessStats};
pub use sentence_detector::{is_sentence_internal, split_sentences, AbbreviationTable, SentenceSegmenter};
pub use tokenizer::{Token, Tokenizer};

// Re-export archive and batch processing for the binary and benchmarks
pub use archive::{process_epub, ArchiveReport, MarkupMember};
pub use discovery::{collect_discovered_files, DiscoveryConfig, FileValidation, InputKind};
pub use parallel_processing::{
    process_book, process_files_parallel, write_run_stats, FileStats, FileStatus, RunOptions, RunStats,
};
pub use plain_text::{process_text_file, split_text};
