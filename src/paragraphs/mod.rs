// WHY: Single entry point that applies merging and splitting to one markup document
// Holds the compiled tokenizer so it is built once per run, not once per file

use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod merger;
pub mod splitter;

pub use merger::merge_adjacent;
pub use splitter::{ParagraphSplitter, SplitOutcome};

use crate::config::SplitConfig;
use crate::error::Result;
use crate::markup::Document;
use crate::sentence_detector::{AbbreviationTable, SentenceSegmenter};
use crate::tokenizer::Tokenizer;

/// Counters for one processed document
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessStats {
    pub paragraphs_seen: usize,
    pub paragraphs_merged: usize,
    pub paragraphs_split: usize,
    pub paragraphs_produced: usize,
}

impl ProcessStats {
    pub fn changed(&self) -> bool {
        self.paragraphs_merged > 0 || self.paragraphs_split > 0
    }

    pub fn add(&mut self, other: &ProcessStats) {
        self.paragraphs_seen += other.paragraphs_seen;
        self.paragraphs_merged += other.paragraphs_merged;
        self.paragraphs_split += other.paragraphs_split;
        self.paragraphs_produced += other.paragraphs_produced;
    }
}

/// Merger followed by splitter, configured once and reused for every file
#[derive(Debug, Clone)]
pub struct DocumentProcessor {
    tokenizer: Tokenizer,
    abbreviations: &'static AbbreviationTable,
    config: SplitConfig,
}

impl DocumentProcessor {
    /// Validate the configuration and compile the tokenizer
    pub fn new(config: SplitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            tokenizer: Tokenizer::new()?,
            abbreviations: AbbreviationTable::shared(),
            config,
        })
    }

    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn splitter(&self) -> ParagraphSplitter<'_> {
        ParagraphSplitter::new(
            &self.tokenizer,
            SentenceSegmenter::new(self.abbreviations),
            self.config.max_words_per_paragraph,
        )
    }

    /// Merge (if configured) then split every paragraph of `document`, in place
    pub fn process_document(&self, document: &mut Document) -> ProcessStats {
        let mut stats = ProcessStats {
            paragraphs_seen: document.paragraph_count(),
            ..Default::default()
        };

        if self.config.merge_before_splitting {
            stats.paragraphs_merged = merge_adjacent(document);
        }

        let outcome = self.splitter().split_document(document);
        stats.paragraphs_split = outcome.paragraphs_split;
        stats.paragraphs_produced = outcome.paragraphs_produced;

        debug!(?stats, "Processed document");
        stats
    }

    /// Rewrite one markup fragment string
    pub fn process_markup(&self, markup: &str) -> (String, ProcessStats) {
        let mut document = Document::parse(markup);
        let stats = self.process_document(&mut document);
        if !stats.changed() {
            return (markup.to_string(), stats);
        }
        (document.to_string(), stats)
    }

    pub fn process(&self, markup: &str) -> String {
        self.process_markup(markup).0
    }
}
