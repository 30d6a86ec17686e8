// WHY: Regroups an over-long paragraph's sentences into paragraphs that reach the threshold
// Sentences are never cut, so a single long sentence still stands alone

use tracing::debug;

use crate::markup::{Document, Node};
use crate::sentence_detector::SentenceSegmenter;
use crate::tokenizer::Tokenizer;

/// Text placed between paragraphs produced from one original
pub const PARAGRAPH_SEPARATOR: &str = "\n";

/// Outcome of one splitting pass over a document
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SplitOutcome {
    /// Paragraphs over the threshold that were replaced
    pub paragraphs_split: usize,
    /// Paragraphs written in their place
    pub paragraphs_produced: usize,
}

/// Greedy sentence packer bounded by a word threshold
#[derive(Debug, Clone, Copy)]
pub struct ParagraphSplitter<'a> {
    tokenizer: &'a Tokenizer,
    segmenter: SentenceSegmenter<'a>,
    max_words: usize,
}

impl<'a> ParagraphSplitter<'a> {
    pub fn new(tokenizer: &'a Tokenizer, segmenter: SentenceSegmenter<'a>, max_words: usize) -> Self {
        Self {
            tokenizer,
            segmenter,
            max_words,
        }
    }

    pub fn max_words(&self) -> usize {
        self.max_words
    }

    pub fn exceeds_threshold(&self, fragment: &str) -> bool {
        self.tokenizer.count_words(fragment) > self.max_words
    }

    /// Pack the fragment's sentences into groups of at least `max_words` words
    ///
    /// A group is closed as soon as its cumulative word count reaches the
    /// threshold; whatever remains at the end becomes the last group regardless
    /// of size. Original spacing inside a group is kept; groups are trimmed.
    pub fn pack_sentences(&self, fragment: &str) -> Vec<String> {
        let mut groups = Vec::new();
        let mut buffer = String::new();
        let mut words = 0;

        for span in self.segmenter.sentence_spans(fragment) {
            let sentence = &fragment[span];
            buffer.push_str(sentence);
            words += self.tokenizer.count_words(sentence);

            if words >= self.max_words {
                flush(&mut groups, &mut buffer);
                words = 0;
            }
        }
        flush(&mut groups, &mut buffer);

        groups
    }

    /// Replace every over-threshold paragraph with its sentence groups, in place
    pub fn split_document(&self, document: &mut Document) -> SplitOutcome {
        let nodes = document.take_nodes();
        let mut rewritten = Vec::with_capacity(nodes.len());
        let mut outcome = SplitOutcome::default();

        for node in nodes {
            let paragraph = match node {
                Node::Paragraph(paragraph) if self.exceeds_threshold(paragraph.inner_html()) => paragraph,
                other => {
                    rewritten.push(other);
                    continue;
                }
            };

            let groups = self.pack_sentences(paragraph.inner_html());
            if groups.len() < 2 {
                // One sentence group would only reshuffle whitespace
                rewritten.push(Node::Paragraph(paragraph));
                continue;
            }

            debug!(
                "Splitting paragraph of {} words into {} paragraphs",
                self.tokenizer.count_words(paragraph.inner_html()),
                groups.len()
            );
            outcome.paragraphs_split += 1;
            outcome.paragraphs_produced += groups.len();

            for (index, group) in groups.iter().enumerate() {
                if index > 0 {
                    rewritten.push(Node::Text(PARAGRAPH_SEPARATOR.to_string()));
                }
                rewritten.push(Node::Paragraph(paragraph.with_inner_html(group)));
            }
        }

        document.set_nodes(rewritten);
        outcome
    }
}

fn flush(groups: &mut Vec<String>, buffer: &mut String) {
    let trimmed = buffer.trim();
    if !trimmed.is_empty() {
        groups.push(trimmed.to_string());
    }
    buffer.clear();
}
