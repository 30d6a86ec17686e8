// WHY: Centralized abbreviation handling for sentence boundary detection
// Decides whether a terminal mark belongs to an abbreviation or initial rather than ending a sentence

use std::collections::HashSet;
use std::sync::OnceLock;

/// Abbreviations after which punctuation never ends a sentence
pub const UNCONDITIONAL_ABBREVIATIONS: &[&str] = &[
    // Russian
    "т.к.", "т.е.", "т.н.", "г.", "ул.", "д.", "рис.", "табл.", "стр.", "п.", "ч.", "см.",
    // English
    "e.g.", "i.e.", "mr.", "mrs.", "ms.", "dr.", "prof.", "fig.", "vs.", "sr.", "jr.",
];

/// Abbreviations that may still close a sentence when the next word is capitalized
pub const CONDITIONAL_ABBREVIATIONS: &[&str] = &[
    // Russian
    "т.п.", "т.д.", "др.", "пр.", "руб.",
    // English
    "etc.", "inc.", "ltd.",
];

/// Marks that can terminate a sentence
pub fn is_terminal_punctuation(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '…')
}

fn is_space(c: char) -> bool {
    c.is_whitespace() || c == '\u{00A0}'
}

/// Two immutable lowercase lookup sets
#[derive(Debug, Clone)]
pub struct AbbreviationTable {
    unconditional: HashSet<String>,
    conditional: HashSet<String>,
}

impl AbbreviationTable {
    /// Build a table; entries are lowercased on the way in
    pub fn new<'a>(
        unconditional: impl IntoIterator<Item = &'a str>,
        conditional: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            unconditional: unconditional.into_iter().map(str::to_lowercase).collect(),
            conditional: conditional.into_iter().map(str::to_lowercase).collect(),
        }
    }

    /// Process-wide table built from the default lists on first use
    pub fn shared() -> &'static AbbreviationTable {
        static SHARED: OnceLock<AbbreviationTable> = OnceLock::new();
        SHARED.get_or_init(AbbreviationTable::default)
    }

    pub fn is_unconditional(&self, candidate: &str) -> bool {
        self.unconditional.contains(candidate)
    }

    pub fn is_conditional(&self, candidate: &str) -> bool {
        self.conditional.contains(candidate)
    }

    /// Check whether the terminal mark at character index `i` is sentence-internal
    ///
    /// Returns true for initials ("A. S. Pushkin", "A.S. Pushkin"), unconditional
    /// abbreviations, and conditional abbreviations followed by a lowercase word.
    pub fn is_sentence_internal(&self, text: &str, i: usize) -> bool {
        let chars: Vec<char> = text.chars().collect();
        self.is_sentence_internal_at(&chars, i)
    }

    /// Same as [`is_sentence_internal`](Self::is_sentence_internal) over pre-split characters
    /// WHY: the segmenter calls this per mark and must not re-collect the fragment each time
    pub fn is_sentence_internal_at(&self, chars: &[char], i: usize) -> bool {
        if chars.is_empty() || i >= chars.len() {
            return false;
        }

        // Nearest preceding non-space character
        let mut j = i;
        while j > 0 && is_space(chars[j - 1]) {
            j -= 1;
        }
        if j == 0 {
            return false;
        }
        let nearest = chars[j - 1];

        // Initial: lone capital preceded by space, dot, or start boundary character
        if nearest.is_uppercase() && j >= 2 && matches!(chars[j - 2], ' ' | '.' | '\u{00A0}') {
            return true;
        }

        // Letters and dots immediately before the mark
        let mut start = i;
        while start > 0 && (chars[start - 1].is_alphabetic() || chars[start - 1] == '.') {
            start -= 1;
        }
        if start == i {
            return false;
        }

        let candidate: String = chars[start..=i].iter().collect::<String>().to_lowercase();
        let candidate = candidate.trim();

        if self.is_unconditional(candidate) {
            return true;
        }
        if self.is_conditional(candidate) {
            // Next letter or digit decides: capitalized means a new sentence began
            return match chars[i + 1..].iter().find(|c| c.is_alphanumeric()) {
                None => false,
                Some(c) => !c.is_uppercase(),
            };
        }

        false
    }
}

impl Default for AbbreviationTable {
    fn default() -> Self {
        Self::new(
            UNCONDITIONAL_ABBREVIATIONS.iter().copied(),
            CONDITIONAL_ABBREVIATIONS.iter().copied(),
        )
    }
}

/// Classify using the shared default table
pub fn is_sentence_internal(text: &str, i: usize) -> bool {
    AbbreviationTable::shared().is_sentence_internal(text, i)
}
