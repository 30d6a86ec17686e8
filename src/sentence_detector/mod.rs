// WHY: Markup-aware sentence segmentation in one left-to-right pass
// Punctuation meaning depends only on bounded lookback/lookahead, so no grammar is needed

use std::ops::Range;

pub mod abbreviations;

pub use abbreviations::{is_sentence_internal, is_terminal_punctuation, AbbreviationTable};

/// Quotes opened further back than this many characters no longer suppress splitting
/// WHY: an author who forgot to close a quote must not swallow the rest of the paragraph
pub const QUOTE_SUPPRESSION_WINDOW: usize = 200;

/// HTML elements that never have a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

fn is_quote(c: char) -> bool {
    matches!(c, '"' | '«' | '“' | '»' | '”')
}

/// How a complete `<...>` tag affects the open-tag count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagEffect {
    Open,
    Close,
    Neutral,
}

fn classify_tag(body: &[char]) -> TagEffect {
    match body.first() {
        Some('/') => return TagEffect::Close,
        Some('!') | Some('?') => return TagEffect::Neutral,
        _ => {}
    }
    if body.last() == Some(&'/') {
        return TagEffect::Neutral;
    }

    let name: String = body
        .iter()
        .take_while(|c| !c.is_whitespace() && **c != '/')
        .collect::<String>()
        .to_ascii_lowercase();
    if VOID_ELEMENTS.contains(&name.as_str()) {
        TagEffect::Neutral
    } else {
        TagEffect::Open
    }
}

/// State threaded through a single scan
#[derive(Debug, Default)]
struct ScanState {
    /// Only emptiness matters, so a depth counter stands in for the tag stack
    open_tags: usize,
    inside_quote: bool,
    quote_opened_at: usize,
    sentence_start: usize,
}

impl ScanState {
    fn apply_tag(&mut self, body: &[char]) {
        match classify_tag(body) {
            TagEffect::Open => self.open_tags += 1,
            TagEffect::Close => self.open_tags = self.open_tags.saturating_sub(1),
            TagEffect::Neutral => {}
        }
    }

    fn toggle_quote(&mut self, i: usize) {
        self.inside_quote = !self.inside_quote;
        if self.inside_quote {
            self.quote_opened_at = i;
        }
    }

    fn quote_suppresses(&self, i: usize) -> bool {
        self.inside_quote && i - self.quote_opened_at <= QUOTE_SUPPRESSION_WINDOW
    }
}

/// Sentence segmenter over paragraph fragments that may contain markup
#[derive(Debug, Clone, Copy)]
pub struct SentenceSegmenter<'a> {
    abbreviations: &'a AbbreviationTable,
}

impl Default for SentenceSegmenter<'static> {
    fn default() -> Self {
        Self::new(AbbreviationTable::shared())
    }
}

impl<'a> SentenceSegmenter<'a> {
    pub fn new(abbreviations: &'a AbbreviationTable) -> Self {
        Self { abbreviations }
    }

    /// Untrimmed byte ranges that tile `fragment` exactly, one per sentence
    ///
    /// The last range may lack terminal punctuation, may be whitespace only,
    /// or may hold an unterminated tag and everything after it.
    pub fn sentence_spans(&self, fragment: &str) -> Vec<Range<usize>> {
        let indexed: Vec<(usize, char)> = fragment.char_indices().collect();
        let chars: Vec<char> = indexed.iter().map(|&(_, c)| c).collect();
        let byte_at = |i: usize| indexed.get(i).map_or(fragment.len(), |&(b, _)| b);

        let mut spans = Vec::new();
        let mut state = ScanState::default();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];

            if c == '<' {
                match chars[i + 1..].iter().position(|&c| c == '>') {
                    Some(offset) => {
                        let end = i + 1 + offset;
                        state.apply_tag(&chars[i + 1..end]);
                        i = end + 1;
                        continue;
                    }
                    // Unterminated tag: the remainder becomes the trailing segment
                    None => break,
                }
            }

            if is_quote(c) {
                state.toggle_quote(i);
            } else if is_terminal_punctuation(c) && self.is_boundary(&chars, i, &state) {
                spans.push(byte_at(state.sentence_start)..byte_at(i + 1));
                state.sentence_start = i + 1;
            }

            i += 1;
        }

        if state.sentence_start < chars.len() {
            spans.push(byte_at(state.sentence_start)..fragment.len());
        }

        spans
    }

    /// Trimmed, non-empty sentences in document order
    pub fn split_sentences<'f>(&self, fragment: &'f str) -> Vec<&'f str> {
        self.sentence_spans(fragment)
            .into_iter()
            .map(|span| fragment[span].trim())
            .filter(|sentence| !sentence.is_empty())
            .collect()
    }

    fn is_boundary(&self, chars: &[char], i: usize, state: &ScanState) -> bool {
        let next = chars.get(i + 1).copied();

        if self.abbreviations.is_sentence_internal_at(chars, i) {
            return false;
        }
        // Decimal number such as 3.14
        if i > 0 && chars[i - 1].is_numeric() && next.is_some_and(char::is_numeric) {
            return false;
        }
        if state.open_tags > 0 {
            return false;
        }
        // Defer to the last mark of a run like "?!" or "..."
        if next.is_some_and(is_terminal_punctuation) {
            return false;
        }
        if state.quote_suppresses(i) {
            return false;
        }
        true
    }
}

/// Split with the shared default abbreviation table
pub fn split_sentences(fragment: &str) -> Vec<&str> {
    SentenceSegmenter::default().split_sentences(fragment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_basic_sentences() {
        assert_eq!(
            split_sentences("Одно. Два. Три. Четыре. Пять."),
            vec!["Одно.", "Два.", "Три.", "Четыре.", "Пять."]
        );
    }

    #[test]
    fn test_trailing_text_without_punctuation() {
        assert_eq!(
            split_sentences("First one. And then some"),
            vec!["First one.", "And then some"]
        );
    }

    #[test]
    fn test_abbreviations_do_not_split() {
        assert_eq!(
            split_sentences("Dr. Watson arrived. Mr. Holmes did not."),
            vec!["Dr. Watson arrived.", "Mr. Holmes did not."]
        );
    }

    #[test]
    fn test_conditional_abbreviation_followed_by_capital_splits() {
        assert_eq!(
            split_sentences("We studied physics etc. Now we study chemistry."),
            vec!["We studied physics etc.", "Now we study chemistry."]
        );
        assert_eq!(
            split_sentences("Apples, pears, etc. were sold. Then rain."),
            vec!["Apples, pears, etc. were sold.", "Then rain."]
        );
        let sentences = split_sentences("Мы изучали физику и т.д. Теперь изучаем химию.");
        assert_eq!(sentences.last(), Some(&"Теперь изучаем химию."));
    }

    #[test]
    fn test_initials_do_not_split() {
        assert_eq!(
            split_sentences("Это написал А. С. Пушкин. Потом был обед."),
            vec!["Это написал А. С. Пушкин.", "Потом был обед."]
        );
    }

    #[test]
    fn test_decimal_numbers_do_not_split() {
        assert_eq!(
            split_sentences("Число 3.14 равно π. Верно."),
            vec!["Число 3.14 равно π.", "Верно."]
        );
    }

    #[test]
    fn test_punctuation_runs_split_once() {
        assert_eq!(
            split_sentences("Что?! Не может быть... Правда!!! Да."),
            vec!["Что?!", "Не может быть...", "Правда!!!", "Да."]
        );
        assert_eq!(split_sentences("Wait… What?"), vec!["Wait…", "What?"]);
    }

    #[test]
    fn test_open_tag_suppresses_split() {
        assert_eq!(
            split_sentences("<i>One. Two.</i> Three. Four."),
            vec!["<i>One. Two.</i> Three.", "Four."]
        );
    }

    #[test]
    fn test_punctuation_inside_tag_attributes_is_ignored() {
        assert_eq!(
            split_sentences("See <a href=\"notes.html#n1\">note</a>. Next."),
            vec!["See <a href=\"notes.html#n1\">note</a>.", "Next."]
        );
    }

    #[test]
    fn test_self_closing_and_void_tags_do_not_suppress() {
        assert_eq!(
            split_sentences("One.<br/>Two. Three.<br>Four."),
            vec!["One.", "<br/>Two.", "Three.", "<br>Four."]
        );
    }

    #[test]
    fn test_unterminated_tag_becomes_trailing_segment() {
        assert_eq!(
            split_sentences("One. Two. <span class=\"x. y. z"),
            vec!["One.", "Two.", "<span class=\"x. y. z"]
        );
    }

    #[test]
    fn test_quotes_suppress_split() {
        assert_eq!(
            split_sentences("Он сказал: «Привет. Как дела?» И ушёл. Всё."),
            vec!["Он сказал: «Привет. Как дела?» И ушёл.", "Всё."]
        );
    }

    #[test]
    fn test_quote_kinds_share_one_toggle() {
        // « opens, the straight quote closes: nesting is not tracked
        assert_eq!(
            split_sentences("«Один. \"Два. Три."),
            vec!["«Один. \"Два.", "Три."]
        );
    }

    #[test]
    fn test_forgotten_quote_stops_suppressing_after_window() {
        let long = "слово ".repeat(50);
        let text = format!("\"Начало. {long}конец. Потом.");
        let sentences = split_sentences(&text);
        assert_eq!(sentences.len(), 2);
        assert!(sentences[0].starts_with("\"Начало. слово"));
        assert_eq!(sentences[1], "Потом.");
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   \n ").is_empty());
        let segmenter = SentenceSegmenter::default();
        assert_eq!(segmenter.sentence_spans("  "), vec![0..2]);
    }

    #[test]
    fn test_spans_cover_multibyte_text() {
        let text = "Первое. Второе! Третье";
        let spans = SentenceSegmenter::default().sentence_spans(text);
        assert_eq!(spans.len(), 3);
        assert_eq!(&text[spans[0].clone()], "Первое.");
        assert_eq!(&text[spans[1].clone()], " Второе!");
        assert_eq!(&text[spans[2].clone()], " Третье");
    }

    proptest! {
        #[test]
        fn prop_spans_reconstruct_fragment(s in "[a-zA-ZА-я0-9 .!?…<>/\"«»“”\u{00A0}-]{0,120}") {
            let spans = SentenceSegmenter::default().sentence_spans(&s);
            let mut expected_start = 0;
            for span in &spans {
                prop_assert_eq!(span.start, expected_start);
                expected_start = span.end;
            }
            prop_assert_eq!(expected_start, s.len());
        }

        #[test]
        fn prop_sentences_are_trimmed_and_non_empty(s in "\\PC{0,200}") {
            for sentence in split_sentences(&s) {
                prop_assert!(!sentence.is_empty());
                prop_assert_eq!(sentence, sentence.trim());
            }
        }
    }
}
