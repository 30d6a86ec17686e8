// WHY: Word accounting must ignore markup, so tokens carry a word/non-word flag
// and tags are matched before anything else can claim their letters

use regex_automata::{meta::Regex, util::captures::Captures, Anchored, Input};
use tracing::debug;

use crate::error::Result;

/// Priority-ordered alternation, matched anchored at the current offset:
/// 1. tag, 2. hyphen-joined word, 3. single symbol, 4. whitespace run (incl. U+00A0)
const TOKEN_PATTERN: &str = r"(<[^>]*>)|(\w+(?:-\w+)*)|([^\w\s\x{00A0}-])|([\s\x{00A0}]+)";

const WORD_GROUP: usize = 2;

/// A slice of the source fragment, classified as word or non-word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub is_word: bool,
}

impl<'a> Token<'a> {
    pub fn word(text: &'a str) -> Self {
        Self { text, is_word: true }
    }

    pub fn other(text: &'a str) -> Self {
        Self { text, is_word: false }
    }
}

/// Compiled markup-aware tokenizer
///
/// Immutable after construction; share one instance across files.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    regex: Regex,
}

impl Tokenizer {
    pub fn new() -> Result<Self> {
        let regex = Regex::new(TOKEN_PATTERN)?;
        debug!("Compiled tokenizer pattern: {}", TOKEN_PATTERN);
        Ok(Self { regex })
    }

    /// Split a fragment into tokens whose texts concatenate back to `fragment`
    pub fn tokenize<'a>(&self, fragment: &'a str) -> Vec<Token<'a>> {
        let mut tokens = Vec::new();
        let mut caps = self.regex.create_captures();
        let mut pos = 0;

        while pos < fragment.len() {
            let token = self.next_token(fragment, pos, &mut caps);
            pos += token.text.len();
            tokens.push(token);
        }

        tokens
    }

    /// Number of word tokens in `fragment`
    pub fn count_words(&self, fragment: &str) -> usize {
        let mut caps = self.regex.create_captures();
        let mut pos = 0;
        let mut words = 0;

        while pos < fragment.len() {
            let token = self.next_token(fragment, pos, &mut caps);
            if token.is_word {
                words += 1;
            }
            pos += token.text.len();
        }

        words
    }

    fn next_token<'a>(&self, fragment: &'a str, pos: usize, caps: &mut Captures) -> Token<'a> {
        let input = Input::new(fragment).range(pos..).anchored(Anchored::Yes);
        self.regex.captures(input, caps);

        match caps.get_match() {
            Some(m) if m.end() > pos => {
                let text = &fragment[pos..m.end()];
                if caps.get_group(WORD_GROUP).is_some() {
                    Token::word(text)
                } else {
                    Token::other(text)
                }
            }
            _ => {
                // Only a lone hyphen falls through every alternative
                let width = fragment[pos..].chars().next().map_or(1, char::len_utf8);
                Token::other(&fragment[pos..pos + width])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::OnceLock;

    static SHARED_TOKENIZER: OnceLock<Tokenizer> = OnceLock::new();

    fn get_tokenizer() -> &'static Tokenizer {
        SHARED_TOKENIZER.get_or_init(|| Tokenizer::new().unwrap())
    }

    #[test]
    fn test_spaces_and_nbsp() {
        let tokens = get_tokenizer().tokenize("Слово1\u{00A0}Слово2 Слово3");
        assert_eq!(
            tokens,
            vec![
                Token::word("Слово1"),
                Token::other("\u{00A0}"),
                Token::word("Слово2"),
                Token::other(" "),
                Token::word("Слово3"),
            ]
        );
    }

    #[test]
    fn test_tags_are_never_words() {
        let tokens = get_tokenizer().tokenize("Текст с тегом<tag attr=\"value\">и после</tag> тега.");
        assert_eq!(
            tokens,
            vec![
                Token::word("Текст"),
                Token::other(" "),
                Token::word("с"),
                Token::other(" "),
                Token::word("тегом"),
                Token::other("<tag attr=\"value\">"),
                Token::word("и"),
                Token::other(" "),
                Token::word("после"),
                Token::other("</tag>"),
                Token::other(" "),
                Token::word("тега"),
                Token::other("."),
            ]
        );
    }

    #[test]
    fn test_punctuation_and_hyphenated_words() {
        let tokens = get_tokenizer().tokenize("Он сказал: \"Привет!\" и зачем-то ушёл.");
        let words: Vec<&str> = tokens.iter().filter(|t| t.is_word).map(|t| t.text).collect();
        assert_eq!(words, vec!["Он", "сказал", "Привет", "и", "зачем-то", "ушёл"]);
        assert!(tokens.contains(&Token::other(":")));
        assert!(tokens.contains(&Token::other("\"")));
    }

    #[test]
    fn test_stray_hyphen_falls_back_to_single_token() {
        let tokens = get_tokenizer().tokenize("one - two");
        assert_eq!(
            tokens,
            vec![
                Token::word("one"),
                Token::other(" "),
                Token::other("-"),
                Token::other(" "),
                Token::word("two"),
            ]
        );
    }

    #[test]
    fn test_unterminated_tag_degrades_to_symbols() {
        let tokens = get_tokenizer().tokenize("text <span class");
        assert_eq!(tokens[2], Token::other("<"));
        assert_eq!(get_tokenizer().count_words("text <span class"), 3);
    }

    #[test]
    fn test_count_words() {
        let tokenizer = get_tokenizer();
        assert_eq!(tokenizer.count_words(""), 0);
        assert_eq!(tokenizer.count_words("!!! *** ???"), 0);
        assert_eq!(tokenizer.count_words("Это нью-йоркский музей."), 3);
        assert_eq!(tokenizer.count_words("<a href=\"x.html\">link text</a> e-mail"), 3);
    }

    proptest! {
        #[test]
        fn prop_tokens_reconstruct_input(s in "\\PC*") {
            let tokens = get_tokenizer().tokenize(&s);
            let joined: String = tokens.iter().map(|t| t.text).collect();
            prop_assert_eq!(joined, s);
        }

        #[test]
        fn prop_tag_spans_are_not_words(inner in "[a-zA-Z =\"]{0,20}") {
            let fragment = format!("word<{inner}>word");
            let tokens = get_tokenizer().tokenize(&fragment);
            for token in tokens.iter().filter(|t| t.text.starts_with('<')) {
                prop_assert!(!token.is_word);
            }
            prop_assert_eq!(get_tokenizer().count_words(&fragment), 2);
        }
    }
}
