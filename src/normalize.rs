use regex::Regex;
use std::sync::OnceLock;

use crate::bag::WordBag;

fn word_pattern() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| Regex::new(r"\b[a-zA-Z]+\b").expect("word pattern is valid"))
}

/// Lowercase the text and pull out its alphabetic words, in order.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    word_pattern()
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Normalize raw text into the word multiset of a record.
pub fn normalize(text: &str) -> WordBag {
    WordBag::from_words(tokenize(text))
}
