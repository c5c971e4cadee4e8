//! Part-of-speech tagging.
//!
//! The generator only needs one category per token, so every tagger is reduced
//! to the [`PosTagger`] capability: an ordered list of words in, a parallel list
//! of categories out.

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::pos::Pos;

/// Assigns one grammatical category to every word of a sequence.
pub trait PosTagger: Send + Sync {
    /// Tag `words` in order. The result must have the same length as the input.
    fn tag(&self, words: &[String]) -> Result<Vec<Pos>>;
}

/// Run `tagger` and check it kept one category per word.
pub fn tag_checked(tagger: &dyn PosTagger, words: &[String]) -> Result<Vec<Pos>> {
    let tags = tagger.tag(words)?;
    if tags.len() != words.len() {
        bail!(
            "tagger returned {} categories for {} words",
            tags.len(),
            words.len()
        );
    }
    Ok(tags)
}

/// Context-free tagger backed by a `word|POS1,POS2` lexicon file.
///
/// The first listed category of a word is the one used. Words missing from the
/// lexicon get the fallback category.
#[derive(Debug, Clone)]
pub struct LexiconTagger {
    entries: HashMap<String, Pos>,
    fallback: Pos,
}

impl LexiconTagger {
    pub fn new(fallback: Pos) -> Self {
        Self {
            entries: HashMap::new(),
            fallback,
        }
    }

    /// Add or replace a word's category.
    pub fn with_word(mut self, word: &str, pos: Pos) -> Self {
        self.entries.insert(word.to_lowercase(), pos);
        self
    }

    /// Parse `word|POS1,POS2` lines. A bare `word` or an empty `word|` is an
    /// untaggable word and gets the fallback category.
    pub fn from_str(lexicon: &str, fallback: Pos) -> Result<Self> {
        let mut tagger = Self::new(fallback);
        for (line_no, line) in lexicon.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (word, tags) = line.split_once('|').unwrap_or((line, ""));
            let word = word.trim().to_lowercase();
            if word.is_empty() {
                bail!("line {}: no word before '|' in {:?}", line_no + 1, line);
            }
            let pos = tags
                .split(',')
                .map(str::trim)
                .find(|t| !t.is_empty())
                .map(Pos::parse)
                .unwrap_or_else(|| tagger.fallback.clone());
            tagger.entries.insert(word, pos);
        }
        Ok(tagger)
    }

    pub fn from_file(path: impl AsRef<Path>, fallback: Pos) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read lexicon from {}", path.display()))?;
        Self::from_str(&text, fallback)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize in the same `word|POS` format `from_str` reads, sorted by word.
    pub fn to_lexicon_string(&self) -> String {
        let mut words: Vec<_> = self.entries.iter().collect();
        words.sort_by(|a, b| a.0.cmp(b.0));
        let mut out = String::new();
        for (word, pos) in words {
            out.push_str(&format!("{}|{}\n", word, pos));
        }
        out
    }
}

impl PosTagger for LexiconTagger {
    fn tag(&self, words: &[String]) -> Result<Vec<Pos>> {
        Ok(words
            .iter()
            .map(|w| {
                self.entries
                    .get(&w.to_lowercase())
                    .cloned()
                    .unwrap_or_else(|| self.fallback.clone())
            })
            .collect())
    }
}

/// Supported tokenizer languages
#[derive(Debug, Clone, Copy)]
pub enum Language {
    English,
}

impl Language {
    /// Language code (ISO 639-1)
    fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
        }
    }

    /// File name nlprule uses for this language's tokenizer
    pub fn tokenizer_filename(&self) -> String {
        format!("{}_tokenizer.bin", self.code())
    }
}

#[cfg(feature = "nlprule")]
pub use self::nlp::NlpruleTagger;

#[cfg(feature = "nlprule")]
mod nlp {
    use super::{Language, PosTagger};
    use crate::pos::Pos;
    use anyhow::{bail, Context, Result};
    use nlprule::Tokenizer;
    use std::path::Path;

    /// Tagger that runs words through nlprule's statistical tokenizer.
    pub struct NlpruleTagger {
        tokenizer: Tokenizer,
        fallback: Pos,
    }

    impl NlpruleTagger {
        pub fn from_path(tokenizer_path: impl AsRef<Path>, fallback: Pos) -> Result<Self> {
            let path = tokenizer_path.as_ref();
            let tokenizer = Tokenizer::new(path)
                .with_context(|| format!("Failed to load tokenizer from {}", path.display()))?;
            Ok(Self { tokenizer, fallback })
        }

        /// Look for the language's tokenizer binary in the usual places:
        /// /opt/nlprule-data/, /app/data/, data/, then the current directory.
        pub fn from_language(language: Language, fallback: Pos) -> Result<Self> {
            let filename = language.tokenizer_filename();
            let locations = ["/opt/nlprule-data/", "/app/data/", "data/", ""];

            for location in &locations {
                let path = format!("{}{}", location, filename);
                if Path::new(&path).exists() {
                    return Self::from_path(&path, fallback);
                }
            }

            Self::from_path(&filename, fallback).with_context(|| {
                format!(
                    "Could not find {} in any of: current directory, data/, /app/data/, or /opt/nlprule-data/",
                    filename
                )
            })
        }
    }

    impl PosTagger for NlpruleTagger {
        fn tag(&self, words: &[String]) -> Result<Vec<Pos>> {
            let text = words.join(" ");
            let mut tags = Vec::with_capacity(words.len());

            for sentence in self.tokenizer.pipe(&text) {
                for token in sentence.tokens() {
                    let word = token.word();
                    if word.text().as_str().trim().is_empty() {
                        continue;
                    }
                    // First tag with a known mapping wins; otherwise keep the raw tag.
                    let mut raw = None;
                    let mut mapped = None;
                    for data in word.tags() {
                        let tag = data.pos().as_str();
                        if tag.is_empty() || tag == "SENT_START" || tag == "SENT_END" {
                            continue;
                        }
                        if let Some(pos) = Pos::from_penn(tag) {
                            mapped = Some(pos);
                            break;
                        }
                        raw.get_or_insert_with(|| Pos::parse(tag));
                    }
                    tags.push(mapped.or(raw).unwrap_or_else(|| self.fallback.clone()));
                }
            }

            if tags.len() != words.len() {
                bail!(
                    "nlprule split {} words into {} tokens",
                    words.len(),
                    tags.len()
                );
            }
            Ok(tags)
        }
    }
}
