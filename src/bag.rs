use std::collections::HashMap;
use std::fmt;

/// A multiset of words that remembers the order in which words were first seen.
///
/// Equality only looks at the counts, so two bags built in a different order
/// still compare equal.
#[derive(Clone, Debug, Default)]
pub struct WordBag {
    order: Vec<String>,
    counts: HashMap<String, usize>,
}

impl WordBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a bag from a stream of words, one count per word.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut bag = Self::new();
        for word in words {
            bag.add(word.as_ref(), 1);
        }
        bag
    }

    /// Count the whitespace-separated words of a sentence.
    pub fn from_sentence(sentence: &str) -> Self {
        Self::from_words(sentence.split_whitespace())
    }

    pub fn add(&mut self, word: &str, n: usize) {
        if n == 0 {
            return;
        }
        match self.counts.get_mut(word) {
            Some(count) => *count += n,
            None => {
                self.order.push(word.to_string());
                self.counts.insert(word.to_string(), n);
            }
        }
    }

    /// Add every word of `other` into this bag.
    pub fn merge(&mut self, other: &WordBag) {
        for (word, count) in other.iter() {
            self.add(word, count);
        }
    }

    /// Count of `word`, zero when absent.
    pub fn count(&self, word: &str) -> usize {
        self.counts.get(word).copied().unwrap_or(0)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.counts.contains_key(word)
    }

    /// Total number of word occurrences.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Distinct words with their counts, in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.order
            .iter()
            .map(move |word| (word.as_str(), self.counts[word]))
    }

    /// Distinct words in first-seen order.
    pub fn words(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(String::as_str)
    }

    /// Every occurrence as its own token; repeats of a word are adjacent.
    pub fn expand(&self) -> Vec<String> {
        let mut tokens = Vec::with_capacity(self.total());
        for (word, count) in self.iter() {
            tokens.extend(std::iter::repeat(word.to_string()).take(count));
        }
        tokens
    }

    /// True when adding `other` keeps every word within the quota set by `limit`.
    ///
    /// Words missing from `limit` have a quota of zero.
    pub fn fits_within(&self, other: &WordBag, limit: &WordBag) -> bool {
        other
            .iter()
            .all(|(word, count)| self.count(word) + count <= limit.count(word))
    }

    /// Words of `self` not covered by `other`, floored at zero, in `self`'s order.
    pub fn difference(&self, other: &WordBag) -> WordBag {
        let mut missing = WordBag::new();
        for (word, count) in self.iter() {
            missing.add(word, count.saturating_sub(other.count(word)));
        }
        missing
    }
}

impl PartialEq for WordBag {
    fn eq(&self, other: &Self) -> bool {
        self.counts == other.counts
    }
}

impl Eq for WordBag {}

impl fmt::Display for WordBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (word, count)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{word:?}: {count}")?;
        }
        write!(f, "}}")
    }
}

impl<S: AsRef<str>> FromIterator<S> for WordBag {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_words(iter)
    }
}
