use anyhow::{ensure, Result};
use std::collections::{HashMap, HashSet};

use crate::pos::Pos;

/// One physical use of a word within a record.
///
/// `index` counts repeats of the same word under the same category, so the
/// second "cat" tagged as a noun is `("cat", N, 1)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Occurrence {
    pub word: String,
    pub pos: Pos,
    pub index: usize,
}

/// Occurrences of a record grouped by category.
///
/// Categories and the occurrences inside each category keep the order in
/// which the tokens were seen.
#[derive(Clone, Debug, Default)]
pub struct CategoryGrouping {
    categories: Vec<Pos>,
    words: Vec<String>,
    by_pos: HashMap<Pos, Vec<Occurrence>>,
}

impl CategoryGrouping {
    /// Group tokens by their tag. `tags[i]` is the category of `tokens[i]`.
    pub fn from_tagged(tokens: &[String], tags: &[Pos]) -> Result<Self> {
        ensure!(
            tokens.len() == tags.len(),
            "{} tokens but {} tags",
            tokens.len(),
            tags.len()
        );

        let mut grouping = Self::default();
        let mut seen: HashMap<(&str, &Pos), usize> = HashMap::new();
        let mut distinct = HashSet::new();
        for (word, pos) in tokens.iter().zip(tags) {
            if distinct.insert(word.as_str()) {
                grouping.words.push(word.clone());
            }
            let next = seen.entry((word.as_str(), pos)).or_insert(0);
            grouping.push(Occurrence {
                word: word.clone(),
                pos: pos.clone(),
                index: *next,
            });
            *next += 1;
        }
        Ok(grouping)
    }

    fn push(&mut self, occurrence: Occurrence) {
        if !self.by_pos.contains_key(&occurrence.pos) {
            self.categories.push(occurrence.pos.clone());
        }
        self.by_pos
            .entry(occurrence.pos.clone())
            .or_default()
            .push(occurrence);
    }

    /// Occurrences of a category; empty when the category never appeared.
    pub fn get(&self, pos: &Pos) -> &[Occurrence] {
        self.by_pos.get(pos).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True when the category has at least one occurrence.
    pub fn has(&self, pos: &Pos) -> bool {
        !self.get(pos).is_empty()
    }

    /// Categories in first-seen order.
    pub fn categories(&self) -> &[Pos] {
        &self.categories
    }

    /// Total number of occurrences across all categories.
    pub fn occurrence_count(&self) -> usize {
        self.by_pos.values().map(Vec::len).sum()
    }

    /// Distinct words, in token order.
    pub fn distinct_words(&self) -> &[String] {
        &self.words
    }

    /// Keep only the occurrences whose word is in `words`. Categories left
    /// without occurrences stay listed but empty.
    pub fn restrict_to(&self, words: &HashSet<String>) -> CategoryGrouping {
        let by_pos = self
            .by_pos
            .iter()
            .map(|(pos, occurrences)| {
                let kept = occurrences
                    .iter()
                    .filter(|o| words.contains(&o.word))
                    .cloned()
                    .collect();
                (pos.clone(), kept)
            })
            .collect();
        CategoryGrouping {
            categories: self.categories.clone(),
            words: self
                .words
                .iter()
                .filter(|w| words.contains(*w))
                .cloned()
                .collect(),
            by_pos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_repeats_get_increasing_indices() {
        let grouping = CategoryGrouping::from_tagged(
            &tokens("cat cat sat cat"),
            &[Pos::N, Pos::N, Pos::V, Pos::N],
        )
        .unwrap();
        let nouns: Vec<_> = grouping.get(&Pos::N).iter().map(|o| o.index).collect();
        assert_eq!(nouns, vec![0, 1, 2]);
        assert_eq!(grouping.get(&Pos::V)[0].index, 0);
        assert_eq!(grouping.occurrence_count(), 4);
    }

    #[test]
    fn test_indices_are_per_word_and_category() {
        // "run" tagged once as a verb and once as a noun: both are repeat 0
        let grouping = CategoryGrouping::from_tagged(
            &tokens("run run dog"),
            &[Pos::V, Pos::N, Pos::N],
        )
        .unwrap();
        assert_eq!(grouping.get(&Pos::V)[0], Occurrence { word: "run".into(), pos: Pos::V, index: 0 });
        assert_eq!(grouping.get(&Pos::N)[0], Occurrence { word: "run".into(), pos: Pos::N, index: 0 });
        assert_eq!(grouping.categories(), &[Pos::V, Pos::N]);
    }

    #[test]
    fn test_never_drops_occurrences() {
        let toks = tokens("a b a c b a d");
        let tags = vec![
            Pos::Det,
            Pos::Other("x".into()),
            Pos::Det,
            Pos::N,
            Pos::Other("x".into()),
            Pos::Adj,
            Pos::V,
        ];
        let grouping = CategoryGrouping::from_tagged(&toks, &tags).unwrap();
        assert_eq!(grouping.occurrence_count(), toks.len());
        assert_eq!(grouping.distinct_words(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_length_mismatch_is_an_error() {
        assert!(CategoryGrouping::from_tagged(&tokens("a b"), &[Pos::N]).is_err());
    }

    #[test]
    fn test_restrict_to_keeps_only_listed_words() {
        let grouping = CategoryGrouping::from_tagged(
            &tokens("dog cat dog run"),
            &[Pos::N, Pos::N, Pos::N, Pos::V],
        )
        .unwrap();
        let keep: HashSet<String> = ["dog".to_string()].into_iter().collect();
        let restricted = grouping.restrict_to(&keep);
        assert_eq!(restricted.get(&Pos::N).len(), 2);
        assert!(!restricted.has(&Pos::V));
        assert_eq!(restricted.distinct_words(), &["dog".to_string()]);
        assert_eq!(restricted.categories(), grouping.categories());
    }
}
