//! Greedy reconstruction of a record's word multiset from candidate sentences.

use log::{error, warn};

use crate::bag::WordBag;

/// Sentences chosen for one record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub id: String,
    /// Accepted candidates, in the order they were accepted.
    pub sentences: Vec<String>,
    /// Leftover words joined as-is, present only when the candidates fell short.
    pub patch: Option<String>,
    /// Word usage across `sentences` and `patch`.
    pub used: WordBag,
    /// Whether `used` matched the record's words exactly.
    pub verified: bool,
}

impl Selection {
    /// Every chosen sentence, patch last, joined into one text.
    pub fn combined(&self) -> String {
        let mut parts: Vec<&str> = self.sentences.iter().map(String::as_str).collect();
        if let Some(patch) = &self.patch {
            parts.push(patch);
        }
        parts.join(" ")
    }

    /// Words the patch had to supply.
    pub fn patched_words(&self) -> Vec<String> {
        self.patch
            .as_deref()
            .map(|p| p.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

/// Pick sentences whose combined words equal `required`.
///
/// Candidates are tried longest first and accepted only while no word goes
/// over its count in `required`. Whatever is still missing afterwards is
/// appended as one patch sentence. The final usage is checked against
/// `required`; a mismatch is logged but still returned.
pub fn select(id: &str, required: &WordBag, candidates: &[String]) -> Selection {
    let mut ranked: Vec<(&String, WordBag)> = candidates
        .iter()
        .map(|sentence| (sentence, WordBag::from_sentence(sentence)))
        .collect();
    // Stable, so equally long candidates keep their pool order.
    ranked.sort_by(|a, b| b.1.total().cmp(&a.1.total()));

    let goal = required.total();
    let mut used = WordBag::new();
    let mut sentences = Vec::new();

    for (sentence, words) in ranked {
        if used.fits_within(&words, required) {
            used.merge(&words);
            sentences.push(sentence.clone());
        }
        if used.total() == goal {
            break;
        }
    }

    let missing = required.difference(&used);
    let patch = if missing.is_empty() {
        None
    } else {
        let words = missing.expand();
        warn!("Record {}: adding missing words to match input: {:?}", id, words);
        Some(words.join(" "))
    };

    let mut final_usage = WordBag::new();
    for sentence in sentences.iter().chain(patch.iter()) {
        final_usage.merge(&WordBag::from_sentence(sentence));
    }

    let verified = final_usage == *required;
    if !verified {
        error!(
            "Record {}: combined sentence does not match original word counts even after adding missing words. Original: {} Final: {}",
            id, required, final_usage
        );
    }

    Selection {
        id: id.to_string(),
        sentences,
        patch,
        used: final_usage,
        verified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag(pairs: &[(&str, usize)]) -> WordBag {
        let mut bag = WordBag::new();
        for (word, count) in pairs {
            bag.add(word, *count);
        }
        bag
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_candidate_covers_exactly() {
        let required = bag(&[("cat", 2), ("sat", 1)]);
        let selection = select("1", &required, &strings(&["cat sat cat"]));
        assert_eq!(selection.combined(), "cat sat cat");
        assert!(selection.patch.is_none());
        assert!(selection.verified);
    }

    #[test]
    fn test_two_candidates_fill_quota() {
        let required = bag(&[("dog", 1), ("run", 1), ("fast", 1)]);
        let selection = select("2", &required, &strings(&["dog run", "fast"]));
        assert_eq!(selection.sentences, vec!["dog run", "fast"]);
        assert_eq!(selection.combined(), "dog run fast");
        assert!(selection.verified);
    }

    #[test]
    fn test_empty_pool_is_all_patch() {
        let required = bag(&[("a", 1), ("b", 1), ("c", 1)]);
        let selection = select("3", &required, &[]);
        assert!(selection.sentences.is_empty());
        assert_eq!(selection.patch.as_deref(), Some("a b c"));
        assert_eq!(selection.combined(), "a b c");
        assert!(selection.verified);
    }

    #[test]
    fn test_foreign_word_rejects_candidate() {
        let required = bag(&[("x", 2)]);
        let selection = select("4", &required, &strings(&["x y"]));
        assert!(selection.sentences.is_empty());
        assert_eq!(selection.combined(), "x x");
        assert_eq!(selection.patched_words(), vec!["x", "x"]);
        assert!(selection.verified);
    }

    #[test]
    fn test_longest_first_and_quota() {
        let required = bag(&[("the", 1), ("dog", 2), ("barks", 1)]);
        let candidates = strings(&["dog barks", "the dog barks", "dog", "the dog"]);
        let selection = select("5", &required, &candidates);
        // "the dog barks" goes first; "dog barks" and "the dog" would overuse.
        assert_eq!(selection.sentences, vec!["the dog barks", "dog"]);
        assert!(selection.patch.is_none());
        assert!(selection.verified);
    }

    #[test]
    fn test_equal_length_keeps_pool_order() {
        let required = bag(&[("a", 1), ("b", 1)]);
        let selection = select("6", &required, &strings(&["b", "a"]));
        assert_eq!(selection.combined(), "b a");
    }

    #[test]
    fn test_partial_cover_then_patch() {
        let required = bag(&[("red", 1), ("ball", 2), ("rolls", 1)]);
        let selection = select("7", &required, &strings(&["red ball rolls"]));
        assert_eq!(selection.sentences, vec!["red ball rolls"]);
        assert_eq!(selection.patch.as_deref(), Some("ball"));
        assert_eq!(selection.used, required);
    }

    #[test]
    fn test_never_overuses_before_patch() {
        let required = bag(&[("a", 2), ("b", 1), ("c", 3)]);
        let candidates = strings(&["a a a", "c c c c", "a b c", "c c", "b b", "a", "c"]);
        let selection = select("8", &required, &candidates);
        let mut before_patch = WordBag::new();
        for sentence in &selection.sentences {
            before_patch.merge(&WordBag::from_sentence(sentence));
            for (word, count) in before_patch.iter() {
                assert!(count <= required.count(word), "{word} overused");
            }
        }
        assert!(selection.verified);
    }

    #[test]
    fn test_reselecting_gives_same_multiset() {
        let required = bag(&[("a", 2), ("b", 1), ("c", 1)]);
        let candidates = strings(&["a b", "c a", "a c b", "b"]);
        let first = select("9", &required, &candidates);
        let second = select("9", &required, &candidates);
        assert_eq!(first.used, second.used);
        assert_eq!(first.used, required);
    }

    #[test]
    fn test_empty_record() {
        let selection = select("10", &WordBag::new(), &strings(&["stray"]));
        assert!(selection.sentences.is_empty());
        assert!(selection.patch.is_none());
        assert_eq!(selection.combined(), "");
        assert!(selection.verified);
    }
}
