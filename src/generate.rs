//! Template-driven sentence synthesis for a single record.

use std::collections::HashSet;

use log::debug;

use crate::catalog::{Template, TemplateCatalog};
use crate::grouping::{CategoryGrouping, Occurrence};

/// Bounds on how much enumeration a single template may do.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerationLimits {
    /// Stop a template after this many distinct sentences. `None` enumerates all.
    pub max_sentences_per_template: Option<usize>,
}

/// Sentence texts without duplicates, kept in the order they were first produced.
#[derive(Clone, Debug, Default)]
pub struct SentenceSet {
    sentences: Vec<String>,
    seen: HashSet<String>,
}

impl SentenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the text was already present.
    pub fn insert(&mut self, sentence: String) -> bool {
        if self.seen.contains(&sentence) {
            return false;
        }
        self.seen.insert(sentence.clone());
        self.sentences.push(sentence);
        true
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.sentences.iter()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.sentences
    }
}

impl Extend<String> for SentenceSet {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        for sentence in iter {
            self.insert(sentence);
        }
    }
}

/// Enumerate every sentence `template` can form from `grouping`.
///
/// Slots are filled left to right from their category's occurrences, and the
/// last slot varies fastest. An occurrence is never used twice in one
/// sentence, but two repeats of the same word are distinct occurrences and may
/// both appear. Texts are deduplicated.
pub fn instantiate(
    grouping: &CategoryGrouping,
    template: &Template,
    limits: GenerationLimits,
) -> Vec<String> {
    if template.is_empty() || !template.is_fillable(grouping) {
        return Vec::new();
    }

    let slots: Vec<&[Occurrence]> = template.slots().iter().map(|pos| grouping.get(pos)).collect();
    let mut chosen: Vec<&Occurrence> = Vec::with_capacity(slots.len());
    let mut out = SentenceSet::new();
    fill_slot(&slots, &mut chosen, &mut out, limits.max_sentences_per_template);
    out.into_vec()
}

// Depth-first walk over the cartesian product. A branch is cut as soon as its
// next occurrence is already part of the partial sentence. Returns false once
// the limit is reached so callers unwind without exploring further.
fn fill_slot<'a>(
    slots: &[&'a [Occurrence]],
    chosen: &mut Vec<&'a Occurrence>,
    out: &mut SentenceSet,
    limit: Option<usize>,
) -> bool {
    let depth = chosen.len();
    if depth == slots.len() {
        let words: Vec<&str> = chosen.iter().map(|o| o.word.as_str()).collect();
        out.insert(words.join(" "));
        return limit.map_or(true, |max| out.len() < max);
    }

    for occurrence in slots[depth] {
        if chosen.contains(&occurrence) {
            continue;
        }
        chosen.push(occurrence);
        let keep_going = fill_slot(slots, chosen, out, limit);
        chosen.pop();
        if !keep_going {
            return false;
        }
    }
    true
}

/// Sentences generated for one record, split by the phase that produced them.
#[derive(Clone, Debug, Default)]
pub struct RecordSentences {
    /// The best-fit template, if any template could be filled at all.
    pub primary_template: Option<Template>,
    pub primary: Vec<String>,
    pub fallback: Vec<String>,
    /// Words no generated sentence contains.
    pub unused: Vec<String>,
}

impl RecordSentences {
    /// Primary and fallback sentences as one pool, without duplicate texts.
    pub fn pool(&self) -> Vec<String> {
        let mut set = SentenceSet::new();
        set.extend(self.primary.iter().cloned());
        set.extend(self.fallback.iter().cloned());
        set.into_vec()
    }
}

fn unused_words(all: &[String], used: &HashSet<String>) -> Vec<String> {
    all.iter().filter(|w| !used.contains(*w)).cloned().collect()
}

/// Generate the candidate sentences of one record.
///
/// The best-fit template is filled from every occurrence first. Any word that
/// did not make it into one of those sentences is then targeted with the whole
/// catalog, restricted to occurrences of such words. A word counts as used as
/// soon as any sentence contains it, whatever its repeat count.
pub fn generate_for_record(
    grouping: &CategoryGrouping,
    catalog: &TemplateCatalog,
    limits: GenerationLimits,
) -> RecordSentences {
    let all_words = grouping.distinct_words();
    let mut used: HashSet<String> = HashSet::new();
    let mut result = RecordSentences::default();

    if let Some(template) = catalog.largest_fillable(grouping) {
        result.primary = instantiate(grouping, template, limits);
        for sentence in &result.primary {
            used.extend(sentence.split_whitespace().map(str::to_string));
        }
        debug!(
            "best-fit template {:?} produced {} sentence(s)",
            template.to_string(),
            result.primary.len()
        );
        result.primary_template = Some(template.clone());
    }

    let mut unused = unused_words(all_words, &used);
    if !unused.is_empty() {
        let targets: HashSet<String> = unused.iter().cloned().collect();
        let restricted = grouping.restrict_to(&targets);

        for template in catalog.iter() {
            let unused_now: HashSet<&str> = unused.iter().map(String::as_str).collect();
            for sentence in instantiate(&restricted, template, limits) {
                let words: HashSet<&str> = sentence.split_whitespace().collect();
                if words.iter().any(|w| unused_now.contains(w)) {
                    used.extend(words.iter().map(|w| w.to_string()));
                    result.fallback.push(sentence);
                }
            }
            unused = unused_words(all_words, &used);
            if unused.is_empty() {
                break;
            }
        }
    }

    result.unused = unused;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pos::Pos;

    fn grouping(words: &str, tags: &[Pos]) -> CategoryGrouping {
        let tokens: Vec<String> = words.split_whitespace().map(str::to_string).collect();
        CategoryGrouping::from_tagged(&tokens, tags).unwrap()
    }

    fn template(spec: &str) -> Template {
        Template::new(spec.split_whitespace().map(Pos::parse).collect())
    }

    #[test]
    fn test_unfillable_template_yields_nothing() {
        let g = grouping("dog", &[Pos::N]);
        assert!(instantiate(&g, &template("N V"), GenerationLimits::default()).is_empty());
    }

    #[test]
    fn test_empty_template_yields_nothing() {
        let g = grouping("dog", &[Pos::N]);
        assert!(instantiate(&g, &Template::new(vec![]), GenerationLimits::default()).is_empty());
    }

    #[test]
    fn test_single_slot_enumerates_distinct_words() {
        let g = grouping("dog dog cat", &[Pos::N, Pos::N, Pos::N]);
        let sentences = instantiate(&g, &template("N"), GenerationLimits::default());
        assert_eq!(sentences, vec!["dog", "cat"]);
    }

    #[test]
    fn test_repeat_occurrences_may_share_a_sentence() {
        let g = grouping("cat cat sat", &[Pos::N, Pos::N, Pos::V]);
        let sentences = instantiate(&g, &template("N V N"), GenerationLimits::default());
        assert_eq!(sentences, vec!["cat sat cat"]);
    }

    #[test]
    fn test_single_occurrence_is_never_reused() {
        let g = grouping("dog cat runs", &[Pos::N, Pos::N, Pos::V]);
        let sentences = instantiate(&g, &template("N V N"), GenerationLimits::default());
        assert_eq!(sentences, vec!["dog runs cat", "cat runs dog"]);

        let lonely = grouping("dog runs", &[Pos::N, Pos::V]);
        assert!(instantiate(&lonely, &template("N V N"), GenerationLimits::default()).is_empty());
    }

    #[test]
    fn test_enumeration_order_is_lexicographic_by_slot() {
        let g = grouping("the a dog cat", &[Pos::Det, Pos::Det, Pos::N, Pos::N]);
        let sentences = instantiate(&g, &template("Det N"), GenerationLimits::default());
        assert_eq!(sentences, vec!["the dog", "the cat", "a dog", "a cat"]);
    }

    #[test]
    fn test_limit_caps_sentences_per_template() {
        let g = grouping("the a dog cat", &[Pos::Det, Pos::Det, Pos::N, Pos::N]);
        let limits = GenerationLimits {
            max_sentences_per_template: Some(3),
        };
        assert_eq!(instantiate(&g, &template("Det N"), limits).len(), 3);
    }

    #[test]
    fn test_no_sentence_repeats_an_occurrence() {
        let g = grouping(
            "big big dog dog runs",
            &[Pos::Adj, Pos::Adj, Pos::N, Pos::N, Pos::V],
        );
        let required = crate::bag::WordBag::from_sentence("big big dog dog runs");
        for sentence in instantiate(&g, &template("Adj N V Adj N"), GenerationLimits::default()) {
            let used = crate::bag::WordBag::from_sentence(&sentence);
            assert!(crate::bag::WordBag::new().fits_within(&used, &required), "{sentence}");
        }
    }

    #[test]
    fn test_primary_fill_covers_every_word() {
        let catalog = TemplateCatalog::english().unwrap();
        let g = grouping("dog chases cat", &[Pos::N, Pos::V, Pos::N]);
        let result = generate_for_record(&g, &catalog, GenerationLimits::default());
        assert_eq!(result.primary_template.unwrap().to_string(), "N V N");
        assert_eq!(result.primary, vec!["dog chases cat", "cat chases dog"]);
        assert!(result.fallback.is_empty());
        assert!(result.unused.is_empty());
    }

    #[test]
    fn test_leftover_words_reach_the_unused_list() {
        let catalog = TemplateCatalog::english().unwrap();
        let g = grouping(
            "the red ball bounces floor",
            &[Pos::Det, Pos::Adj, Pos::N, Pos::V, Pos::N],
        );
        let result = generate_for_record(&g, &catalog, GenerationLimits::default());
        assert_eq!(result.primary_template.unwrap().to_string(), "Det Adj N");
        assert_eq!(result.primary, vec!["the red ball", "the red floor"]);
        // A lone verb fits no template.
        assert!(result.fallback.is_empty());
        assert_eq!(result.unused, vec!["bounces"]);
    }

    #[test]
    fn test_best_fit_may_produce_nothing() {
        let catalog = TemplateCatalog::english().unwrap();
        // "Det N V N" has every category present but needs two nouns.
        let g = grouping(
            "dog barks stone rock",
            &[Pos::N, Pos::V, Pos::Other("x".into()), Pos::Det],
        );
        let result = generate_for_record(&g, &catalog, GenerationLimits::default());
        assert_eq!(result.primary_template.unwrap().to_string(), "Det N V N");
        assert!(result.primary.is_empty());
        assert_eq!(result.fallback, vec!["dog barks", "rock dog"]);
        assert_eq!(result.unused, vec!["stone"]);
    }

    #[test]
    fn test_fallback_fills_second_template() {
        let catalog = TemplateCatalog::from_str("N V\nDet N\nN N\n").unwrap();
        let g = grouping(
            "dog barks the cat",
            &[Pos::N, Pos::V, Pos::Det, Pos::N],
        );
        let result = generate_for_record(&g, &catalog, GenerationLimits::default());
        assert_eq!(result.primary, vec!["dog barks", "cat barks"]);
        // Only "the" is left; no template fits it alone once restricted.
        assert_eq!(result.unused, vec!["the"]);

        let g = grouping("dog barks the", &[Pos::N, Pos::V, Pos::Det]);
        let catalog = TemplateCatalog::from_str("N V\nDet\n").unwrap();
        let result = generate_for_record(&g, &catalog, GenerationLimits::default());
        assert_eq!(result.primary, vec!["dog barks"]);
        assert_eq!(result.fallback, vec!["the"]);
        assert!(result.unused.is_empty());
    }

    #[test]
    fn test_repeated_word_counts_as_used_after_one_sentence() {
        let catalog = TemplateCatalog::from_str("N V\nDet N\n").unwrap();
        let g = grouping("dog dog barks cat", &[Pos::N, Pos::N, Pos::V, Pos::Det]);
        let result = generate_for_record(&g, &catalog, GenerationLimits::default());
        assert_eq!(result.primary, vec!["dog barks"]);
        // The second "dog" is not targeted again once one sentence holds "dog".
        assert!(result.fallback.is_empty());
        assert_eq!(result.unused, vec!["cat"]);

        let required = crate::bag::WordBag::from_sentence("dog dog barks cat");
        let selection = crate::cover::select("1", &required, &result.pool());
        assert_eq!(selection.sentences, vec!["dog barks"]);
        assert_eq!(selection.patch.as_deref(), Some("dog cat"));
        assert!(selection.verified);
    }

    #[test]
    fn test_nothing_fillable_gives_empty_pool() {
        let catalog = TemplateCatalog::english().unwrap();
        let g = grouping("a b c", &[Pos::Adv, Pos::Adv, Pos::Adv]);
        let result = generate_for_record(&g, &catalog, GenerationLimits::default());
        assert!(result.primary_template.is_none());
        assert!(result.pool().is_empty());
        assert_eq!(result.unused, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_pool_has_no_duplicates() {
        let mut set = SentenceSet::new();
        assert!(set.insert("a b".into()));
        assert!(!set.insert("a b".into()));
        set.extend(vec!["c".to_string(), "a b".to_string()]);
        assert_eq!(set.into_vec(), vec!["a b", "c"]);
    }
}
