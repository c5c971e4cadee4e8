//! Batch orchestration: records in, candidate store and combined rows out.
//!
//! Records never share state, so each stage maps over them on the rayon pool
//! and collects results back in input order.

use anyhow::{Context, Result};
use log::{debug, error, info};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

use crate::catalog::TemplateCatalog;
use crate::cover::{select, Selection};
use crate::generate::{generate_for_record, GenerationLimits, RecordSentences, SentenceSet};
use crate::grouping::CategoryGrouping;
use crate::pos::Pos;
use crate::records::{Candidate, CombinedRow, Record};
use crate::tagger::{tag_checked, LexiconTagger, PosTagger};

/// Tagger, templates and limits shared by every record of a batch.
pub struct Pipeline {
    tagger: Box<dyn PosTagger>,
    catalog: TemplateCatalog,
    limits: GenerationLimits,
}

impl Pipeline {
    pub fn new(tagger: Box<dyn PosTagger>, catalog: TemplateCatalog, limits: GenerationLimits) -> Self {
        Self {
            tagger,
            catalog,
            limits,
        }
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    /// Tag, group and generate sentences for one record.
    pub fn sentences_for(&self, record: &Record) -> Result<RecordSentences> {
        let tokens = record.words.expand();
        let tags = tag_checked(self.tagger.as_ref(), &tokens)
            .with_context(|| format!("Failed to tag record {}", record.id))?;
        let grouping = CategoryGrouping::from_tagged(&tokens, &tags)?;
        Ok(generate_for_record(&grouping, &self.catalog, self.limits))
    }

    /// Candidate sentences for every record, grouped by record in input order.
    ///
    /// A record whose tagging fails is logged and contributes no candidates.
    pub fn generate(&self, records: &[Record]) -> Vec<Candidate> {
        let pools: Vec<Vec<Candidate>> = records
            .par_iter()
            .map(|record| {
                let sentences = match self.sentences_for(record) {
                    Ok(sentences) => sentences,
                    Err(e) => {
                        error!("Record {}: {:#}", record.id, e);
                        return Vec::new();
                    }
                };
                if !sentences.unused.is_empty() {
                    debug!(
                        "Record {}: no template placed {:?}",
                        record.id, sentences.unused
                    );
                }
                sentences
                    .pool()
                    .into_iter()
                    .map(|sentence| Candidate {
                        id: record.id.clone(),
                        sentence,
                    })
                    .collect()
            })
            .collect();

        let candidates: Vec<Candidate> = pools.into_iter().flatten().collect();
        info!(
            "Generated {} candidate sentence(s) for {} record(s)",
            candidates.len(),
            records.len()
        );
        candidates
    }

    /// Generate and combine in one pass, without persisting candidates.
    pub fn run(&self, records: &[Record]) -> Combined {
        let candidates = self.generate(records);
        combine(records, &candidates)
    }
}

/// Counters for a combine pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub records: usize,
    pub candidates: usize,
    pub selected_sentences: usize,
    pub patched_records: usize,
    pub patched_words: usize,
    pub mismatched_records: usize,
}

/// Per-record entry of the JSON report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecordReport {
    pub id: String,
    pub sentences: usize,
    pub patched_words: Vec<String>,
    pub verified: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct Report {
    pub stats: RunStats,
    pub records: Vec<RecordReport>,
}

/// Output of a combine pass.
#[derive(Clone, Debug)]
pub struct Combined {
    pub selections: Vec<Selection>,
    pub stats: RunStats,
}

impl Combined {
    pub fn rows(&self) -> Vec<CombinedRow> {
        self.selections
            .iter()
            .map(|s| CombinedRow {
                id: s.id.clone(),
                combined_sentence: s.combined(),
            })
            .collect()
    }

    pub fn report(&self) -> Report {
        Report {
            stats: self.stats.clone(),
            records: self
                .selections
                .iter()
                .map(|s| RecordReport {
                    id: s.id.clone(),
                    sentences: s.sentences.len(),
                    patched_words: s.patched_words(),
                    verified: s.verified,
                })
                .collect(),
        }
    }
}

/// Choose sentences for every record from the candidate store.
///
/// Candidates are matched to records by id; duplicate texts within a record
/// are dropped. Records without candidates are covered entirely by a patch.
pub fn combine(records: &[Record], candidates: &[Candidate]) -> Combined {
    let mut pools: HashMap<&str, SentenceSet> = HashMap::new();
    for candidate in candidates {
        pools
            .entry(candidate.id.as_str())
            .or_default()
            .insert(candidate.sentence.clone());
    }

    let selections: Vec<Selection> = records
        .par_iter()
        .map(|record| {
            let pool: Vec<String> = pools
                .get(record.id.as_str())
                .map(|set| set.iter().cloned().collect())
                .unwrap_or_default();
            select(&record.id, &record.words, &pool)
        })
        .collect();

    let mut stats = RunStats {
        records: records.len(),
        candidates: candidates.len(),
        ..RunStats::default()
    };
    for selection in &selections {
        stats.selected_sentences += selection.sentences.len();
        let patched = selection.patched_words().len();
        if patched > 0 {
            stats.patched_records += 1;
            stats.patched_words += patched;
        }
        if !selection.verified {
            stats.mismatched_records += 1;
        }
    }

    info!(
        "Combined {} record(s): {} sentence(s) selected, {} record(s) patched, {} mismatch(es)",
        stats.records, stats.selected_sentences, stats.patched_records, stats.mismatched_records
    );

    Combined { selections, stats }
}

/// Write the JSON coverage report.
pub fn write_report(report: &Report, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write report {}", path.display()))?;
    Ok(())
}

/// Tag every record and keep each word's most frequent category.
///
/// Ties go to the category seen first. Records that fail to tag are skipped.
pub fn build_lexicon(records: &[Record], tagger: &dyn PosTagger, fallback: Pos) -> LexiconTagger {
    let tagged: Vec<Vec<(String, Pos)>> = records
        .par_iter()
        .filter_map(|record| {
            let tokens = record.words.expand();
            match tag_checked(tagger, &tokens) {
                Ok(tags) => Some(tokens.into_iter().zip(tags).collect()),
                Err(e) => {
                    error!("Record {}: {:#}", record.id, e);
                    None
                }
            }
        })
        .collect();

    // word -> (category, count) in first-seen order
    let mut votes: HashMap<String, Vec<(Pos, usize)>> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    for (word, pos) in tagged.into_iter().flatten() {
        let entry = votes.entry(word.clone()).or_insert_with(|| {
            order.push(word.clone());
            Vec::new()
        });
        match entry.iter_mut().find(|(p, _)| *p == pos) {
            Some((_, n)) => *n += 1,
            None => entry.push((pos, 1)),
        }
    }

    let mut lexicon = LexiconTagger::new(fallback);
    for word in order {
        let best = votes[&word]
            .iter()
            .fold(None::<&(Pos, usize)>, |best, cand| match best {
                Some(b) if b.1 >= cand.1 => Some(b),
                _ => Some(cand),
            });
        if let Some((pos, _)) = best {
            lexicon = lexicon.with_word(&word, pos.clone());
        }
    }
    lexicon
}
