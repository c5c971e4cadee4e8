//! Rebuild bags of words into template-shaped sentences.
//!
//! Each record's words are tagged, grouped into per-category occurrences and
//! poured into part-of-speech templates. A greedy selector then picks
//! sentences until every occurrence of every word is used exactly once,
//! patching any shortfall with the leftover words.

pub mod bag;
pub mod catalog;
pub mod config;
pub mod cover;
pub mod generate;
pub mod grouping;
pub mod normalize;
pub mod pipeline;
pub mod pos;
pub mod records;
pub mod tagger;

pub use bag::WordBag;
pub use catalog::{Template, TemplateCatalog};
pub use cover::{select, Selection};
pub use generate::{generate_for_record, instantiate, GenerationLimits, RecordSentences};
pub use grouping::{CategoryGrouping, Occurrence};
pub use pipeline::{combine, Combined, Pipeline, RunStats};
pub use pos::Pos;
pub use records::{Candidate, CombinedRow, Record};
pub use tagger::{LexiconTagger, PosTagger};

#[cfg(feature = "nlprule")]
pub use tagger::NlpruleTagger;
