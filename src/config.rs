use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::TemplateCatalog;
use crate::generate::GenerationLimits;
use crate::pos::Pos;
use crate::records::Columns;
use crate::tagger::{LexiconTagger, PosTagger};

/// Which part-of-speech tagger to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaggerKind {
    /// `word|POS` lexicon file
    Lexicon,
    /// nlprule statistical tokenizer
    Nlprule,
}

/// Settings that may come from a YAML file and be overridden on the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub id_column: String,
    pub text_column: String,
    pub tagger: TaggerKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lexicon: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokenizer: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templates: Option<PathBuf>,
    /// Category given to words the tagger cannot place
    pub fallback_pos: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_sentences_per_template: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            id_column: "id".to_string(),
            text_column: "text".to_string(),
            tagger: TaggerKind::Nlprule,
            lexicon: None,
            tokenizer: None,
            templates: None,
            fallback_pos: "x".to_string(),
            max_sentences_per_template: None,
            threads: None,
        }
    }
}

impl Settings {
    pub fn from_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_str(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn columns(&self) -> Columns {
        Columns {
            id: self.id_column.clone(),
            text: self.text_column.clone(),
        }
    }

    pub fn limits(&self) -> GenerationLimits {
        GenerationLimits {
            max_sentences_per_template: self.max_sentences_per_template,
        }
    }

    pub fn fallback(&self) -> Pos {
        Pos::parse(&self.fallback_pos)
    }

    pub fn catalog(&self) -> Result<TemplateCatalog> {
        match &self.templates {
            Some(path) => TemplateCatalog::from_file(path),
            None => TemplateCatalog::english(),
        }
    }

    pub fn build_tagger(&self) -> Result<Box<dyn PosTagger>> {
        match self.tagger {
            TaggerKind::Lexicon => {
                let path = match &self.lexicon {
                    Some(path) => path,
                    None => bail!("the lexicon tagger needs --lexicon <file>"),
                };
                Ok(Box::new(LexiconTagger::from_file(path, self.fallback())?))
            }
            TaggerKind::Nlprule => self.build_nlprule_tagger(),
        }
    }

    #[cfg(feature = "nlprule")]
    fn build_nlprule_tagger(&self) -> Result<Box<dyn PosTagger>> {
        use crate::tagger::{Language, NlpruleTagger};
        let tagger = match &self.tokenizer {
            Some(path) => NlpruleTagger::from_path(path, self.fallback())?,
            None => NlpruleTagger::from_language(Language::English, self.fallback())?,
        };
        Ok(Box::new(tagger))
    }

    #[cfg(not(feature = "nlprule"))]
    fn build_nlprule_tagger(&self) -> Result<Box<dyn PosTagger>> {
        bail!("built without the `nlprule` feature; use --tagger lexicon")
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "sentence-cover")]
#[command(about = "Rebuild each record's words into template-shaped sentences that use every word exactly once")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// YAML settings file; flags below override its values
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Tagger to use
    #[arg(long, global = true, value_enum)]
    pub tagger: Option<TaggerKind>,

    /// Lexicon file for the lexicon tagger (word|POS per line)
    #[arg(long, global = true)]
    pub lexicon: Option<PathBuf>,

    /// nlprule tokenizer binary (default: search for en_tokenizer.bin)
    #[arg(long, global = true)]
    pub tokenizer: Option<PathBuf>,

    /// Template catalog file (default: built-in English templates)
    #[arg(long, global = true)]
    pub templates: Option<PathBuf>,

    /// Worker threads (default: one per core)
    #[arg(long, global = true)]
    pub threads: Option<usize>,

    /// Input column holding the record id
    #[arg(long, global = true)]
    pub id_column: Option<String>,

    /// Input column holding the record text
    #[arg(long, global = true)]
    pub text_column: Option<String>,

    /// Stop enumerating a template after this many sentences
    #[arg(long, global = true)]
    pub max_sentences_per_template: Option<usize>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Generate candidate sentences and write the candidate store
    Generate {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        candidates: PathBuf,
    },
    /// Select sentences from a candidate store and write combined rows
    Combine {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        candidates: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Write a JSON coverage report
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Generate and combine in one pass
    Run {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Also persist the candidate store
        #[arg(short, long)]
        candidates: Option<PathBuf>,
        /// Write a JSON coverage report
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Tag the input records and write a word|POS lexicon
    BuildLexicon {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print the template catalog in priority order
    Templates,
}

impl Cli {
    /// Settings from `--config` (or defaults) with command-line overrides applied.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::from_file(path)?,
            None => Settings::default(),
        };

        if let Some(tagger) = self.tagger {
            settings.tagger = tagger;
        }
        if let Some(lexicon) = &self.lexicon {
            settings.lexicon = Some(lexicon.clone());
            // A lexicon on the command line implies the lexicon tagger.
            if self.tagger.is_none() {
                settings.tagger = TaggerKind::Lexicon;
            }
        }
        if let Some(tokenizer) = &self.tokenizer {
            settings.tokenizer = Some(tokenizer.clone());
        }
        if let Some(templates) = &self.templates {
            settings.templates = Some(templates.clone());
        }
        if let Some(threads) = self.threads {
            settings.threads = Some(threads);
        }
        if let Some(id_column) = &self.id_column {
            settings.id_column = id_column.clone();
        }
        if let Some(text_column) = &self.text_column {
            settings.text_column = text_column.clone();
        }
        if let Some(max) = self.max_sentences_per_template {
            settings.max_sentences_per_template = Some(max);
        }
        Ok(settings)
    }
}
