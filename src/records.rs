//! CSV input and output: source records, the candidate store and final rows.

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use crate::bag::WordBag;
use crate::normalize::normalize;

/// One input row reduced to its identifier and word multiset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub id: String,
    pub words: WordBag,
}

impl Record {
    pub fn new(id: impl Into<String>, words: WordBag) -> Self {
        Self {
            id: id.into(),
            words,
        }
    }

    /// Build a record straight from raw text.
    pub fn from_text(id: impl Into<String>, text: &str) -> Self {
        Self::new(id, normalize(text))
    }
}

/// A generated sentence and the record it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub sentence: String,
}

/// Final output row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedRow {
    pub id: String,
    pub combined_sentence: String,
}

/// Which input columns hold the record id and its text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Columns {
    pub id: String,
    pub text: String,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            id: "id".to_string(),
            text: "text".to_string(),
        }
    }
}

/// Open a file for reading, decompressing `.gz` files on the fly.
pub fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let reader: Box<dyn Read> = if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(reader)
}

/// Read records from CSV. Rows without an id column are keyed by row index.
pub fn read_records_from<R: Read>(reader: R, columns: &Columns) -> Result<Vec<Record>> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers()?.clone();

    let text_ix = match headers.iter().position(|h| h == columns.text) {
        Some(ix) => ix,
        None => bail!(
            "text column {:?} not found; available columns: {:?}",
            columns.text,
            headers.iter().collect::<Vec<_>>()
        ),
    };
    let id_ix = headers.iter().position(|h| h == columns.id);

    let mut records = Vec::new();
    for (row_ix, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("Failed to read CSV row {}", row_ix + 1))?;
        let id = match id_ix {
            Some(ix) => row.get(ix).unwrap_or_default().to_string(),
            None => row_ix.to_string(),
        };
        let text = row.get(text_ix).unwrap_or_default();
        records.push(Record::from_text(id, text));
    }
    Ok(records)
}

pub fn read_records(path: &Path, columns: &Columns) -> Result<Vec<Record>> {
    read_records_from(open_input(path)?, columns)
        .with_context(|| format!("Failed to load records from {}", path.display()))
}

pub fn read_candidates_from<R: Read>(reader: R) -> Result<Vec<Candidate>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut candidates = Vec::new();
    for result in reader.deserialize() {
        let candidate: Candidate = result?;
        candidates.push(candidate);
    }
    Ok(candidates)
}

pub fn read_candidates(path: &Path) -> Result<Vec<Candidate>> {
    read_candidates_from(open_input(path)?)
        .with_context(|| format!("Failed to load candidates from {}", path.display()))
}

/// Write rows with a header line derived from the row type's field names.
pub fn write_rows_to<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_rows_to(file, rows).with_context(|| format!("Failed to write {}", path.display()))
}
