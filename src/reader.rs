//! Line-delimited JSON readers for the three subtask prediction files.
//!
//! Every reader turns a file of one-JSON-object-per-line records into a
//! [`SentenceMap`] keyed by the record's `text`. Terms are decoded into
//! [`Term`] at this boundary, whatever shape the subtask wrote them in.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::{EvalError, Result};
use crate::term::Term;
use crate::types::{AspectOpinions, AspectSentiment, SentenceMap};

// =============================================================================
// JSONL streaming
// =============================================================================

/// Streams parsed records from a JSONL file, one per non-blank line.
pub struct JsonlReader<T> {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_no: usize,
    _record: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(EvalError::missing_file(path));
            }
            Err(err) => return Err(err.into()),
        };
        debug!(path = %path.display(), "reading jsonl records");
        Ok(Self {
            path,
            lines: BufReader::new(file).lines(),
            line_no: 0,
            _record: PhantomData,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Line number of the most recently yielded record (1-based).
    pub fn line_no(&self) -> usize {
        self.line_no
    }
}

impl<T: DeserializeOwned> Iterator for JsonlReader<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => return Some(Err(err.into())),
            };
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            return Some(
                serde_json::from_str(&line)
                    .map_err(|e| EvalError::malformed(&self.path, self.line_no, e.to_string())),
            );
        }
    }
}

// =============================================================================
// Record shapes
// =============================================================================

#[derive(Debug, Deserialize)]
struct AteRecord {
    text: String,
    pred: Vec<Term>,
}

#[derive(Debug, Deserialize)]
struct ToscPair {
    aspect_term: Term,
    opinion_term: Term,
}

#[derive(Debug, Deserialize)]
struct ToscRecord {
    text: String,
    opinion: ToscPair,
    sentiment_pred: String,
}

#[derive(Debug, Deserialize)]
struct ToweRecord {
    text: String,
    aspect_terms: Vec<String>,
    pred: Vec<String>,
}

// =============================================================================
// Subtask readers
// =============================================================================

/// Read ATE predictions: sentence -> predicted aspect terms.
///
/// A sentence seen twice keeps the aspect terms of its last record.
pub fn read_ate(path: impl AsRef<Path>) -> Result<SentenceMap<Term>> {
    let mut result = SentenceMap::new();
    for record in JsonlReader::<AteRecord>::open(path)? {
        let record = record?;
        result.replace(record.text, record.pred);
    }
    Ok(result)
}

/// Read TOSC predictions: sentence -> polarity per aspect-opinion pair.
pub fn read_tosc(path: impl AsRef<Path>) -> Result<SentenceMap<AspectSentiment>> {
    let mut result = SentenceMap::new();
    for record in JsonlReader::<ToscRecord>::open(path)? {
        let record = record?;
        result.push(
            &record.text,
            AspectSentiment {
                aspect_term: record.opinion.aspect_term,
                opinion_term: record.opinion.opinion_term,
                polarity: record.sentiment_pred,
            },
        );
    }
    Ok(result)
}

/// Read TOWE predictions: sentence -> opinion terms per aspect.
///
/// Only the first entry of `aspect_terms` is used. Aspect and opinion terms
/// arrive in encoded `text-start-end` form and are decoded here.
pub fn read_towe(path: impl AsRef<Path>) -> Result<SentenceMap<AspectOpinions>> {
    let mut result = SentenceMap::new();
    let mut reader = JsonlReader::<ToweRecord>::open(path)?;
    while let Some(record) = reader.next() {
        let record = record?;
        let Some(aspect) = record.aspect_terms.first() else {
            return Err(EvalError::malformed(
                reader.path(),
                reader.line_no(),
                "aspect_terms is empty",
            ));
        };
        let aspect_term = Term::decode(aspect)?;
        let opinions = record
            .pred
            .iter()
            .map(|e| Term::decode(e))
            .collect::<Result<Vec<_>>>()?;
        result.push(
            &record.text,
            AspectOpinions {
                aspect_term,
                opinions,
            },
        );
    }
    Ok(result)
}
