//! Gold-standard test records and the views derived from them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EvalError, Result};
use crate::reader::JsonlReader;
use crate::term::Term;
use crate::types::{AspectOpinions, AspectSentiment, SentenceMap, SubtaskResults, Triplet};

// =============================================================================
// Records
// =============================================================================

/// One annotated aspect-opinion relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldOpinion {
    pub aspect_term: Term,
    pub opinion_term: Term,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polarity: Option<String>,
}

/// One test sentence with its annotated opinions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldRecord {
    pub sentence: String,
    #[serde(default)]
    pub opinions: Vec<GoldOpinion>,
}

#[derive(Debug, Deserialize)]
struct SampleMetadata {
    original_line_data: GoldRecord,
}

/// A test file line: either the original line data itself or a sample
/// wrapping it under `metadata.original_line_data`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GoldLine {
    Sample { metadata: SampleMetadata },
    Record(GoldRecord),
}

impl From<GoldLine> for GoldRecord {
    fn from(line: GoldLine) -> Self {
        match line {
            GoldLine::Sample { metadata } => metadata.original_line_data,
            GoldLine::Record(record) => record,
        }
    }
}

// =============================================================================
// Dataset providers
// =============================================================================

/// Source of gold test records.
pub trait GoldDataset {
    fn name(&self) -> &str;
    fn test_records(&self) -> Result<Vec<GoldRecord>>;
}

/// Gold records read from a JSONL test file.
#[derive(Debug, Clone)]
pub struct JsonlGoldDataset {
    name: String,
    path: PathBuf,
}

impl JsonlGoldDataset {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GoldDataset for JsonlGoldDataset {
    fn name(&self) -> &str {
        &self.name
    }

    fn test_records(&self) -> Result<Vec<GoldRecord>> {
        let records = JsonlReader::<GoldLine>::open(&self.path)?
            .map(|line| line.map(GoldRecord::from))
            .collect::<Result<Vec<_>>>()?;
        debug!(dataset = %self.name, records = records.len(), "loaded gold records");
        Ok(records)
    }
}

/// Known dataset names and where their test split lives under a data dir.
pub struct DatasetRegistry {
    datasets: HashMap<String, PathBuf>,
}

impl Default for DatasetRegistry {
    fn default() -> Self {
        let mut datasets = HashMap::new();
        for (name, dir) in [
            ("ASOTEDataRest14", "rest14"),
            ("ASOTEDataLapt14", "lapt14"),
            ("ASOTEDataRest15", "rest15"),
            ("ASOTEDataRest16", "rest16"),
        ] {
            datasets.insert(
                name.to_string(),
                Path::new("ASOTE").join(dir).join("test.txt"),
            );
        }
        Self { datasets }
    }
}

impl DatasetRegistry {
    pub fn list(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.datasets.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn insert(&mut self, name: impl Into<String>, relative_path: impl Into<PathBuf>) {
        self.datasets.insert(name.into(), relative_path.into());
    }

    /// Resolve `name` to a dataset rooted at `data_dir`.
    pub fn resolve(&self, name: &str, data_dir: &Path) -> Result<JsonlGoldDataset> {
        let relative = self.datasets.get(name).ok_or_else(|| {
            EvalError::config(format!(
                "unknown dataset {name:?}; known datasets: {}",
                self.list().join(", ")
            ))
        })?;
        Ok(JsonlGoldDataset::new(name, data_dir.join(relative)))
    }
}

// =============================================================================
// Derived gold views
// =============================================================================

/// Gold triplets per sentence. Opinions without a polarity are dropped.
pub fn extract_gold_triplets(records: &[GoldRecord]) -> SentenceMap<Triplet> {
    let mut result = SentenceMap::new();
    for record in records {
        let triplets = result.ensure(&record.sentence);
        for opinion in &record.opinions {
            let Some(polarity) = opinion.polarity.as_deref() else {
                continue;
            };
            triplets.push(Triplet::new(
                &opinion.aspect_term,
                Some(polarity),
                &opinion.opinion_term,
            ));
        }
    }
    result
}

/// Gold in subtask shape, for the ATE / ATSA / TOWE granularities.
///
/// Aspect terms are the distinct aspects of every annotated opinion;
/// polarities are the annotated opinions that carry one; opinion terms are
/// grouped under their aspect.
pub fn extract_gold_subtasks(records: &[GoldRecord]) -> SubtaskResults {
    let mut gold = SubtaskResults::default();
    for record in records {
        let sentence = record.sentence.as_str();
        let aspect_terms = gold.ate.ensure(sentence);
        for opinion in &record.opinions {
            if !aspect_terms.contains(&opinion.aspect_term) {
                aspect_terms.push(opinion.aspect_term.clone());
            }
        }

        let polarities = gold.tosc.ensure(sentence);
        for opinion in &record.opinions {
            if let Some(polarity) = &opinion.polarity {
                polarities.push(AspectSentiment {
                    aspect_term: opinion.aspect_term.clone(),
                    opinion_term: opinion.opinion_term.clone(),
                    polarity: polarity.clone(),
                });
            }
        }

        let grouped = gold.towe.ensure(sentence);
        for opinion in &record.opinions {
            match grouped
                .iter_mut()
                .find(|e| e.aspect_term == opinion.aspect_term)
            {
                Some(entry) => entry.opinions.push(opinion.opinion_term.clone()),
                None => grouped.push(AspectOpinions {
                    aspect_term: opinion.aspect_term.clone(),
                    opinions: vec![opinion.opinion_term.clone()],
                }),
            }
        }
    }
    gold
}

/// Gold computed once and shared by every run.
#[derive(Debug, Clone)]
pub struct GoldStandard {
    pub dataset: String,
    pub triplets: SentenceMap<Triplet>,
    pub subtasks: SubtaskResults,
}

impl GoldStandard {
    pub fn from_records(dataset: impl Into<String>, records: &[GoldRecord]) -> Self {
        Self {
            dataset: dataset.into(),
            triplets: extract_gold_triplets(records),
            subtasks: extract_gold_subtasks(records),
        }
    }

    pub fn load(dataset: &dyn GoldDataset) -> Result<Self> {
        let records = dataset.test_records()?;
        Ok(Self::from_records(dataset.name(), &records))
    }
}
