//! Repeated-run orchestration: read, merge and score each run's predictions
//! against one fixed gold standard.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{EvalError, Result};
use crate::gold::{DatasetRegistry, GoldStandard, JsonlGoldDataset};
use crate::merge::merge_subtask_results;
use crate::metrics::{
    evaluate_aspect_opinions, evaluate_aspect_sentiment, evaluate_aspect_terms,
    evaluate_triplets, DegeneratePolicy,
};
use crate::reader::{read_ate, read_tosc, read_towe};
use crate::report::{AggregateReport, RunMetrics, SkippedRun};
use crate::types::SubtaskResults;

pub const DEFAULT_RUN_COUNT: usize = 5;
pub const DEFAULT_DATASET: &str = "ASOTEDataRest14";

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    pub dataset_name: String,
    /// Root under which registered datasets live.
    #[serde(default)]
    pub data_dir: PathBuf,
    /// Gold test file; bypasses the dataset registry when set.
    #[serde(default)]
    pub gold_path: Option<PathBuf>,
    pub ate_template: String,
    pub towe_template: String,
    pub tosc_template: String,
    /// Use the templates verbatim for every run.
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_run_count")]
    pub run_count: usize,
    #[serde(default)]
    pub degenerate_policy: DegeneratePolicy,
}

fn default_run_count() -> usize {
    DEFAULT_RUN_COUNT
}

impl EvalConfig {
    pub fn new(
        dataset_name: impl Into<String>,
        ate_template: impl Into<String>,
        towe_template: impl Into<String>,
        tosc_template: impl Into<String>,
    ) -> Self {
        Self {
            dataset_name: dataset_name.into(),
            data_dir: PathBuf::new(),
            gold_path: None,
            ate_template: ate_template.into(),
            towe_template: towe_template.into(),
            tosc_template: tosc_template.into(),
            debug: false,
            run_count: DEFAULT_RUN_COUNT,
            degenerate_policy: DegeneratePolicy::default(),
        }
    }

    /// Load a config from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            EvalError::config(format!("cannot read config {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| EvalError::config(format!("invalid config {}: {e}", path.display())))?;
        Ok(config)
    }

    /// The gold dataset this config points at.
    pub fn gold_dataset(&self) -> Result<JsonlGoldDataset> {
        match &self.gold_path {
            Some(path) => Ok(JsonlGoldDataset::new(&self.dataset_name, path)),
            None => DatasetRegistry::default().resolve(&self.dataset_name, &self.data_dir),
        }
    }

    /// Prediction files for run `index`.
    pub fn run_paths(&self, index: usize) -> Result<RunPaths> {
        let fill = |template: &str| -> Result<PathBuf> {
            if self.debug {
                Ok(PathBuf::from(template))
            } else {
                fill_template(template, index).map(PathBuf::from)
            }
        };
        Ok(RunPaths {
            ate: fill(&self.ate_template)?,
            towe: fill(&self.towe_template)?,
            tosc: fill(&self.tosc_template)?,
        })
    }
}

/// Replace the first `%d` or `%i` in `template` with `index`.
pub fn fill_template(template: &str, index: usize) -> Result<String> {
    let position = ["%d", "%i"]
        .iter()
        .filter_map(|p| template.find(*p))
        .min()
        .ok_or_else(|| {
            EvalError::config(format!(
                "path template {template:?} has no %d or %i run placeholder"
            ))
        })?;
    let mut filled = String::with_capacity(template.len() + 4);
    filled.push_str(&template[..position]);
    filled.push_str(&index.to_string());
    filled.push_str(&template[position + 2..]);
    Ok(filled)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunPaths {
    pub ate: PathBuf,
    pub towe: PathBuf,
    pub tosc: PathBuf,
}

impl RunPaths {
    /// First of the three files (in ATE, TOWE, TOSC order) that is absent.
    pub fn first_missing(&self) -> Option<&Path> {
        [&self.ate, &self.towe, &self.tosc]
            .into_iter()
            .find(|p| !p.exists())
            .map(PathBuf::as_path)
    }
}

// =============================================================================
// Runs
// =============================================================================

/// Read the three prediction files of one run.
pub fn read_predictions(paths: &RunPaths) -> Result<SubtaskResults> {
    Ok(SubtaskResults {
        ate: read_ate(&paths.ate)?,
        tosc: read_tosc(&paths.tosc)?,
        towe: read_towe(&paths.towe)?,
    })
}

/// Score one run at all four granularities.
pub fn evaluate_run(
    run_index: usize,
    paths: &RunPaths,
    gold: &GoldStandard,
    policy: DegeneratePolicy,
) -> Result<RunMetrics> {
    let pred = read_predictions(paths)?;
    let triplets = merge_subtask_results(&pred.ate, &pred.tosc, &pred.towe);
    debug!(
        run_index,
        sentences = triplets.len(),
        triplets = triplets.item_count(),
        "merged subtask predictions"
    );

    Ok(RunMetrics {
        run_index,
        paths: paths.clone(),
        asote: evaluate_triplets(&gold.triplets, &triplets, policy)?,
        ate: evaluate_aspect_terms(&gold.subtasks, &pred, policy)?,
        atsa: evaluate_aspect_sentiment(&gold.subtasks, &pred, policy)?,
        towe: evaluate_aspect_opinions(&gold.subtasks, &pred, policy)?,
    })
}

/// Evaluate every run of `config` against an already loaded gold standard.
///
/// A run with any of its three files absent is skipped and recorded; any
/// other failure aborts the evaluation.
pub fn run_with_gold(config: &EvalConfig, gold: &GoldStandard) -> Result<AggregateReport> {
    let mut report = AggregateReport::new(&gold.dataset);
    for run_index in 0..config.run_count {
        let paths = config.run_paths(run_index)?;
        if let Some(missing) = paths.first_missing() {
            warn!(run_index, path = %missing.display(), "prediction file missing, skipping run");
            report.skipped.push(SkippedRun {
                run_index,
                missing: missing.to_path_buf(),
            });
            continue;
        }

        let metrics = match evaluate_run(run_index, &paths, gold, config.degenerate_policy) {
            Ok(metrics) => metrics,
            // Removed between the existence check and the read.
            Err(EvalError::MissingFile { path }) => {
                warn!(run_index, path = %path.display(), "prediction file missing, skipping run");
                report.skipped.push(SkippedRun {
                    run_index,
                    missing: path,
                });
                continue;
            }
            Err(err) => return Err(err),
        };
        info!(
            run_index,
            precision = metrics.asote.precision,
            recall = metrics.asote.recall,
            f1 = metrics.asote.f1,
            "run evaluated"
        );
        report.runs.push(metrics);
    }
    Ok(report)
}

/// Load gold from the configured dataset, then evaluate every run.
pub fn run(config: &EvalConfig) -> Result<AggregateReport> {
    let dataset = config.gold_dataset()?;
    let gold = GoldStandard::load(&dataset)?;
    run_with_gold(config, &gold)
}
