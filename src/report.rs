//! Aggregate report over repeated runs and its plain-text rendering.

use std::fmt::Write as _;
use std::path::PathBuf;

use serde::Serialize;

use crate::metrics::{format_percent, Accuracy, PrfScore};
use crate::runner::RunPaths;

/// All four granularities for one completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunMetrics {
    pub run_index: usize,
    pub paths: RunPaths,
    pub asote: PrfScore,
    pub ate: PrfScore,
    pub atsa: Accuracy,
    pub towe: PrfScore,
}

/// A run skipped because one of its prediction files was absent.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedRun {
    pub run_index: usize,
    pub missing: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    pub dataset: String,
    pub runs: Vec<RunMetrics>,
    pub skipped: Vec<SkippedRun>,
}

/// Which precision/recall/F1 granularity to read from each run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrfGranularity {
    Asote,
    Ate,
    Towe,
}

impl PrfGranularity {
    fn description(self) -> &'static str {
        match self {
            Self::Asote => "asote_metrics_of_multi_runs",
            Self::Ate => "ate_metrics_of_multi_runs",
            Self::Towe => "towe_metrics_of_multi_runs",
        }
    }

    fn select(self, run: &RunMetrics) -> &PrfScore {
        match self {
            Self::Asote => &run.asote,
            Self::Ate => &run.ate,
            Self::Towe => &run.towe,
        }
    }
}

/// Comma-joined per-run series for one granularity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrfSeries {
    pub precisions: String,
    pub recalls: String,
    pub f1s: String,
}

impl AggregateReport {
    pub fn new(dataset: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            runs: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn prf_scores(&self, granularity: PrfGranularity) -> Vec<&PrfScore> {
        self.runs.iter().map(|r| granularity.select(r)).collect()
    }

    pub fn prf_series(&self, granularity: PrfGranularity) -> PrfSeries {
        let scores = self.prf_scores(granularity);
        let join = |f: fn(&PrfScore) -> f64| {
            scores
                .iter()
                .map(|s| format_percent(f(*s)))
                .collect::<Vec<_>>()
                .join(",")
        };
        PrfSeries {
            precisions: join(|s| s.precision),
            recalls: join(|s| s.recall),
            f1s: join(|s| s.f1),
        }
    }

    pub fn accuracy_series(&self) -> String {
        self.runs
            .iter()
            .map(|r| format_percent(r.atsa.accuracy))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Mean precision, recall and F1 over completed runs; `None` when no run
    /// completed.
    pub fn mean(&self, granularity: PrfGranularity) -> Option<(f64, f64, f64)> {
        let scores = self.prf_scores(granularity);
        if scores.is_empty() {
            return None;
        }
        let n = scores.len() as f64;
        let sum = scores.iter().fold((0.0, 0.0, 0.0), |acc, s| {
            (acc.0 + s.precision, acc.1 + s.recall, acc.2 + s.f1)
        });
        Some((sum.0 / n, sum.1 / n, sum.2 / n))
    }

    pub fn mean_accuracy(&self) -> Option<f64> {
        if self.runs.is_empty() {
            return None;
        }
        let sum: f64 = self.runs.iter().map(|r| r.atsa.accuracy).sum();
        Some(sum / self.runs.len() as f64)
    }
}

fn render_prf(out: &mut String, report: &AggregateReport, granularity: PrfGranularity) {
    let series = report.prf_series(granularity);
    let _ = writeln!(out, "{}", granularity.description());
    let _ = writeln!(out, "precision: {}", series.precisions);
    let _ = writeln!(out, "recall: {}", series.recalls);
    let _ = writeln!(out, "f1: {}", series.f1s);
    let _ = writeln!(
        out,
        "{}\t{}\t{}",
        series.precisions, series.recalls, series.f1s
    );
    if let Some((p, r, f1)) = report.mean(granularity) {
        let _ = writeln!(
            out,
            "mean: {} {} {}",
            format_percent(p),
            format_percent(r),
            format_percent(f1)
        );
    }
}

/// Plain-text report: skipped-run notices, then ASOTE, ATE, TOWE and ATSA
/// blocks.
pub fn render_report_text(report: &AggregateReport) -> String {
    let mut out = String::new();
    for skipped in &report.skipped {
        let _ = writeln!(out, "not exist: {}", skipped.missing.display());
    }
    for granularity in [PrfGranularity::Asote, PrfGranularity::Ate, PrfGranularity::Towe] {
        render_prf(&mut out, report, granularity);
    }
    let _ = writeln!(out, "atsa_metrics_of_multi_runs");
    let _ = writeln!(out, "acc: {}", report.accuracy_series());
    if let Some(mean) = report.mean_accuracy() {
        let _ = writeln!(out, "mean: {}", format_percent(mean));
    }
    out
}
