#![forbid(unsafe_code)]

//! # asote-eval
//!
//! Evaluation of a three-stage opinion-mining pipeline. Aspect term
//! extraction (ATE), target-oriented opinion word extraction (TOWE) and
//! target-oriented sentiment classification (TOSC) each write their own
//! predictions; this crate merges them into aspect-sentiment-opinion
//! triplets (ASOTE) and scores them against gold annotations.
//!
//! Scores are micro-averaged over sentences at four granularities: full
//! triplets, aspect terms, aspect sentiment (accuracy) and aspect-opinion
//! pairs. Evaluation repeats over several prediction runs; a run whose
//! files are missing is skipped.

pub mod error;
pub mod gold;
pub mod merge;
pub mod metrics;
pub mod projection;
pub mod reader;
pub mod report;
pub mod runner;
pub mod term;
pub mod types;

pub use error::{EvalError, Result};
pub use gold::{GoldDataset, GoldRecord, GoldStandard, JsonlGoldDataset};
pub use merge::merge_subtask_results;
pub use metrics::{DegeneratePolicy, MatchCounts, PrfScore};
pub use report::{AggregateReport, RunMetrics};
pub use runner::{run, run_with_gold, EvalConfig};
pub use term::Term;
pub use types::{SentenceMap, SubtaskResults, Triplet};
