//! Error types for the evaluator.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for evaluator operations.
pub type Result<T> = std::result::Result<T, EvalError>;

/// Errors that can occur while reading, merging or scoring predictions.
#[derive(Debug, Error)]
pub enum EvalError {
    /// A prediction or gold file does not exist.
    #[error("not exist: {}", path.display())]
    MissingFile { path: PathBuf },

    /// A JSON line could not be parsed or lacks a required field.
    #[error("malformed record at {}:{line}: {message}", path.display())]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// An encoded `text-start-end` term string could not be decoded.
    #[error("cannot decode term {input:?}: {reason}")]
    TermCodec { input: String, reason: String },

    /// A ratio had a zero denominator under the fail policy.
    #[error("degenerate metric: {metric} has zero {denominator}")]
    DegenerateMetric {
        metric: &'static str,
        denominator: &'static str,
    },

    /// Bad configuration (template, dataset name, config file).
    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EvalError {
    pub fn missing_file(path: impl Into<PathBuf>) -> Self {
        Self::MissingFile { path: path.into() }
    }

    pub fn malformed(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    pub fn term_codec(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TermCodec {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Get a short error code for logging.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingFile { .. } => "missing_file",
            Self::MalformedRecord { .. } => "malformed_record",
            Self::TermCodec { .. } => "term_codec",
            Self::DegenerateMetric { .. } => "degenerate_metric",
            Self::Config(_) => "config_error",
            Self::Io(_) => "io_error",
            Self::Json(_) => "json_error",
        }
    }

    /// Whether the run that produced this error can be skipped instead of
    /// aborting the whole evaluation.
    pub fn is_skippable(&self) -> bool {
        matches!(self, Self::MissingFile { .. })
    }
}
