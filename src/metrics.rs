//! Micro-averaged scoring for the four evaluation granularities.
//!
//! Counts are summed over every gold sentence before any ratio is taken.
//! Scores are percentages; they print with three decimals.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{EvalError, Result};
use crate::projection::{aspect_opinions_of, aspect_sentiment_of, aspect_terms_of};
use crate::types::{SentenceMap, SentenceView, SubtaskResults, Triplet};

// =============================================================================
// Types
// =============================================================================

/// What to do when a ratio's denominator is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneratePolicy {
    /// Report the ratio as 0 and log a warning.
    #[default]
    Zero,
    /// Return [`EvalError::DegenerateMetric`].
    Fail,
}

/// Summed gold, predicted and matched counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCounts {
    pub true_count: usize,
    pub pred_count: usize,
    pub tp: usize,
}

impl std::ops::AddAssign for MatchCounts {
    fn add_assign(&mut self, other: Self) {
        self.true_count += other.true_count;
        self.pred_count += other.pred_count;
        self.tp += other.tp;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrfScore {
    pub counts: MatchCounts,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Accuracy {
    pub correct: usize,
    pub total: usize,
    pub accuracy: f64,
}

/// Format a percentage the way reports print it.
pub fn format_percent(value: f64) -> String {
    format!("{value:.3}")
}

// =============================================================================
// Ratios
// =============================================================================

fn degenerate(
    metric: &'static str,
    denominator: &'static str,
    policy: DegeneratePolicy,
) -> Result<f64> {
    match policy {
        DegeneratePolicy::Zero => {
            warn!(metric, denominator, "zero denominator, reporting 0");
            Ok(0.0)
        }
        DegeneratePolicy::Fail => Err(EvalError::DegenerateMetric {
            metric,
            denominator,
        }),
    }
}

fn percent(
    metric: &'static str,
    denominator_name: &'static str,
    numerator: usize,
    denominator: usize,
    policy: DegeneratePolicy,
) -> Result<f64> {
    if denominator == 0 {
        return degenerate(metric, denominator_name, policy);
    }
    Ok(numerator as f64 / denominator as f64 * 100.0)
}

/// Precision = tp / pred_count, recall = tp / true_count, F1 their harmonic
/// mean; all as percentages.
pub fn precision_recall_f1(
    true_count: usize,
    pred_count: usize,
    tp: usize,
    policy: DegeneratePolicy,
) -> Result<PrfScore> {
    let precision = percent("precision", "predicted count", tp, pred_count, policy)?;
    let recall = percent("recall", "true count", tp, true_count, policy)?;
    let f1 = if precision + recall == 0.0 {
        degenerate("f1", "precision + recall", policy)?
    } else {
        2.0 * precision * recall / (precision + recall)
    };
    Ok(PrfScore {
        counts: MatchCounts {
            true_count,
            pred_count,
            tp,
        },
        precision,
        recall,
        f1,
    })
}

impl MatchCounts {
    pub fn score(self, policy: DegeneratePolicy) -> Result<PrfScore> {
        precision_recall_f1(self.true_count, self.pred_count, self.tp, policy)
    }
}

// =============================================================================
// Granularities
// =============================================================================

/// Count triplets over every gold sentence. Matching is list containment, so
/// repeated triplets count once per occurrence on both sides.
pub fn count_triplets(gold: &SentenceMap<Triplet>, pred: &SentenceMap<Triplet>) -> MatchCounts {
    let mut counts = MatchCounts::default();
    for (sentence, triplets_true) in gold.iter() {
        let triplets_pred = pred.get(sentence);
        counts.true_count += triplets_true.len();
        counts.pred_count += triplets_pred.len();
        counts.tp += triplets_true
            .iter()
            .filter(|t| triplets_pred.contains(t))
            .count();
    }
    counts
}

/// ASOTE: full aspect-sentiment-opinion triplets.
pub fn evaluate_triplets(
    gold: &SentenceMap<Triplet>,
    pred: &SentenceMap<Triplet>,
    policy: DegeneratePolicy,
) -> Result<PrfScore> {
    count_triplets(gold, pred).score(policy)
}

fn count_projected(
    gold: &SubtaskResults,
    pred: &SubtaskResults,
    project: fn(&SentenceView<'_>) -> HashSet<String>,
) -> MatchCounts {
    let mut counts = MatchCounts::default();
    for sentence in gold.sentences() {
        let keys_true = project(&gold.sentence(sentence));
        let keys_pred = project(&pred.sentence(sentence));
        counts.true_count += keys_true.len();
        counts.pred_count += keys_pred.len();
        counts.tp += keys_true.intersection(&keys_pred).count();
    }
    counts
}

/// ATE: aspect terms.
pub fn evaluate_aspect_terms(
    gold: &SubtaskResults,
    pred: &SubtaskResults,
    policy: DegeneratePolicy,
) -> Result<PrfScore> {
    count_projected(gold, pred, aspect_terms_of).score(policy)
}

/// TOWE: aspect-opinion pairs.
pub fn evaluate_aspect_opinions(
    gold: &SubtaskResults,
    pred: &SubtaskResults,
    policy: DegeneratePolicy,
) -> Result<PrfScore> {
    count_projected(gold, pred, aspect_opinions_of).score(policy)
}

/// ATSA: share of gold aspect-polarity pairs that were predicted. There is
/// no predicted-count term, so this is an accuracy over gold only.
pub fn evaluate_aspect_sentiment(
    gold: &SubtaskResults,
    pred: &SubtaskResults,
    policy: DegeneratePolicy,
) -> Result<Accuracy> {
    let counts = count_projected(gold, pred, aspect_sentiment_of);
    let accuracy = percent("accuracy", "gold count", counts.tp, counts.true_count, policy)?;
    Ok(Accuracy {
        correct: counts.tp,
        total: counts.true_count,
        accuracy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Term;

    fn triplet(aspect: &str, sentiment: &str, opinion: &str) -> Triplet {
        Triplet::new(
            &Term::new(aspect, 0, 1),
            Some(sentiment),
            &Term::new(opinion, 2, 3),
        )
    }

    #[test]
    fn prf_formats_to_three_decimals() {
        let score = precision_recall_f1(3, 2, 1, DegeneratePolicy::Fail).unwrap();
        assert_eq!(format_percent(score.precision), "50.000");
        assert_eq!(format_percent(score.recall), "33.333");
        assert_eq!(format_percent(score.f1), "40.000");
    }

    #[test]
    fn aggregation_is_micro() {
        let mut gold = SentenceMap::new();
        let mut pred = SentenceMap::new();
        gold.push("s1", triplet("a", "pos", "o"));
        pred.push("s1", triplet("a", "pos", "o"));
        for name in ["b", "c", "d"] {
            gold.push("s2", triplet(name, "neg", "o"));
        }
        pred.push("s2", triplet("e", "neg", "o"));

        let score = evaluate_triplets(&gold, &pred, DegeneratePolicy::Fail).unwrap();
        assert_eq!(
            score.counts,
            MatchCounts {
                true_count: 4,
                pred_count: 2,
                tp: 1
            }
        );
        assert_eq!(format_percent(score.precision), "50.000");
        assert_eq!(format_percent(score.recall), "25.000");
    }

    #[test]
    fn empty_inputs_count_nothing() {
        let counts = count_triplets(&SentenceMap::new(), &SentenceMap::new());
        assert_eq!(counts, MatchCounts::default());
    }

    #[test]
    fn zero_policy_reports_zero_instead_of_nan() {
        let score =
            evaluate_triplets(&SentenceMap::new(), &SentenceMap::new(), DegeneratePolicy::Zero)
                .unwrap();
        assert_eq!(score.precision, 0.0);
        assert_eq!(score.recall, 0.0);
        assert_eq!(score.f1, 0.0);
    }

    #[test]
    fn fail_policy_rejects_zero_denominators() {
        let err = precision_recall_f1(0, 5, 0, DegeneratePolicy::Fail).unwrap_err();
        assert_eq!(err.code(), "degenerate_metric");
        assert!(precision_recall_f1(5, 0, 0, DegeneratePolicy::Fail).is_err());
        // Both denominators fine, but nothing matched.
        assert!(precision_recall_f1(5, 5, 0, DegeneratePolicy::Fail).is_err());
        assert!(precision_recall_f1(5, 5, 0, DegeneratePolicy::Zero).unwrap().f1 == 0.0);
    }

    #[test]
    fn duplicate_predictions_inflate_counts() {
        let mut gold = SentenceMap::new();
        let mut pred = SentenceMap::new();
        gold.push("s", triplet("a", "pos", "o"));
        pred.push("s", triplet("a", "pos", "o"));
        pred.push("s", triplet("a", "pos", "o"));
        let counts = count_triplets(&gold, &pred);
        assert_eq!(counts.pred_count, 2);
        assert_eq!(counts.tp, 1);
    }

    #[test]
    fn aspect_sentiment_is_accuracy_over_gold() {
        let mut gold = SubtaskResults::default();
        let mut pred = SubtaskResults::default();
        let aspect = Term::new("food", 4, 8);
        let opinion = Term::new("great", 13, 18);
        for (aspect_text, polarity) in [("food", "positive"), ("staff", "negative")] {
            gold.tosc.push(
                "s",
                crate::types::AspectSentiment {
                    aspect_term: Term::new(aspect_text, 4, 8),
                    opinion_term: opinion.clone(),
                    polarity: polarity.to_string(),
                },
            );
        }
        pred.tosc.push(
            "s",
            crate::types::AspectSentiment {
                aspect_term: aspect,
                opinion_term: opinion,
                polarity: "positive".to_string(),
            },
        );

        let acc = evaluate_aspect_sentiment(&gold, &pred, DegeneratePolicy::Fail).unwrap();
        assert_eq!((acc.correct, acc.total), (1, 2));
        assert_eq!(format_percent(acc.accuracy), "50.000");
    }
}
