//! Shared types: sentence-keyed maps, subtask predictions and triplets.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::term::Term;

// =============================================================================
// Sentence-keyed map
// =============================================================================

/// Sentence-keyed lists.
///
/// Looking up a sentence that was never inserted yields an empty slice; the
/// absence of a sentence is never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceMap<T> {
    entries: HashMap<String, Vec<T>>,
}

impl<T> Default for SentenceMap<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> SentenceMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Items for `sentence`, empty if the sentence is absent.
    pub fn get(&self, sentence: &str) -> &[T] {
        self.entries
            .get(sentence)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, sentence: &str) -> bool {
        self.entries.contains_key(sentence)
    }

    /// Register `sentence` with an empty list if it is not present yet.
    pub fn ensure(&mut self, sentence: &str) -> &mut Vec<T> {
        self.entries.entry(sentence.to_string()).or_default()
    }

    /// Append one item to `sentence`.
    pub fn push(&mut self, sentence: &str, item: T) {
        self.ensure(sentence).push(item);
    }

    /// Replace the items of `sentence`.
    pub fn replace(&mut self, sentence: impl Into<String>, items: Vec<T>) {
        self.entries.insert(sentence.into(), items);
    }

    /// Sentences present in the map, in arbitrary order.
    pub fn sentences(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[T])> {
        self.entries
            .iter()
            .map(|(sentence, items)| (sentence.as_str(), items.as_slice()))
    }

    /// Number of sentences.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of items across all sentences.
    pub fn item_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}

impl<T> FromIterator<(String, Vec<T>)> for SentenceMap<T> {
    fn from_iter<I: IntoIterator<Item = (String, Vec<T>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

// =============================================================================
// Subtask predictions
// =============================================================================

/// A polarity attached to one aspect-opinion pair (TOSC output, or a gold
/// annotation carrying a polarity).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectSentiment {
    pub aspect_term: Term,
    pub opinion_term: Term,
    pub polarity: String,
}

/// Opinion terms extracted for one aspect (TOWE output).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectOpinions {
    pub aspect_term: Term,
    pub opinions: Vec<Term>,
}

/// The three subtask outputs, each keyed by sentence.
#[derive(Debug, Clone, Default)]
pub struct SubtaskResults {
    pub ate: SentenceMap<Term>,
    pub tosc: SentenceMap<AspectSentiment>,
    pub towe: SentenceMap<AspectOpinions>,
}

impl SubtaskResults {
    /// Every sentence any of the three subtasks mentions.
    pub fn sentences(&self) -> BTreeSet<&str> {
        self.ate
            .sentences()
            .chain(self.tosc.sentences())
            .chain(self.towe.sentences())
            .collect()
    }

    /// Borrow everything the three subtasks produced for `sentence`.
    pub fn sentence(&self, sentence: &str) -> SentenceView<'_> {
        SentenceView {
            aspect_terms: self.ate.get(sentence),
            polarities: self.tosc.get(sentence),
            opinions: self.towe.get(sentence),
        }
    }
}

/// One sentence's slice of [`SubtaskResults`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SentenceView<'a> {
    pub aspect_terms: &'a [Term],
    pub polarities: &'a [AspectSentiment],
    pub opinions: &'a [AspectOpinions],
}

// =============================================================================
// Triplets
// =============================================================================

/// Sentiment written into a triplet when no polarity was predicted for the
/// aspect-opinion pair.
pub const MISSING_SENTIMENT: &str = "-";

/// An `aspect_sentiment_opinion` triplet in its canonical string form.
///
/// Triplets compare by string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Triplet(String);

impl Triplet {
    pub fn new(aspect: &Term, sentiment: Option<&str>, opinion: &Term) -> Self {
        let sentiment = sentiment.unwrap_or(MISSING_SENTIMENT);
        Self(format!("{aspect}_{sentiment}_{opinion}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Triplet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_sentence_is_empty() {
        let map: SentenceMap<Term> = SentenceMap::new();
        assert!(map.get("nothing here").is_empty());
        assert!(!map.contains("nothing here"));
    }

    #[test]
    fn push_appends_and_ensure_registers() {
        let mut map = SentenceMap::new();
        map.push("s", Term::new("a", 0, 1));
        map.push("s", Term::new("b", 2, 3));
        map.ensure("t");
        assert_eq!(map.get("s").len(), 2);
        assert!(map.contains("t"));
        assert!(map.get("t").is_empty());
        assert_eq!(map.len(), 2);
        assert_eq!(map.item_count(), 2);
    }

    #[test]
    fn triplet_string_form() {
        let aspect = Term::new("food", 4, 8);
        let opinion = Term::new("great", 13, 18);
        assert_eq!(
            Triplet::new(&aspect, Some("positive"), &opinion).as_str(),
            "food-4-8_positive_great-13-18"
        );
        assert_eq!(
            Triplet::new(&aspect, None, &opinion).to_string(),
            "food-4-8_-_great-13-18"
        );
    }

    #[test]
    fn view_of_absent_sentence_is_empty() {
        let results = SubtaskResults::default();
        let view = results.sentence("missing");
        assert!(view.aspect_terms.is_empty());
        assert!(view.polarities.is_empty());
        assert!(view.opinions.is_empty());
    }
}
