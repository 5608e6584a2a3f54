//! Project one sentence's subtask results onto the sets compared for each
//! evaluation granularity. Empty inputs give empty sets.

use std::collections::HashSet;

use crate::types::SentenceView;

/// Encoded aspect terms.
pub fn aspect_terms_of(sentence: &SentenceView<'_>) -> HashSet<String> {
    sentence.aspect_terms.iter().map(|t| t.encode()).collect()
}

/// `aspect__polarity` keys, one per polarity entry.
pub fn aspect_sentiment_of(sentence: &SentenceView<'_>) -> HashSet<String> {
    sentence
        .polarities
        .iter()
        .map(|e| format!("{}__{}", e.aspect_term, e.polarity))
        .collect()
}

/// `aspect__opinion` keys. Aspects without opinions contribute nothing.
pub fn aspect_opinions_of(sentence: &SentenceView<'_>) -> HashSet<String> {
    let mut result = HashSet::new();
    for entry in sentence.opinions {
        let mut opinions: Vec<_> = entry.opinions.iter().collect();
        opinions.sort_by_key(|t| t.start);
        for opinion in opinions {
            result.insert(format!("{}__{}", entry.aspect_term, opinion));
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Term;
    use crate::types::{AspectOpinions, AspectSentiment};

    #[test]
    fn empty_view_projects_to_empty_sets() {
        let view = SentenceView::default();
        assert!(aspect_terms_of(&view).is_empty());
        assert!(aspect_sentiment_of(&view).is_empty());
        assert!(aspect_opinions_of(&view).is_empty());
    }

    #[test]
    fn projections_use_double_underscore_keys() {
        let aspect = Term::new("food", 4, 8);
        let aspect_terms = vec![aspect.clone(), aspect.clone()];
        let polarities = vec![AspectSentiment {
            aspect_term: aspect.clone(),
            opinion_term: Term::new("great", 13, 18),
            polarity: "positive".to_string(),
        }];
        let opinions = vec![
            AspectOpinions {
                aspect_term: aspect.clone(),
                opinions: vec![Term::new("hot", 30, 33), Term::new("great", 13, 18)],
            },
            AspectOpinions {
                aspect_term: Term::new("staff", 40, 45),
                opinions: vec![],
            },
        ];
        let view = SentenceView {
            aspect_terms: &aspect_terms,
            polarities: &polarities,
            opinions: &opinions,
        };

        assert_eq!(aspect_terms_of(&view), HashSet::from(["food-4-8".to_string()]));
        assert_eq!(
            aspect_sentiment_of(&view),
            HashSet::from(["food-4-8__positive".to_string()])
        );
        assert_eq!(
            aspect_opinions_of(&view),
            HashSet::from([
                "food-4-8__great-13-18".to_string(),
                "food-4-8__hot-30-33".to_string(),
            ])
        );
    }
}
