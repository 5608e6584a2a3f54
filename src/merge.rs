//! Merge per-subtask predictions into ASOTE triplets.

use std::collections::HashMap;

use crate::term::Term;
use crate::types::{AspectOpinions, AspectSentiment, SentenceMap, Triplet};

/// Combine ATE, TOSC and TOWE predictions into per-sentence triplets.
///
/// ATE defines the sentences considered; sentences only present in `tosc` or
/// `towe` are ignored. An aspect with no TOWE opinion yields no triplet. A
/// pair with no TOSC polarity gets the `-` sentiment. Triplets are not
/// deduplicated.
pub fn merge_subtask_results(
    ate: &SentenceMap<Term>,
    tosc: &SentenceMap<AspectSentiment>,
    towe: &SentenceMap<AspectOpinions>,
) -> SentenceMap<Triplet> {
    let mut result = SentenceMap::new();
    for (sentence, aspect_terms) in ate.iter() {
        let triplets = result.ensure(sentence);

        // A repeated aspect keeps the opinions of its last TOWE record.
        let opinions_by_aspect: HashMap<&Term, &[Term]> = towe
            .get(sentence)
            .iter()
            .map(|e| (&e.aspect_term, e.opinions.as_slice()))
            .collect();

        let polarity_by_pair: HashMap<(&Term, &Term), &str> = tosc
            .get(sentence)
            .iter()
            .map(|e| ((&e.aspect_term, &e.opinion_term), e.polarity.as_str()))
            .collect();

        for aspect in aspect_terms {
            let Some(opinions) = opinions_by_aspect.get(aspect) else {
                continue;
            };
            for opinion in opinions.iter() {
                let sentiment = polarity_by_pair.get(&(aspect, opinion)).copied();
                triplets.push(Triplet::new(aspect, sentiment, opinion));
            }
        }
    }
    result
}
