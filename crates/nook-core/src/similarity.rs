use std::collections::HashSet;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::config::ExtractConfig;
use crate::document::Document;
use crate::tokenizer::token_set;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedMatch {
    pub document: Document,
    /// Jaccard similarity in (threshold, 1].
    pub score: f64,
}

/// |a ∩ b| / |a ∪ b|, or 0 when both sets are empty.
pub fn jaccard<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64
}

/// Jaccard similarity of the two texts' token sets.
pub fn similarity(a: &str, b: &str) -> f64 {
    jaccard(&token_set(a), &token_set(b))
}

pub fn rank(query_text: &str, candidates: &[Document], self_id: Option<&str>) -> Vec<RankedMatch> {
    rank_with(query_text, candidates, self_id, &ExtractConfig::default())
}

/// Candidates scoring above the relevance threshold, best first.
/// Equal scores keep candidate order. `self_id` is never returned.
pub fn rank_with(
    query_text: &str,
    candidates: &[Document],
    self_id: Option<&str>,
    config: &ExtractConfig,
) -> Vec<RankedMatch> {
    let query = token_set(query_text);
    if query.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<RankedMatch> = candidates
        .iter()
        .filter(|doc| self_id != Some(doc.id.as_str()))
        .filter_map(|doc| {
            let score = jaccard(&query, &token_set(&doc.text));
            (score > config.relevance_threshold).then(|| RankedMatch {
                document: doc.clone(),
                score,
            })
        })
        .collect();

    matches.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    matches.truncate(config.max_matches);
    matches
}
