//! Fuse content and collaborative candidates into one ranking.
#![forbid(unsafe_code)]

use std::collections::HashMap;

use compass_core::{CollaborativeEvidence, ItemScores, RecommendationSource, StageCounts};

use crate::ConfigError;

const WEIGHT_SUM_TOLERANCE: f32 = 0.000_001_f32;

/// A scored item emitted by one of the engines.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Identifier of the course or consultant.
    pub item_id: String,
    /// Relevance in `0.0..=1.0` for collaborative candidates; boosted
    /// similarity for content candidates.
    pub score: f32,
    /// Peer evidence for collaborative candidates.
    pub evidence: Option<CollaborativeEvidence>,
}

impl Candidate {
    /// Candidate without peer evidence.
    #[must_use]
    pub fn new(item_id: impl Into<String>, score: f32) -> Self {
        Self {
            item_id: item_id.into(),
            score,
            evidence: None,
        }
    }

    /// Attach peer evidence while returning `self` for chaining.
    #[must_use]
    pub fn with_evidence(mut self, evidence: CollaborativeEvidence) -> Self {
        self.evidence = Some(evidence);
        self
    }
}

/// Weights applied to each signal when computing the hybrid score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HybridWeights {
    /// Multiplier applied to content scores.
    pub content: f32,
    /// Multiplier applied to collaborative scores.
    pub collaborative: f32,
}

impl HybridWeights {
    /// Rank by content similarity alone.
    pub const CONTENT_ONLY: Self = Self {
        content: 1.0_f32,
        collaborative: 0.0_f32,
    };

    /// Rank by peer behaviour alone.
    pub const COLLABORATIVE_ONLY: Self = Self {
        content: 0.0_f32,
        collaborative: 1.0_f32,
    };

    /// Validate the weights and return a copy.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidWeights`] when either value is not
    /// finite, is negative, or the pair does not sum to 1.0.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(ConfigError::InvalidWeights {
                content: self.content,
                collaborative: self.collaborative,
            })
        }
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "validation sums weights to check they form a convex blend"
    )]
    fn is_valid(self) -> bool {
        self.content.is_finite()
            && self.collaborative.is_finite()
            && self.content >= 0.0_f32
            && self.collaborative >= 0.0_f32
            && ((self.content + self.collaborative) - 1.0_f32).abs() <= WEIGHT_SUM_TOLERANCE
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "hybrid score is a weighted sum of the two signals"
    )]
    fn blend(self, content: f32, collaborative: f32) -> f32 {
        self.content * content + self.collaborative * collaborative
    }
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self {
            content: 0.5_f32,
            collaborative: 0.5_f32,
        }
    }
}

/// A merged item with its blended scores.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedItem {
    /// Identifier of the course or consultant.
    pub item_id: String,
    /// Content, collaborative and hybrid scores with attribution.
    pub scores: ItemScores,
    /// Evidence of the strongest collaborative candidate, if any.
    pub evidence: Option<CollaborativeEvidence>,
}

struct Accumulator {
    item_id: String,
    content: f32,
    collaborative: f32,
    evidence: Option<CollaborativeEvidence>,
}

/// Merge the two candidate streams and keep the best `limit` items.
///
/// Items keep their first-seen order (content first) until the stable sort
/// by hybrid score. Repeated candidates keep their maximum score per signal.
///
/// # Examples
/// ```
/// use compass_core::RecommendationSource;
/// use compass_scorer::{Candidate, HybridWeights, merge};
///
/// let (items, counts) = merge(
///     vec![Candidate::new("a", 0.4)],
///     vec![Candidate::new("a", 0.6), Candidate::new("b", 0.2)],
///     10,
///     HybridWeights::default(),
/// );
/// assert_eq!(counts.merged, 2);
/// assert_eq!(items[0].item_id, "a");
/// assert_eq!(items[0].scores.source, RecommendationSource::Both);
/// assert_eq!(items[1].scores.source, RecommendationSource::Collaborative);
/// ```
#[must_use]
pub fn merge(
    content: Vec<Candidate>,
    collaborative: Vec<Candidate>,
    limit: usize,
    weights: HybridWeights,
) -> (Vec<MergedItem>, StageCounts) {
    let mut counts = StageCounts {
        content_hits: content.len(),
        collaborative_hits: collaborative.len(),
        ..StageCounts::default()
    };

    let mut order: Vec<Accumulator> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut slot = |item_id: &str, order: &mut Vec<Accumulator>| -> usize {
        if let Some(&position) = positions.get(item_id) {
            return position;
        }
        let position = order.len();
        order.push(Accumulator {
            item_id: item_id.to_owned(),
            content: 0.0_f32,
            collaborative: 0.0_f32,
            evidence: None,
        });
        positions.insert(item_id.to_owned(), position);
        position
    };

    for candidate in content {
        let position = slot(&candidate.item_id, &mut order);
        if let Some(entry) = order.get_mut(position) {
            entry.content = entry.content.max(candidate.score);
        }
    }
    for candidate in collaborative {
        let position = slot(&candidate.item_id, &mut order);
        if let Some(entry) = order.get_mut(position) {
            if entry.evidence.is_none() || candidate.score > entry.collaborative {
                entry.collaborative = entry.collaborative.max(candidate.score);
                entry.evidence = candidate.evidence;
            }
        }
    }

    let mut merged: Vec<MergedItem> = order
        .into_iter()
        .map(|entry| MergedItem {
            scores: ItemScores {
                content_score: entry.content,
                collaborative_score: entry.collaborative,
                hybrid_score: weights.blend(entry.content, entry.collaborative),
                source: attribute(entry.content, entry.collaborative),
            },
            item_id: entry.item_id,
            evidence: entry.evidence,
        })
        .collect();
    merged.sort_by(|lhs, rhs| rhs.scores.hybrid_score.total_cmp(&lhs.scores.hybrid_score));
    counts.merged = merged.len();
    merged.truncate(limit);
    counts.returned = merged.len();
    (merged, counts)
}

fn attribute(content: f32, collaborative: f32) -> RecommendationSource {
    match (content > 0.0_f32, collaborative > 0.0_f32) {
        (true, true) => RecommendationSource::Both,
        (false, true) => RecommendationSource::Collaborative,
        _ => RecommendationSource::ContentBased,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compass_core::{CohortKind, RiskTier};
    use rstest::rstest;

    fn evidence(peer: &str, similarity: f32) -> CollaborativeEvidence {
        CollaborativeEvidence {
            peer_id: peer.to_owned(),
            similarity,
            cohort: CohortKind::TierAndCategory,
            tier: RiskTier::Low,
        }
    }

    #[rstest]
    #[case(0.5, 0.5, true)]
    #[case(1.0, 0.0, true)]
    #[case(0.7, 0.3, true)]
    #[case(0.5, 0.6, false)]
    #[case(-0.5, 1.5, false)]
    #[case(f32::NAN, 0.5, false)]
    fn weight_validation(#[case] content: f32, #[case] collaborative: f32, #[case] ok: bool) {
        let weights = HybridWeights {
            content,
            collaborative,
        };
        assert_eq!(weights.validate().is_ok(), ok);
    }

    #[rstest]
    #[expect(
        clippy::float_arithmetic,
        reason = "test compares floating point scores"
    )]
    fn content_only_item_scales_by_content_weight() {
        let weights = HybridWeights {
            content: 0.7,
            collaborative: 0.3,
        };
        let (items, _) = merge(vec![Candidate::new("a", 0.5)], Vec::new(), 5, weights);
        let item = items.first().expect("one item");
        assert_eq!(item.scores.source, RecommendationSource::ContentBased);
        assert!((item.scores.hybrid_score - 0.35).abs() < 0.000_1_f32);
    }

    #[rstest]
    fn keeps_strongest_collaborative_evidence() {
        let (items, counts) = merge(
            Vec::new(),
            vec![
                Candidate::new("c2", 0.5).with_evidence(evidence("u-weak", 0.5)),
                Candidate::new("c2", 0.8).with_evidence(evidence("u-strong", 0.8)),
            ],
            5,
            HybridWeights::default(),
        );
        assert_eq!(counts.collaborative_hits, 2);
        assert_eq!(counts.merged, 1);
        let item = items.first().expect("one item");
        assert_eq!(item.scores.collaborative_score, 0.8);
        assert_eq!(item.evidence.as_ref().map(|e| e.peer_id.as_str()), Some("u-strong"));
    }

    #[rstest]
    fn ties_keep_first_seen_order_and_truncate() {
        let (items, counts) = merge(
            vec![Candidate::new("x", 0.0), Candidate::new("y", 0.0)],
            vec![Candidate::new("z", 0.0)],
            2,
            HybridWeights::default(),
        );
        let ids: Vec<&str> = items.iter().map(|item| item.item_id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y"]);
        assert_eq!(counts.merged, 3);
        assert_eq!(counts.returned, 2);
    }
}
