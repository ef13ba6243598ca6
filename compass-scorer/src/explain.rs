//! Human-readable explanations of a recommendation response.

use compass_core::{
    CollaborativeEvidence, ItemKind, ItemScores, RecommendationItem, RecommendationResponse,
    RecommendationSource, RecommendationStatus, RecommendationSummary, RiskProfile, RiskTier,
};
use serde::Serialize;

/// Build the reason string for an item ranked for a user in `tier`.
///
/// # Examples
/// ```
/// use compass_core::{ItemScores, RecommendationSource, RiskTier};
/// use compass_scorer::reason;
///
/// let scores = ItemScores {
///     content_score: 0.6,
///     collaborative_score: 0.0,
///     hybrid_score: 0.3,
///     source: RecommendationSource::ContentBased,
/// };
/// assert_eq!(reason(&scores, None, RiskTier::Low), "matches your LOW risk profile");
/// ```
#[must_use]
pub fn reason(
    scores: &ItemScores,
    evidence: Option<&CollaborativeEvidence>,
    tier: RiskTier,
) -> String {
    let content = || format!("matches your {tier} risk profile");
    let collaborative = || {
        evidence.map_or_else(
            || format!("users with {tier} risk level also engaged with this"),
            |peer| {
                format!(
                    "users with {} risk level also engaged with this (peer {}, similarity {:.2})",
                    peer.tier, peer.peer_id, peer.similarity
                )
            },
        )
    };
    match scores.source {
        RecommendationSource::ContentBased => content(),
        RecommendationSource::Collaborative => collaborative(),
        RecommendationSource::Both => format!("{}; {}", content(), collaborative()),
    }
}

/// Explanation of one recommended item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemExplanation {
    /// Identifier of the item.
    pub item_id: String,
    /// Kind of the item.
    pub kind: ItemKind,
    /// Title or full name.
    pub name: String,
    /// Final ranking score.
    pub hybrid_score: f32,
    /// Signal attribution.
    pub source: RecommendationSource,
    /// Content similarity factor.
    pub content_factor: f32,
    /// Peer similarity factor.
    pub collaborative_factor: f32,
    /// Peer whose history surfaced the item, if any.
    pub peer_id: Option<String>,
    /// Reason text.
    pub reason: String,
}

impl ItemExplanation {
    fn from_item(item: &RecommendationItem, reason: &str) -> Self {
        let scores = item.scores();
        Self {
            item_id: item.item_id().to_owned(),
            kind: match item {
                RecommendationItem::Course(_) => ItemKind::Course,
                RecommendationItem::Consultant(_) => ItemKind::Consultant,
            },
            name: item.display_name().to_owned(),
            hybrid_score: scores.hybrid_score,
            source: scores.source,
            content_factor: scores.content_score,
            collaborative_factor: scores.collaborative_score,
            peer_id: item.evidence().map(|evidence| evidence.peer_id.clone()),
            reason: reason.to_owned(),
        }
    }
}

/// Explanation of a whole response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    /// Target user.
    pub user_id: String,
    /// Profile the ranking used.
    pub risk_profile: RiskProfile,
    /// Pipeline counts.
    pub summary: RecommendationSummary,
    /// Outcome classification.
    pub status: RecommendationStatus,
    /// Course entries in ranked order.
    pub course_explanations: Vec<ItemExplanation>,
    /// Consultant entries in ranked order.
    pub consultant_explanations: Vec<ItemExplanation>,
}

/// Explain every item in `response`.
#[must_use]
pub fn explain(response: &RecommendationResponse) -> Explanation {
    let courses = response.courses.iter().map(|course| {
        ItemExplanation::from_item(&RecommendationItem::Course(course.clone()), &course.reason)
    });
    let consultants = response.consultants.iter().map(|consultant| {
        ItemExplanation::from_item(
            &RecommendationItem::Consultant(consultant.clone()),
            &consultant.reason,
        )
    });
    Explanation {
        user_id: response.user_id.clone(),
        risk_profile: response.risk_profile.clone(),
        summary: response.summary,
        status: response.status,
        course_explanations: courses.collect(),
        consultant_explanations: consultants.collect(),
    }
}
