//! Peer-cohort collaborative filtering.
//!
//! The cohort is drawn from users whose current profile shares the target's
//! tier and survey category, falling back to the tier alone when the strict
//! cohort has no relevant history. Peers are ranked by cosine similarity of
//! their rating rows and endorse the items they rated highly.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use compass_core::{
    CohortKind, CollaborativeEvidence, InteractionRecord, ItemKind, RiskProfile, RiskTier,
};
use log::{debug, warn};

use crate::{Candidate, ConfigError};

type Ratings<'a> = BTreeMap<&'a str, f32>;

/// Thresholds governing cohort selection and endorsement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CohortConfig {
    /// Peers below this similarity are ignored.
    pub similarity_threshold: f32,
    /// Minimum peer rating for a course to be endorsed.
    pub course_endorsement: f32,
    /// Minimum peer rating for a consultant to be endorsed.
    pub consultant_endorsement: f32,
    /// Rating at which the target counts as already engaged with a consultant.
    pub consultant_engaged: f32,
    /// Optional cap on the number of peers consulted.
    pub max_peers: Option<usize>,
}

impl CohortConfig {
    /// Validate the thresholds and return a copy.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidThreshold`] naming the first threshold
    /// that is not a finite, non-negative value.
    pub fn validate(self) -> Result<Self, ConfigError> {
        for (name, value) in [
            ("similarity threshold", self.similarity_threshold),
            ("course endorsement threshold", self.course_endorsement),
            ("consultant endorsement threshold", self.consultant_endorsement),
            ("consultant engagement threshold", self.consultant_engaged),
        ] {
            if !value.is_finite() || value < 0.0_f32 {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }
        Ok(self)
    }

    const fn endorsement(&self, kind: ItemKind) -> f32 {
        match kind {
            ItemKind::Course => self.course_endorsement,
            ItemKind::Consultant => self.consultant_endorsement,
        }
    }
}

impl Default for CohortConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.1_f32,
            course_endorsement: 0.4_f32,
            consultant_endorsement: 0.5_f32,
            consultant_engaged: 0.5_f32,
            max_peers: None,
        }
    }
}

/// Collaborative engine over one snapshot of profiles and interactions.
#[derive(Debug, Clone, Copy)]
pub struct CollaborativeEngine<'a> {
    config: CohortConfig,
    profiles: &'a BTreeMap<String, RiskProfile>,
    interactions: &'a [InteractionRecord],
}

impl<'a> CollaborativeEngine<'a> {
    /// Build an engine over resolved `profiles` and raw `interactions`.
    #[must_use]
    pub const fn new(
        config: CohortConfig,
        profiles: &'a BTreeMap<String, RiskProfile>,
        interactions: &'a [InteractionRecord],
    ) -> Self {
        Self {
            config,
            profiles,
            interactions,
        }
    }

    /// Rank items of `kind` for `user_id` using peer endorsements.
    ///
    /// Only ids in `catalog` are returned. The list is empty when the target
    /// has no interactions of the kind or no cohort member does.
    #[must_use]
    pub fn rank(
        &self,
        user_id: &str,
        profile: &RiskProfile,
        kind: ItemKind,
        catalog: &BTreeSet<&str>,
        top_k: usize,
    ) -> Vec<Candidate> {
        let matrix = rating_matrix(self.interactions, kind);
        let Some(target) = matrix.get(user_id) else {
            debug!("user {user_id} has no {kind} interactions; skipping collaborative ranking");
            return Vec::new();
        };

        let tier = profile.effective_tier();
        let Some((cohort, cohort_kind)) = self.cohort(user_id, profile, &matrix, kind) else {
            debug!("no {tier} cohort with {kind} interactions for user {user_id}");
            return Vec::new();
        };

        let peers = self.similar_peers(target, &cohort, &matrix);
        let engaged = self.engaged_items(user_id, kind);
        let threshold = self.config.endorsement(kind);

        let mut seen: HashSet<&str> = HashSet::new();
        let mut candidates = Vec::new();
        for (peer_id, similarity) in peers {
            let Some(row) = matrix.get(peer_id) else {
                continue;
            };
            for (&item_id, &rating) in row {
                if rating < threshold
                    || engaged.contains(item_id)
                    || !catalog.contains(item_id)
                    || !seen.insert(item_id)
                {
                    continue;
                }
                candidates.push(Candidate::new(item_id, similarity).with_evidence(
                    CollaborativeEvidence {
                        peer_id: peer_id.to_owned(),
                        similarity,
                        cohort: cohort_kind,
                        tier,
                    },
                ));
            }
        }
        candidates.sort_by(|lhs, rhs| rhs.score.total_cmp(&lhs.score));
        candidates.truncate(top_k);
        debug!(
            "collaborative {kind} ranking for {user_id}: {} candidates",
            candidates.len()
        );
        candidates
    }

    fn cohort<'m>(
        &self,
        user_id: &str,
        profile: &RiskProfile,
        matrix: &BTreeMap<&'m str, Ratings<'m>>,
        kind: ItemKind,
    ) -> Option<(Vec<&'m str>, CohortKind)> {
        let tier = profile.effective_tier();
        if let Some(category) = profile.survey_category.as_deref() {
            let strict = self.members(user_id, tier, Some(category), matrix);
            if !strict.is_empty() {
                return Some((strict, CohortKind::TierAndCategory));
            }
            warn!(
                "no {tier}/{category} peers with {kind} interactions for {user_id}; \
                 falling back to tier-only cohort"
            );
        }
        let relaxed = self.members(user_id, tier, None, matrix);
        (!relaxed.is_empty()).then_some((relaxed, CohortKind::TierOnly))
    }

    fn members<'m>(
        &self,
        user_id: &str,
        tier: RiskTier,
        category: Option<&str>,
        matrix: &BTreeMap<&'m str, Ratings<'m>>,
    ) -> Vec<&'m str> {
        matrix
            .keys()
            .copied()
            .filter(|member| *member != user_id)
            .filter(|member| {
                self.profiles.get(*member).is_some_and(|peer| {
                    peer.risk_tier == Some(tier)
                        && category.is_none_or(|wanted| {
                            peer.survey_category.as_deref() == Some(wanted)
                        })
                })
            })
            .collect()
    }

    fn similar_peers<'m>(
        &self,
        target: &Ratings<'_>,
        cohort: &[&'m str],
        matrix: &BTreeMap<&'m str, Ratings<'m>>,
    ) -> Vec<(&'m str, f32)> {
        let mut peers: Vec<(&str, f32)> = cohort
            .iter()
            .filter_map(|peer| matrix.get(peer).map(|row| (*peer, cosine(target, row))))
            .filter(|(_, similarity)| *similarity >= self.config.similarity_threshold)
            .collect();
        peers.sort_by(|lhs, rhs| rhs.1.total_cmp(&lhs.1));
        if let Some(cap) = self.config.max_peers {
            peers.truncate(cap);
        }
        peers
    }

    fn engaged_items(&self, user_id: &str, kind: ItemKind) -> HashSet<&'a str> {
        self.interactions
            .iter()
            .filter(|record| record.user_id() == user_id && record.kind() == kind)
            .filter(|record| {
                kind == ItemKind::Course || record.rating() >= self.config.consultant_engaged
            })
            .map(InteractionRecord::item_id)
            .collect()
    }
}

/// Average ratings per user and item for interactions of `kind`.
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "duplicate ratings are averaged"
)]
fn rating_matrix(interactions: &[InteractionRecord], kind: ItemKind) -> BTreeMap<&str, Ratings<'_>> {
    let mut sums: BTreeMap<&str, BTreeMap<&str, (f32, usize)>> = BTreeMap::new();
    for record in interactions.iter().filter(|record| record.kind() == kind) {
        let cell = sums
            .entry(record.user_id())
            .or_default()
            .entry(record.item_id())
            .or_default();
        cell.0 += record.rating();
        cell.1 += 1;
    }
    sums.into_iter()
        .map(|(user, row)| {
            let averaged = row
                .into_iter()
                .map(|(item, (sum, count))| (item, sum / count.max(1) as f32))
                .collect();
            (user, averaged)
        })
        .collect()
}

/// Cosine similarity between two sparse rating rows.
#[expect(
    clippy::float_arithmetic,
    reason = "cosine similarity divides the dot product by both norms"
)]
fn cosine(lhs: &Ratings<'_>, rhs: &Ratings<'_>) -> f32 {
    let norm = |row: &Ratings<'_>| row.values().map(|value| value * value).sum::<f32>().sqrt();
    let denominator = norm(lhs) * norm(rhs);
    if denominator <= 0.0_f32 {
        return 0.0_f32;
    }
    let dot: f32 = lhs
        .iter()
        .filter_map(|(item, value)| rhs.get(item).map(|other| value * other))
        .sum();
    (dot / denominator).clamp(0.0_f32, 1.0_f32)
}
