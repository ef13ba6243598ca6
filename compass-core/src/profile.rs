//! Risk profiles: the static tier table and a user's resolved profile.
//!
//! [`RiskProfileTable`] maps each [`RiskTier`] to the keywords used to build
//! a textual user profile. [`RiskProfile`] is the per-user summary derived
//! from survey history.

use chrono::{DateTime, Utc};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::RiskTier;

/// Keywords and weighting associated with one risk tier.
#[derive(Debug, Clone, PartialEq)]
pub struct TierProfile {
    /// Course topics suited to the tier.
    pub course_topics: Vec<&'static str>,
    /// Consultant specializations suited to the tier.
    pub consultant_specializations: Vec<&'static str>,
    /// Relative priority of the tier.
    ///
    /// Carried as table data for callers; ranking does not read it.
    pub priority_weight: f32,
}

impl TierProfile {
    /// Pseudo-document describing the tier's course interests.
    pub fn course_document(&self) -> String {
        self.course_topics.join(" ")
    }

    /// Pseudo-document describing the tier's consultant needs.
    pub fn consultant_document(&self) -> String {
        self.consultant_specializations.join(" ")
    }

    /// Whether any specialization tag contains one of the tier's keywords.
    ///
    /// Tags are expected in lower case.
    pub fn matches_specialization<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        self.consultant_specializations
            .iter()
            .any(|wanted| tags.iter().any(|tag| tag.as_ref().contains(wanted)))
    }
}

/// Immutable mapping from risk tier to profile keywords.
///
/// # Examples
/// ```
/// use compass_core::{RiskProfileTable, RiskTier};
///
/// let table = RiskProfileTable::default();
/// assert!(table.get(RiskTier::Low).course_topics.contains(&"prevention"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RiskProfileTable {
    low: TierProfile,
    medium: TierProfile,
    high: TierProfile,
}

impl RiskProfileTable {
    /// Construct a table from explicit tier profiles.
    pub const fn new(low: TierProfile, medium: TierProfile, high: TierProfile) -> Self {
        Self { low, medium, high }
    }

    /// Return the profile for `tier`.
    pub const fn get(&self, tier: RiskTier) -> &TierProfile {
        match tier {
            RiskTier::Low => &self.low,
            RiskTier::Medium => &self.medium,
            RiskTier::High => &self.high,
        }
    }
}

impl Default for RiskProfileTable {
    fn default() -> Self {
        Self {
            low: TierProfile {
                course_topics: vec!["prevention", "awareness", "healthy_lifestyle"],
                consultant_specializations: vec!["general", "prevention"],
                priority_weight: 0.3,
            },
            medium: TierProfile {
                course_topics: vec!["intervention", "coping_skills", "family_support"],
                consultant_specializations: vec![
                    "intervention",
                    "family_therapy",
                    "cognitive_behavioral",
                ],
                priority_weight: 0.6,
            },
            high: TierProfile {
                course_topics: vec!["treatment", "recovery", "intensive_support"],
                consultant_specializations: vec![
                    "addiction_specialist",
                    "clinical_psychology",
                    "psychiatry",
                ],
                priority_weight: 1.0,
            },
        }
    }
}

/// A user's current risk assessment summary.
///
/// An unknown profile (no surveys) has no tier; engines fall back to
/// [`RiskTier::Medium`] via [`RiskProfile::effective_tier`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RiskProfile {
    /// Tier of the most recent survey.
    pub risk_tier: Option<RiskTier>,
    /// Category of the most recent survey.
    pub survey_category: Option<String>,
    /// Score of the most recent survey.
    pub latest_score: i32,
    /// Completion time of the most recent survey.
    pub completed_at: Option<DateTime<Utc>>,
    /// Number of surveys the user has taken.
    pub surveys_taken_count: usize,
}

impl RiskProfile {
    /// Profile for a user without survey history.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Whether the profile was derived from at least one survey.
    pub const fn is_known(&self) -> bool {
        self.risk_tier.is_some()
    }

    /// Tier to use for scoring, defaulting to [`RiskTier::Medium`].
    ///
    /// # Examples
    /// ```
    /// use compass_core::{RiskProfile, RiskTier};
    ///
    /// assert_eq!(RiskProfile::unknown().effective_tier(), RiskTier::Medium);
    /// ```
    pub fn effective_tier(&self) -> RiskTier {
        self.risk_tier.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(RiskTier::Low, "prevention awareness healthy_lifestyle")]
    #[case(RiskTier::Medium, "intervention coping_skills family_support")]
    #[case(RiskTier::High, "treatment recovery intensive_support")]
    fn course_documents_follow_tier(#[case] tier: RiskTier, #[case] expected: &str) {
        let table = RiskProfileTable::default();
        assert_eq!(table.get(tier).course_document(), expected);
    }

    #[test]
    fn priority_weights_increase_with_severity() {
        let table = RiskProfileTable::default();
        let weights: Vec<f32> = RiskTier::ALL
            .iter()
            .map(|tier| table.get(*tier).priority_weight)
            .collect();
        assert!(weights.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn specialization_match_uses_substrings() {
        let table = RiskProfileTable::default();
        let high = table.get(RiskTier::High);
        assert!(high.matches_specialization(&["senior psychiatry lead"]));
        assert!(!high.matches_specialization(&["family_therapy"]));
    }

    #[test]
    fn unknown_profile_defaults_to_medium() {
        let profile = RiskProfile::unknown();
        assert!(!profile.is_known());
        assert_eq!(profile.effective_tier(), RiskTier::Medium);
        assert_eq!(profile.surveys_taken_count, 0);
    }
}
