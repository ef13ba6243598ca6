//! Score bands that classify a survey total into a risk tier.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::RiskTier;

/// An inclusive score band for one survey type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RiskRule {
    /// Survey instrument the band applies to.
    pub survey_type_id: String,
    /// Lowest score in the band.
    pub min_score: i32,
    /// Highest score in the band.
    pub max_score: i32,
    /// Tier assigned to scores inside the band.
    pub risk_tier: RiskTier,
    /// Human readable description.
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
    /// Inactive rules are ignored.
    #[cfg_attr(feature = "serde", serde(default = "default_active"))]
    pub is_active: bool,
}

#[cfg(feature = "serde")]
const fn default_active() -> bool {
    true
}

impl RiskRule {
    /// Construct an active rule.
    pub fn new(
        survey_type_id: impl Into<String>,
        min_score: i32,
        max_score: i32,
        risk_tier: RiskTier,
    ) -> Self {
        Self {
            survey_type_id: survey_type_id.into(),
            min_score,
            max_score,
            risk_tier,
            description: None,
            is_active: true,
        }
    }

    /// Whether `score` falls inside the inclusive band.
    pub const fn contains(&self, score: i32) -> bool {
        self.min_score <= score && score <= self.max_score
    }
}

/// Active rules for `survey_type_id`, in input order.
pub fn rules_for<'a>(rules: &'a [RiskRule], survey_type_id: &str) -> Vec<&'a RiskRule> {
    rules
        .iter()
        .filter(|rule| rule.is_active && rule.survey_type_id == survey_type_id)
        .collect()
}

/// Classify a total score with the first matching active rule.
///
/// Returns `None` when no active band for the survey type covers `score`.
///
/// # Examples
/// ```
/// use compass_core::{RiskRule, RiskTier, classify_score};
///
/// let rules = vec![
///     RiskRule::new("crafft", 0, 1, RiskTier::Low),
///     RiskRule::new("crafft", 2, 3, RiskTier::Medium),
///     RiskRule::new("crafft", 4, 6, RiskTier::High),
/// ];
/// assert_eq!(classify_score(&rules, "crafft", 2), Some(RiskTier::Medium));
/// assert_eq!(classify_score(&rules, "assist", 2), None);
/// ```
pub fn classify_score(rules: &[RiskRule], survey_type_id: &str, score: i32) -> Option<RiskTier> {
    rules_for(rules, survey_type_id)
        .into_iter()
        .find(|rule| rule.contains(score))
        .map(|rule| rule.risk_tier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn assist_rules() -> Vec<RiskRule> {
        let mut retired = RiskRule::new("assist", 0, 40, RiskTier::High);
        retired.is_active = false;
        vec![
            retired,
            RiskRule::new("assist", 0, 3, RiskTier::Low),
            RiskRule::new("assist", 4, 26, RiskTier::Medium),
            RiskRule::new("assist", 27, 39, RiskTier::High),
        ]
    }

    #[rstest]
    #[case(0, Some(RiskTier::Low))]
    #[case(3, Some(RiskTier::Low))]
    #[case(4, Some(RiskTier::Medium))]
    #[case(39, Some(RiskTier::High))]
    #[case(40, None)]
    #[case(-1, None)]
    fn classifies_inclusive_bands(
        assist_rules: Vec<RiskRule>,
        #[case] score: i32,
        #[case] expected: Option<RiskTier>,
    ) {
        assert_eq!(classify_score(&assist_rules, "assist", score), expected);
    }

    #[rstest]
    fn inactive_rules_are_not_listed(assist_rules: Vec<RiskRule>) {
        let active = rules_for(&assist_rules, "assist");
        assert_eq!(active.len(), 3);
        assert!(active.iter().all(|rule| rule.is_active));
    }
}
