//! Derive a user's current risk profile from survey history.
//!
//! The current survey is the one with the latest completion time. Attempts
//! without a completion time are older than any completed attempt, and ties
//! go to the earliest record in collection order.

use std::collections::BTreeMap;

use compass_core::{RiskProfile, SurveyRecord};

/// Return the current survey of `user_id`, if the user has any.
#[must_use]
pub fn current_survey<'a>(user_id: &str, surveys: &'a [SurveyRecord]) -> Option<&'a SurveyRecord> {
    surveys
        .iter()
        .filter(|survey| survey.user_id == user_id)
        .fold(None, |best: Option<&SurveyRecord>, candidate| match best {
            Some(current) if candidate.completed_at <= current.completed_at => Some(current),
            _ => Some(candidate),
        })
}

/// Resolve the risk profile of `user_id`.
///
/// Users without surveys receive [`RiskProfile::unknown`].
///
/// # Examples
/// ```
/// use compass_core::{RiskTier, SurveyRecord};
/// use compass_scorer::resolve;
///
/// let surveys = vec![SurveyRecord::new("u1", RiskTier::High, 30)];
/// let profile = resolve("u1", &surveys);
/// assert_eq!(profile.risk_tier, Some(RiskTier::High));
/// assert_eq!(resolve("ghost", &surveys).effective_tier(), RiskTier::Medium);
/// ```
#[must_use]
pub fn resolve(user_id: &str, surveys: &[SurveyRecord]) -> RiskProfile {
    let taken = surveys
        .iter()
        .filter(|survey| survey.user_id == user_id)
        .count();
    current_survey(user_id, surveys).map_or_else(RiskProfile::unknown, |survey| {
        profile_from(survey, taken)
    })
}

/// Resolve the current profile of every user with at least one survey.
#[must_use]
pub fn resolve_all(surveys: &[SurveyRecord]) -> BTreeMap<String, RiskProfile> {
    let mut latest: BTreeMap<&str, (&SurveyRecord, usize)> = BTreeMap::new();
    for survey in surveys {
        latest
            .entry(survey.user_id.as_str())
            .and_modify(|(current, taken)| {
                *taken = taken.saturating_add(1);
                if survey.completed_at > current.completed_at {
                    *current = survey;
                }
            })
            .or_insert((survey, 1));
    }
    latest
        .into_iter()
        .map(|(user_id, (survey, taken))| (user_id.to_owned(), profile_from(survey, taken)))
        .collect()
}

fn profile_from(survey: &SurveyRecord, taken: usize) -> RiskProfile {
    RiskProfile {
        risk_tier: Some(survey.risk_tier),
        survey_category: survey.survey_category.clone(),
        latest_score: survey.total_score,
        completed_at: survey.completed_at,
        surveys_taken_count: taken,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compass_core::RiskTier;
    use compass_core::test_support::{january, survey};
    use rstest::rstest;

    #[rstest]
    fn latest_completion_wins() {
        let surveys = vec![
            survey("u1", RiskTier::Low, "assist", 3),
            survey("u1", RiskTier::High, "crafft", 9),
            survey("u1", RiskTier::Medium, "assist", 5),
        ];
        let profile = resolve("u1", &surveys);
        assert_eq!(profile.risk_tier, Some(RiskTier::High));
        assert_eq!(profile.survey_category.as_deref(), Some("crafft"));
        assert_eq!(profile.completed_at, Some(january(9)));
        assert_eq!(profile.surveys_taken_count, 3);
    }

    #[rstest]
    fn incomplete_attempts_are_oldest() {
        let surveys = vec![
            SurveyRecord::new("u1", RiskTier::High, 30),
            survey("u1", RiskTier::Low, "assist", 1),
        ];
        assert_eq!(resolve("u1", &surveys).risk_tier, Some(RiskTier::Low));
    }

    #[rstest]
    fn ties_keep_first_record() {
        let surveys = vec![
            survey("u1", RiskTier::Medium, "assist", 4),
            survey("u1", RiskTier::High, "assist", 4),
        ];
        assert_eq!(resolve("u1", &surveys).risk_tier, Some(RiskTier::Medium));
        let all = resolve_all(&surveys);
        assert_eq!(
            all.get("u1").and_then(|profile| profile.risk_tier),
            Some(RiskTier::Medium)
        );
    }

    #[rstest]
    fn unknown_user_falls_back_to_medium() {
        let profile = resolve("nobody", &[]);
        assert!(!profile.is_known());
        assert_eq!(profile.effective_tier(), RiskTier::Medium);
        assert_eq!(profile.latest_score, 0);
    }

    #[rstest]
    fn resolve_all_matches_resolve() {
        let surveys = vec![
            survey("u2", RiskTier::Low, "assist", 2),
            survey("u1", RiskTier::High, "crafft", 1),
            survey("u2", RiskTier::High, "assist", 6),
        ];
        let all = resolve_all(&surveys);
        assert_eq!(all.len(), 2);
        for (user_id, profile) in &all {
            assert_eq!(profile, &resolve(user_id, &surveys));
        }
    }
}
