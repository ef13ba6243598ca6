//! Summaries of interaction history and risk distribution.
#![forbid(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use compass_core::{InteractionRecord, ItemKind, RiskProfile};
use serde::Serialize;

/// Platform-wide interaction summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InteractionStats {
    /// Number of interactions.
    pub total_interactions: usize,
    /// Number of course interactions.
    pub course_interactions: usize,
    /// Number of consultant interactions.
    pub consultant_interactions: usize,
    /// Distinct interacting users.
    pub unique_users: usize,
    /// Distinct courses interacted with.
    pub unique_courses: usize,
    /// Distinct consultants interacted with.
    pub unique_consultants: usize,
    /// Mean rating, zero when there are no interactions.
    pub mean_rating: f32,
    /// Count of interactions per rating rounded to two decimals.
    pub rating_distribution: BTreeMap<String, usize>,
}

impl InteractionStats {
    /// Summarise `records`.
    ///
    /// # Examples
    /// ```
    /// use compass_core::InteractionRecord;
    /// use compass_scorer::InteractionStats;
    ///
    /// let records = vec![
    ///     InteractionRecord::from_enrollment("u1", "c1", Some(50.0)),
    ///     InteractionRecord::from_enrollment("u2", "c1", Some(50.0)),
    /// ];
    /// let stats = InteractionStats::from_records(&records);
    /// assert_eq!(stats.unique_users, 2);
    /// assert_eq!(stats.rating_distribution.get("0.50"), Some(&2));
    /// ```
    #[must_use]
    pub fn from_records(records: &[InteractionRecord]) -> Self {
        let mut users = BTreeSet::new();
        let mut courses = BTreeSet::new();
        let mut consultants = BTreeSet::new();
        let mut rating_distribution: BTreeMap<String, usize> = BTreeMap::new();
        for record in records {
            users.insert(record.user_id());
            match record.kind() {
                ItemKind::Course => courses.insert(record.item_id()),
                ItemKind::Consultant => consultants.insert(record.item_id()),
            };
            *rating_distribution
                .entry(format!("{:.2}", record.rating()))
                .or_default() += 1;
        }
        Self {
            total_interactions: records.len(),
            course_interactions: count_kind(records, ItemKind::Course),
            consultant_interactions: count_kind(records, ItemKind::Consultant),
            unique_users: users.len(),
            unique_courses: courses.len(),
            unique_consultants: consultants.len(),
            mean_rating: mean_rating(records.iter()),
            rating_distribution,
        }
    }
}

/// Interaction summary for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserInteractionStats {
    /// The summarised user.
    pub user_id: String,
    /// Number of course interactions.
    pub course_interactions: usize,
    /// Number of consultant interactions.
    pub consultant_interactions: usize,
    /// Distinct items the user interacted with.
    pub unique_items: usize,
    /// Mean rating across the user's interactions.
    pub mean_rating: f32,
    /// Earliest timestamped interaction.
    pub first_interaction: Option<DateTime<Utc>>,
    /// Latest timestamped interaction.
    pub last_interaction: Option<DateTime<Utc>>,
}

impl UserInteractionStats {
    /// Summarise the interactions of `user_id`, or `None` when there are none.
    #[must_use]
    pub fn for_user(user_id: &str, records: &[InteractionRecord]) -> Option<Self> {
        let own: Vec<&InteractionRecord> = records
            .iter()
            .filter(|record| record.user_id() == user_id)
            .collect();
        if own.is_empty() {
            return None;
        }
        let kind_count =
            |kind: ItemKind| own.iter().filter(|record| record.kind() == kind).count();
        let items: BTreeSet<(ItemKind, &str)> = own
            .iter()
            .map(|record| (record.kind(), record.item_id()))
            .collect();
        let timestamps = || own.iter().filter_map(|record| record.interacted_at());
        Some(Self {
            user_id: user_id.to_owned(),
            course_interactions: kind_count(ItemKind::Course),
            consultant_interactions: kind_count(ItemKind::Consultant),
            unique_items: items.len(),
            mean_rating: mean_rating(own.iter().copied()),
            first_interaction: timestamps().min(),
            last_interaction: timestamps().max(),
        })
    }
}

/// Distribution of users across risk tiers and survey categories.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RiskSummary {
    /// Users with at least one survey.
    pub total_users: usize,
    /// Users per current tier.
    pub by_tier: BTreeMap<String, usize>,
    /// Users per current survey category.
    pub by_category: BTreeMap<String, usize>,
}

impl RiskSummary {
    /// Summarise resolved `profiles` keyed by user id.
    #[must_use]
    pub fn from_profiles(profiles: &BTreeMap<String, RiskProfile>) -> Self {
        let mut summary = Self {
            total_users: profiles.len(),
            ..Self::default()
        };
        for profile in profiles.values() {
            *summary
                .by_tier
                .entry(profile.effective_tier().to_string())
                .or_default() += 1;
            if let Some(category) = &profile.survey_category {
                *summary.by_category.entry(category.clone()).or_default() += 1;
            }
        }
        summary
    }
}

fn count_kind(records: &[InteractionRecord], kind: ItemKind) -> usize {
    records.iter().filter(|record| record.kind() == kind).count()
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "the mean divides a rating sum by a small count"
)]
fn mean_rating<'r>(records: impl Iterator<Item = &'r InteractionRecord>) -> f32 {
    let (sum, count) = records.fold((0.0_f32, 0_usize), |(sum, count), record| {
        (sum + record.rating(), count + 1)
    });
    if count == 0 {
        0.0_f32
    } else {
        sum / count as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve_all;
    use compass_core::test_support::{january, sample_interactions, sample_surveys};
    use rstest::rstest;

    #[rstest]
    #[expect(
        clippy::float_arithmetic,
        reason = "test compares floating point means"
    )]
    fn sample_history_summary() {
        let stats = InteractionStats::from_records(&sample_interactions());
        assert_eq!(stats.total_interactions, 11);
        assert_eq!(stats.course_interactions, 6);
        assert_eq!(stats.consultant_interactions, 5);
        assert_eq!(stats.unique_users, 4);
        assert_eq!(stats.unique_courses, 4);
        assert_eq!(stats.unique_consultants, 3);
        assert_eq!(stats.rating_distribution.get("1.00"), Some(&4));
        assert!((stats.mean_rating - 8.4_f32 / 11.0_f32).abs() < 0.001_f32);
    }

    #[rstest]
    fn empty_history_has_zero_mean() {
        let stats = InteractionStats::from_records(&[]);
        assert_eq!(stats.total_interactions, 0);
        assert_eq!(stats.mean_rating, 0.0_f32);
    }

    #[rstest]
    fn user_stats_track_first_and_last_interaction() {
        let records = vec![
            InteractionRecord::from_enrollment("u1", "c1", Some(40.0)).at(january(3)),
            InteractionRecord::from_enrollment("u1", "c1", Some(80.0)).at(january(9)),
            InteractionRecord::from_enrollment("u1", "c2", None),
            InteractionRecord::from_enrollment("u2", "c1", Some(10.0)).at(january(1)),
        ];
        let stats = UserInteractionStats::for_user("u1", &records).expect("u1 has history");
        assert_eq!(stats.course_interactions, 3);
        assert_eq!(stats.unique_items, 2);
        assert_eq!(stats.first_interaction, Some(january(3)));
        assert_eq!(stats.last_interaction, Some(january(9)));
        assert!(UserInteractionStats::for_user("nobody", &records).is_none());
    }

    #[rstest]
    fn risk_summary_counts_current_tiers() {
        let summary = RiskSummary::from_profiles(&resolve_all(&sample_surveys()));
        assert_eq!(summary.total_users, 5);
        assert_eq!(summary.by_tier.get("LOW"), Some(&2));
        assert_eq!(summary.by_tier.get("HIGH"), Some(&2));
        assert_eq!(summary.by_tier.get("MEDIUM"), Some(&1));
        assert_eq!(summary.by_category.get("assist"), Some(&3));
    }
}
