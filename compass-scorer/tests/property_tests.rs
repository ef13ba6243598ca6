//! Property-based tests for scoring invariants.
//!
//! # Invariants tested
//!
//! - **Score range:** Content, collaborative and hybrid scores are finite and
//!   non-negative.
//! - **Hybrid bound:** A hybrid score never exceeds the weighted maxima of
//!   its inputs.
//! - **Cosine range:** Text similarity lies in `0.0..=1.0` and is one for
//!   identical known text.
//! - **Determinism:** Identical snapshots yield identical responses.

#![expect(
    clippy::expect_used,
    clippy::float_arithmetic,
    reason = "property tests fail fast and compare floating point bounds"
)]

use std::collections::HashSet;

use compass_core::test_support::{consultant_rating, course_rating, sample_source};
use compass_core::{InteractionRecord, RecommendationRequest, Recommender};
use compass_scorer::{Candidate, HybridRecommender, HybridWeights, TfIdf, merge};
use proptest::prelude::*;

const TOLERANCE: f32 = 0.000_1_f32;

const COURSES: [&str; 4] = ["c-prevention", "c-recovery", "c-coping", "c-lifestyle"];
const CONSULTANTS: [&str; 3] = ["k-general", "k-psych", "k-family"];
const USERS: [&str; 5] = ["u-low-1", "u-low-2", "u-high-1", "u-high-2", "u-medium"];

fn candidates() -> impl Strategy<Value = Vec<Candidate>> {
    prop::collection::vec((0_usize..8, 0.0_f32..1.5_f32), 0..12).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(item, score)| Candidate::new(format!("item-{item}"), score))
            .collect()
    })
}

fn interactions() -> impl Strategy<Value = Vec<InteractionRecord>> {
    prop::collection::vec((0_usize..5, 0_usize..7, 0.0_f32..=1.0_f32), 0..30).prop_map(|rows| {
        rows.into_iter()
            .filter_map(|(user, item, rating)| {
                let user = USERS.get(user)?;
                Some(match COURSES.get(item) {
                    Some(course) => course_rating(user, course, rating),
                    None => consultant_rating(user, CONSULTANTS.get(item - COURSES.len())?, rating),
                })
            })
            .collect()
    })
}

fn max_score(candidates: &[Candidate]) -> f32 {
    candidates
        .iter()
        .map(|candidate| candidate.score)
        .fold(0.0_f32, f32::max)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: merged scores respect the weighted maxima of their inputs.
    #[test]
    fn hybrid_scores_are_bounded(
        content in candidates(),
        collaborative in candidates(),
        weight in 0.0_f32..=1.0_f32,
        limit in 0_usize..10,
    ) {
        let weights = HybridWeights { content: weight, collaborative: 1.0 - weight }
            .validate()
            .expect("complementary weights are valid");
        let bound = weights.content * max_score(&content)
            + weights.collaborative * max_score(&collaborative);
        let (items, counts) = merge(content, collaborative, limit, weights);

        prop_assert!(items.len() <= limit);
        prop_assert_eq!(counts.returned, items.len());
        let ids: HashSet<&str> = items.iter().map(|item| item.item_id.as_str()).collect();
        prop_assert_eq!(ids.len(), items.len());
        for item in &items {
            prop_assert!(item.scores.hybrid_score >= 0.0);
            prop_assert!(item.scores.hybrid_score <= bound + TOLERANCE);
        }
        for pair in items.windows(2) {
            if let [first, second] = pair {
                prop_assert!(first.scores.hybrid_score >= second.scores.hybrid_score);
            }
        }
    }

    /// Property: cosine similarity stays in range and is one on identical text.
    #[test]
    fn cosine_is_bounded(
        words in prop::collection::vec("[a-z]{2,8}", 1..12),
        query in prop::collection::vec("[a-z]{2,8}", 0..6),
    ) {
        let document = words.join(" ");
        let space = TfIdf::fit(&[document.as_str(), "recovery treatment"]);
        let vector = space.transform(&document);
        let similarity = vector.cosine(&space.transform(&query.join(" ")));
        prop_assert!((0.0..=1.0).contains(&similarity));
        if !vector.is_empty() {
            prop_assert!((vector.cosine(&vector) - 1.0).abs() < TOLERANCE);
        }
    }

    /// Property: engine output is deterministic and every score is non-negative.
    #[test]
    fn recommendations_are_deterministic(
        history in interactions(),
        user in 0_usize..6,
        top_k in 0_usize..6,
    ) {
        let source = sample_source().with_interactions(history);
        let engine = HybridRecommender::new(source);
        let user_id = USERS.get(user).copied().unwrap_or("ghost");
        let request = RecommendationRequest::from_top_k(user_id, top_k, 3);

        let first = engine.recommend(&request);
        let second = engine.recommend(&request);
        prop_assert_eq!(&first, &second);
        for item in first.items() {
            let scores = item.scores();
            prop_assert!(scores.content_score >= 0.0 && scores.content_score.is_finite());
            prop_assert!((0.0..=1.0).contains(&scores.collaborative_score));
            prop_assert!(scores.hybrid_score >= 0.0);
        }
    }
}
