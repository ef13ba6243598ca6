//! Unit coverage for the hybrid recommender.
#![forbid(unsafe_code)]

use compass_core::test_support::{FailingSource, sample_source};
use compass_core::{
    Collection, RecommendationRequest, RecommendationSource, RecommendationStatus, Recommender,
    RiskTier, SnapshotSource,
};
use rstest::{fixture, rstest};

use crate::{ConfigError, HybridRecommender, HybridWeights, Mode, RecommenderConfig};

#[fixture]
fn engine() -> HybridRecommender<SnapshotSource> {
    HybridRecommender::new(sample_source())
}

#[rstest]
fn low_risk_user_gets_full_response(engine: HybridRecommender<SnapshotSource>) {
    let response = engine.get_recommendations("u-low-1", 5);
    assert_eq!(response.status, RecommendationStatus::Success);
    assert!(response.message.is_none());
    assert_eq!(response.risk_profile.risk_tier, Some(RiskTier::Low));
    assert_eq!(response.courses.len(), 4);
    assert_eq!(response.consultants.len(), 3);
    let lifestyle = response
        .courses
        .iter()
        .find(|course| course.course_id == "c-lifestyle")
        .expect("peer-endorsed course");
    assert_eq!(
        lifestyle.evidence.as_ref().map(|e| e.peer_id.as_str()),
        Some("u-low-2")
    );
}

#[rstest]
fn unavailable_consultants_are_never_recommended(engine: HybridRecommender<SnapshotSource>) {
    for user in ["u-low-1", "u-high-1", "u-medium", "ghost"] {
        let response = engine.get_recommendations(user, 10);
        assert!(
            response
                .consultants
                .iter()
                .all(|consultant| consultant.consultant_id != "k-away")
        );
    }
}

#[rstest]
fn missing_peer_signal_is_partial(engine: HybridRecommender<SnapshotSource>) {
    let response = engine.get_recommendations("u-high-1", 5);
    assert_eq!(response.status, RecommendationStatus::Partial);
    let message = response.message.expect("partial message");
    assert_eq!(message, "no collaborative consultant matches");
    assert_eq!(response.summary.consultants.collaborative_hits, 0);
    assert!(response.summary.courses.collaborative_hits > 0);
}

#[rstest]
fn unknown_user_falls_back_to_medium(engine: HybridRecommender<SnapshotSource>) {
    let response = engine.get_recommendations("ghost", 5);
    assert_eq!(response.status, RecommendationStatus::Partial);
    assert_eq!(response.risk_profile.effective_tier(), RiskTier::Medium);
    assert!(!response.courses.is_empty());
    let message = response.message.expect("partial message");
    assert!(message.starts_with("no survey history"));
}

#[rstest]
fn consultant_limit_caps_top_k(engine: HybridRecommender<SnapshotSource>) {
    let response = engine.get_recommendations("u-low-2", 2);
    assert!(response.courses.len() <= 2);
    assert!(response.consultants.len() <= 2);
    assert_eq!(response.summary.courses.returned, response.courses.len());
}

#[rstest]
fn responses_are_deterministic(engine: HybridRecommender<SnapshotSource>) {
    let request = RecommendationRequest::new("u-low-2");
    assert_eq!(engine.recommend(&request), engine.recommend(&request));
}

#[rstest]
fn content_only_mode_attributes_content(engine: HybridRecommender<SnapshotSource>) {
    let response = engine
        .content_recommendations(&RecommendationRequest::new("u-low-1"))
        .expect("snapshot reads succeed");
    assert_eq!(response.status, RecommendationStatus::Success);
    for course in &response.courses {
        assert_eq!(course.scores.source, RecommendationSource::ContentBased);
        assert_eq!(course.scores.hybrid_score, course.scores.content_score);
        assert_eq!(course.scores.collaborative_score, 0.0);
    }
}

#[rstest]
fn collaborative_only_mode_skips_content(engine: HybridRecommender<SnapshotSource>) {
    let response = engine
        .recommend_with(&RecommendationRequest::new("u-low-2"), Mode::CollaborativeOnly)
        .expect("snapshot reads succeed");
    assert_eq!(response.summary.courses.content_hits, 0);
    assert!(
        response
            .courses
            .iter()
            .all(|course| course.scores.source == RecommendationSource::Collaborative)
    );
}

#[rstest]
#[case(Collection::Surveys)]
#[case(Collection::Courses)]
#[case(Collection::Interactions)]
fn data_source_failures_become_error_status(#[case] collection: Collection) {
    let engine = HybridRecommender::new(FailingSource::on(collection));
    let request = RecommendationRequest::new("u-low-1");
    assert!(engine.try_recommend(&request).is_err());
    let response = engine.recommend(&request);
    assert_eq!(response.status, RecommendationStatus::Error);
    assert!(response.courses.is_empty());
    assert!(response.consultants.is_empty());
    let message = response.message.expect("error message");
    assert!(message.contains(collection.as_str()));
}

#[rstest]
fn invalid_configuration_is_rejected() {
    let config = RecommenderConfig {
        weights: HybridWeights {
            content: 0.9,
            collaborative: 0.9,
        },
        ..RecommenderConfig::default()
    };
    let error = HybridRecommender::with_config(sample_source(), config).expect_err("bad weights");
    assert!(matches!(error, ConfigError::InvalidWeights { .. }));

    let config = RecommenderConfig {
        diversity_factor: 0,
        ..RecommenderConfig::default()
    };
    let error = HybridRecommender::with_config(sample_source(), config).expect_err("bad factor");
    assert_eq!(error, ConfigError::InvalidDiversityFactor { value: 0 });
}

#[rstest]
fn auxiliary_queries_read_the_source(engine: HybridRecommender<SnapshotSource>) {
    assert_eq!(
        engine.classify("assist", 30).expect("rules load"),
        Some(RiskTier::High)
    );
    assert_eq!(engine.classify("crafft", 30).expect("rules load"), None);
    let summary = engine.risk_summary().expect("surveys load");
    assert_eq!(summary.total_users, 5);
    let stats = engine.interaction_stats().expect("interactions load");
    assert_eq!(stats.total_interactions, 11);
    let user = engine
        .user_interaction_stats("u-high-2")
        .expect("interactions load")
        .expect("user has history");
    assert_eq!(user.course_interactions, 2);
    assert_eq!(user.consultant_interactions, 1);
    let profile = engine.risk_profile("u-low-1").expect("surveys load");
    assert_eq!(profile.surveys_taken_count, 2);
}
