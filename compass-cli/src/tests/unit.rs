//! Focused unit tests covering CLI configuration resolution.

use super::helpers::{Workspace, write_utf8};
use super::*;
use crate::recommend::{
    DEFAULT_EXPLAIN_TOP_K, ModeArg, RecommendConfig, config_from_layers_for_test,
    positive_top_k, resolve_weights,
};
use crate::report::ClassifyConfig;
use crate::source::{SourceConfig, load_snapshot};
use camino::Utf8PathBuf;
use compass_scorer::{ConfigError, Mode};
use rstest::rstest;

fn snapshot_args(user_id: Option<&str>) -> RecommendArgs {
    RecommendArgs {
        user_id: user_id.map(str::to_owned),
        snapshot: Some(Utf8PathBuf::from("snapshot.json")),
        ..RecommendArgs::default()
    }
}

#[rstest]
fn converting_recommend_without_user_errors() {
    let err = RecommendConfig::try_from(snapshot_args(None)).expect_err("missing user");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_USER_ID);
            assert_eq!(env, ENV_RECOMMEND_USER_ID);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn recommend_config_applies_defaults() {
    let config = RecommendConfig::try_from(snapshot_args(Some("u-low-1"))).expect("config");
    assert_eq!(config.user_id, "u-low-1");
    assert_eq!(config.top_k, compass_core::DEFAULT_COURSE_LIMIT);
    assert_eq!(config.mode, Mode::Hybrid);
    assert_eq!(config.recommender.consultant_limit, 3);
    assert_eq!(
        config.source,
        SourceConfig::Snapshot(Utf8PathBuf::from("snapshot.json"))
    );
}

#[rstest]
#[case(None, 5)]
#[case(Some(1), 1)]
#[case(Some(12), 12)]
fn explain_counts_default_to_five(#[case] top_k: Option<usize>, #[case] expected: usize) {
    let count = positive_top_k(top_k, DEFAULT_EXPLAIN_TOP_K).expect("positive count");
    assert_eq!(count, expected);
}

#[rstest]
fn zero_top_k_is_rejected() {
    let args = RecommendArgs {
        top_k: Some(0),
        ..snapshot_args(Some("u-low-1"))
    };
    let err = RecommendConfig::try_from(args).expect_err("zero top-k");
    match err {
        CliError::ZeroCount { field } => assert_eq!(field, ARG_TOP_K),
        other => panic!("expected ZeroCount, found {other:?}"),
    }
}

#[rstest]
fn source_selection_requires_a_path() {
    let err = SourceConfig::from_paths(None, None).expect_err("no source");
    assert!(matches!(err, CliError::MissingSource));
}

#[rstest]
fn source_selection_rejects_two_paths() {
    let err = SourceConfig::from_paths(
        Some(Utf8PathBuf::from("compass.db")),
        Some(Utf8PathBuf::from("snapshot.json")),
    )
    .expect_err("conflicting sources");
    match err {
        CliError::ConflictingSources { database, snapshot } => {
            assert_eq!(database, "compass.db");
            assert_eq!(snapshot, "snapshot.json");
        }
        other => panic!("expected ConflictingSources, found {other:?}"),
    }
}

#[rstest]
#[case(Some(0.7), None, 0.7, 0.3)]
#[case(None, Some(0.25), 0.75, 0.25)]
#[case(None, None, 0.5, 0.5)]
#[case(Some(1.0), Some(0.0), 1.0, 0.0)]
fn partial_weights_are_completed(
    #[case] content: Option<f32>,
    #[case] collaborative: Option<f32>,
    #[case] expected_content: f32,
    #[case] expected_collaborative: f32,
) {
    let weights = resolve_weights(content, collaborative).expect("valid weights");
    assert!((weights.content - expected_content).abs() < 1e-6);
    assert!((weights.collaborative - expected_collaborative).abs() < 1e-6);
}

#[rstest]
fn weights_that_do_not_sum_to_one_are_rejected() {
    let args = RecommendArgs {
        content_weight: Some(0.9),
        collaborative_weight: Some(0.9),
        ..snapshot_args(Some("u-low-1"))
    };
    let err = RecommendConfig::try_from(args).expect_err("invalid weights");
    match err {
        CliError::InvalidConfiguration(ConfigError::InvalidWeights { .. }) => {}
        other => panic!("expected InvalidConfiguration, found {other:?}"),
    }
}

#[rstest]
fn mode_flag_selects_collaborative_only() {
    let cli = Cli::try_parse_from([
        "compass",
        "recommend",
        "u-low-1",
        "--snapshot",
        "snapshot.json",
        "--mode",
        "collaborative",
        "--top-k",
        "2",
    ])
    .expect("arguments parse");
    let Command::Recommend(args) = cli.command else {
        panic!("expected recommend command");
    };
    assert_eq!(args.mode, Some(ModeArg::Collaborative));
    let config = RecommendConfig::try_from(args).expect("config");
    assert_eq!(config.mode, Mode::CollaborativeOnly);
    assert_eq!(config.top_k, 2);
}

#[rstest]
fn classify_requires_a_score() {
    let args = ClassifyArgs {
        survey_type: Some("assist".to_owned()),
        snapshot: Some(Utf8PathBuf::from("snapshot.json")),
        ..ClassifyArgs::default()
    };
    let err = ClassifyConfig::try_from(args).expect_err("missing score");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_SCORE);
            assert_eq!(env, ENV_CLASSIFY_SCORE);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn validate_reports_missing_snapshot() {
    let workspace = Workspace::new();
    let path = workspace.path("missing.json");
    let err = SourceConfig::Snapshot(path.clone())
        .validate()
        .expect_err("missing snapshot");
    match err {
        CliError::MissingSourceFile { field, path: reported } => {
            assert_eq!(field, ARG_SNAPSHOT);
            assert_eq!(reported, path);
        }
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn validate_rejects_directories() {
    let workspace = Workspace::new();
    let path = workspace.path("compass.db");
    std::fs::create_dir(path.as_std_path()).expect("create directory");
    let err = SourceConfig::Database(path)
        .validate()
        .expect_err("directory source");
    match err {
        CliError::SourcePathNotFile { field, .. } => assert_eq!(field, ARG_DATABASE),
        other => panic!("expected SourcePathNotFile, found {other:?}"),
    }
}

#[rstest]
fn load_snapshot_rejects_invalid_json() {
    let workspace = Workspace::new();
    let path = workspace.path("snapshot.json");
    write_utf8(&path, b"{ not valid json");
    let err = load_snapshot(&path).expect_err("invalid json");
    match err {
        CliError::ParseSnapshot { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected ParseSnapshot, found {other:?}"),
    }
}

#[rstest]
fn load_snapshot_decodes_the_sample_platform() {
    let workspace = Workspace::new();
    let snapshot = load_snapshot(&workspace.sample_snapshot()).expect("snapshot decodes");
    assert_eq!(snapshot, compass_core::test_support::sample_source());
}

#[cfg(not(feature = "store-sqlite"))]
#[rstest]
fn databases_require_the_sqlite_feature() {
    let workspace = Workspace::new();
    let path = workspace.path("compass.db");
    write_utf8(&path, b"");
    let Err(err) = SourceConfig::Database(path).open() else {
        panic!("database sources need the store-sqlite feature");
    };
    match err {
        CliError::MissingFeature { feature, .. } => assert_eq!(feature, "store-sqlite"),
        other => panic!("expected MissingFeature, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "top_k": "many" }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "snapshot": "from-file.json",
            "top_k": 7,
            "mode": "content",
        }),
        None,
    );
    composer.push_environment(json!({
        "user_id": "u-high-1",
        "top_k": 4,
    }));
    composer.push_cli(json!({ "mode": "collaborative" }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.user_id, "u-high-1");
    assert_eq!(config.top_k, 4);
    assert_eq!(config.mode, Mode::CollaborativeOnly);
    assert_eq!(
        config.source,
        SourceConfig::Snapshot(Utf8PathBuf::from("from-file.json"))
    );
}
