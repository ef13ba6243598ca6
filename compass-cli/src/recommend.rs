//! `recommend` and `explain` command implementations.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use compass_core::{
    DEFAULT_COURSE_LIMIT, DataSource, RecommendationRequest, RecommendationResponse,
};
use compass_scorer::{
    ConfigError, HybridRecommender, HybridWeights, Mode, RecommenderConfig, explain,
};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::source::SourceConfig;
use crate::{
    ARG_COLLABORATIVE_WEIGHT, ARG_CONSULTANT_LIMIT, ARG_CONTENT_WEIGHT, ARG_DATABASE, ARG_MODE,
    ARG_SNAPSHOT, ARG_TOP_K, ARG_USER_ID, CliError, ENV_EXPLAIN_USER_ID, ENV_RECOMMEND_USER_ID,
    write_json,
};

/// Courses explained when `explain --top-k` is not given.
pub(crate) const DEFAULT_EXPLAIN_TOP_K: usize = 5;

/// Signals combined by the `recommend` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum ModeArg {
    /// Blend content and collaborative scores.
    #[default]
    Hybrid,
    /// Content similarity only.
    Content,
    /// Peer behaviour only.
    Collaborative,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Hybrid => Self::Hybrid,
            ModeArg::Content => Self::ContentOnly,
            ModeArg::Collaborative => Self::CollaborativeOnly,
        }
    }
}

/// CLI arguments for the `recommend` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "recommend",
    long_about = "Rank courses and consultants for one user. The user's \
                 latest survey selects the risk profile, the catalog is \
                 ranked by text similarity and peers in the same risk \
                 cohort contribute collaborative scores.",
    about = "Recommend courses and consultants for a user"
)]
#[ortho_config(prefix = "COMPASS")]
pub(crate) struct RecommendArgs {
    /// Identifier of the user to recommend for.
    #[arg(value_name = ARG_USER_ID)]
    #[serde(default)]
    pub(crate) user_id: Option<String>,
    /// Path to a platform SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Path to a JSON snapshot.
    #[arg(long = ARG_SNAPSHOT, value_name = "path")]
    #[serde(default)]
    pub(crate) snapshot: Option<Utf8PathBuf>,
    /// Signals to combine.
    #[arg(long = ARG_MODE, value_enum)]
    #[serde(default)]
    pub(crate) mode: Option<ModeArg>,
    /// Number of courses to return.
    #[arg(long = ARG_TOP_K, value_name = "count")]
    #[serde(default)]
    pub(crate) top_k: Option<usize>,
    /// Upper bound on returned consultants.
    #[arg(long = ARG_CONSULTANT_LIMIT, value_name = "count")]
    #[serde(default)]
    pub(crate) consultant_limit: Option<usize>,
    /// Weight of the content score; the other weight defaults to its complement.
    #[arg(long = ARG_CONTENT_WEIGHT, value_name = "weight")]
    #[serde(default)]
    pub(crate) content_weight: Option<f32>,
    /// Weight of the collaborative score.
    #[arg(long = ARG_COLLABORATIVE_WEIGHT, value_name = "weight")]
    #[serde(default)]
    pub(crate) collaborative_weight: Option<f32>,
}

impl RecommendArgs {
    pub(crate) fn into_config(self) -> Result<RecommendConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RecommendConfig::try_from(merged)
    }
}

/// Resolved `recommend` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecommendConfig {
    pub(crate) user_id: String,
    pub(crate) source: SourceConfig,
    pub(crate) mode: Mode,
    pub(crate) top_k: usize,
    pub(crate) recommender: RecommenderConfig,
}

impl TryFrom<RecommendArgs> for RecommendConfig {
    type Error = CliError;

    fn try_from(args: RecommendArgs) -> Result<Self, Self::Error> {
        let user_id = args.user_id.ok_or(CliError::MissingArgument {
            field: ARG_USER_ID,
            env: ENV_RECOMMEND_USER_ID,
        })?;
        let source = SourceConfig::from_paths(args.database, args.snapshot)?;
        let defaults = RecommenderConfig::default();
        let recommender = RecommenderConfig {
            weights: resolve_weights(args.content_weight, args.collaborative_weight)?,
            consultant_limit: args.consultant_limit.unwrap_or(defaults.consultant_limit),
            ..defaults
        }
        .validate()?;
        Ok(Self {
            user_id,
            source,
            mode: args.mode.unwrap_or_default().into(),
            top_k: positive_top_k(args.top_k, DEFAULT_COURSE_LIMIT)?,
            recommender,
        })
    }
}

/// Apply the course default and reject a zero count.
pub(crate) fn positive_top_k(top_k: Option<usize>, default: usize) -> Result<usize, CliError> {
    match top_k.unwrap_or(default) {
        0 => Err(CliError::ZeroCount { field: ARG_TOP_K }),
        count => Ok(count),
    }
}

/// Complete a partial weight pair so that it sums to one.
pub(crate) fn resolve_weights(
    content: Option<f32>,
    collaborative: Option<f32>,
) -> Result<HybridWeights, ConfigError> {
    let weights = match (content, collaborative) {
        (None, None) => HybridWeights::default(),
        (Some(content), None) => HybridWeights {
            content,
            collaborative: 1.0 - content,
        },
        (None, Some(collaborative)) => HybridWeights {
            content: 1.0 - collaborative,
            collaborative,
        },
        (Some(content), Some(collaborative)) => HybridWeights {
            content,
            collaborative,
        },
    };
    weights.validate()
}

/// CLI arguments for the `explain` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "explain",
    about = "Explain why each item was recommended to a user"
)]
#[ortho_config(prefix = "COMPASS")]
pub(crate) struct ExplainArgs {
    /// Identifier of the user to explain.
    #[arg(value_name = ARG_USER_ID)]
    #[serde(default)]
    pub(crate) user_id: Option<String>,
    /// Path to a platform SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Path to a JSON snapshot.
    #[arg(long = ARG_SNAPSHOT, value_name = "path")]
    #[serde(default)]
    pub(crate) snapshot: Option<Utf8PathBuf>,
    /// Number of courses to explain.
    #[arg(long = ARG_TOP_K, value_name = "count")]
    #[serde(default)]
    pub(crate) top_k: Option<usize>,
}

impl ExplainArgs {
    fn into_config(self) -> Result<RecommendConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        let user_id = merged.user_id.ok_or(CliError::MissingArgument {
            field: ARG_USER_ID,
            env: ENV_EXPLAIN_USER_ID,
        })?;
        Ok(RecommendConfig {
            user_id,
            source: SourceConfig::from_paths(merged.database, merged.snapshot)?,
            mode: Mode::Hybrid,
            top_k: positive_top_k(merged.top_k, DEFAULT_EXPLAIN_TOP_K)?,
            recommender: RecommenderConfig::default(),
        })
    }
}

pub(crate) fn run_recommend_with(
    args: RecommendArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let source = config.source.open()?;
    let response = execute_recommend(&config, source)?;
    write_json(writer, &response)
}

pub(crate) fn run_explain_with(args: ExplainArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let source = config.source.open()?;
    let response = execute_recommend(&config, source)?;
    write_json(writer, &explain(&response))
}

/// Run the configured request against an opened source.
pub(crate) fn execute_recommend(
    config: &RecommendConfig,
    source: Box<dyn DataSource>,
) -> Result<RecommendationResponse, CliError> {
    let engine = HybridRecommender::with_config(source, config.recommender.clone())?;
    let request = RecommendationRequest::from_top_k(
        config.user_id.as_str(),
        config.top_k,
        engine.config().consultant_limit,
    );
    Ok(engine.recommend_with(&request, config.mode)?)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<RecommendConfig, CliError> {
    let merged = RecommendArgs::merge_from_layers(layers).map_err(CliError::from)?;
    RecommendConfig::try_from(merged)
}
