//! Reporting commands: `risk-summary`, `stats` and `classify`.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use compass_core::{DataSource, RiskTier};
use compass_scorer::HybridRecommender;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::source::SourceConfig;
use crate::{
    ARG_DATABASE, ARG_SCORE, ARG_SNAPSHOT, ARG_SURVEY_TYPE, ARG_USER, CliError,
    ENV_CLASSIFY_SCORE, ENV_CLASSIFY_SURVEY_TYPE, write_json,
};

/// CLI arguments for the `risk-summary` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "risk-summary",
    about = "Count users per current risk tier and survey category"
)]
#[ortho_config(prefix = "COMPASS")]
pub(crate) struct RiskSummaryArgs {
    /// Path to a platform SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Path to a JSON snapshot.
    #[arg(long = ARG_SNAPSHOT, value_name = "path")]
    #[serde(default)]
    pub(crate) snapshot: Option<Utf8PathBuf>,
}

/// CLI arguments for the `stats` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "stats",
    about = "Summarise interaction history for the platform or one user"
)]
#[ortho_config(prefix = "COMPASS")]
pub(crate) struct StatsArgs {
    /// Restrict the summary to one user.
    #[arg(long = ARG_USER, value_name = "id")]
    #[serde(default)]
    pub(crate) user: Option<String>,
    /// Path to a platform SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Path to a JSON snapshot.
    #[arg(long = ARG_SNAPSHOT, value_name = "path")]
    #[serde(default)]
    pub(crate) snapshot: Option<Utf8PathBuf>,
}

/// CLI arguments for the `classify` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "classify",
    about = "Classify a survey score with the stored risk rules"
)]
#[ortho_config(prefix = "COMPASS")]
pub(crate) struct ClassifyArgs {
    /// Survey instrument, for example `assist` or `crafft`.
    #[arg(long = ARG_SURVEY_TYPE, value_name = "type")]
    #[serde(default)]
    pub(crate) survey_type: Option<String>,
    /// Total survey score.
    #[arg(long = ARG_SCORE, value_name = "score", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) score: Option<i32>,
    /// Path to a platform SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Path to a JSON snapshot.
    #[arg(long = ARG_SNAPSHOT, value_name = "path")]
    #[serde(default)]
    pub(crate) snapshot: Option<Utf8PathBuf>,
}

/// Output of the `classify` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Survey instrument that was classified.
    pub survey_type: String,
    /// Classified score.
    pub score: i32,
    /// Matching tier, absent when no active rule covers the score.
    pub risk_tier: Option<RiskTier>,
}

/// Resolved `classify` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ClassifyConfig {
    pub(crate) survey_type: String,
    pub(crate) score: i32,
    pub(crate) source: SourceConfig,
}

impl TryFrom<ClassifyArgs> for ClassifyConfig {
    type Error = CliError;

    fn try_from(args: ClassifyArgs) -> Result<Self, Self::Error> {
        let survey_type = args.survey_type.ok_or(CliError::MissingArgument {
            field: ARG_SURVEY_TYPE,
            env: ENV_CLASSIFY_SURVEY_TYPE,
        })?;
        let score = args.score.ok_or(CliError::MissingArgument {
            field: ARG_SCORE,
            env: ENV_CLASSIFY_SCORE,
        })?;
        Ok(Self {
            survey_type,
            score,
            source: SourceConfig::from_paths(args.database, args.snapshot)?,
        })
    }
}

fn engine(source: &SourceConfig) -> Result<HybridRecommender<Box<dyn DataSource>>, CliError> {
    Ok(HybridRecommender::new(source.open()?))
}

pub(crate) fn run_risk_summary_with(
    args: RiskSummaryArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let source = SourceConfig::from_paths(merged.database, merged.snapshot)?;
    let summary = engine(&source)?.risk_summary()?;
    write_json(writer, &summary)
}

pub(crate) fn run_stats_with(args: StatsArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let source = SourceConfig::from_paths(merged.database, merged.snapshot)?;
    let engine = engine(&source)?;
    match merged.user {
        Some(user_id) => {
            let stats = engine
                .user_interaction_stats(&user_id)?
                .ok_or(CliError::NoInteractions { user_id })?;
            write_json(writer, &stats)
        }
        None => write_json(writer, &engine.interaction_stats()?),
    }
}

pub(crate) fn run_classify_with(
    args: ClassifyArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = ClassifyConfig::try_from(merged)?;
    let risk_tier = engine(&config.source)?.classify(&config.survey_type, config.score)?;
    write_json(
        writer,
        &Classification {
            survey_type: config.survey_type,
            score: config.score,
            risk_tier,
        },
    )
}
