//! Command-line interface for the Compass recommendation engine.
//!
//! Every subcommand reads a platform SQLite database (`--database`) or a
//! JSON snapshot (`--snapshot`) and prints pretty JSON on stdout. Options may
//! also come from configuration files or `COMPASS_CMDS_*` environment
//! variables.
#![forbid(unsafe_code)]

use std::io::Write;

use clap::{Parser, Subcommand};
use serde::Serialize;

mod error;
mod fs;
mod recommend;
mod report;
mod source;

pub use error::CliError;
pub use report::Classification;

use recommend::{ExplainArgs, RecommendArgs, run_explain_with, run_recommend_with};
use report::{
    ClassifyArgs, RiskSummaryArgs, StatsArgs, run_classify_with, run_risk_summary_with,
    run_stats_with,
};

pub(crate) const ARG_USER_ID: &str = "user-id";
pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ARG_SNAPSHOT: &str = "snapshot";
pub(crate) const ARG_MODE: &str = "mode";
pub(crate) const ARG_TOP_K: &str = "top-k";
pub(crate) const ARG_CONSULTANT_LIMIT: &str = "consultant-limit";
pub(crate) const ARG_CONTENT_WEIGHT: &str = "content-weight";
pub(crate) const ARG_COLLABORATIVE_WEIGHT: &str = "collaborative-weight";
pub(crate) const ARG_USER: &str = "user";
pub(crate) const ARG_SURVEY_TYPE: &str = "survey-type";
pub(crate) const ARG_SCORE: &str = "score";
pub(crate) const ENV_RECOMMEND_USER_ID: &str = "COMPASS_CMDS_RECOMMEND_USER_ID";
pub(crate) const ENV_EXPLAIN_USER_ID: &str = "COMPASS_CMDS_EXPLAIN_USER_ID";
pub(crate) const ENV_CLASSIFY_SURVEY_TYPE: &str = "COMPASS_CMDS_CLASSIFY_SURVEY_TYPE";
pub(crate) const ENV_CLASSIFY_SCORE: &str = "COMPASS_CMDS_CLASSIFY_SCORE";

/// Run the Compass CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    run_command(cli.command, &mut stdout)
}

fn run_command(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Recommend(args) => run_recommend_with(args, writer),
        Command::Explain(args) => run_explain_with(args, writer),
        Command::RiskSummary(args) => run_risk_summary_with(args, writer),
        Command::Stats(args) => run_stats_with(args, writer),
        Command::Classify(args) => run_classify_with(args, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "compass",
    about = "Risk-aware course and consultant recommendations",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Recommend courses and consultants for a user.
    Recommend(RecommendArgs),
    /// Explain each recommendation for a user.
    Explain(ExplainArgs),
    /// Count users per risk tier.
    RiskSummary(RiskSummaryArgs),
    /// Summarise interaction history.
    Stats(StatsArgs),
    /// Classify a survey score.
    Classify(ClassifyArgs),
}

fn write_json<T: Serialize + ?Sized>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerializeOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
mod tests;
