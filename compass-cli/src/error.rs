//! Error types emitted by the Compass CLI.

use std::sync::Arc;

use camino::Utf8PathBuf;
use compass_core::RecommendError;
use compass_scorer::ConfigError;
use thiserror::Error;

/// Errors emitted by the Compass CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A count option was set to zero.
    #[error("{field} must be at least 1")]
    ZeroCount { field: &'static str },
    /// Neither a database nor a snapshot was named.
    #[error("missing data source (set --database or --snapshot)")]
    MissingSource,
    /// Both a database and a snapshot were named.
    #[error("choose one data source: --database {database:?} or --snapshot {snapshot:?}")]
    ConflictingSources {
        database: Utf8PathBuf,
        snapshot: Utf8PathBuf,
    },
    /// The requested operation requires a missing compile-time feature.
    #[error("{action} requires the `{feature}` feature to be enabled")]
    MissingFeature {
        feature: &'static str,
        action: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening the snapshot file failed.
    #[error("failed to open snapshot at {path:?}: {source}")]
    OpenSnapshot {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Snapshot JSON could not be decoded.
    #[error("failed to parse snapshot JSON at {path:?}: {source}")]
    ParseSnapshot {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Opening the SQLite database failed.
    #[cfg(feature = "store-sqlite")]
    #[error(transparent)]
    OpenDatabase(#[from] compass_core::SqliteSourceError),
    /// The recommender settings were rejected.
    #[error("invalid recommender configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
    /// Reading from the data source failed.
    #[error(transparent)]
    Recommend(#[from] RecommendError),
    /// The user has no recorded interactions.
    #[error("user {user_id} has no recorded interactions")]
    NoInteractions { user_id: String },
    /// Serializing the command output failed.
    #[error("failed to serialize output: {0}")]
    SerializeOutput(#[source] serde_json::Error),
    /// Writing the command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
