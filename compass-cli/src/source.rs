//! Data source selection shared by every subcommand.

use std::io::BufReader;

use camino::{Utf8Path, Utf8PathBuf};
use compass_core::{DataSource, SnapshotSource};

use crate::fs::{file_is_file, open_utf8_file};
use crate::{ARG_DATABASE, ARG_SNAPSHOT, CliError};

/// Where the engine reads its records from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SourceConfig {
    /// A platform SQLite database.
    Database(Utf8PathBuf),
    /// A JSON snapshot file.
    Snapshot(Utf8PathBuf),
}

impl SourceConfig {
    /// Pick the single configured source.
    pub(crate) fn from_paths(
        database: Option<Utf8PathBuf>,
        snapshot: Option<Utf8PathBuf>,
    ) -> Result<Self, CliError> {
        match (database, snapshot) {
            (Some(database), None) => Ok(Self::Database(database)),
            (None, Some(snapshot)) => Ok(Self::Snapshot(snapshot)),
            (None, None) => Err(CliError::MissingSource),
            (Some(database), Some(snapshot)) => {
                Err(CliError::ConflictingSources { database, snapshot })
            }
        }
    }

    pub(crate) fn validate(&self) -> Result<(), CliError> {
        match self {
            Self::Database(path) => require_existing(path, ARG_DATABASE),
            Self::Snapshot(path) => require_existing(path, ARG_SNAPSHOT),
        }
    }

    /// Open the configured source for reading.
    pub(crate) fn open(&self) -> Result<Box<dyn DataSource>, CliError> {
        self.validate()?;
        match self {
            Self::Database(path) => open_database(path),
            Self::Snapshot(path) => Ok(Box::new(load_snapshot(path)?)),
        }
    }
}

fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(feature = "store-sqlite")]
fn open_database(path: &Utf8Path) -> Result<Box<dyn DataSource>, CliError> {
    let source = compass_core::SqliteSource::open(path.as_std_path())?;
    Ok(Box::new(source))
}

#[cfg(not(feature = "store-sqlite"))]
fn open_database(_path: &Utf8Path) -> Result<Box<dyn DataSource>, CliError> {
    Err(CliError::MissingFeature {
        feature: "store-sqlite",
        action: "reading a SQLite database",
    })
}

/// Loads a JSON-encoded [`SnapshotSource`] from disk.
pub(crate) fn load_snapshot(path: &Utf8Path) -> Result<SnapshotSource, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenSnapshot {
        path: path.to_path_buf(),
        source,
    })?;
    SnapshotSource::from_json_reader(BufReader::new(file)).map_err(|source| {
        CliError::ParseSnapshot {
            path: path.to_path_buf(),
            source,
        }
    })
}
