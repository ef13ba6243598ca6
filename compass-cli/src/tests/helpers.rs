//! Test helpers for writing CLI inputs to disk.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use compass_core::test_support::sample_source;
use tempfile::TempDir;

/// Write `bytes` to a UTF-8 path, creating or truncating it.
pub(super) fn write_utf8(path: &Utf8Path, bytes: &[u8]) {
    std::fs::write(path.as_std_path(), bytes).expect("write test file");
}

/// A temporary directory holding the sample platform as CLI inputs.
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    /// Serialise the sample platform into `snapshot.json`.
    pub(super) fn sample_snapshot(&self) -> Utf8PathBuf {
        let path = self.path("snapshot.json");
        let payload = serde_json::to_vec_pretty(&sample_source()).expect("serialise snapshot");
        write_utf8(&path, &payload);
        path
    }

    /// Persist the sample platform into `compass.db`.
    #[cfg(feature = "store-sqlite")]
    pub(super) fn sample_database(&self) -> Utf8PathBuf {
        let path = self.path("compass.db");
        compass_core::test_support::write_sqlite_dataset(path.as_std_path(), &sample_source())
            .expect("write sqlite dataset");
        path
    }
}

/// Parse `argv` and run the command, capturing stdout.
pub(super) fn run_argv(argv: &[&str]) -> (Result<(), crate::CliError>, String) {
    let mut stdout = Vec::new();
    let outcome = crate::Cli::try_parse_from(argv)
        .map_err(crate::CliError::from)
        .and_then(|cli| crate::run_command(cli.command, &mut stdout));
    let text = String::from_utf8(stdout).expect("stdout utf-8");
    (outcome, text)
}
