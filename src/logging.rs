//! File logging setup
//!
//! The terminal belongs to the UI, so log output goes to a file instead of
//! stdout/stderr. The filter comes from `MANGATERM_LOG` (same syntax as
//! `RUST_LOG`) and defaults to `mangaterm=info`.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter
pub const LOG_ENV_VAR: &str = "MANGATERM_LOG";

/// Filter used when `MANGATERM_LOG` is unset or invalid
const DEFAULT_FILTER: &str = "mangaterm=info";

/// Errors that can occur when setting up logging
#[derive(Debug, Error)]
pub enum LogError {
    /// No home directory to put the default log file in
    #[error("Could not determine a data directory for the log file")]
    NoDataDir,

    /// Creating or opening the log file failed
    #[error("Failed to open log file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A global subscriber was already installed
    #[error("Failed to install log subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Default log location, e.g. `~/.local/share/mangaterm/mangaterm.log` on Linux
pub fn default_log_path() -> Option<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "mangaterm")?;
    Some(project_dirs.data_dir().join("mangaterm.log"))
}

/// Opens `path` for appending, creating parent directories as needed
pub fn open_log_file(path: &Path) -> Result<File, LogError> {
    let open_err = |source| LogError::Open {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(open_err)?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(open_err)
}

/// Installs the global tracing subscriber writing to `path` (or the default
/// location) and returns the path in use
pub fn init(path: Option<&Path>) -> Result<PathBuf, LogError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => default_log_path().ok_or(LogError::NoDataDir)?,
    };
    let file = open_log_file(&path)?;

    let filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()?;

    Ok(path)
}
