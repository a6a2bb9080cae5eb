//! Log ingestion -- read a gate log file into ordered raw lines.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("log file not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("failed to read log file {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read every line of `path` as UTF-8 text, reporting why it failed.
pub fn try_read_lines(path: &Path) -> Result<Vec<String>, IngestError> {
    let content = std::fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => IngestError::NotFound {
            path: path.to_path_buf(),
        },
        _ => IngestError::Unreadable {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let lines: Vec<String> = content.lines().map(str::to_string).collect();
    debug!(path = %path.display(), lines = lines.len(), "read log file");
    Ok(lines)
}

/// Read every line of `path`, degrading to an empty batch on failure.
///
/// The failure is reported to the operator; callers treat an empty result
/// as "no data".
pub fn read_lines(path: &Path) -> Vec<String> {
    match try_read_lines(path) {
        Ok(lines) => lines,
        Err(e) => {
            error!(error = %e, "could not load log, continuing with no data");
            Vec::new()
        }
    }
}
