// Local copy of the submitted query. Saving is best-effort: the pipeline
// logs a `RecordError` and carries on, so a read-only working directory
// never blocks the submission.

use chrono::{SecondsFormat, Utc};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("could not write {path}: {source}")]
pub struct RecordError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Something that keeps a copy of the final query before it is submitted.
pub trait QueryRecorder {
    /// Store `query`. Returns where it went, for the log line.
    fn record(&self, query: &str) -> Result<PathBuf, RecordError>;
}

/// Writes a timestamped comment line followed by the query to a file,
/// replacing whatever was there.
#[derive(Debug, Clone)]
pub struct FileRecorder {
    path: PathBuf,
}

impl FileRecorder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileRecorder { path: path.into() }
    }
}

impl QueryRecorder for FileRecorder {
    fn record(&self, query: &str) -> Result<PathBuf, RecordError> {
        let stamped = format!(
            "-- saved: {}\n{}\n",
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            query
        );
        std::fs::write(&self.path, stamped).map_err(|source| RecordError {
            path: self.path.clone(),
            source,
        })?;
        // Report the absolute location when it can be resolved.
        Ok(std::fs::canonicalize(&self.path).unwrap_or_else(|_| self.path.clone()))
    }
}

/// Shorten `query` for log output: at most 240 characters, then `...`.
pub fn preview(query: &str) -> String {
    const MAX: usize = 240;
    match query.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &query[..idx]),
        None => query.to_string(),
    }
}
