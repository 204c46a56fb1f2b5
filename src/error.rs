use std::path::PathBuf;

use thiserror::Error;

// ------------------------------------------------------------
// Collector errors
// ------------------------------------------------------------
//
// Only the construction-time variants (`InvalidConfiguration`,
// `OutputDirectory`) ever reach the caller. Fetch and persist
// failures are logged and folded into per-app outcomes inside
// the collector.
//
#[derive(Debug, Error)]
pub enum CollectorError {
    /// Bad app mapping or output directory path.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("cannot prepare output directory {path}: {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("fetching reviews for {app_id} ({name}) failed: {source}")]
    FetchFailure {
        app_id: String,
        name: String,
        #[source]
        source: FetchError,
    },

    #[error("saving reviews to {path} failed: {source}")]
    PersistFailure {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

// ------------------------------------------------------------
// Review source errors
// ------------------------------------------------------------
//
// Failure kinds a `ReviewSource` may report for one app.
//
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response (rate limiting shows up here as 429)
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed response: {0}")]
    Malformed(String),
}
