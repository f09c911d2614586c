use std::path::PathBuf;

use thiserror::Error;

/// Why a feed could not be turned into rows. Any of these leaves the
/// feed's view in its "unable to load" state; nothing is retried.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("feed payload is malformed: {0}")]
    Malformed(String),

    #[error("feed query failed: {0}")]
    Query(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode CSV feed: {0}")]
    Csv(#[from] csv::Error),
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::Malformed(err.to_string())
    }
}
