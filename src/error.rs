use std::path::PathBuf;

use thiserror::Error;

/// Problems with the creator list. All of them stop the run before any
/// state file is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("can't read creator list {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("creator list {} is not a JSON array of creators: {source}", .path.display())]
    Invalid {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("creator list {} is empty", .0.display())]
    Empty(PathBuf),

    #[error("creator list {} has no entry with both a name and a url", .0.display())]
    NoValidCreators(PathBuf),
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error("can't write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("can't serialize state for {}: {source}", .path.display())]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Transport level failure while fetching a creator page (DNS, timeout,
/// connection reset, truncated body). HTTP status codes are not errors here.
#[derive(Debug, Error)]
#[error("network error: {0}")]
pub struct FetchError(#[from] pub reqwest::Error);

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("can't make an absolute url from {raw:?}: {source}")]
    Url {
        raw: String,
        source: url::ParseError,
    },
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook answered with status {0}")]
    Status(u16),
}
