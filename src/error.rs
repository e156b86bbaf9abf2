// src/error.rs
use std::{io, path::PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CrawlError>;

#[derive(Debug, Error)]
pub enum CrawlError {
    /// None of the candidate encodings fit the bytes. Never retried.
    #[error("cannot decode {len} bytes as any of: {tried}")]
    Decoding { len: usize, tried: String },

    /// Every attempt failed. `status` is the last HTTP status seen, if any.
    #[error(
        "request for the url '{location}' returns status code {}",
        .status.map_or_else(|| s!("unknown"), |code| code.to_string())
    )]
    Fetch { location: String, status: Option<u16> },

    #[error("handler for location {0} not implemented")]
    UnsupportedLocation(String),

    /// A matched element is missing a mandatory field; drops that record only.
    #[error("cannot extract record: {0}")]
    Extraction(String),

    #[error("cannot commit {}: {source}", .path.display())]
    CommitIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// A site job panicked; the worker caught it and moved on.
    #[error("site job panicked: {0}")]
    Panicked(String),
}

impl CrawlError {
    pub fn extraction(msg: impl Into<String>) -> Self {
        CrawlError::Extraction(msg.into())
    }

    pub fn commit_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CrawlError::CommitIo { path: path.into(), source }
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CrawlError::Io { path: path.into(), source }
    }

    /// Only transport and status failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CrawlError::Fetch { .. } | CrawlError::Http(_))
    }
}
