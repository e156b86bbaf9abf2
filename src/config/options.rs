// src/config/options.rs
use std::path::PathBuf;
use std::time::Duration;

use super::consts::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Output root; entries land under `<prefix>/<site>/<YYYY-MM>/<DD>/`.
    pub prefix: PathBuf,
    pub workers: usize,
    pub fetch: FetchOptions,
    /// Read each site's cached copy instead of its live URL (when it has one).
    pub use_cached: bool,
    /// Restrict the run to these site names or URLs. Empty = every site.
    pub only_sites: Vec<String>,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            prefix: PathBuf::from("."),
            workers: WORKERS,
            fetch: FetchOptions::default(),
            use_cached: false,
            only_sites: Vec::new(),
        }
    }
}

impl CrawlOptions {
    pub fn with_prefix(prefix: impl Into<PathBuf>) -> Self {
        Self { prefix: prefix.into(), ..Self::default() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchOptions {
    pub attempts: u32,
    pub backoff: Duration,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            attempts: FETCH_ATTEMPTS,
            backoff: Duration::from_secs(RETRY_BACKOFF_SECS),
            timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
            user_agent: s!(USER_AGENT),
        }
    }
}
