// src/store.rs
//
// Content-addressed, append-only record store.
//
//   <prefix>/<site>/<YYYY-MM | 年月未知>/<DD | 日期未知>/<sha256(url)>
//
// A file's presence is the only "seen before" check. Entries are created once
// and never rewritten; re-crawling an unchanged page is a no-op.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::config::consts::{UNKNOWN_DAY, UNKNOWN_YEAR_MONTH};
use crate::data::CanonicalRecord;
use crate::error::{CrawlError, Result};
use crate::log::RunLog;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Committed {
    Created(PathBuf),
    AlreadyPresent(PathBuf),
}

impl Committed {
    pub fn path(&self) -> &Path {
        match self {
            Committed::Created(p) | Committed::AlreadyPresent(p) => p,
        }
    }
}

/// Hex sha256 of the URL; the entry's file name and dedup key.
pub fn digest(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Clone, Debug)]
pub struct CommitStore {
    prefix: PathBuf,
}

impl CommitStore {
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        Self { prefix: prefix.into() }
    }

    pub fn entry_path(&self, record: &CanonicalRecord) -> PathBuf {
        let date = record.notice_date.as_ref();
        let year_month = date.and_then(|d| d.year_month()).unwrap_or_else(|| s!(UNKNOWN_YEAR_MONTH));
        let day = date.and_then(|d| d.day()).unwrap_or_else(|| s!(UNKNOWN_DAY));
        self.prefix
            .join(&record.site_name)
            .join(year_month)
            .join(day)
            .join(digest(&record.absolute_url))
    }

    /// Write the record unless its entry exists.
    ///
    /// The line goes to a temp file in the bucket directory first and is then
    /// persisted without clobbering, so a concurrent commit of the same URL
    /// sees either nothing or the complete file.
    pub fn commit(&self, record: &CanonicalRecord, log: &RunLog) -> Result<Committed> {
        let path = self.entry_path(record);
        let dir = path.parent().unwrap_or(&self.prefix).to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| CrawlError::commit_io(&dir, e))?;

        if path.exists() {
            debug!(path = %path.display(), "already present");
            return Ok(Committed::AlreadyPresent(path));
        }

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| CrawlError::commit_io(&dir, e))?;
        tmp.write_all(record.to_line().as_bytes())
            .and_then(|_| tmp.flush())
            .map_err(|e| CrawlError::commit_io(tmp.path(), e))?;

        match tmp.persist_noclobber(&path) {
            Ok(_) => {}
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                debug!(path = %path.display(), "lost create race");
                return Ok(Committed::AlreadyPresent(path));
            }
            Err(e) => return Err(CrawlError::commit_io(&path, e.error)),
        }

        log.write_entry(&path, &record.fields());
        Ok(Committed::Created(path))
    }
}
