// src/file.rs

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::NaiveDateTime;

use crate::config::consts::{SENTINEL_SUFFIX, TIMESTAMP_FMT};
use crate::error::{CrawlError, Result};

pub fn ensure_directory(dir: &Path) -> Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(CrawlError::io(
            dir,
            std::io::Error::new(std::io::ErrorKind::AlreadyExists, "path exists but is not a directory"),
        ));
    }
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| CrawlError::io(dir, e))?;
    }
    Ok(())
}

/// `<log>.is-new`, the marker a downstream consumer polls for.
pub fn sentinel_path(log_path: &Path) -> PathBuf {
    let mut name = log_path.as_os_str().to_owned();
    name.push(SENTINEL_SUFFIX);
    PathBuf::from(name)
}

/// Drop the completion marker next to the run log, holding the finish time.
pub fn write_sentinel(log_path: &Path, now: NaiveDateTime) -> Result<PathBuf> {
    let path = sentinel_path(log_path);
    fs::write(&path, join!(&now.format(TIMESTAMP_FMT).to_string(), "\n")).map_err(|e| CrawlError::io(&path, e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn ensure_directory_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_directory(&nested).unwrap();
        ensure_directory(&nested).unwrap();
        assert!(nested.is_dir());

        let file = dir.path().join("plain");
        fs::write(&file, "x").unwrap();
        assert!(matches!(ensure_directory(&file), Err(CrawlError::Io { .. })));
    }

    #[test]
    fn sentinel_sits_next_to_log() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("ztb-crawler-20150616083005.log");
        let now = NaiveDate::from_ymd_opt(2015, 6, 16).unwrap().and_hms_opt(8, 31, 0).unwrap();

        let path = write_sentinel(&log, now).unwrap();
        assert_eq!(path, dir.path().join("ztb-crawler-20150616083005.log.is-new"));
        assert_eq!(fs::read_to_string(path).unwrap(), "2015-06-16 08:31:00\n");
    }
}
