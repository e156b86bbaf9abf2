// src/log.rs
//
// Append-only run log. One file per run, shared by every worker.
// Lines are tagged `#Info:` / `#Warn:` / `#Error:` and mirrored to `tracing`.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDateTime;

use crate::config::consts::{FIELD_SEP, LOG_NAME_PREFIX, LOG_NAME_STAMP};

const ENTRY_INDENT: &str = "         ";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl Level {
    fn tag(self) -> &'static str {
        match self {
            Level::Info => "#Info",
            Level::Warn => "#Warn",
            Level::Error => "#Error",
        }
    }
}

/// `ztb-crawler-20150616083000.log`
pub fn run_log_name(now: NaiveDateTime) -> String {
    format!("{LOG_NAME_PREFIX}-{}.log", now.format(LOG_NAME_STAMP))
}

pub struct RunLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl RunLog {
    pub fn create(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { path, file: Mutex::new(file) })
    }

    pub fn path(&self) -> &Path { &self.path }

    /// Internal logging function
    pub fn write_log(&self, level: Level, msg: &str) {
        match level {
            Level::Info => tracing::info!(target: "ztb_crawler::run", "{msg}"),
            Level::Warn => tracing::warn!(target: "ztb_crawler::run", "{msg}"),
            Level::Error => tracing::error!(target: "ztb_crawler::run", "{msg}"),
        }
        self.write_raw(&format!("{}: {msg}", level.tag()));
    }

    /// Untagged continuation line.
    pub fn write_raw(&self, line: &str) {
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{line}");
        }
    }

    /// New-entry header plus its indented field line, written under one lock
    /// so no other worker's line lands between them.
    pub fn write_entry(&self, path: &Path, fields: &[String]) {
        let header = format!("created new data entry in file \"{}\"", path.display());
        tracing::info!(target: "ztb_crawler::run", "{header}");
        let block = format!("{}: {header}\n{ENTRY_INDENT}{}\n", Level::Info.tag(), fields.join(FIELD_SEP));
        if let Ok(mut file) = self.file.lock() {
            let _ = file.write_all(block.as_bytes());
        }
    }
}

/// Info-level run log line
#[macro_export]
macro_rules! logf {
    ($log:expr, $($arg:tt)*) => {
        $log.write_log($crate::log::Level::Info, &format!($($arg)*))
    };
}

/// Warn-level run log line
#[macro_export]
macro_rules! logw {
    ($log:expr, $($arg:tt)*) => {
        $log.write_log($crate::log::Level::Warn, &format!($($arg)*))
    };
}

/// Error-level run log line
#[macro_export]
macro_rules! loge {
    ($log:expr, $($arg:tt)*) => {
        $log.write_log($crate::log::Level::Error, &format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn name_is_timestamped() {
        let now = NaiveDate::from_ymd_opt(2015, 6, 16).unwrap().and_hms_opt(8, 30, 5).unwrap();
        assert_eq!(run_log_name(now), "ztb-crawler-20150616083005.log");
    }

    #[test]
    fn lines_are_tagged_and_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        let log = RunLog::create(&path).unwrap();
        logf!(log, "job for url \"{}\" started ...", "http://a/");
        loge!(log, "job for url \"{}\" failed", "http://a/");
        log.write_raw("         detail");
        drop(log);

        // reopening appends
        let log = RunLog::create(&path).unwrap();
        logw!(log, "again");

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec![
            "#Info: job for url \"http://a/\" started ...",
            "#Error: job for url \"http://a/\" failed",
            "         detail",
            "#Warn: again",
        ]);
    }

    #[test]
    fn entry_header_and_fields_stay_together_across_threads() {
        let dir = tempfile::tempdir().unwrap();
        let log = std::sync::Arc::new(RunLog::create(dir.path().join("run.log")).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let log = std::sync::Arc::clone(&log);
                std::thread::spawn(move || {
                    for n in 0..200 {
                        let id = format!("{t}-{n}");
                        logf!(log, "noise {id}");
                        log.write_entry(Path::new(&format!("/data/{id}")), &[s!("甲"), format!("http://x/{id}")]);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let text = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        let mut entries = 0;
        for (i, line) in lines.iter().enumerate() {
            if let Some(rest) = line.strip_prefix("#Info: created new data entry in file \"/data/") {
                let id = rest.trim_end_matches('"');
                assert_eq!(lines[i + 1], format!("         甲  http://x/{id}"));
                entries += 1;
            }
        }
        assert_eq!(entries, 8 * 200);
    }
}
