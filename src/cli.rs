// src/cli.rs
use std::{fs, path::PathBuf, sync::Arc, time::Duration};

use chrono::Local;
use clap::Parser;

use crate::{
    config::{consts::WORKERS, CrawlOptions},
    error::{CrawlError, Result},
    file::{ensure_directory, write_sentinel},
    log::{run_log_name, RunLog},
    progress::Progress,
    scrape::{Crawler, RunSummary},
    specs::sites,
};

/// Crawl procurement notice listings into a content-addressed file tree.
#[derive(Parser, Debug)]
#[command(name = "ztb-crawler", version, about)]
pub struct Args {
    /// Output root; created when missing. Holds the run log and the entries.
    #[arg(value_name = "PREFIX", required_unless_present = "list_sites")]
    pub prefix: Option<PathBuf>,

    /// Sites crawled in parallel.
    #[arg(long, default_value_t = WORKERS)]
    pub workers: usize,

    /// Read each site's saved copy instead of the live page.
    #[arg(long)]
    pub cached: bool,

    /// Only crawl this site (name or listing URL). Repeatable.
    #[arg(long = "site", value_name = "NAME")]
    pub sites: Vec<String>,

    /// Pause between failed fetch attempts.
    #[arg(long)]
    pub backoff_secs: Option<u64>,

    /// Per-request transport timeout.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Print the known sites and exit.
    #[arg(long)]
    pub list_sites: bool,
}

impl Args {
    pub fn options(&self) -> CrawlOptions {
        let mut opts = CrawlOptions::with_prefix(self.prefix.clone().unwrap_or_default());
        opts.workers = self.workers.max(1);
        opts.use_cached = self.cached;
        opts.only_sites = self.sites.clone();
        if let Some(secs) = self.backoff_secs {
            opts.fetch.backoff = Duration::from_secs(secs);
        }
        if let Some(secs) = self.timeout_secs {
            opts.fetch.timeout = Duration::from_secs(secs);
        }
        opts
    }
}

/// Prints one line per finished site and a tally at the end.
#[derive(Default)]
pub struct CliProgress {
    total: usize,
    done: usize,
    failed: usize,
}

impl Progress for CliProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
    }

    fn log(&mut self, msg: &str) {
        eprintln!("{msg}");
    }

    fn item_done(&mut self, name: &str) {
        self.done += 1;
        eprintln!("[{}/{}] {name} ok", self.done + self.failed, self.total);
    }

    fn item_failed(&mut self, name: &str) {
        self.failed += 1;
        eprintln!("[{}/{}] {name} FAILED", self.done + self.failed, self.total);
    }

    fn finish(&mut self) {
        eprintln!("{} sites crawled, {} failed", self.done, self.failed);
    }
}

pub fn list_sites() {
    for site in sites::all() {
        println!("{}\t{}", site.name, site.url);
    }
}

/// One pass over the registry. Per-site failures end up in the run log and
/// the summary; only setup failures (prefix, log file) are returned as errors.
pub fn run(args: &Args) -> Result<RunSummary> {
    let opts = args.options();
    ensure_directory(&opts.prefix)?;

    let log_path = opts.prefix.join(run_log_name(Local::now().naive_local()));
    let log = Arc::new(RunLog::create(&log_path).map_err(|e| CrawlError::io(&log_path, e))?);
    let shown = fs::canonicalize(&log_path).unwrap_or_else(|_| log_path.clone());
    logf!(log, "log will be written to \"{}\"", shown.display());

    let selected = sites::select(sites::all(), &opts.only_sites);
    let mut progress = CliProgress::default();
    if selected.is_empty() {
        progress.log("no site matches the --site filter");
    }

    let summary = Crawler::new(&opts, Arc::clone(&log))?.run(selected, Some(&mut progress));

    logf!(log, "log has been written to \"{}\"", shown.display());
    write_sentinel(&log_path, Local::now().naive_local())?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn prefix_required_unless_listing() {
        assert!(Args::try_parse_from(["ztb-crawler"]).is_err());
        assert!(Args::try_parse_from(["ztb-crawler", "a", "b"]).is_err());
        let args = Args::try_parse_from(["ztb-crawler", "--list-sites"]).unwrap();
        assert!(args.list_sites && args.prefix.is_none());
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::try_parse_from([
            "ztb-crawler", "/tmp/out", "--workers", "8", "--cached",
            "--site", "湖州市", "--site", "无锡市", "--backoff-secs", "0", "--timeout-secs", "7",
        ])
        .unwrap();
        let opts = args.options();
        assert_eq!(opts.prefix, PathBuf::from("/tmp/out"));
        assert_eq!(opts.workers, 8);
        assert!(opts.use_cached);
        assert_eq!(opts.only_sites, vec![s!("湖州市"), s!("无锡市")]);
        assert_eq!(opts.fetch.backoff, Duration::ZERO);
        assert_eq!(opts.fetch.timeout, Duration::from_secs(7));
        assert_eq!(opts.fetch.attempts, crate::config::consts::FETCH_ATTEMPTS);
    }

    #[test]
    fn run_frames_the_log_and_writes_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("out");
        let args = Args::try_parse_from([
            OsString::from("ztb-crawler"),
            prefix.clone().into_os_string(),
            OsString::from("--site"),
            OsString::from("不存在"),
        ])
        .unwrap();

        let summary = run(&args).unwrap();
        assert!(summary.outcomes.is_empty());

        let mut logs: Vec<PathBuf> = fs::read_dir(&prefix)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.extension().is_some_and(|x| x == "log"))
            .collect();
        assert_eq!(logs.len(), 1);
        let log = logs.pop().unwrap();

        let text = fs::read_to_string(&log).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("#Info: log will be written to \""));
        assert!(lines[lines.len() - 1].starts_with("#Info: log has been written to \""));
        assert!(crate::file::sentinel_path(&log).exists());
    }
}
