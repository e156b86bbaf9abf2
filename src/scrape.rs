// src/scrape.rs
use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    thread,
    sync::{ mpsc, Arc, atomic::{ AtomicUsize, Ordering }}
};

use scraper::Html;
use tracing::{debug, info_span};

use crate::{
    config::options::CrawlOptions,
    core::{html, net::Source},
    error::{CrawlError, Result},
    log::RunLog,
    progress::Progress,
    specs::SiteSpec,
    store::{CommitStore, Committed},
};

/// Counters for one site that was read to the end.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SiteReport {
    /// Elements the structural matcher yielded.
    pub matched: usize,
    pub created: usize,
    pub already_present: usize,
    /// Matches that could not yield a record.
    pub skipped: usize,
}

#[derive(Debug)]
pub struct SiteOutcome {
    pub name: String,
    pub url: String,
    pub result: Result<SiteReport>,
}

/// Per-site outcomes, in registry order.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<SiteOutcome>,
}

impl RunSummary {
    pub fn created(&self) -> usize {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok()).map(|r| r.created).sum()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }
}

/// fetch → parse → match → extract → commit, for one site.
///
/// A record that cannot be extracted is logged and skipped; the page goes on.
/// Fetch, decode and commit failures end the site.
pub fn crawl_site(
    site: &SiteSpec,
    source: &Source,
    store: &CommitStore,
    log: &RunLog,
    use_cached: bool,
) -> Result<SiteReport> {
    let text = source.fetch_text(site.location(use_cached))?;
    let doc = Html::parse_document(&text);

    let mut report = SiteReport::default();
    for el in html::find(&doc, &site.tag, &site.constraints) {
        report.matched += 1;
        let record = match site.extract(el) {
            Ok(r) => r,
            Err(e) => {
                report.skipped += 1;
                logw!(log, "record skipped on \"{}\": {e}", site.url);
                continue;
            }
        };
        match store.commit(&record, log)? {
            Committed::Created(_) => report.created += 1,
            Committed::AlreadyPresent(_) => report.already_present += 1,
        }
    }
    debug!(site = %site.name, ?report, "site done");
    Ok(report)
}

/// One site job with its start and end lines. A panic inside `job` becomes
/// `CrawlError::Panicked` so the site still gets an `#Error` line and a slot.
fn run_site(site: &SiteSpec, log: &RunLog, job: impl FnOnce() -> Result<SiteReport>) -> Result<SiteReport> {
    logf!(log, "job for url \"{}\" started ...", site.url);
    let result = panic::catch_unwind(AssertUnwindSafe(job))
        .unwrap_or_else(|payload| Err(CrawlError::Panicked(panic_message(payload.as_ref()))));
    match &result {
        Ok(_) => logf!(log, "job for url \"{}\" succeeded", site.url),
        Err(e) => loge!(log, "job for url \"{}\" failed: {e}", site.url),
    }
    result
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        s!("non-string panic payload")
    }
}

/// Runs sites over a bounded pool of worker threads.
pub struct Crawler {
    source: Arc<Source>,
    store: Arc<CommitStore>,
    log: Arc<RunLog>,
    workers: usize,
    use_cached: bool,
}

impl Crawler {
    pub fn new(opts: &CrawlOptions, log: Arc<RunLog>) -> Result<Self> {
        Ok(Self {
            source: Arc::new(Source::new(opts.fetch.clone())?),
            store: Arc::new(CommitStore::new(&opts.prefix)),
            log,
            workers: opts.workers,
            use_cached: opts.use_cached,
        })
    }

    pub fn run(&self, sites: Vec<SiteSpec>, mut progress: Option<&mut dyn Progress>) -> RunSummary {
        if let Some(p) = progress.as_deref_mut() {
            p.begin(sites.len());
        }
        if sites.is_empty() {
            if let Some(p) = progress.as_deref_mut() {
                p.finish();
            }
            return RunSummary::default();
        }

        let sites = Arc::new(sites);
        let counter = Arc::new(AtomicUsize::new(0));
        let (res_tx, res_rx) = mpsc::channel::<(usize, Result<SiteReport>)>();

        let workers = self.workers.min(sites.len()).max(1);

        // Spawn workers

        for _ in 0..workers {
            let sites = Arc::clone(&sites);
            let idx = Arc::clone(&counter);
            let tx = res_tx.clone();
            let source = Arc::clone(&self.source);
            let store = Arc::clone(&self.store);
            let log = Arc::clone(&self.log);
            let use_cached = self.use_cached;

            thread::spawn(
                move || {
                    loop {
                        let i = idx.fetch_add(1, Ordering::Relaxed);
                        if i >= sites.len() {
                            break;
                        }
                        let site = &sites[i];
                        let _span = info_span!("site", name = %site.name).entered();

                        let result = run_site(site, &log, || crawl_site(site, &source, &store, &log, use_cached));
                        let _ = tx.send((i, result));
                    }
                }
            );
        }
        drop(res_tx); // main thread is sole receiver now

        // Aggregate results
        let mut slots: Vec<Option<Result<SiteReport>>> = (0..sites.len()).map(|_| None).collect();

        for _ in 0..sites.len() {
            match res_rx.recv() {
                Ok((i, result)) => {
                    if let Some(p) = progress.as_deref_mut() {
                        match &result {
                            Ok(_) => p.item_done(&sites[i].name),
                            Err(_) => p.item_failed(&sites[i].name),
                        }
                    }
                    slots[i] = Some(result);
                }
                Err(_) => break, // workers ended early; bail gracefully
            }
        }

        if let Some(p) = progress.as_deref_mut() {
            p.finish();
        }

        let outcomes = slots
            .into_iter()
            .zip(sites.iter())
            .filter_map(|(slot, site)| {
                slot.map(|result| SiteOutcome { name: site.name.clone(), url: site.url.clone(), result })
            })
            .collect();
        RunSummary { outcomes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::options::FetchOptions;
    use crate::core::html::{AncestorPath, AttributeRule};
    use crate::progress::NullProgress;
    use crate::specs::Extractor;
    use std::fs;

    const LISTING: &str = r#"<html><body><table id="list">
<tr><td><a href="/art/2015/6/15/a.html">甲工程招标公告</a></td><td>[2015-06-15]</td></tr>
<tr><td><a href="/art/2015/6/14/b.html"> <b>坏</b> <i>行</i> </a></td><td>[2015-06-14]</td></tr>
<tr><td><a href="/art/c.html">乙工程</a></td><td>无日期</td></tr>
</table><a href="/nav.html">导航</a></body></html>"#;

    fn site(cached: &str) -> SiteSpec {
        SiteSpec::new("http://ztb.example.gov.cn/list/", "甲市", "a", Extractor::AnchorRow { date_required: false })
            .cached_at(cached)
            .constrain(AncestorPath::new(&["td", "tr", "table"], AttributeRule::new("table").require("id", "list")))
    }

    #[test]
    fn crawl_site_counts_and_skips() {
        let dir = tempfile::tempdir().unwrap();
        let page = dir.path().join("listing.html");
        fs::write(&page, LISTING).unwrap();

        let source = Source::new(FetchOptions::default()).unwrap();
        let store = CommitStore::new(dir.path().join("out"));
        let log = RunLog::create(dir.path().join("run.log")).unwrap();
        let site = site(page.to_str().unwrap());

        let first = crawl_site(&site, &source, &store, &log, true).unwrap();
        assert_eq!(first, SiteReport { matched: 3, created: 2, already_present: 0, skipped: 1 });

        let second = crawl_site(&site, &source, &store, &log, true).unwrap();
        assert_eq!(second, SiteReport { matched: 3, created: 0, already_present: 2, skipped: 1 });

        let text = fs::read_to_string(log.path()).unwrap();
        assert!(text.lines().any(|l| l.starts_with("#Warn: record skipped on \"http://ztb.example.gov.cn/list/\"")));
    }

    #[test]
    fn failing_site_does_not_stop_the_others() {
        let dir = tempfile::tempdir().unwrap();
        let page = dir.path().join("listing.html");
        fs::write(&page, LISTING).unwrap();
        let missing = dir.path().join("missing.html");

        let mut opts = CrawlOptions::with_prefix(dir.path().join("out"));
        opts.use_cached = true;
        opts.workers = 2;
        let log = Arc::new(RunLog::create(dir.path().join("run.log")).unwrap());
        let crawler = Crawler::new(&opts, log).unwrap();

        let mut broken = site(missing.to_str().unwrap());
        broken.url = s!("http://broken.example.gov.cn/list/");
        let summary = crawler.run(vec![broken, site(page.to_str().unwrap())], None);

        assert_eq!(summary.outcomes.len(), 2);
        assert_eq!(summary.outcomes[0].url, "http://broken.example.gov.cn/list/");
        assert!(matches!(summary.outcomes[0].result, Err(CrawlError::Io { .. })));
        assert_eq!(summary.outcomes[1].result.as_ref().unwrap().created, 2);
        assert_eq!(summary.created(), 2);
        assert_eq!(summary.failed(), 1);
    }

    #[test]
    fn panicking_job_is_reported_as_failure() {
        let dir = tempfile::tempdir().unwrap();
        let log = RunLog::create(dir.path().join("run.log")).unwrap();
        let site = site("unused.html");

        let result = run_site(&site, &log, || panic!("row index out of range"));
        match result {
            Err(CrawlError::Panicked(msg)) => assert_eq!(msg, "row index out of range"),
            other => panic!("expected Panicked, got {other:?}"),
        }

        let owned = run_site(&site, &log, || panic!("{} cells", 3));
        assert!(matches!(owned, Err(CrawlError::Panicked(ref m)) if m == "3 cells"));

        let text = fs::read_to_string(log.path()).unwrap();
        let started = "#Info: job for url \"http://ztb.example.gov.cn/list/\" started ...";
        let failed = "#Error: job for url \"http://ztb.example.gov.cn/list/\" failed: site job panicked: row index out of range";
        assert_eq!(text.matches(started).count(), 2);
        assert!(text.lines().any(|l| l == failed));
    }

    #[test]
    fn empty_registry_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let opts = CrawlOptions::with_prefix(dir.path());
        let log = Arc::new(RunLog::create(dir.path().join("run.log")).unwrap());
        let summary = Crawler::new(&opts, log).unwrap().run(Vec::new(), Some(&mut NullProgress));
        assert!(summary.outcomes.is_empty());
    }
}
