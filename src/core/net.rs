// src/core/net.rs
//
// Where page text comes from. A location string picks its source by prefix:
//   http:// https://     → RemoteHttp (GET with retry)
//   file:/// / ./        → LocalFile  (cached copies, fixtures)
// First matching prefix wins; anything else is a configuration error.

use std::{
    fs::{self, File},
    io::{BufRead, BufReader},
    path::PathBuf,
    thread,
};

use reqwest::{StatusCode, blocking::Client};
use tracing::{debug, warn};

use crate::config::FetchOptions;
use crate::core::encoding;
use crate::error::{CrawlError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    RemoteHttp,
    LocalFile,
}

/// Static prefix table, scanned in order.
pub const PREFIXES: &[(&str, SourceKind)] = &[
    ("http://", SourceKind::RemoteHttp),
    ("https://", SourceKind::RemoteHttp),
    ("file:///", SourceKind::LocalFile),
    ("/", SourceKind::LocalFile),
    ("./", SourceKind::LocalFile),
];

pub fn classify(location: &str) -> Result<SourceKind> {
    PREFIXES
        .iter()
        .find(|(prefix, _)| location.starts_with(prefix))
        .map(|(_, kind)| *kind)
        .ok_or_else(|| CrawlError::UnsupportedLocation(location.to_string()))
}

/// `file:///srv/x.html` → `/srv/x.html`; other local forms unchanged.
pub fn local_path(location: &str) -> PathBuf {
    match location.strip_prefix("file://") {
        Some(rest) => PathBuf::from(rest),
        None => PathBuf::from(location),
    }
}

/// Decoded lines, produced on demand. Single pass.
pub type Lines = Box<dyn Iterator<Item = Result<String>> + Send>;

#[derive(Clone)]
pub struct Source {
    client: Client,
    opts: FetchOptions,
}

impl Source {
    pub fn new(opts: FetchOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(opts.user_agent.as_str())
            .timeout(opts.timeout)
            .build()?;
        Ok(Self { client, opts })
    }

    pub fn fetch_text(&self, location: &str) -> Result<String> {
        match classify(location)? {
            SourceKind::RemoteHttp => self.http_get(location),
            SourceKind::LocalFile => read_local(location),
        }
    }

    pub fn fetch_lines(&self, location: &str) -> Result<Lines> {
        match classify(location)? {
            SourceKind::RemoteHttp => {
                let text = self.http_get(location)?;
                let lines: Vec<Result<String>> = text
                    .split('\n')
                    .map(|l| Ok(l.trim_end_matches('\r').to_string()))
                    .collect();
                Ok(Box::new(lines.into_iter()))
            }
            SourceKind::LocalFile => {
                let path = local_path(location);
                let file = File::open(&path).map_err(|e| CrawlError::io(&path, e))?;
                let lines = BufReader::new(file).split(b'\n').map(move |line| {
                    let line = line.map_err(|e| CrawlError::io(&path, e))?;
                    encoding::decode(&line).map(|s| s.trim().to_string())
                });
                Ok(Box::new(lines))
            }
        }
    }

    /// GET with a fixed pause between failed attempts.
    /// Retries whatever `CrawlError::is_retryable` accepts (bad status,
    /// transport, body read); an undecodable 200 body returns at once.
    fn http_get(&self, url: &str) -> Result<String> {
        let attempts = self.opts.attempts.max(1);
        let mut last_status: Option<u16> = None;

        for attempt in 1..=attempts {
            debug!(url, attempt, "GET");
            match self.get_once(url) {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() => {
                    if let CrawlError::Fetch { status: Some(code), .. } = &e {
                        last_status = Some(*code);
                    }
                    warn!(url, attempt, error = %e, "attempt failed");
                }
                Err(e) => return Err(e),
            }
            if attempt < attempts {
                thread::sleep(self.opts.backoff);
            }
        }

        Err(CrawlError::Fetch { location: url.to_string(), status: last_status })
    }

    fn get_once(&self, url: &str) -> Result<String> {
        let resp = self.client.get(url).send()?;
        if resp.status() != StatusCode::OK {
            return Err(CrawlError::Fetch { location: url.to_string(), status: Some(resp.status().as_u16()) });
        }
        let body = resp.bytes()?;
        encoding::decode(&body)
    }
}

fn read_local(location: &str) -> Result<String> {
    let path = local_path(location);
    let bytes = fs::read(&path).map_err(|e| CrawlError::io(&path, e))?;
    encoding::decode(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn classify_by_prefix() {
        assert_eq!(classify("http://www.wxzb.net/x.aspx").unwrap(), SourceKind::RemoteHttp);
        assert_eq!(classify("https://a/").unwrap(), SourceKind::RemoteHttp);
        assert_eq!(classify("file:///tmp/x").unwrap(), SourceKind::LocalFile);
        assert_eq!(classify("/tmp/x").unwrap(), SourceKind::LocalFile);
        assert_eq!(classify("./sample-data/wu-xi").unwrap(), SourceKind::LocalFile);
    }

    #[test]
    fn unknown_prefix_is_fatal() {
        let err = classify("ftp://x/y").unwrap_err();
        assert!(matches!(err, CrawlError::UnsupportedLocation(ref l) if l == "ftp://x/y"));
        assert!(!err.is_retryable());
        assert!(classify("sample-data/x").is_err());
    }

    #[test]
    fn file_url_maps_to_absolute_path() {
        assert_eq!(local_path("file:///srv/data/a.html"), PathBuf::from("/srv/data/a.html"));
        assert_eq!(local_path("./a.html"), PathBuf::from("./a.html"));
    }

    #[test]
    fn local_text_and_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        let mut f = File::create(&path).unwrap();
        let (gbk, _, _) = encoding_rs::GBK.encode("  第一行  \r\n第二行\n");
        f.write_all(&gbk).unwrap();
        drop(f);

        let source = Source::new(FetchOptions::default()).unwrap();
        let location = format!("file://{}", path.display());

        let text = source.fetch_text(&location).unwrap();
        assert!(text.contains("第二行"));

        let lines: Vec<String> = source
            .fetch_lines(&location)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(lines, vec!["第一行", "第二行"]);
    }

    #[test]
    fn missing_local_file_is_io_error() {
        let source = Source::new(FetchOptions::default()).unwrap();
        let err = source.fetch_text("/definitely/not/here.html").unwrap_err();
        assert!(matches!(err, CrawlError::Io { .. }));
    }
}
