// src/specs/mod.rs
//! # Site “specs” module
//!
//! Each procurement site is described declaratively by a [`SiteSpec`]: where the
//! listing lives, which tag marks a notice, the ancestor constraints that tell a
//! notice link apart from navigation links, and which [`Extractor`] strategy
//! turns a matched element into a [`CanonicalRecord`].
//!
//! ## What lives here
//! - The **registry** of known sites (`sites::all()`), a plain table.
//! - The **strategies**: one module per listing layout. Each is a pure function
//!   `(site, matched element) → record`; the layouts differ only in *where* the
//!   title, date and link sit relative to the matched anchor.
//! - **URL resolution** shared by all strategies.
//!
//! ## What does **not** live here
//! - Fetching and decoding (`core::net`), DOM matching (`core::html`),
//!   persistence (`store`), scheduling across sites (`scrape`).
//!
//! ## Adding a site
//! Reuse a strategy if the listing looks like one we already read; otherwise add
//! a variant to [`Extractor`] and a module next to the others. No ad hoc
//! branches inside an existing strategy.
//!
//! ## Failure policy
//! A strategy returns `CrawlError::Extraction` when a mandatory field is
//! missing. The pipeline drops that one record and carries on with the page.

pub mod anchor_row;
pub mod labelled_cells;
pub mod onclick_popup;
pub mod row_text;
pub mod sites;

use scraper::ElementRef;
use url::Url;

use crate::core::html::AncestorPath;
use crate::core::sanitize::strip_dot_segments;
use crate::core::NoticeDate;
use crate::data::CanonicalRecord;
use crate::error::{CrawlError, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteSpec {
    /// Listing page; also the base for relative links. Unique per site.
    pub url: String,
    /// Saved copy of `url`, read instead of it when running from cache.
    pub cached_location: Option<String>,
    /// Publisher name; first directory level in the store.
    pub name: String,
    pub tag: String,
    pub constraints: Vec<AncestorPath>,
    pub extractor: Extractor,
}

impl SiteSpec {
    pub fn new(url: &str, name: &str, tag: &str, extractor: Extractor) -> Self {
        Self {
            url: s!(url),
            cached_location: None,
            name: s!(name),
            tag: s!(tag),
            constraints: Vec::new(),
            extractor,
        }
    }

    pub fn cached_at(mut self, location: &str) -> Self {
        self.cached_location = Some(s!(location));
        self
    }

    pub fn constrain(mut self, c: AncestorPath) -> Self {
        self.constraints.push(c);
        self
    }

    /// Where to read the listing from.
    pub fn location(&self, use_cached: bool) -> &str {
        match (&self.cached_location, use_cached) {
            (Some(cached), true) => cached,
            _ => &self.url,
        }
    }

    pub fn extract(&self, el: ElementRef<'_>) -> Result<CanonicalRecord> {
        self.extractor.extract(self, el)
    }
}

/// Listing layouts we know how to read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Extractor {
    /// Anchor text is the title; a sibling cell of the anchor's cell holds the date.
    AnchorRow { date_required: bool },
    /// Whole row text is the title; no date.
    RowText,
    /// Link hidden in `onclick="window.open("…")"`; title attribute plus a category cell.
    OnclickPopup { category_cell: usize, date_cell: usize, date_required: bool },
    /// Label cells prefixed to the anchor text, deadline cell appended.
    LabelledCells { label_cells: Vec<usize>, deadline_cell: usize, date_required: bool },
}

impl Extractor {
    pub fn extract(&self, site: &SiteSpec, el: ElementRef<'_>) -> Result<CanonicalRecord> {
        match self {
            Extractor::AnchorRow { date_required } => anchor_row::extract(site, el, *date_required),
            Extractor::RowText => row_text::extract(site, el),
            Extractor::OnclickPopup { category_cell, date_cell, date_required } => {
                onclick_popup::extract(site, el, *category_cell, *date_cell, *date_required)
            }
            Extractor::LabelledCells { label_cells, deadline_cell, date_required } => {
                labelled_cells::extract(site, el, label_cells, *deadline_cell, *date_required)
            }
        }
    }
}

/* ---------- shared helpers ---------- */

fn has_scheme(href: &str) -> bool {
    match href.find(':') {
        Some(i) if i > 0 => {
            let scheme = &href[..i];
            scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme.chars().all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c))
        }
        _ => false,
    }
}

/// Absolute form of `href`: verbatim when it carries a scheme, otherwise joined
/// onto `base` with standard URL-join rules. `x/../` pairs are removed either way.
pub fn resolve_url(base: &str, href: &str) -> Result<String> {
    let href = href.trim();
    if href.is_empty() {
        return Err(CrawlError::extraction("empty link"));
    }
    let absolute = if has_scheme(href) {
        s!(href)
    } else {
        let base = Url::parse(base)
            .map_err(|e| CrawlError::extraction(format!("bad base url {base}: {e}")))?;
        base.join(href)
            .map_err(|e| CrawlError::extraction(format!("cannot join {href}: {e}")))?
            .to_string()
    };
    Ok(strip_dot_segments(&absolute))
}

/// Enforce a strategy's date policy: when required, only a full date will do.
pub(crate) fn check_date(date: Option<NoticeDate>, required: bool, url: &str) -> Result<Option<NoticeDate>> {
    match date {
        Some(d) if d.is_full() || !required => Ok(Some(d)),
        None if !required => Ok(None),
        _ => Err(CrawlError::extraction(format!("no full notice date for {url}"))),
    }
}

pub(crate) fn href(el: ElementRef<'_>) -> Result<&str> {
    el.value()
        .attr("href")
        .ok_or_else(|| CrawlError::extraction("anchor has no href"))
}
