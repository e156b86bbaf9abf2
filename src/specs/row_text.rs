// src/specs/row_text.rs
//
// Listings whose row carries no parseable date and spreads the title over
// several cells. Title = every non-empty text piece of the anchor's row,
// joined with `-`.

use scraper::ElementRef;

use crate::core::html::{ancestor, collect_text};
use crate::data::CanonicalRecord;
use crate::error::{CrawlError, Result};

use super::{SiteSpec, href, resolve_url};

pub fn extract(site: &SiteSpec, anchor: ElementRef<'_>) -> Result<CanonicalRecord> {
    let url = resolve_url(&site.url, href(anchor)?)?;
    let title = ancestor(anchor, 2)
        .and_then(collect_text)
        .ok_or_else(|| CrawlError::extraction(format!("empty row for {url}")))?;
    Ok(CanonicalRecord::new(&site.name, None, url, title))
}
