// src/specs/anchor_row.rs
//
// The common listing: one table row per notice.
//
//   <tr>
//     <td><a href="…">TITLE</a></td>
//     <td>[2015-06-15]</td>         ← or `06-15`, any sibling cell
//   </tr>
//
// Title: the anchor's single-child text path (mandatory).
// Date:  first sibling `td` of the anchor's cell whose text parses as a date.
//        A bare `MM-DD` gets its year back from the article URL when possible.

use scraper::ElementRef;

use crate::core::date::{parse_date_token, reconstruct_from_url};
use crate::core::html::{ancestor, child_elements, collapse_single_child_text};
use crate::core::sanitize::normalize_ws;
use crate::core::NoticeDate;
use crate::data::CanonicalRecord;
use crate::error::{CrawlError, Result};

use super::{SiteSpec, check_date, href, resolve_url};

pub fn extract(site: &SiteSpec, anchor: ElementRef<'_>, date_required: bool) -> Result<CanonicalRecord> {
    let url = resolve_url(&site.url, href(anchor)?)?;

    let title = collapse_single_child_text(anchor)
        .map(|t| normalize_ws(&t))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| CrawlError::extraction(format!("no title text for {url}")))?;

    let date = row_date(anchor).map(|d| reconstruct_from_url(&url, d));
    let date = check_date(date, date_required, &url)?;

    Ok(CanonicalRecord::new(&site.name, date, url, title))
}

fn row_date(anchor: ElementRef<'_>) -> Option<NoticeDate> {
    let row = ancestor(anchor, 2)?;
    child_elements(row)
        .filter(|cell| cell.value().name() == "td")
        .filter_map(collapse_single_child_text)
        .find_map(|text| parse_date_token(&text))
}
