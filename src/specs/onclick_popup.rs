// src/specs/onclick_popup.rs
//
// Links opened through script:
//
//   <a onclick='window.open("ViewReportDetail.aspx?ReportGuid=…", …)' title="FULL TITLE">short…</a>
//
// The relative URL is the first double-quoted string of `onclick`. The row's
// category cell is prefixed to the title attribute: `[category]title`.

use scraper::ElementRef;

use crate::core::date::{parse_date_token, reconstruct_from_url};
use crate::core::html::{ancestor, child_elements, element_text};
use crate::core::sanitize::normalize_ws;
use crate::data::CanonicalRecord;
use crate::error::{CrawlError, Result};

use super::{SiteSpec, check_date, resolve_url};

pub fn extract(
    site: &SiteSpec,
    anchor: ElementRef<'_>,
    category_cell: usize,
    date_cell: usize,
    date_required: bool,
) -> Result<CanonicalRecord> {
    let onclick = anchor
        .value()
        .attr("onclick")
        .ok_or_else(|| CrawlError::extraction("anchor has no onclick"))?;
    let relative = onclick
        .split('"')
        .nth(1)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| CrawlError::extraction(format!("no quoted link in onclick: {onclick}")))?;
    let url = resolve_url(&site.url, relative)?;

    let title_text = anchor
        .value()
        .attr("title")
        .map(normalize_ws)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| CrawlError::extraction(format!("no title attribute for {url}")))?;

    let cells: Vec<ElementRef<'_>> = ancestor(anchor, 2).map(|row| child_elements(row).collect()).unwrap_or_default();
    let category = cells
        .get(category_cell)
        .map(|c| element_text(*c))
        .ok_or_else(|| CrawlError::extraction(format!("row has no cell {category_cell} for {url}")))?;

    let date = cells
        .get(date_cell)
        .map(|c| element_text(*c))
        .and_then(|t| t.split_whitespace().next().and_then(parse_date_token))
        .map(|d| reconstruct_from_url(&url, d));
    let date = check_date(date, date_required, &url)?;

    let title = format!("[{category}]{title_text}");
    Ok(CanonicalRecord::new(&site.name, date, url, title))
}
