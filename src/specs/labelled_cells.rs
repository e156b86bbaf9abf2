// src/specs/labelled_cells.rs
//
// Project lists where the notice is a row of labelled columns (district,
// type, bidder…) plus a deadline. Title becomes
//
//   [label1][label2]…[截至日期:deadline]anchor text
//
// Label cells contribute the text of their first child only.

use scraper::ElementRef;

use crate::core::date::{parse_date_token, reconstruct_from_url};
use crate::core::html::{ancestor, child_elements, element_text, first_child_text};
use crate::data::CanonicalRecord;
use crate::error::{CrawlError, Result};

use super::{SiteSpec, check_date, href, resolve_url};

const DEADLINE_LABEL: &str = "截至日期:";

pub fn extract(
    site: &SiteSpec,
    anchor: ElementRef<'_>,
    label_cells: &[usize],
    deadline_cell: usize,
    date_required: bool,
) -> Result<CanonicalRecord> {
    let url = resolve_url(&site.url, href(anchor)?)?;
    let text = element_text(anchor);
    if text.is_empty() {
        return Err(CrawlError::extraction(format!("no anchor text for {url}")));
    }

    let cells: Vec<ElementRef<'_>> = ancestor(anchor, 2).map(|row| child_elements(row).collect()).unwrap_or_default();
    let cell = |i: usize| {
        cells
            .get(i)
            .copied()
            .ok_or_else(|| CrawlError::extraction(format!("row has no cell {i} for {url}")))
    };

    let mut title = s!();
    for &i in label_cells {
        let label = first_child_text(cell(i)?).unwrap_or_default();
        title.push_str(&join!("[", &label, "]"));
    }
    let deadline = element_text(cell(deadline_cell)?);
    title.push_str(&join!("[", DEADLINE_LABEL, &deadline, "]"));
    title.push_str(&text);

    let date = deadline
        .split_whitespace()
        .next()
        .and_then(parse_date_token)
        .map(|d| reconstruct_from_url(&url, d));
    let date = check_date(date, date_required, &url)?;

    Ok(CanonicalRecord::new(&site.name, date, url, title))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::html::{AncestorPath, AttributeRule, find};
    use crate::specs::Extractor;
    use scraper::Html;

    const NANTONG: &str = r#"<table class="xian1">
<tr><td><span>崇川区</span></td><td>施工</td><td align="left"><a href="ProjectDetail.aspx?id=42">某小区配套工程</a></td><td>房建</td><td>公开</td><td>2015-06-30 17:00</td></tr>
<tr><td>港闸区</td><td align="left"><a href="ProjectDetail.aspx?id=43">缺列</a></td></tr>
</table>"#;

    fn site(date_required: bool) -> SiteSpec {
        SiteSpec::new(
            "http://www.ntszjs.com/ntszzb/ProjectList.aspx?id=000100010002",
            "南通市",
            "a",
            Extractor::LabelledCells { label_cells: vec![0, 1, 3, 4], deadline_cell: 5, date_required },
        )
        .constrain(AncestorPath::new(&["td"], AttributeRule::new("td").require("align", "left")))
        .constrain(AncestorPath::new(&["td", "tr", "table"], AttributeRule::new("table").require("class", "xian1")))
    }

    #[test]
    fn labels_and_deadline_frame_the_title() {
        let site = site(true);
        let doc = Html::parse_document(NANTONG);
        let results: Vec<_> = find(&doc, &site.tag, &site.constraints).map(|a| site.extract(a)).collect();
        assert_eq!(results.len(), 2);

        let r = results[0].as_ref().unwrap();
        assert_eq!(r.title, "[崇川区][施工][房建][公开][截至日期:2015-06-30 17:00]某小区配套工程");
        assert_eq!(r.absolute_url, "http://www.ntszjs.com/ntszzb/ProjectDetail.aspx?id=42");
        assert_eq!(r.notice_date.unwrap().to_string(), "2015-06-30");

        // short row: missing label cells drop only this record
        assert!(matches!(results[1], Err(CrawlError::Extraction(_))));
    }
}
