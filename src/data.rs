// src/data.rs
//
// The canonical notice record every extractor produces and the store persists.

use chrono::{Local, NaiveDateTime};

use crate::config::consts::{FIELD_SEP, TIMESTAMP_FMT, UNKNOWN_DATE_FIELD};
use crate::core::NoticeDate;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalRecord {
    pub site_name: String,
    pub notice_date: Option<NoticeDate>,
    /// Always absolute (resolved against the site URL by the extractor).
    pub absolute_url: String,
    pub title: String,
    pub collected_at: NaiveDateTime,
}

impl CanonicalRecord {
    /// Stamped with the local time of extraction.
    pub fn new(site_name: &str, notice_date: Option<NoticeDate>, absolute_url: String, title: String) -> Self {
        Self {
            site_name: site_name.to_string(),
            notice_date,
            absolute_url,
            title,
            collected_at: Local::now().naive_local(),
        }
    }

    /// `site_name, date, url, title, collected_at`; unknown dates get a placeholder.
    pub fn fields(&self) -> [String; 5] {
        [
            self.site_name.clone(),
            self.notice_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| s!(UNKNOWN_DATE_FIELD)),
            self.absolute_url.clone(),
            self.title.clone(),
            self.collected_at.format(TIMESTAMP_FMT).to_string(),
        ]
    }

    /// One stored line, newline-terminated.
    pub fn to_line(&self) -> String {
        let mut line = self.fields().join(FIELD_SEP);
        line.push('\n');
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::date::parse_date_token;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2015, 6, 16).unwrap().and_hms_opt(8, 30, 0).unwrap()
    }

    #[test]
    fn line_has_fixed_field_order() {
        let mut r = CanonicalRecord::new("无锡市", parse_date_token("2015-06-15"), s!("http://x/y"), s!("施工招标"));
        r.collected_at = at();
        assert_eq!(r.to_line(), "无锡市  2015-06-15  http://x/y  施工招标  2015-06-16 08:30:00\n");
    }

    #[test]
    fn missing_date_uses_placeholder() {
        let mut r = CanonicalRecord::new("镇江市", None, s!("http://x/z"), s!("t"));
        r.collected_at = at();
        assert_eq!(r.fields()[1], "<日期未知>");
    }
}
