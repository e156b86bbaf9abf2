// src/core/date.rs
//
// Notice dates as listing tables print them: `YYYY-MM-DD`, or a bare `MM-DD`
// when the site assumes the reader knows the year.

use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::core::sanitize::{pad_digit, strip_bracket_chars};

const FULL_FMT: &str = "%Y-%m-%d";

/// Leap year used to validate month-day tokens, so `02-29` is accepted.
const PROBE_YEAR: &str = "2000";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NoticeDate {
    Full(NaiveDate),
    MonthDay { month: u32, day: u32 },
}

impl NoticeDate {
    pub fn is_full(&self) -> bool {
        matches!(self, NoticeDate::Full(_))
    }

    /// `YYYY-MM` bucket, full dates only.
    pub fn year_month(&self) -> Option<String> {
        match self {
            NoticeDate::Full(d) => Some(d.format("%Y-%m").to_string()),
            NoticeDate::MonthDay { .. } => None,
        }
    }

    /// `DD` bucket, full dates only.
    pub fn day(&self) -> Option<String> {
        match self {
            NoticeDate::Full(d) => Some(format!("{:02}", d.day())),
            NoticeDate::MonthDay { .. } => None,
        }
    }
}

impl fmt::Display for NoticeDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeDate::Full(d) => write!(f, "{}", d.format(FULL_FMT)),
            NoticeDate::MonthDay { month, day } => write!(f, "{month:02}-{day:02}"),
        }
    }
}

/// Parse a date cell: optional enclosing brackets, then `YYYY-MM-DD` or `MM-DD`.
pub fn parse_date_token(s: &str) -> Option<NoticeDate> {
    let s = strip_bracket_chars(s);
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, FULL_FMT) {
        return Some(NoticeDate::Full(d));
    }
    let probe = format!("{PROBE_YEAR}-{s}");
    NaiveDate::parse_from_str(&probe, FULL_FMT)
        .ok()
        .map(|d| NoticeDate::MonthDay { month: d.month(), day: d.day() })
}

/// Recover the year of a `MM-DD` date from the article URL.
///
/// Many sites print `06-15` in the listing but file the article under
/// `.../2015/6/15/art_....html`. Scan the path segments (single digits padded)
/// for a consecutive `MM`,`DD` pair and read the year from the segment before.
/// Full dates, and month-days with no matching triple, come back unchanged.
pub fn reconstruct_from_url(url: &str, date: NoticeDate) -> NoticeDate {
    if date.is_full() {
        return date;
    }
    let wanted = date.to_string();
    let segments: Vec<String> = url.split('/').map(pad_digit).collect();

    for i in 1..segments.len().saturating_sub(1) {
        if format!("{}-{}", segments[i], segments[i + 1]) != wanted {
            continue;
        }
        let candidate = format!("{}-{}-{}", segments[i - 1], segments[i], segments[i + 1]);
        if let Ok(d) = NaiveDate::parse_from_str(&candidate, FULL_FMT) {
            return NoticeDate::Full(d);
        }
    }
    date
}
