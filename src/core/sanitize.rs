// src/core/sanitize.rs

pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Drop `[` and `]` characters, keep what they enclose: `[2015-06-15]` → `2015-06-15`.
pub fn strip_bracket_chars(s: &str) -> String {
    s.chars().filter(|c| *c != '[' && *c != ']').collect()
}

/// Remove `segment/../` pairs left behind by naive joins.
/// `http://a/b/../c/x.html` → `http://a/c/x.html`. Repeats until stable.
pub fn strip_dot_segments(url: &str) -> String {
    let mut out = url.to_string();
    while let Some(idx) = out.find("/../") {
        // start of the segment preceding "/../"
        let seg_start = out[..idx].rfind('/').map(|i| i + 1).unwrap_or(0);
        let seg = &out[seg_start..idx];
        if seg.is_empty() || seg == ".." || seg.ends_with(':') {
            break;
        }
        out.replace_range(seg_start..idx + 4, "");
    }
    out
}

/// Two-digit form for single-digit numeric path segments: `6` → `06`.
pub fn pad_digit(seg: &str) -> String {
    if seg.len() == 1 && seg.as_bytes()[0].is_ascii_digit() {
        join!("0", seg)
    } else {
        seg.to_string()
    }
}
