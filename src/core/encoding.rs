// src/core/encoding.rs
//
// Bytes → text for pages that rarely declare their charset honestly.
// Candidates are tried in order; the first clean decode wins.

use encoding_rs::{Encoding, GBK, UTF_8};

use crate::error::{CrawlError, Result};

pub const CANDIDATES: &[&Encoding] = &[UTF_8, GBK];

pub fn decode(bytes: &[u8]) -> Result<String> {
    for enc in CANDIDATES {
        if let Some(text) = enc.decode_without_bom_handling_and_without_replacement(bytes) {
            let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
            return Ok(text.to_string());
        }
    }
    Err(CrawlError::Decoding {
        len: bytes.len(),
        tried: CANDIDATES.iter().map(|e| e.name()).collect::<Vec<_>>().join(", "),
    })
}
