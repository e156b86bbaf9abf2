// src/core/mod.rs

pub mod date;
pub mod encoding;
pub mod html;
pub mod net;
pub mod sanitize;

pub use date::NoticeDate;
pub use net::{Source, SourceKind};
