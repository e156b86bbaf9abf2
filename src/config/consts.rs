// src/config/consts.rs

// Net config
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                              (KHTML, like Gecko) Chrome/42.0.2311.152 Safari/537.36";
pub const FETCH_ATTEMPTS: u32 = 3;
pub const RETRY_BACKOFF_SECS: u64 = 5; // fixed, not exponential
pub const HTTP_TIMEOUT_SECS: u64 = 30;

// Store layout
pub const UNKNOWN_YEAR_MONTH: &str = "年月未知";
pub const UNKNOWN_DAY: &str = "日期未知";
pub const UNKNOWN_DATE_FIELD: &str = "<日期未知>";
pub const FIELD_SEP: &str = "  ";

// Run log
pub const LOG_NAME_PREFIX: &str = "ztb-crawler";
pub const LOG_NAME_STAMP: &str = "%Y%m%d%H%M%S";
pub const SENTINEL_SUFFIX: &str = ".is-new";
pub const TIMESTAMP_FMT: &str = "%Y-%m-%d %H:%M:%S";

// Concurrency
pub const WORKERS: usize = 4;
