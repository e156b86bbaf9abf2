// src/progress.rs
/// Lightweight progress reporting for a crawl run.
/// Front ends implement this to surface status to users.
pub trait Progress {
    /// Called at the start with the number of sites to visit.
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// One site finished cleanly.
    fn item_done(&mut self, _name: &str) {}

    /// One site failed; the run goes on.
    fn item_failed(&mut self, _name: &str) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}
