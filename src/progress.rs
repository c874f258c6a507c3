//! Progress notification for live (plaintext) runs.
//!
//! The store only ever tells a sink to advance; it never reads progress state
//! back.

use indicatif::{ProgressBar, ProgressStyle};

pub trait ProgressSink: Send + Sync {
    /// Advance by one finished worker. Must not block.
    fn advance(&self);
}

/// Sink for non-interactive runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn advance(&self) {}
}

impl ProgressSink for ProgressBar {
    fn advance(&self) {
        self.inc(1);
    }
}

/// Progress bar drawn on stderr so stdout stays reserved for the report.
pub fn bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}
