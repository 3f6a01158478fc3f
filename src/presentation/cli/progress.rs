//! Progress reporting for CLI

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;

/// Progress reporter using indicatif
pub struct ProgressReporter {
    bar: Arc<ProgressBar>,
}

impl ProgressReporter {
    /// Creates a byte-granular progress reporter
    pub fn new(total: u64, message: &str) -> Self {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                .unwrap()
                .progress_chars("#>-"),
        );
        bar.set_message(message.to_string());

        Self { bar: Arc::new(bar) }
    }

    /// Creates a progress reporter for MFT linearization
    pub fn for_extraction() -> Self {
        // Total is unknown until the run list decodes; the callback sets it
        Self::new(0, "Linearizing MFT...")
    }

    /// Updates the progress bar
    pub fn update(&self, position: u64) {
        self.bar.set_position(position);
    }

    /// Finishes with a message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Gets a callback for extraction progress
    pub fn extraction_callback(&self) -> Box<dyn Fn(u64, u64)> {
        let bar = Arc::clone(&self.bar);
        Box::new(move |copied: u64, total: u64| {
            if bar.length() != Some(total) {
                bar.set_length(total);
            }
            bar.set_position(copied);
        })
    }
}
