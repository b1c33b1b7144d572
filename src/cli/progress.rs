//! Spinner that follows pipeline progress on the terminal.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::entries::ResolveError;
use crate::pipeline::PipelineObserver;
use crate::protocol::IntermediateLine;

/// Drives an indicatif spinner from pipeline events.
pub struct SpinnerObserver {
    pb: ProgressBar,
}

impl SpinnerObserver {
    pub fn new(message: impl Into<String>) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner);
        }
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb.set_message(message.into());
        Self { pb }
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

impl PipelineObserver for SpinnerObserver {
    fn page_extracted(&self, uri: &str, lines: &[IntermediateLine]) {
        tracing::debug!("{}: {} lines", uri, lines.len());
        self.pb
            .set_message(format!("Extracted {} lines from {}", lines.len(), uri));
    }

    fn entry_resolved(&self, reference: &str, tracks: usize) {
        self.pb
            .set_message(format!("Resolved {} ({} tracks)", reference, tracks));
    }

    fn entry_failed(&self, reference: &str, error: &ResolveError) {
        tracing::warn!("Skipping {:?}: {}", reference, error);
        self.pb.println(format!(
            "{} Skipped {}: {}",
            style("!").yellow(),
            reference,
            error
        ));
    }
}
