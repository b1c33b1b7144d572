//! Progress hooks invoked by the crawler and the resolution orchestrator.

use tracing::{debug, info, warn};

use crate::entries::ResolveError;
use crate::protocol::IntermediateLine;

/// Receives progress events from a pipeline run.
///
/// Every method has a no-op default so implementors only override what they
/// display.
pub trait PipelineObserver: Send + Sync {
    /// A page was fetched and extracted.
    fn page_extracted(&self, _uri: &str, _lines: &[IntermediateLine]) {}

    /// An entry finished resolving into `tracks` tracks.
    fn entry_resolved(&self, _reference: &str, _tracks: usize) {}

    /// An entry failed to resolve and was skipped.
    fn entry_failed(&self, _reference: &str, _error: &ResolveError) {}
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Logs events through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn page_extracted(&self, uri: &str, lines: &[IntermediateLine]) {
        info!("Extracted {} lines from {}", lines.len(), uri);
        for line in lines {
            debug!("  {}", line);
        }
    }

    fn entry_resolved(&self, reference: &str, tracks: usize) {
        debug!("Resolved {:?} into {} tracks", reference, tracks);
    }

    fn entry_failed(&self, reference: &str, error: &ResolveError) {
        warn!("Skipping {:?}: {}", reference, error);
    }
}
