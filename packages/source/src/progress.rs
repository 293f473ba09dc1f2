//! Progress reporting for long-running ingestion.
//!
//! The pipeline reports through [`ProgressCallback`] so it stays independent
//! of any rendering backend. The CLI plugs in an `indicatif` spinner; tests
//! and library callers use [`NullProgress`].

/// Receives progress updates from the ingestion pipeline.
///
/// Implementations must be `Send + Sync`: every worker thread reports
/// through the same shared instance.
pub trait ProgressCallback: Send + Sync {
    /// Advance progress by `delta` records.
    fn inc(&self, delta: u64);

    /// Update the message displayed alongside the progress indicator.
    fn set_message(&self, msg: String);

    /// Mark progress as complete with a final message.
    fn finish(&self, msg: String);
}

/// Ignores all progress updates.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}
