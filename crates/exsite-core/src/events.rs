//! Structured extraction events.
//!
//! The decoder never prints or owns a global logger; it reports through a
//! sink injected into the session. The caller decides how events become
//! log lines, progress bars or metrics.

use std::path::Path;

use crate::detect::ContainerFormat;

/// Receiver for structured events emitted during one extraction session.
///
/// Requires `Send` so sessions can run on worker threads.
pub trait EventSink: Send {
    /// Called once after format detection, before any entry is read.
    fn on_session_start(&mut self, format: ContainerFormat);

    /// Called after an entry has been fully written to disk.
    fn on_entry_written(&mut self, path: &Path, size: u64);

    /// Called when an entry is skipped (traversal finding, directory or
    /// file creation failure). The reason is human-readable.
    fn on_entry_skipped(&mut self, path: &Path, reason: &str);

    /// Called periodically with running totals.
    fn on_progress(&mut self, files: usize, bytes: u64);

    /// Called once with final counts, whatever the outcome.
    fn on_session_end(&mut self, files: usize, bytes: u64);
}

/// No-op implementation of [`EventSink`].
#[derive(Debug, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn on_session_start(&mut self, _format: ContainerFormat) {}

    fn on_entry_written(&mut self, _path: &Path, _size: u64) {}

    fn on_entry_skipped(&mut self, _path: &Path, _reason: &str) {}

    fn on_progress(&mut self, _files: usize, _bytes: u64) {}

    fn on_session_end(&mut self, _files: usize, _bytes: u64) {}
}
