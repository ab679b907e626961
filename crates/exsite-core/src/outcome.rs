//! Extraction outcome classification.

use std::time::Duration;

use crate::ExtractionError;

/// Statistics for a completed extraction.
#[derive(Debug, Clone, Default)]
pub struct ExtractionStats {
    /// Number of files fully written to disk.
    pub files_extracted: usize,

    /// Total payload bytes written.
    pub bytes_written: u64,

    /// Wall-clock duration of the session.
    pub duration: Duration,

    /// Per-entry problems that did not stop the session.
    pub warnings: Vec<String>,
}

impl ExtractionStats {
    /// Returns whether any per-entry warnings were recorded.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Terminal classification of one extraction session.
///
/// Produced exactly once per session and immutable after creation. A
/// session that writes zero files is never a success: an empty result
/// almost always means the wrong format was chosen or the archive is
/// truncated at byte zero.
#[derive(Debug)]
pub enum ExtractionOutcome {
    /// The archive was decoded to exhaustion and at least one file was
    /// written.
    Success(ExtractionStats),

    /// The stream ended cleanly but no file was extracted.
    EmptyArchive,

    /// Structural corruption stopped the session; the destination holds a
    /// partial extraction of `files_extracted` complete files.
    Corrupted {
        /// Files fully written before the corruption point.
        files_extracted: usize,
    },

    /// An unrecoverable I/O failure outside the archive structure.
    FatalIo(ExtractionError),
}

impl ExtractionOutcome {
    /// Returns `true` for [`ExtractionOutcome::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Number of files fully written, whatever the outcome.
    #[must_use]
    pub fn files_extracted(&self) -> usize {
        match self {
            Self::Success(stats) => stats.files_extracted,
            Self::Corrupted { files_extracted } => *files_extracted,
            Self::EmptyArchive | Self::FatalIo(_) => 0,
        }
    }
}

impl std::fmt::Display for ExtractionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success(stats) => write!(
                f,
                "extracted {} files ({} bytes) in {:.2}s",
                stats.files_extracted,
                stats.bytes_written,
                stats.duration.as_secs_f64()
            ),
            Self::EmptyArchive => write!(f, "archive produced no files"),
            Self::Corrupted { files_extracted } => write!(
                f,
                "archive corrupted; {files_extracted} files extracted before failure"
            ),
            Self::FatalIo(err) => write!(f, "fatal I/O failure: {err}"),
        }
    }
}
