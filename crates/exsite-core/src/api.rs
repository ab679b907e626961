//! High-level public API for archive detection and extraction.

use std::fs::File;
use std::io::Read;
use std::io::Seek;
use std::path::Path;

use crate::ExtractOptions;
use crate::ExtractionOutcome;
use crate::Result;
use crate::detect::ContainerFormat;
use crate::events::NoopSink;
use crate::session;
use crate::session::ExtractionSession;

/// Detects which container layout a stream uses.
///
/// Reads at most one header-record's worth of bytes and rewinds the stream,
/// so the same handle can be passed on to extraction.
///
/// # Errors
///
/// Returns an error only if reading or rewinding the stream fails;
/// classification itself is total.
pub fn detect_format<R: Read + Seek>(input: &mut R) -> Result<ContainerFormat> {
    session::sniff_format(input)
}

/// Opens an archive file and extracts it to `dest_dir`.
///
/// The destination root is created if missing. Events are discarded; use
/// [`ExtractionSession`] directly to observe progress.
///
/// # Errors
///
/// Returns an error if the archive cannot be opened or the destination
/// root cannot be created — input errors raised before any decoding
/// begins. Everything after that is reported through the returned
/// [`ExtractionOutcome`].
///
/// # Examples
///
/// ```no_run
/// use exsite_core::ExtractOptions;
/// use exsite_core::extract_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let outcome = extract_archive("site-export.bin", "restored/", &ExtractOptions::default())?;
/// if !outcome.is_success() {
///     eprintln!("extraction incomplete: {outcome}");
/// }
/// # Ok(())
/// # }
/// ```
pub fn extract_archive<P: AsRef<Path>, Q: AsRef<Path>>(
    archive_path: P,
    dest_dir: Q,
    opts: &ExtractOptions,
) -> Result<ExtractionOutcome> {
    let input = File::open(archive_path.as_ref())?;
    std::fs::create_dir_all(dest_dir.as_ref())?;

    let mut sink = NoopSink;
    let mut session = ExtractionSession::new(opts, &mut sink);
    Ok(session.extract(input, dest_dir.as_ref()))
}
