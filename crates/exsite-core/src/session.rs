//! Session orchestration: detection, dispatch, outcome classification.

use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::path::Path;
use std::time::Instant;

use crate::ExtractOptions;
use crate::ExtractionOutcome;
use crate::binary::BinaryReader;
use crate::binary::Termination;
use crate::detect;
use crate::detect::ContainerFormat;
use crate::events::EventSink;
use crate::header::HEADER_LEN;
use crate::io::read_full;
use crate::outcome::ExtractionStats;
use crate::text::TextReader;

/// One extraction run over a single input stream.
///
/// The session owns no I/O of its own: the caller supplies the open stream,
/// the destination root and the event sink. There is no retry logic; the
/// only resilience mechanisms are the whole-archive fallback from binary to
/// text and the per-entry skip inside the readers.
///
/// # Examples
///
/// ```no_run
/// use exsite_core::ExtractOptions;
/// use exsite_core::ExtractionSession;
/// use exsite_core::NoopSink;
/// use std::fs::File;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let opts = ExtractOptions::default();
/// let mut sink = NoopSink;
/// let mut session = ExtractionSession::new(&opts, &mut sink);
/// let input = File::open("site-export.bin")?;
/// let outcome = session.extract(input, Path::new("/var/www/restore"));
/// println!("{outcome}");
/// # Ok(())
/// # }
/// ```
pub struct ExtractionSession<'a> {
    opts: &'a ExtractOptions,
    sink: &'a mut dyn EventSink,
}

impl<'a> ExtractionSession<'a> {
    /// Creates a session with the given options and event sink.
    pub fn new(opts: &'a ExtractOptions, sink: &'a mut dyn EventSink) -> Self {
        Self { opts, sink }
    }

    /// Detects the container format and extracts the stream to `dest`.
    ///
    /// Always produces exactly one [`ExtractionOutcome`]; I/O failures
    /// before or outside the archive structure surface as
    /// [`ExtractionOutcome::FatalIo`] rather than a panic or an `Err`.
    pub fn extract<R: Read + Seek>(&mut self, mut input: R, dest: &Path) -> ExtractionOutcome {
        let started = Instant::now();

        let format = match sniff_format(&mut input) {
            Ok(format) => format,
            Err(err) => return ExtractionOutcome::FatalIo(err),
        };
        tracing::debug!(%format, dest = %dest.display(), "starting extraction session");
        self.sink.on_session_start(format);

        let mut stats = ExtractionStats::default();
        let ended = match format {
            ContainerFormat::Binary => {
                let mut reader = BinaryReader::new(input, dest, self.opts);
                reader.extract_all(&mut stats, self.sink)
            }
            ContainerFormat::Text => {
                let mut reader = TextReader::new(BufReader::new(input), dest, self.opts);
                reader
                    .extract_all(&mut stats, self.sink)
                    // Both text endings are clean completions.
                    .map(|_| Termination::EndOfArchive)
            }
        };

        stats.duration = started.elapsed();
        self.sink
            .on_session_end(stats.files_extracted, stats.bytes_written);

        let outcome = match ended {
            Err(err) => ExtractionOutcome::FatalIo(err),
            Ok(Termination::Corrupted) => ExtractionOutcome::Corrupted {
                files_extracted: stats.files_extracted,
            },
            Ok(Termination::EndOfArchive) => {
                if stats.files_extracted == 0 {
                    ExtractionOutcome::EmptyArchive
                } else {
                    ExtractionOutcome::Success(stats)
                }
            }
        };
        tracing::debug!(%outcome, "extraction session finished");
        outcome
    }
}

/// Reads the detection prefix and rewinds the stream.
pub(crate) fn sniff_format<R: Read + Seek>(
    input: &mut R,
) -> crate::Result<ContainerFormat> {
    let mut prefix = [0u8; HEADER_LEN];
    let got = read_full(input, &mut prefix)?;
    input.rewind()?;
    Ok(detect::classify_prefix(&prefix[..got]))
}
