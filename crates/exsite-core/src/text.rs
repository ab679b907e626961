//! Line-oriented decoder for the sentinel text format (fallback).
//!
//! The stream is a UTF-8 line format: optional `#` comment preamble, then
//! repeated `FILE-START:<path>` / `SIZE-HASH:` metadata / content lines /
//! `FILE-END` groups, closed by `ARCHIVE-END`. Content lines are copied
//! byte-for-byte including their original terminators. Sentinel matching
//! is exact, so a content line equal to `FILE-END` corrupts the boundary —
//! an accepted limitation of the format, not something this decoder can
//! repair.
//!
//! Unlike the binary reader, structural problems here degrade to per-entry
//! skips: an unresolvable path or unopenable output discards content lines
//! until the next sentinel and the loop continues.

use std::fs;
use std::fs::File;
use std::io::BufRead;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use crate::ExtractOptions;
use crate::Result;
use crate::events::EventSink;
use crate::io::CountingWriter;
use crate::outcome::ExtractionStats;
use crate::path;

const FILE_START: &[u8] = b"FILE-START:";
const FILE_END: &[u8] = b"FILE-END";
const ARCHIVE_END: &[u8] = b"ARCHIVE-END";
const METADATA_PREFIX: &[u8] = b"SIZE-HASH:";
const COMMENT_MARKER: &[u8] = b"#";

/// How a text run ended. Both variants are non-fatal: whatever was
/// extracted before the end stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TextEnd {
    /// The archive-end sentinel was seen.
    Done,
    /// Input ended without the archive-end sentinel.
    EndOfStream,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Preamble,
    Idle,
    Header,
    Content,
}

pub(crate) struct TextReader<'a, R: BufRead> {
    input: R,
    dest: &'a Path,
    opts: &'a ExtractOptions,
    state: State,
    /// Destination resolved from the last file-start sentinel; `None` after
    /// a failed resolve, which discards the group.
    pending: Option<PathBuf>,
    current: Option<(PathBuf, CountingWriter<File>)>,
}

impl<'a, R: BufRead> TextReader<'a, R> {
    pub(crate) fn new(input: R, dest: &'a Path, opts: &'a ExtractOptions) -> Self {
        Self {
            input,
            dest,
            opts,
            state: State::Preamble,
            pending: None,
            current: None,
        }
    }

    /// Drives the line loop to exhaustion, one line at a time with no
    /// look-ahead.
    pub(crate) fn extract_all(
        &mut self,
        stats: &mut ExtractionStats,
        sink: &mut dyn EventSink,
    ) -> Result<TextEnd> {
        let mut line = Vec::new();
        loop {
            line.clear();
            let got = self.input.read_until(b'\n', &mut line)?;
            if got == 0 {
                self.close_current(stats, sink);
                return Ok(TextEnd::EndOfStream);
            }

            let sentinel = strip_terminator(&line);

            if self.state == State::Preamble {
                if sentinel.starts_with(COMMENT_MARKER) {
                    continue;
                }
                self.state = State::Idle;
            }

            match self.state {
                State::Preamble | State::Idle => {
                    if sentinel == ARCHIVE_END {
                        return Ok(TextEnd::Done);
                    }
                    if let Some(rest) = sentinel.strip_prefix(FILE_START) {
                        self.start_entry(rest, stats, sink);
                    }
                    // Anything else between groups is noise; drop it.
                }
                State::Header => {
                    if sentinel.starts_with(METADATA_PREFIX) {
                        self.open_output(stats, sink);
                        self.state = State::Content;
                    } else if sentinel == ARCHIVE_END {
                        return Ok(TextEnd::Done);
                    } else if let Some(rest) = sentinel.strip_prefix(FILE_START) {
                        // A new group before the metadata line abandons the
                        // previous start.
                        self.start_entry(rest, stats, sink);
                    }
                }
                State::Content => {
                    if sentinel == FILE_END {
                        self.close_current(stats, sink);
                        self.state = State::Idle;
                        if let Some(delay) = self.opts.inter_entry_delay {
                            std::thread::sleep(delay);
                        }
                    } else if sentinel == ARCHIVE_END {
                        self.close_current(stats, sink);
                        return Ok(TextEnd::Done);
                    } else if let Some((_, writer)) = self.current.as_mut() {
                        // Verbatim passthrough, terminator included.
                        writer.write_all(&line)?;
                    }
                }
            }
        }
    }

    /// Handles a file-start sentinel: resolve the stored path and create
    /// its parent directories.
    fn start_entry(&mut self, raw_path: &[u8], stats: &mut ExtractionStats, sink: &mut dyn EventSink) {
        self.close_current(stats, sink);
        self.state = State::Header;
        self.pending = None;

        let Ok(stored) = str::from_utf8(raw_path) else {
            self.record_skip(Path::new("<non-UTF-8>"), "path is not valid UTF-8", stats, sink);
            return;
        };

        let resolved = path::decode(stored)
            .and_then(|decoded| path::resolve(self.dest, &decoded, ""));
        let dest_path = match resolved {
            Ok(p) => p,
            Err(err) => {
                self.record_skip(Path::new(stored), &err.to_string(), stats, sink);
                return;
            }
        };

        if let Some(parent) = dest_path.parent()
            && let Err(err) = fs::create_dir_all(parent)
        {
            let reason = format!("cannot create directory: {err}");
            self.record_skip(&dest_path, &reason, stats, sink);
            return;
        }

        self.pending = Some(dest_path);
    }

    /// Handles the metadata sentinel: open the output stream.
    ///
    /// On failure the group has no current output and content lines are
    /// silently discarded until the next sentinel — best-effort recovery.
    fn open_output(&mut self, stats: &mut ExtractionStats, sink: &mut dyn EventSink) {
        let Some(dest_path) = self.pending.take() else {
            return;
        };
        match File::create(&dest_path) {
            Ok(file) => self.current = Some((dest_path, CountingWriter::new(file))),
            Err(err) => {
                let reason = format!("cannot create file: {err}");
                self.record_skip(&dest_path, &reason, stats, sink);
            }
        }
    }

    /// Closes the open output, if any, and counts the finished file.
    fn close_current(&mut self, stats: &mut ExtractionStats, sink: &mut dyn EventSink) {
        if let Some((dest_path, writer)) = self.current.take() {
            let bytes = writer.total_bytes();
            drop(writer.into_inner());
            stats.files_extracted += 1;
            stats.bytes_written += bytes;
            sink.on_entry_written(&dest_path, bytes);
            if stats.files_extracted.is_multiple_of(self.opts.progress_interval) {
                sink.on_progress(stats.files_extracted, stats.bytes_written);
            }
        }
    }

    fn record_skip(
        &mut self,
        shown: &Path,
        reason: &str,
        stats: &mut ExtractionStats,
        sink: &mut dyn EventSink,
    ) {
        tracing::debug!(path = %shown.display(), reason, "skipping text entry");
        sink.on_entry_skipped(shown, reason);
        stats.warnings.push(format!("{}: {reason}", shown.display()));
    }
}

/// Strips the line terminator (`\n` or `\r\n`) for sentinel comparison.
/// Content writes use the original bytes, never this view.
fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
