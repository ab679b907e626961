//! Sequential decoder for the binary container format.
//!
//! The wire format is a plain concatenation of `[4375-byte header][payload]`
//! records with no trailer, no global checksum and no entry count. The
//! reader advances one record per iteration and only ever holds one header
//! block plus one copy chunk in memory.
//!
//! Error policy: structural corruption (short header, undecodable fields,
//! truncated payload) is terminal because the stream position is no longer
//! trustworthy. Environment failures (directory or file creation denied)
//! and traversal findings skip exactly one entry, realigning the stream
//! with an exact-length payload skip.

use std::fs;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;

use crate::ExtractOptions;
use crate::Result;
use crate::events::EventSink;
use crate::header;
use crate::header::ArchiveEntry;
use crate::header::HEADER_LEN;
use crate::io::ChunkBuffer;
use crate::io::read_full;
use crate::outcome::ExtractionStats;
use crate::path;

/// How a reader run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Termination {
    /// Clean end of stream at a record boundary.
    EndOfArchive,
    /// Structural corruption; the stream position is unrecoverable.
    Corrupted,
}

/// One iteration's verdict, private to the reader loop.
enum EntryStep {
    Continue,
    Abort,
}

pub(crate) struct BinaryReader<'a, R: Read> {
    input: R,
    dest: &'a Path,
    opts: &'a ExtractOptions,
    chunk: ChunkBuffer,
}

impl<'a, R: Read> BinaryReader<'a, R> {
    pub(crate) fn new(input: R, dest: &'a Path, opts: &'a ExtractOptions) -> Self {
        Self {
            input,
            dest,
            opts,
            chunk: ChunkBuffer::new(),
        }
    }

    /// Drives the record loop to exhaustion.
    ///
    /// Counters accumulate into `stats`; per-entry events go to `sink`.
    /// `Err` is reserved for I/O failures outside the archive structure —
    /// corruption is a normal [`Termination`], not an error.
    pub(crate) fn extract_all(
        &mut self,
        stats: &mut ExtractionStats,
        sink: &mut dyn EventSink,
    ) -> Result<Termination> {
        let mut header_buf = [0u8; HEADER_LEN];

        loop {
            let got = read_full(&mut self.input, &mut header_buf)?;
            if got == 0 {
                return Ok(Termination::EndOfArchive);
            }
            if got < HEADER_LEN {
                tracing::warn!(got, "short header block at record boundary");
                return Ok(Termination::Corrupted);
            }

            let entry = match header::decode(&header_buf)
                .and_then(|raw| ArchiveEntry::from_raw(&raw, SystemTime::now()))
            {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(%err, "rejecting header block");
                    return Ok(Termination::Corrupted);
                }
            };

            match self.process_entry(&entry, stats, sink)? {
                EntryStep::Continue => {}
                EntryStep::Abort => return Ok(Termination::Corrupted),
            }

            if let Some(delay) = self.opts.inter_entry_delay {
                std::thread::sleep(delay);
            }
        }
    }

    fn process_entry(
        &mut self,
        entry: &ArchiveEntry,
        stats: &mut ExtractionStats,
        sink: &mut dyn EventSink,
    ) -> Result<EntryStep> {
        let dest_path = match path::resolve(self.dest, &entry.rel_dir, &entry.name) {
            Ok(p) => p,
            Err(err) if err.is_recoverable() => {
                let shown = PathBuf::from(&entry.rel_dir).join(&entry.name);
                return self.skip_entry(&shown, entry.size, &err.to_string(), stats, sink);
            }
            Err(err) => return Err(err),
        };

        if let Some(parent) = dest_path.parent()
            && let Err(err) = fs::create_dir_all(parent)
        {
            let reason = format!("cannot create directory: {err}");
            return self.skip_entry(&dest_path, entry.size, &reason, stats, sink);
        }

        let mut file = match File::create(&dest_path) {
            Ok(f) => f,
            Err(err) => {
                let reason = format!("cannot create file: {err}");
                return self.skip_entry(&dest_path, entry.size, &reason, stats, sink);
            }
        };

        if entry.size > 0 {
            let copied = self
                .chunk
                .copy_exact(&mut self.input, &mut file, entry.size)?;
            if copied < entry.size {
                // Partial file stays on disk; the outcome reports it.
                tracing::warn!(
                    path = %dest_path.display(),
                    copied,
                    declared = entry.size,
                    "payload truncated mid-entry"
                );
                return Ok(EntryStep::Abort);
            }
        }

        if let Err(err) = file.set_modified(entry.modified()) {
            stats
                .warnings
                .push(format!("{}: cannot set mtime: {err}", dest_path.display()));
        }
        drop(file);

        stats.files_extracted += 1;
        stats.bytes_written += entry.size;
        sink.on_entry_written(&dest_path, entry.size);
        if stats.files_extracted.is_multiple_of(self.opts.progress_interval) {
            sink.on_progress(stats.files_extracted, stats.bytes_written);
        }

        Ok(EntryStep::Continue)
    }

    /// Skips one entry's payload so the stream stays record-aligned.
    fn skip_entry(
        &mut self,
        shown_path: &Path,
        size: u64,
        reason: &str,
        stats: &mut ExtractionStats,
        sink: &mut dyn EventSink,
    ) -> Result<EntryStep> {
        sink.on_entry_skipped(shown_path, reason);
        stats
            .warnings
            .push(format!("{}: {reason}", shown_path.display()));

        let skipped = self.chunk.skip_exact(&mut self.input, size)?;
        if skipped < size {
            tracing::warn!(skipped, declared = size, "cannot realign after skip");
            return Ok(EntryStep::Abort);
        }
        Ok(EntryStep::Continue)
    }
}
