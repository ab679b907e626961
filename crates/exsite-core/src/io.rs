//! I/O helpers shared by the container readers.

use std::io::Read;
use std::io::Write;
use std::io::{self};

use crate::ExtractionError;
use crate::Result;

/// Chunk size for payload streaming and skipping (512 KiB).
///
/// Peak memory is bounded by this constant regardless of entry size.
pub const CHUNK_SIZE: usize = 512 * 1024;

/// Wrapper writer that tracks total bytes written.
///
/// The counter only increments on successful writes; a write that fails
/// partway through counts only the bytes actually accepted.
pub struct CountingWriter<W> {
    inner: W,
    bytes_written: u64,
}

impl<W> CountingWriter<W> {
    /// Creates a new counting writer around `inner`.
    #[must_use]
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            bytes_written: 0,
        }
    }

    /// Returns the total number of bytes successfully written.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.bytes_written
    }

    /// Consumes the counting writer and returns the inner writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let bytes = self.inner.write(buf)?;
        self.bytes_written += bytes as u64;
        Ok(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.inner.write_all(buf)?;
        self.bytes_written += buf.len() as u64;
        Ok(())
    }
}

/// Reusable heap buffer for chunked payload copies.
///
/// One buffer serves a whole extraction session; no per-entry allocation
/// and no entry is ever materialized in full.
pub(crate) struct ChunkBuffer {
    buf: Vec<u8>,
}

impl ChunkBuffer {
    pub(crate) fn new() -> Self {
        Self {
            buf: vec![0u8; CHUNK_SIZE],
        }
    }

    /// Copies exactly `len` bytes from `reader` to `writer` in chunks.
    ///
    /// Returns the number of bytes copied, which is less than `len` only
    /// when the reader ends early; the caller decides whether a short copy
    /// is corruption.
    pub(crate) fn copy_exact<R: Read, W: Write>(
        &mut self,
        reader: &mut R,
        writer: &mut W,
        len: u64,
    ) -> Result<u64> {
        let mut remaining = len;
        while remaining > 0 {
            let want = usize::try_from(remaining.min(self.buf.len() as u64))
                .unwrap_or(self.buf.len());
            let got = read_retrying(reader, &mut self.buf[..want])?;
            if got == 0 {
                break;
            }
            writer
                .write_all(&self.buf[..got])
                .map_err(ExtractionError::Io)?;
            remaining -= got as u64;
        }
        Ok(len - remaining)
    }

    /// Advances `reader` by exactly `len` bytes without keeping the data.
    ///
    /// Returns the number of bytes actually skipped; a short skip leaves
    /// the stream position unrecoverable and the caller must abort.
    pub(crate) fn skip_exact<R: Read>(&mut self, reader: &mut R, len: u64) -> Result<u64> {
        let mut remaining = len;
        while remaining > 0 {
            let want = usize::try_from(remaining.min(self.buf.len() as u64))
                .unwrap_or(self.buf.len());
            let got = read_retrying(reader, &mut self.buf[..want])?;
            if got == 0 {
                break;
            }
            remaining -= got as u64;
        }
        Ok(len - remaining)
    }
}

/// Reads until the buffer is full or the stream ends, retrying on
/// `Interrupted`. Returns the number of bytes read.
pub(crate) fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(ExtractionError::Io(e)),
        }
    }
    Ok(filled)
}

fn read_retrying<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    loop {
        match reader.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(ExtractionError::Io(e)),
        }
    }
}
