//! Codec for the fixed-size binary header record.
//!
//! Every entry in the binary container starts with one 4375-byte record:
//!
//! | field | width | semantics |
//! |-------|-------|-----------|
//! | name  | 255 bytes, NUL-padded | percent-encoded file name |
//! | size  | 4 bytes, unsigned LE  | declared payload length |
//! | mtime | 4 bytes, unsigned LE  | Unix timestamp |
//! | path  | 4112 bytes, NUL-padded | percent-encoded relative directory |
//!
//! Decoding is total over arbitrary bytes: it returns a decode error for
//! malformed input, never a panic. Expected-malformed input is normal
//! control flow here, not an exceptional condition.

use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use crate::ExtractionError;
use crate::Result;
use crate::path;

/// Total length of one header record in bytes.
pub const HEADER_LEN: usize = 4375;

/// Width of the NUL-padded name field.
pub const NAME_LEN: usize = 255;

/// Width of the NUL-padded directory path field.
pub const PATH_LEN: usize = 4112;

/// Maximum accepted payload size for a single entry (1 GiB).
pub const MAX_ENTRY_SIZE: u64 = 1024 * 1024 * 1024;

/// Earliest accepted entry timestamp: 2000-01-01T00:00:00Z.
const MTIME_FLOOR: u64 = 946_684_800;

/// Clock-skew slack accepted past "now" for entry timestamps.
const MTIME_FUTURE_SLACK: Duration = Duration::from_secs(30 * 24 * 60 * 60);

const SIZE_OFFSET: usize = NAME_LEN;
const MTIME_OFFSET: usize = SIZE_OFFSET + 4;
const PATH_OFFSET: usize = MTIME_OFFSET + 4;

/// Header fields as stored, before invariant validation.
///
/// `name` and `path` are still percent-encoded; NUL padding has been
/// trimmed. Field-level invariants are applied by
/// [`ArchiveEntry::from_raw`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHeader {
    /// Percent-encoded file name.
    pub name: String,
    /// Declared payload length in bytes.
    pub size: u32,
    /// Unix timestamp of the stored file.
    pub mtime: u32,
    /// Percent-encoded directory path, relative to the destination root.
    pub path: String,
}

/// Decodes one header record from exactly [`HEADER_LEN`] bytes.
///
/// # Errors
///
/// Returns [`ExtractionError::InvalidHeader`] if `buf` is not exactly
/// [`HEADER_LEN`] bytes long or a text field is not valid UTF-8 up to its
/// NUL padding.
pub fn decode(buf: &[u8]) -> Result<RawHeader> {
    if buf.len() != HEADER_LEN {
        return Err(ExtractionError::InvalidHeader(format!(
            "header record is {} bytes, expected {HEADER_LEN}",
            buf.len()
        )));
    }

    let name = decode_padded_field(&buf[..NAME_LEN], "name")?;
    let path = decode_padded_field(&buf[PATH_OFFSET..], "path")?;

    // Widths are fixed, so these slices are always exactly 4 bytes.
    let size = u32::from_le_bytes([
        buf[SIZE_OFFSET],
        buf[SIZE_OFFSET + 1],
        buf[SIZE_OFFSET + 2],
        buf[SIZE_OFFSET + 3],
    ]);
    let mtime = u32::from_le_bytes([
        buf[MTIME_OFFSET],
        buf[MTIME_OFFSET + 1],
        buf[MTIME_OFFSET + 2],
        buf[MTIME_OFFSET + 3],
    ]);

    Ok(RawHeader {
        name,
        size,
        mtime,
        path,
    })
}

/// Encodes a header into one fixed-size record. Exact inverse of [`decode`].
///
/// # Errors
///
/// Returns [`ExtractionError::InvalidHeader`] if a field does not fit its
/// storage width or contains a NUL byte.
pub fn encode(header: &RawHeader) -> Result<[u8; HEADER_LEN]> {
    let mut buf = [0u8; HEADER_LEN];
    encode_padded_field(header.name.as_bytes(), &mut buf[..NAME_LEN], "name")?;
    buf[SIZE_OFFSET..SIZE_OFFSET + 4].copy_from_slice(&header.size.to_le_bytes());
    buf[MTIME_OFFSET..MTIME_OFFSET + 4].copy_from_slice(&header.mtime.to_le_bytes());
    encode_padded_field(header.path.as_bytes(), &mut buf[PATH_OFFSET..], "path")?;
    Ok(buf)
}

fn decode_padded_field(field: &[u8], what: &str) -> Result<String> {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    str::from_utf8(&field[..end])
        .map(str::to_owned)
        .map_err(|_| ExtractionError::InvalidHeader(format!("{what} field is not valid UTF-8")))
}

fn encode_padded_field(value: &[u8], slot: &mut [u8], what: &str) -> Result<()> {
    if value.len() > slot.len() {
        return Err(ExtractionError::InvalidHeader(format!(
            "{what} field is {} bytes, at most {} fit",
            value.len(),
            slot.len()
        )));
    }
    if value.contains(&0) {
        return Err(ExtractionError::InvalidHeader(format!(
            "{what} field contains a NUL byte"
        )));
    }
    slot[..value.len()].copy_from_slice(value);
    Ok(())
}

/// A header that passed field validation, ready for extraction.
///
/// Owned transiently by a reader for the duration of one record plus its
/// payload; discarded once the payload is consumed or skipped.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Decoded file name.
    pub name: String,
    /// Decoded directory path, relative to the destination root.
    pub rel_dir: String,
    /// Declared payload length in bytes.
    pub size: u64,
    /// Unix timestamp of the stored file.
    pub mtime: u32,
}

impl ArchiveEntry {
    /// Validates a raw header against the field invariants.
    ///
    /// Requires a non-empty name, `size` below [`MAX_ENTRY_SIZE`], `mtime`
    /// between 2000-01-01 and `now` plus 30 days, and name/path fields
    /// that percent-decode without embedded NUL bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::InvalidHeader`] for invariant violations
    /// and [`ExtractionError::MalformedPath`] for undecodable fields.
    pub fn from_raw(raw: &RawHeader, now: SystemTime) -> Result<Self> {
        let size = u64::from(raw.size);
        if size >= MAX_ENTRY_SIZE {
            return Err(ExtractionError::InvalidHeader(format!(
                "declared size {size} exceeds the {MAX_ENTRY_SIZE} byte limit"
            )));
        }
        if !mtime_in_window(raw.mtime, now) {
            return Err(ExtractionError::InvalidHeader(format!(
                "timestamp {} outside the accepted window",
                raw.mtime
            )));
        }

        let name = path::decode(&raw.name)?;
        if name.is_empty() {
            return Err(ExtractionError::InvalidHeader(
                "entry name is empty".to_string(),
            ));
        }
        let rel_dir = path::decode(&raw.path)?;

        Ok(Self {
            name,
            rel_dir,
            size,
            mtime: raw.mtime,
        })
    }

    /// Entry timestamp as a `SystemTime`.
    #[must_use]
    pub fn modified(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(u64::from(self.mtime))
    }
}

/// Checks the `[2000-01-01, now + 30 days]` timestamp window.
pub(crate) fn mtime_in_window(mtime: u32, now: SystemTime) -> bool {
    let mtime = u64::from(mtime);
    if mtime < MTIME_FLOOR {
        return false;
    }
    let ceiling = now
        .duration_since(UNIX_EPOCH)
        .map(|since| since.saturating_add(MTIME_FUTURE_SLACK).as_secs())
        .unwrap_or(0);
    mtime <= ceiling
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_header() -> RawHeader {
        RawHeader {
            name: "index.html".to_string(),
            size: 1234,
            mtime: 1_600_000_000,
            path: "site/pages".to_string(),
        }
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let header = sample_header();
        let buf = encode(&header).unwrap();
        assert_eq!(buf.len(), HEADER_LEN);
        assert_eq!(decode(&buf).unwrap(), header);
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        assert!(matches!(
            decode(&[0u8; 100]),
            Err(ExtractionError::InvalidHeader(_))
        ));
        assert!(matches!(
            decode(&[0u8; HEADER_LEN + 1]),
            Err(ExtractionError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_decode_rejects_invalid_utf8_name() {
        let mut buf = encode(&sample_header()).unwrap();
        buf[0] = 0xFF;
        assert!(matches!(
            decode(&buf),
            Err(ExtractionError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_decode_stops_at_first_nul() {
        let mut buf = encode(&sample_header()).unwrap();
        // Garbage after the terminator must not leak into the field.
        buf[11] = b'X';
        assert_eq!(decode(&buf).unwrap().name, "index.html");
    }

    #[test]
    fn test_decode_arbitrary_bytes_never_panics() {
        let buf = [0xA5u8; HEADER_LEN];
        let _ = decode(&buf);
        let buf = [0u8; HEADER_LEN];
        let raw = decode(&buf).unwrap();
        assert_eq!(raw.name, "");
        assert_eq!(raw.size, 0);
    }

    #[test]
    fn test_encode_rejects_oversized_fields() {
        let mut header = sample_header();
        header.name = "x".repeat(NAME_LEN + 1);
        assert!(matches!(
            encode(&header),
            Err(ExtractionError::InvalidHeader(_))
        ));

        let mut header = sample_header();
        header.path = "p".repeat(PATH_LEN + 1);
        assert!(matches!(
            encode(&header),
            Err(ExtractionError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_encode_rejects_embedded_nul() {
        let mut header = sample_header();
        header.name = "bad\0name".to_string();
        assert!(matches!(
            encode(&header),
            Err(ExtractionError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_entry_from_valid_raw() {
        let now = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let entry = ArchiveEntry::from_raw(&sample_header(), now).unwrap();
        assert_eq!(entry.name, "index.html");
        assert_eq!(entry.rel_dir, "site/pages");
        assert_eq!(entry.size, 1234);
        assert_eq!(
            entry.modified(),
            UNIX_EPOCH + Duration::from_secs(1_600_000_000)
        );
    }

    #[test]
    fn test_entry_decodes_percent_fields() {
        let now = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let raw = RawHeader {
            name: "hello%20world.txt".to_string(),
            size: 1,
            mtime: 1_600_000_000,
            path: "my%20site".to_string(),
        };
        let entry = ArchiveEntry::from_raw(&raw, now).unwrap();
        assert_eq!(entry.name, "hello world.txt");
        assert_eq!(entry.rel_dir, "my site");
    }

    #[test]
    fn test_entry_rejects_max_u32_size() {
        let now = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let mut raw = sample_header();
        raw.size = u32::MAX;
        assert!(matches!(
            ArchiveEntry::from_raw(&raw, now),
            Err(ExtractionError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_entry_rejects_size_at_limit() {
        let now = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let mut raw = sample_header();
        raw.size = u32::try_from(MAX_ENTRY_SIZE).unwrap();
        assert!(ArchiveEntry::from_raw(&raw, now).is_err());

        raw.size = u32::try_from(MAX_ENTRY_SIZE).unwrap() - 1;
        assert!(ArchiveEntry::from_raw(&raw, now).is_ok());
    }

    #[test]
    fn test_entry_rejects_mtime_outside_window() {
        let now = UNIX_EPOCH + Duration::from_secs(1_700_000_000);

        // Before 2000-01-01.
        let mut raw = sample_header();
        raw.mtime = 946_684_799;
        assert!(ArchiveEntry::from_raw(&raw, now).is_err());
        raw.mtime = 946_684_800;
        assert!(ArchiveEntry::from_raw(&raw, now).is_ok());

        // Beyond now + 30 days.
        raw.mtime = 1_700_000_000 + 31 * 24 * 60 * 60;
        assert!(ArchiveEntry::from_raw(&raw, now).is_err());
        raw.mtime = 1_700_000_000 + 29 * 24 * 60 * 60;
        assert!(ArchiveEntry::from_raw(&raw, now).is_ok());
    }

    #[test]
    fn test_entry_rejects_empty_name() {
        let now = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let mut raw = sample_header();
        raw.name = String::new();
        assert!(matches!(
            ArchiveEntry::from_raw(&raw, now),
            Err(ExtractionError::InvalidHeader(_))
        ));
    }
}
