//! Codec for the percent-encoded name and path fields.
//!
//! The export tool percent-encodes names and directory paths so they survive
//! fixed-width, NUL-terminated storage. This module decodes those fields and
//! resolves them against the destination root with a traversal guard; the
//! legacy format performs no such check, so the guard here is a hardening
//! addition, not a port.

use std::path::Path;
use std::path::PathBuf;

use percent_encoding::AsciiSet;
use percent_encoding::CONTROLS;
use percent_encoding::percent_decode_str;
use percent_encoding::utf8_percent_encode;

use crate::ExtractionError;
use crate::Result;

/// Bytes percent-encoded when producing stored fields.
///
/// Control bytes would break the NUL-terminated storage and `%` must be
/// escaped for decoding to be unambiguous. Non-ASCII bytes are always
/// encoded by the percent-encoding crate.
const STORED_FIELD: &AsciiSet = &CONTROLS.add(b'%');

/// Decodes one stored name or path field.
///
/// Trims trailing NUL padding, percent-decodes the remainder and verifies
/// the result is valid UTF-8 with no embedded NUL.
///
/// # Errors
///
/// Returns [`ExtractionError::MalformedPath`] if the decoded bytes are not
/// UTF-8 or still contain a NUL byte.
pub fn decode(raw: &str) -> Result<String> {
    let trimmed = raw.trim_end_matches('\0');
    let decoded = percent_decode_str(trimmed)
        .decode_utf8()
        .map_err(|_| ExtractionError::MalformedPath("field is not valid UTF-8".to_string()))?;
    if decoded.contains('\0') {
        return Err(ExtractionError::MalformedPath(
            "field contains embedded NUL".to_string(),
        ));
    }
    Ok(decoded.into_owned())
}

/// Percent-encodes a name or path for storage. Exact inverse of [`decode`].
#[must_use]
pub fn encode(value: &str) -> String {
    utf8_percent_encode(value, STORED_FIELD).to_string()
}

/// Resolves a decoded entry path against the destination root.
///
/// Joins `rel_dir` and `name` with a single separator, strips leading
/// separators (stored paths are always root-relative) and rejects any
/// parent-directory component so no entry can resolve outside `root`.
///
/// # Errors
///
/// Returns [`ExtractionError::PathTraversal`] for `..` components and
/// [`ExtractionError::MalformedPath`] if nothing remains after sanitizing.
pub fn resolve(root: &Path, rel_dir: &str, name: &str) -> Result<PathBuf> {
    let joined = if rel_dir.is_empty() {
        name.to_string()
    } else if name.is_empty() {
        rel_dir.to_string()
    } else {
        format!("{rel_dir}/{name}")
    };

    let mut rel = PathBuf::new();
    for component in joined.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                return Err(ExtractionError::PathTraversal {
                    path: PathBuf::from(joined),
                });
            }
            comp => rel.push(comp),
        }
    }

    if rel.as_os_str().is_empty() {
        return Err(ExtractionError::MalformedPath(
            "entry path is empty after sanitizing".to_string(),
        ));
    }
    Ok(root.join(rel))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain() {
        assert_eq!(decode("index.html").unwrap(), "index.html");
    }

    #[test]
    fn test_decode_trims_nul_padding() {
        assert_eq!(decode("a.txt\0\0\0\0").unwrap(), "a.txt");
    }

    #[test]
    fn test_decode_percent_sequences() {
        assert_eq!(decode("hello%20world.txt").unwrap(), "hello world.txt");
        assert_eq!(decode("100%25.txt").unwrap(), "100%.txt");
    }

    #[test]
    fn test_decode_unicode() {
        let encoded = encode("résumé (final).pdf");
        assert_eq!(decode(&encoded).unwrap(), "résumé (final).pdf");
    }

    #[test]
    fn test_decode_rejects_embedded_nul() {
        let result = decode("bad%00name.txt");
        assert!(matches!(result, Err(ExtractionError::MalformedPath(_))));
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        // %FF is not a valid UTF-8 byte on its own
        let result = decode("bad%FFname");
        assert!(matches!(result, Err(ExtractionError::MalformedPath(_))));
    }

    #[test]
    fn test_encode_round_trip() {
        for s in ["plain.txt", "with space", "50%", "naïve/ümlaut", "a+b&c@d"] {
            assert_eq!(decode(&encode(s)).unwrap(), s);
        }
    }

    #[test]
    fn test_resolve_joins_dir_and_name() {
        let path = resolve(Path::new("/out"), "blog/2024", "post.html").unwrap();
        assert_eq!(path, PathBuf::from("/out/blog/2024/post.html"));
    }

    #[test]
    fn test_resolve_empty_dir() {
        let path = resolve(Path::new("/out"), "", "root.html").unwrap();
        assert_eq!(path, PathBuf::from("/out/root.html"));
    }

    #[test]
    fn test_resolve_strips_leading_separator() {
        let path = resolve(Path::new("/out"), "/var/www", "x.txt").unwrap();
        assert_eq!(path, PathBuf::from("/out/var/www/x.txt"));
    }

    #[test]
    fn test_resolve_skips_current_dir_components() {
        let path = resolve(Path::new("/out"), "./a/./b", "f").unwrap();
        assert_eq!(path, PathBuf::from("/out/a/b/f"));
    }

    #[test]
    fn test_resolve_rejects_parent_components() {
        for dir in ["..", "../etc", "a/../../etc", "a/b/.."] {
            let result = resolve(Path::new("/out"), dir, "passwd");
            assert!(
                matches!(result, Err(ExtractionError::PathTraversal { .. })),
                "should reject: {dir}"
            );
        }
    }

    #[test]
    fn test_resolve_rejects_parent_name() {
        let result = resolve(Path::new("/out"), "a", "..");
        assert!(matches!(result, Err(ExtractionError::PathTraversal { .. })));
    }

    #[test]
    fn test_resolve_rejects_empty() {
        let result = resolve(Path::new("/out"), "", "");
        assert!(matches!(result, Err(ExtractionError::MalformedPath(_))));

        let result = resolve(Path::new("/out"), "///", ".");
        assert!(matches!(result, Err(ExtractionError::MalformedPath(_))));
    }
}
