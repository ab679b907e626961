//! Container format detection.
//!
//! The export tool shipped two incompatible container layouts. Detection
//! looks at the first header-record's worth of bytes: if they decode into a
//! plausible binary header the stream is treated as binary, anything else
//! falls back to the line-oriented text format. A decode failure is itself
//! evidence for "not binary", so classification never fails.

use std::time::SystemTime;

use crate::header;
use crate::header::MAX_ENTRY_SIZE;
use crate::path;

/// The two container layouts produced by the export tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    /// Fixed-size header records followed by raw payload bytes.
    Binary,
    /// Line-oriented sentinel format.
    Text,
}

impl std::fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Binary => write!(f, "binary"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// Classifies a stream from its first `min(len, 4375)` bytes.
///
/// Total and deterministic: any prefix shorter than one header record is
/// text (too small to hold even one binary entry); otherwise the prefix is
/// decoded and every plausibility check must pass for a binary verdict.
#[must_use]
pub fn classify_prefix(prefix: &[u8]) -> ContainerFormat {
    classify_prefix_at(prefix, SystemTime::now())
}

/// [`classify_prefix`] with an explicit clock, for the timestamp window.
#[must_use]
pub(crate) fn classify_prefix_at(prefix: &[u8], now: SystemTime) -> ContainerFormat {
    if prefix.len() < header::HEADER_LEN {
        return ContainerFormat::Text;
    }

    let Ok(raw) = header::decode(&prefix[..header::HEADER_LEN]) else {
        return ContainerFormat::Text;
    };

    let plausible = decoded_field(&raw.name).is_some_and(|name| {
        !name.is_empty() && name.len() <= header::NAME_LEN && is_plausible_name(&name)
    }) && decoded_field(&raw.path)
        .is_some_and(|p| p.len() <= header::PATH_LEN && !has_control_chars(&p))
        && u64::from(raw.size) < MAX_ENTRY_SIZE
        && header::mtime_in_window(raw.mtime, now);

    if plausible {
        ContainerFormat::Binary
    } else {
        tracing::debug!("first header block failed plausibility checks, using text fallback");
        ContainerFormat::Text
    }
}

fn decoded_field(raw: &str) -> Option<String> {
    path::decode(raw).ok()
}

fn has_control_chars(value: &str) -> bool {
    value.chars().any(char::is_control)
}

/// Permissive filename class: letters, digits, `._- ()[]&@%+`, and any
/// non-ASCII character. Control characters are excluded.
fn is_plausible_name(name: &str) -> bool {
    name.chars().all(|c| {
        c.is_alphanumeric()
            || !c.is_ascii()
            || matches!(
                c,
                '.' | '_' | '-' | ' ' | '(' | ')' | '[' | ']' | '&' | '@' | '%' | '+'
            )
    })
}
