//! Extraction options.

use std::time::Duration;

/// Tunables for one extraction session.
///
/// Pass by reference; the struct is cheap but there is no reason to clone
/// it per entry.
///
/// # Examples
///
/// ```
/// use exsite_core::ExtractOptions;
/// use std::time::Duration;
///
/// // Defaults: no throttling, progress every 100 entries.
/// let opts = ExtractOptions::default();
///
/// // Throttle host I/O between entries.
/// let gentle = ExtractOptions {
///     inter_entry_delay: Some(Duration::from_millis(10)),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Fixed delay inserted between entries to throttle host I/O.
    ///
    /// Has no effect on correctness or ordering.
    pub inter_entry_delay: Option<Duration>,

    /// Number of extracted entries between progress events.
    pub progress_interval: usize,
}

impl Default for ExtractOptions {
    /// Defaults: no inter-entry delay, progress every 100 entries.
    fn default() -> Self {
        Self {
            inter_entry_delay: None,
            progress_interval: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = ExtractOptions::default();
        assert!(opts.inter_entry_delay.is_none());
        assert_eq!(opts.progress_interval, 100);
    }
}
