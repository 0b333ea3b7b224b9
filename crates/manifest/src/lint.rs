//! Timeline checks for entries the assembler accepts but cannot place exactly.

use serde::Serialize;

use crate::entry::Manifest;

/// A timeline problem found in a manifest.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelineIssue {
    /// `end <= start`. Speed-sync skips the entry; assembly refuses the manifest.
    NonPositiveDuration { index: usize, duration_secs: f64 },

    /// Entry starts before the previous entry started.
    OutOfOrder {
        index: usize,
        start_secs: f64,
        previous_start_secs: f64,
    },

    /// Entry starts before the previous entry ended.
    Overlap {
        index: usize,
        start_secs: f64,
        previous_end_secs: f64,
    },
}

impl TimelineIssue {
    pub fn index(&self) -> usize {
        match self {
            Self::NonPositiveDuration { index, .. }
            | Self::OutOfOrder { index, .. }
            | Self::Overlap { index, .. } => *index,
        }
    }
}

impl std::fmt::Display for TimelineIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveDuration {
                index,
                duration_secs,
            } => write!(f, "entry {index}: non-positive duration ({duration_secs:.2}s)"),
            Self::OutOfOrder {
                index,
                start_secs,
                previous_start_secs,
            } => write!(
                f,
                "entry {index}: starts at {start_secs:.2}s, before previous entry start {previous_start_secs:.2}s"
            ),
            Self::Overlap {
                index,
                start_secs,
                previous_end_secs,
            } => write!(
                f,
                "entry {index}: starts at {start_secs:.2}s, overlapping previous entry by {:.2}s",
                previous_end_secs - start_secs
            ),
        }
    }
}

/// Check each entry against its predecessor in manifest order.
///
/// An out-of-order entry is reported once as `OutOfOrder`, not also as `Overlap`.
pub fn lint_timeline(manifest: &Manifest) -> Vec<TimelineIssue> {
    let mut issues = Vec::new();

    for (index, entry) in manifest.iter().enumerate() {
        let duration = entry.manifest_duration();
        if !(duration > 0.0) {
            issues.push(TimelineIssue::NonPositiveDuration {
                index,
                duration_secs: duration,
            });
        }

        let Some(previous) = index.checked_sub(1).map(|i| &manifest.entries[i]) else {
            continue;
        };

        if entry.start_secs < previous.start_secs {
            issues.push(TimelineIssue::OutOfOrder {
                index,
                start_secs: entry.start_secs,
                previous_start_secs: previous.start_secs,
            });
        } else if entry.start_secs < previous.end_secs {
            issues.push(TimelineIssue::Overlap {
                index,
                start_secs: entry.start_secs,
                previous_end_secs: previous.end_secs,
            });
        }
    }

    issues
}
