//! Timeline entry and manifest types.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One scheduled audio segment on the master timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Slot start in seconds.
    pub start_secs: f64,

    /// Slot end in seconds (exclusive).
    pub end_secs: f64,

    /// Speaker label, passed through unmodified.
    pub speaker: String,

    /// Audio file for this slot, as written in the manifest.
    pub file_path: PathBuf,
}

impl TimelineEntry {
    pub fn new(
        start_secs: f64,
        end_secs: f64,
        speaker: impl Into<String>,
        file_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            start_secs,
            end_secs,
            speaker: speaker.into(),
            file_path: file_path.into(),
        }
    }

    /// Length of the slot the clip must fill. Non-positive for invalid entries.
    pub fn manifest_duration(&self) -> f64 {
        self.end_secs - self.start_secs
    }

    /// Same timing and speaker, different audio file.
    pub fn with_file(&self, file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            ..self.clone()
        }
    }
}

/// An ordered list of timeline entries.
///
/// Order is authoritative; entries are not required to be sorted by start time
/// and no field is required to be unique.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub entries: Vec<TimelineEntry>,
}

impl Manifest {
    pub fn new(entries: Vec<TimelineEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimelineEntry> {
        self.entries.iter()
    }

    /// Latest end time across all entries, or 0.0 for an empty manifest.
    pub fn timeline_end_secs(&self) -> f64 {
        self.entries
            .iter()
            .map(|e| e.end_secs)
            .fold(0.0, f64::max)
    }

    /// Distinct speakers in order of first appearance.
    pub fn speakers(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !seen.contains(&entry.speaker.as_str()) {
                seen.push(&entry.speaker);
            }
        }
        seen
    }

    /// Entries whose audio file does not exist on disk.
    pub fn missing_files(&self) -> Vec<&Path> {
        self.entries
            .iter()
            .map(|e| e.file_path.as_path())
            .filter(|p| !p.exists())
            .collect()
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a TimelineEntry;
    type IntoIter = std::slice::Iter<'a, TimelineEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
