//! Outcome of a speed-sync run.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use clipsync_common::error::ClipsyncResult;
use clipsync_manifest::TimelineEntry;

use crate::speed_sync::SpeedPlan;

/// An entry that was corrected.
#[derive(Debug, Clone, Serialize)]
pub struct SyncedEntry {
    /// Position in the input manifest.
    pub index: usize,
    /// Input clip as listed in the manifest.
    pub input: PathBuf,
    /// Entry as written to the synced manifest.
    pub entry: TimelineEntry,
    pub plan: SpeedPlan,
}

/// An entry that was skipped.
#[derive(Debug, Clone, Serialize)]
pub struct EntryFailure {
    pub index: usize,
    pub input: PathBuf,
    pub error: String,
}

/// Successes and failures of one speed-sync run, in manifest order.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub manifest: PathBuf,
    /// Where the synced manifest was written, if any entry succeeded.
    pub synced_manifest: Option<PathBuf>,
    pub generated_at: DateTime<Utc>,
    pub synced: Vec<SyncedEntry>,
    pub failures: Vec<EntryFailure>,
}

impl SyncReport {
    pub fn new(
        manifest: PathBuf,
        synced_manifest: Option<PathBuf>,
        synced: Vec<SyncedEntry>,
        failures: Vec<EntryFailure>,
    ) -> Self {
        Self {
            manifest,
            synced_manifest,
            generated_at: Utc::now(),
            synced,
            failures,
        }
    }

    pub fn total_entries(&self) -> usize {
        self.synced.len() + self.failures.len()
    }

    /// Entries whose speed factor had to be clamped.
    pub fn clamped_count(&self) -> usize {
        self.synced.iter().filter(|s| s.plan.clamped).count()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> ClipsyncResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::info!(report = %path.display(), "Wrote sync report");
        Ok(())
    }
}
