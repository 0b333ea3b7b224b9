//! Per-entry speed correction.
//!
//! Each clip is played back at `actual / slot` times its speed so that it
//! fills its manifest slot. The factor is clamped to `[min_speed, max_speed]`;
//! a clamped clip will not fill its slot exactly but is still written.

use std::path::Path;

use serde::Serialize;

use clipsync_common::config::SyncSettings;
use clipsync_common::error::{ClipsyncError, ClipsyncResult};
use clipsync_engine::AudioEngine;
use clipsync_manifest::{derived_path, Manifest, TimelineEntry};

use crate::report::{EntryFailure, SyncReport, SyncedEntry};

/// Speed factor computed for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpeedPlan {
    /// Slot length from the manifest.
    pub manifest_secs: f64,
    /// Measured clip length.
    pub actual_secs: f64,
    /// `actual_secs / manifest_secs`.
    pub raw_factor: f64,
    /// Factor handed to the engine after clamping.
    pub applied_factor: f64,
    /// Whether clamping changed the factor.
    pub clamped: bool,
}

impl SpeedPlan {
    /// Compute the clamped factor. `manifest_secs` must be positive.
    pub fn compute(manifest_secs: f64, actual_secs: f64, min_speed: f64, max_speed: f64) -> Self {
        let raw_factor = actual_secs / manifest_secs;
        let applied_factor = clamp(raw_factor, min_speed, max_speed);
        Self {
            manifest_secs,
            actual_secs,
            raw_factor,
            applied_factor,
            clamped: applied_factor != raw_factor,
        }
    }

    /// Playback length after the applied factor.
    pub fn corrected_secs(&self) -> f64 {
        self.actual_secs / self.applied_factor
    }
}

fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Speed-sync pass over a manifest.
pub struct SpeedSync<E: AudioEngine> {
    engine: E,
    settings: SyncSettings,
}

impl<E: AudioEngine> SpeedSync<E> {
    pub fn new(engine: E, settings: SyncSettings) -> Self {
        Self { engine, settings }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Clamped speed plan for a slot of `manifest_secs` and a clip of `actual_secs`.
    pub fn plan(&self, manifest_secs: f64, actual_secs: f64) -> SpeedPlan {
        SpeedPlan::compute(
            manifest_secs,
            actual_secs,
            self.settings.min_speed,
            self.settings.max_speed,
        )
    }

    /// Correct every entry of the manifest at `manifest_path`.
    ///
    /// Entry failures are logged and recorded in the report. Successful entries
    /// are written, in manifest order, to `<name>_synced<ext>` next to the
    /// input manifest. Nothing is written when no entry succeeds.
    ///
    /// Fatal errors: an unreadable or malformed manifest, a clamp range the
    /// engine cannot apply, or a failed write of the synced manifest.
    pub fn run(&self, manifest_path: &Path) -> ClipsyncResult<SyncReport> {
        self.check_speed_range()?;

        let manifest = Manifest::load(manifest_path)
            .map_err(|e| ClipsyncError::invalid_manifest(manifest_path, e.to_string()))?;

        tracing::info!(
            manifest = %manifest_path.display(),
            entries = manifest.len(),
            min_speed = self.settings.min_speed,
            max_speed = self.settings.max_speed,
            "Starting speed sync"
        );

        let (synced, failures) = manifest.iter().enumerate().try_fold(
            (Vec::new(), Vec::new()),
            |(mut synced, mut failures), (index, entry)| {
                match self.process_entry(index, entry) {
                    Ok((corrected, plan)) => synced.push(SyncedEntry {
                        index,
                        input: entry.file_path.clone(),
                        entry: corrected,
                        plan,
                    }),
                    Err(err) if !err.is_entry_level() => return Err(err),
                    Err(err) => {
                        tracing::warn!(
                            index,
                            file = %entry.file_path.display(),
                            error = %err,
                            "Skipping entry"
                        );
                        failures.push(EntryFailure {
                            index,
                            input: entry.file_path.clone(),
                            error: err.to_string(),
                        });
                    }
                }
                Ok((synced, failures))
            },
        )?;

        let synced_manifest = if synced.is_empty() {
            tracing::warn!("No audio files were successfully processed; synced manifest not created");
            None
        } else {
            let out_path = derived_path(manifest_path, &self.settings.synced_suffix);
            let entries: Vec<TimelineEntry> = synced.iter().map(|s| s.entry.clone()).collect();
            Manifest::new(entries)
                .save(&out_path)
                .map_err(|e| ClipsyncError::write(&out_path, e.to_string()))?;
            tracing::info!(
                path = %out_path.display(),
                synced = synced.len(),
                skipped = failures.len(),
                "Wrote synced manifest"
            );
            Some(out_path)
        };

        Ok(SyncReport::new(
            manifest_path.to_path_buf(),
            synced_manifest,
            synced,
            failures,
        ))
    }

    /// Correct one entry and return it pointing at the corrected file.
    ///
    /// `index` is only used for error reporting.
    pub fn process_entry(
        &self,
        index: usize,
        entry: &TimelineEntry,
    ) -> ClipsyncResult<(TimelineEntry, SpeedPlan)> {
        let manifest_secs = entry.manifest_duration();
        if !(manifest_secs > 0.0) {
            return Err(ClipsyncError::InvalidDuration {
                index,
                duration: manifest_secs,
            });
        }

        let actual_secs = self.engine.measure_duration(&entry.file_path)?;
        if actual_secs == 0.0 {
            return Err(ClipsyncError::ZeroDuration {
                path: entry.file_path.clone(),
            });
        }

        let plan = self.plan(manifest_secs, actual_secs);
        tracing::debug!(
            index,
            file = %entry.file_path.display(),
            manifest_secs,
            actual_secs,
            raw_factor = plan.raw_factor,
            "Computed speed factor"
        );
        if plan.clamped {
            tracing::warn!(
                index,
                file = %entry.file_path.display(),
                raw_factor = plan.raw_factor,
                applied_factor = plan.applied_factor,
                corrected_secs = plan.corrected_secs(),
                "Speed factor clamped; clip will not fill its slot exactly"
            );
        }

        let output = derived_path(&entry.file_path, &self.settings.synced_suffix);
        self.engine
            .apply_speed(&entry.file_path, &output, plan.applied_factor)?;
        tracing::info!(
            index,
            output = %output.display(),
            factor = plan.applied_factor,
            "Created speed-corrected clip"
        );

        Ok((entry.with_file(output), plan))
    }

    fn check_speed_range(&self) -> ClipsyncResult<()> {
        let (min, max) = (self.settings.min_speed, self.settings.max_speed);
        let (engine_min, engine_max) = self.engine.speed_range();
        if !(min > 0.0) || min > max || min < engine_min || max > engine_max {
            return Err(ClipsyncError::config(format!(
                "speed range [{min}, {max}] must lie within the {} engine range [{engine_min}, {engine_max}]",
                self.engine.name()
            )));
        }
        Ok(())
    }
}
