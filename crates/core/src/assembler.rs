//! Sequential timeline assembly.
//!
//! Entries are folded left to right into one track. Before each clip, the
//! gap between its start time and the current end of the track is filled
//! with silence. The track is then re-measured, so the cursor always follows
//! the real audio length rather than a sum of nominal durations:
//!
//! ```text
//! step 0:            [silence 0..s0] + clip0            -> step_0  (measure -> t0)
//! step 1: step_0   + [silence t0..s1] + clip1           -> step_1  (measure -> t1)
//! ...
//! step N-1 ------------------------------------------------> output
//! ```
//!
//! Overlapping or out-of-order entries (negative gap) are appended directly
//! after the track with no trimming or shifting.
//!
//! Intermediates are always WAV. When the output asks for another format the
//! finished track is encoded once, as the last step.

use std::path::{Path, PathBuf};

use serde::Serialize;

use clipsync_common::config::AssemblySettings;
use clipsync_common::error::{ClipsyncError, ClipsyncResult};
use clipsync_engine::{AudioEngine, EngineError};
use clipsync_manifest::Manifest;

const SCRATCH_PREFIX: &str = "clipsync-build-";
const SCRATCH_EXTENSION: &str = "wav";

/// One fold step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AssemblyStep {
    pub index: usize,
    /// `start - cursor` before this step. Negative for overlaps.
    pub gap_secs: f64,
    /// Whether a silence segment of `gap_secs` was inserted.
    pub silence_inserted: bool,
    /// Measured length of the track after this step.
    pub track_secs: f64,
}

/// Result of a successful assembly.
#[derive(Debug, Clone, Serialize)]
pub struct AssemblySummary {
    pub output: PathBuf,
    /// Measured length of the final track.
    pub duration_secs: f64,
    pub steps: Vec<AssemblyStep>,
}

impl AssemblySummary {
    pub fn total_silence_secs(&self) -> f64 {
        self.steps
            .iter()
            .filter(|s| s.silence_inserted)
            .map(|s| s.gap_secs)
            .sum()
    }

    /// Steps whose clip started before the end of the track.
    pub fn overlap_count(&self) -> usize {
        self.steps.iter().filter(|s| s.gap_secs < 0.0).count()
    }
}

/// Builds one continuous track from a manifest.
pub struct TimelineAssembler<E: AudioEngine> {
    engine: E,
    settings: AssemblySettings,
}

impl<E: AudioEngine> TimelineAssembler<E> {
    pub fn new(engine: E, settings: AssemblySettings) -> Self {
        Self { engine, settings }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Assemble the manifest at `manifest_path` into `output_path`.
    ///
    /// Any failure aborts the run: nothing is moved to `output_path` and the
    /// scratch directory is removed.
    pub fn build(&self, manifest_path: &Path, output_path: &Path) -> ClipsyncResult<AssemblySummary> {
        let manifest = Manifest::load(manifest_path)
            .map_err(|e| ClipsyncError::invalid_manifest(manifest_path, e.to_string()))?;

        check_entries(&manifest, manifest_path)?;

        tracing::info!(
            manifest = %manifest_path.display(),
            output = %output_path.display(),
            entries = manifest.len(),
            "Starting timeline assembly"
        );

        let scratch = tempfile::Builder::new().prefix(SCRATCH_PREFIX).tempdir()?;
        tracing::debug!(scratch = %scratch.path().display(), "Created scratch directory");

        let (final_track, steps) = self.fold_entries(&manifest, scratch.path())?;
        let duration_secs = steps.last().map_or(0.0, |s| s.track_secs);
        let final_track = self.encode_for_output(final_track, scratch.path(), output_path)?;

        move_into_place(&final_track, output_path)
            .map_err(|e| ClipsyncError::write(output_path, e.to_string()))?;

        if let Err(err) = scratch.close() {
            tracing::warn!(error = %err, "Failed to remove scratch directory");
        }

        tracing::info!(
            output = %output_path.display(),
            duration_secs,
            "Assembly complete"
        );

        Ok(AssemblySummary {
            output: output_path.to_path_buf(),
            duration_secs,
            steps,
        })
    }

    fn fold_entries(
        &self,
        manifest: &Manifest,
        scratch: &Path,
    ) -> ClipsyncResult<(PathBuf, Vec<AssemblyStep>)> {
        let epsilon = self.settings.gap_epsilon_secs;
        let ext = SCRATCH_EXTENSION;
        let total = manifest.len();

        let mut current_time = 0.0;
        let mut accumulated: Option<PathBuf> = None;
        let mut steps = Vec::with_capacity(total);

        for (index, entry) in manifest.iter().enumerate() {
            tracing::info!(
                step = index + 1,
                total,
                file = %entry.file_path.display(),
                "Assembling entry"
            );

            let gap = entry.start_secs - current_time;
            let mut inputs = Vec::with_capacity(3);
            if let Some(previous) = &accumulated {
                inputs.push(previous.clone());
            }

            let silence = if gap > epsilon {
                let silence_path = scratch.join(format!("silence_{index}.{ext}"));
                tracing::debug!(gap_secs = gap, "Inserting silence");
                self.engine
                    .synthesize_silence(gap, &silence_path)
                    .map_err(|e| step_error(index, "generate silence", e))?;
                inputs.push(silence_path.clone());
                Some(silence_path)
            } else {
                if gap < -epsilon {
                    tracing::warn!(
                        index,
                        start_secs = entry.start_secs,
                        track_secs = current_time,
                        overlap_secs = -gap,
                        "Entry overlaps the assembled track; appending without correction"
                    );
                }
                None
            };
            inputs.push(entry.file_path.clone());

            let step_file = scratch.join(format!("step_{index}.{ext}"));
            self.engine
                .concatenate(&inputs, &step_file)
                .map_err(|e| step_error(index, "concatenate files", e))?;

            current_time = self
                .engine
                .measure_duration(&step_file)
                .map_err(|e| step_error(index, "measure intermediate track", e))?;
            tracing::debug!(track_secs = current_time, "Intermediate track measured");

            for stale in accumulated.iter().chain(silence.iter()) {
                if let Err(err) = std::fs::remove_file(stale) {
                    tracing::trace!(path = %stale.display(), error = %err, "Intermediate not removed");
                }
            }

            accumulated = Some(step_file);
            steps.push(AssemblyStep {
                index,
                gap_secs: gap,
                silence_inserted: silence.is_some(),
                track_secs: current_time,
            });
        }

        let final_track = accumulated.ok_or_else(|| ClipsyncError::engine("no track was assembled"))?;
        Ok((final_track, steps))
    }

    /// Encode the scratch track into the output's format, unless it already is WAV.
    fn encode_for_output(
        &self,
        track: PathBuf,
        scratch: &Path,
        output_path: &Path,
    ) -> ClipsyncResult<PathBuf> {
        let Some(ext) = output_path.extension().and_then(|e| e.to_str()) else {
            return Ok(track);
        };
        if ext.eq_ignore_ascii_case(SCRATCH_EXTENSION) {
            return Ok(track);
        }

        let encoded = scratch.join(format!("final.{ext}"));
        tracing::debug!(format = ext, "Encoding final track");
        self.engine
            .concatenate(std::slice::from_ref(&track), &encoded)
            .map_err(|e| ClipsyncError::engine(format!("failed to encode final track: {e}")))?;
        Ok(encoded)
    }
}

/// Reject manifests the fold cannot place: no entries, or an entry without a
/// positive (and comparable) duration.
fn check_entries(manifest: &Manifest, manifest_path: &Path) -> ClipsyncResult<()> {
    if manifest.is_empty() {
        return Err(ClipsyncError::EmptyManifest {
            path: manifest_path.to_path_buf(),
        });
    }
    if let Some((index, entry)) = manifest
        .iter()
        .enumerate()
        .find(|(_, e)| !(e.manifest_duration() > 0.0))
    {
        return Err(ClipsyncError::InvalidDuration {
            index,
            duration: entry.manifest_duration(),
        });
    }
    Ok(())
}

fn step_error(index: usize, action: &str, err: EngineError) -> ClipsyncError {
    ClipsyncError::engine(format!("entry {index}: failed to {action}: {err}"))
}

/// Rename `from` to `to`, falling back to copy-then-delete across filesystems.
fn move_into_place(from: &Path, to: &Path) -> std::io::Result<()> {
    if let Some(parent) = to.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(err) => {
            tracing::debug!(error = %err, "Rename failed; copying final track instead");
            std::fs::copy(from, to)?;
            std::fs::remove_file(from)?;
            Ok(())
        }
    }
}
