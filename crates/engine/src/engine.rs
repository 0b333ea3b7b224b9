//! Audio engine trait and errors.

use std::path::{Path, PathBuf};

use clipsync_common::error::ClipsyncError;

/// Speed ratios the ffmpeg `atempo` filter accepts in a single pass.
pub const SUPPORTED_SPEED_RANGE: (f64, f64) = (0.5, 2.0);

/// Errors raised by an audio engine call.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} failed ({status}): {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("could not parse duration of {path} from {output:?}")]
    Parse { path: PathBuf, output: String },

    #[error("speed factor {ratio:.2} is outside the supported range ({min}-{max})")]
    UnsupportedSpeed { ratio: f64, min: f64, max: f64 },

    #[error("silence duration {secs}s must be at least one millisecond")]
    InvalidSilence { secs: f64 },

    #[error("no input files provided for concatenation")]
    EmptyInput,

    #[error("{message}")]
    Other { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other {
            message: msg.into(),
        }
    }
}

impl From<EngineError> for ClipsyncError {
    fn from(err: EngineError) -> Self {
        ClipsyncError::engine(err.to_string())
    }
}

/// Whole-file audio operations used by speed-sync and timeline assembly.
///
/// Every call blocks until the output file is complete.
pub trait AudioEngine: Send {
    /// Playback duration of `file` in seconds.
    fn measure_duration(&self, file: &Path) -> EngineResult<f64>;

    /// Write `input` played back at `ratio` times its speed to `output`.
    ///
    /// Ratios outside [`AudioEngine::speed_range`] are a hard error.
    fn apply_speed(&self, input: &Path, output: &Path, ratio: f64) -> EngineResult<()>;

    /// Write `secs` seconds of silence to `output`.
    fn synthesize_silence(&self, secs: f64, output: &Path) -> EngineResult<()>;

    /// Join `inputs` end to end into `output`. An empty list is an error.
    fn concatenate(&self, inputs: &[PathBuf], output: &Path) -> EngineResult<()>;

    /// Inclusive range of ratios `apply_speed` accepts.
    fn speed_range(&self) -> (f64, f64) {
        SUPPORTED_SPEED_RANGE
    }

    /// Check if this engine can run on the system.
    fn is_available(&self) -> bool;

    /// Engine name.
    fn name(&self) -> &str;
}

/// Reject ratios outside `range`, the way `atempo` would.
pub fn check_speed(ratio: f64, range: (f64, f64)) -> EngineResult<()> {
    let (min, max) = range;
    if ratio.is_finite() && ratio >= min && ratio <= max {
        Ok(())
    } else {
        Err(EngineError::UnsupportedSpeed { ratio, min, max })
    }
}
