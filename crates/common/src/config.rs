//! Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ClipsyncError, ClipsyncResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Speed correction settings.
    pub sync: SyncSettings,

    /// Timeline assembly settings.
    pub assembly: AssemblySettings,

    /// External audio engine settings.
    pub engine: EngineSettings,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Speed correction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Lower bound of the admissible speed factor.
    pub min_speed: f64,

    /// Upper bound of the admissible speed factor.
    pub max_speed: f64,

    /// Suffix appended to the base name of derived files.
    pub synced_suffix: String,
}

/// Smallest accepted `gap_epsilon_secs`. Silence is generated with millisecond
/// precision, so anything shorter would be written as a zero-length segment.
pub const MIN_GAP_EPSILON_SECS: f64 = 0.001;

/// Timeline assembly parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblySettings {
    /// Gaps at or below this many seconds are treated as re-measurement noise.
    pub gap_epsilon_secs: f64,
}

/// Audio engine binaries and silence format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// ffmpeg executable (name on PATH or absolute path).
    pub ffmpeg: String,

    /// ffprobe executable (name on PATH or absolute path).
    pub ffprobe: String,

    /// Sample rate of synthesized silence.
    pub silence_sample_rate: u32,

    /// Channel layout of synthesized silence (e.g., "mono").
    pub silence_channel_layout: String,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "clipsync_core=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            min_speed: 0.8,
            max_speed: 1.5,
            synced_suffix: "_synced".to_string(),
        }
    }
}

impl Default for AssemblySettings {
    fn default() -> Self {
        Self {
            gap_epsilon_secs: 0.01,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
            silence_sample_rate: 44100,
            silence_channel_layout: "mono".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location.
    ///
    /// A missing file yields the defaults. A file that cannot be read, parsed, or
    /// validated is an error; the CLI reports it once logging is up and then
    /// continues with the defaults.
    pub fn load() -> ClipsyncResult<Self> {
        Self::load_or_default(&config_file_path())
    }

    /// Load `path` if it exists, otherwise return the defaults.
    pub fn load_or_default(path: &Path) -> ClipsyncResult<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> ClipsyncResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the settings for values the sync and assembly passes cannot work with.
    pub fn validate(&self) -> ClipsyncResult<()> {
        let sync = &self.sync;
        if !(sync.min_speed > 0.0) || !sync.max_speed.is_finite() {
            return Err(ClipsyncError::config(format!(
                "speed range [{}, {}] must be positive and finite",
                sync.min_speed, sync.max_speed
            )));
        }
        if sync.min_speed > sync.max_speed {
            return Err(ClipsyncError::config(format!(
                "min_speed {} exceeds max_speed {}",
                sync.min_speed, sync.max_speed
            )));
        }
        if sync.synced_suffix.is_empty() {
            return Err(ClipsyncError::config("synced_suffix must not be empty"));
        }
        if !(self.assembly.gap_epsilon_secs >= MIN_GAP_EPSILON_SECS) {
            return Err(ClipsyncError::config(format!(
                "gap_epsilon_secs {} must be at least {MIN_GAP_EPSILON_SECS}",
                self.assembly.gap_epsilon_secs
            )));
        }
        if self.engine.silence_sample_rate == 0 {
            return Err(ClipsyncError::config("silence_sample_rate must be non-zero"));
        }
        Ok(())
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("clipsync").join("config.json")
}
