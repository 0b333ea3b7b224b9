//! ffmpeg/ffprobe subprocess engine.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use clipsync_common::config::EngineSettings;

use crate::engine::{check_speed, AudioEngine, EngineError, EngineResult};

/// Shortest silence that does not round to `-t 0.000`.
const MIN_SILENCE_SECS: f64 = 0.0005;

/// Audio engine backed by the `ffmpeg` and `ffprobe` binaries.
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    ffmpeg: String,
    ffprobe: String,
    silence_sample_rate: u32,
    silence_channel_layout: String,
}

impl FfmpegEngine {
    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            ffmpeg: settings.ffmpeg.clone(),
            ffprobe: settings.ffprobe.clone(),
            silence_sample_rate: settings.silence_sample_rate,
            silence_channel_layout: settings.silence_channel_layout.clone(),
        }
    }

    /// First line of `<tool> -version`, or `None` if the tool cannot be run.
    pub fn tool_version(program: &str) -> Option<String> {
        let output = Command::new(program)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let raw = String::from_utf8_lossy(&output.stdout);
        raw.lines().next().map(|line| line.trim().to_string())
    }

    pub fn ffmpeg_program(&self) -> &str {
        &self.ffmpeg
    }

    pub fn ffprobe_program(&self) -> &str {
        &self.ffprobe
    }

    fn run_ffmpeg(&self, args: Vec<OsString>) -> EngineResult<()> {
        let mut full_args: Vec<OsString> =
            vec!["-hide_banner".into(), "-loglevel".into(), "error".into(), "-y".into()];
        full_args.extend(args);
        run(&self.ffmpeg, &full_args).map(|_| ())
    }
}

impl Default for FfmpegEngine {
    fn default() -> Self {
        Self::new(&EngineSettings::default())
    }
}

impl AudioEngine for FfmpegEngine {
    fn measure_duration(&self, file: &Path) -> EngineResult<f64> {
        let args: Vec<OsString> = vec![
            "-v".into(),
            "error".into(),
            "-show_entries".into(),
            "format=duration".into(),
            "-of".into(),
            "default=noprint_wrappers=1:nokey=1".into(),
            file.into(),
        ];
        let stdout = run(&self.ffprobe, &args)?;
        parse_probe_duration(file, &stdout)
    }

    fn apply_speed(&self, input: &Path, output: &Path, ratio: f64) -> EngineResult<()> {
        check_speed(ratio, self.speed_range())?;
        self.run_ffmpeg(vec![
            "-i".into(),
            input.into(),
            "-filter:a".into(),
            format!("atempo={ratio:.4}").into(),
            output.into(),
        ])
    }

    fn synthesize_silence(&self, secs: f64, output: &Path) -> EngineResult<()> {
        // `-t` is written with millisecond precision.
        if !(secs >= MIN_SILENCE_SECS) || !secs.is_finite() {
            return Err(EngineError::InvalidSilence { secs });
        }
        self.run_ffmpeg(vec![
            "-f".into(),
            "lavfi".into(),
            "-i".into(),
            format!(
                "anullsrc=r={}:cl={}",
                self.silence_sample_rate, self.silence_channel_layout
            )
            .into(),
            "-t".into(),
            format!("{secs:.3}").into(),
            output.into(),
        ])
    }

    fn concatenate(&self, inputs: &[PathBuf], output: &Path) -> EngineResult<()> {
        if inputs.is_empty() {
            return Err(EngineError::EmptyInput);
        }
        let mut args: Vec<OsString> = Vec::with_capacity(inputs.len() * 2 + 3);
        for input in inputs {
            args.push("-i".into());
            args.push(input.into());
        }
        args.push("-filter_complex".into());
        args.push(concat_filter(inputs.len()).into());
        args.push(output.into());
        self.run_ffmpeg(args)
    }

    fn is_available(&self) -> bool {
        command_exists(&self.ffmpeg) && command_exists(&self.ffprobe)
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// `[0:a][1:a]...concat=n=N:v=0:a=1`
fn concat_filter(count: usize) -> String {
    let mut filter: String = (0..count).map(|i| format!("[{i}:a]")).collect();
    filter.push_str(&format!("concat=n={count}:v=0:a=1"));
    filter
}

fn parse_probe_duration(file: &Path, stdout: &str) -> EngineResult<f64> {
    let raw = stdout.trim();
    match raw.parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs >= 0.0 => Ok(secs),
        _ => Err(EngineError::Parse {
            path: file.to_path_buf(),
            output: raw.to_string(),
        }),
    }
}

/// Run `program` to completion and return its stdout. Non-zero exit carries stderr.
fn run(program: &str, args: &[OsString]) -> EngineResult<String> {
    tracing::debug!(program, ?args, "Running audio tool");
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| EngineError::Spawn {
            program: program.to_string(),
            source: e,
        })?;

    if !output.status.success() {
        return Err(EngineError::Failed {
            program: program.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn command_exists(binary: &str) -> bool {
    if binary.contains(std::path::MAIN_SEPARATOR) {
        return Path::new(binary).is_file();
    }
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
