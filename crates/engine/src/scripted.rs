//! Scripted audio engine for tests and dry runs.
//!
//! Durations and failures are keyed by path, either the full path or just the
//! file name. Keying by file name lets a test script intermediate files whose
//! directory is only known at run time (`step_0.wav`, `silence_1.wav`, ...).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::engine::{check_speed, AudioEngine, EngineError, EngineResult, SUPPORTED_SPEED_RANGE};

/// Engine operation, used to target scripted failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    MeasureDuration,
    ApplySpeed,
    SynthesizeSilence,
    Concatenate,
}

/// One recorded engine call.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    MeasureDuration {
        file: PathBuf,
    },
    ApplySpeed {
        input: PathBuf,
        output: PathBuf,
        ratio: f64,
    },
    SynthesizeSilence {
        secs: f64,
        output: PathBuf,
    },
    Concatenate {
        inputs: Vec<PathBuf>,
        output: PathBuf,
    },
}

impl EngineCall {
    pub fn operation(&self) -> Operation {
        match self {
            Self::MeasureDuration { .. } => Operation::MeasureDuration,
            Self::ApplySpeed { .. } => Operation::ApplySpeed,
            Self::SynthesizeSilence { .. } => Operation::SynthesizeSilence,
            Self::Concatenate { .. } => Operation::Concatenate,
        }
    }
}

/// Audio engine that returns scripted values and records every call.
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    durations: HashMap<PathBuf, f64>,
    default_duration: Option<f64>,
    failures: Vec<(Operation, Option<PathBuf>)>,
    speed_range: Option<(f64, f64)>,
    write_outputs: bool,
    calls: Mutex<Vec<EngineCall>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `secs` for `key` (full path or file name).
    pub fn with_duration(mut self, key: impl Into<PathBuf>, secs: f64) -> Self {
        self.durations.insert(key.into(), secs);
        self
    }

    /// Report `secs` for any file without its own scripted duration.
    pub fn with_default_duration(mut self, secs: f64) -> Self {
        self.default_duration = Some(secs);
        self
    }

    /// Fail every call of `op`.
    pub fn failing(mut self, op: Operation) -> Self {
        self.failures.push((op, None));
        self
    }

    /// Fail calls of `op` that target `key` (full path or file name).
    ///
    /// The target is the probed file for `MeasureDuration`, the input for
    /// `ApplySpeed`, and the output for the other operations.
    pub fn failing_on(mut self, op: Operation, key: impl Into<PathBuf>) -> Self {
        self.failures.push((op, Some(key.into())));
        self
    }

    /// Override the ratio range `apply_speed` accepts.
    pub fn with_speed_range(mut self, min: f64, max: f64) -> Self {
        self.speed_range = Some((min, max));
        self
    }

    /// Write placeholder outputs so files can be moved and inspected.
    ///
    /// Speed-adjusted files copy their input, silence is written as
    /// `silence:<secs>\n`, and concatenation joins the input contents.
    pub fn writing_outputs(mut self) -> Self {
        self.write_outputs = true;
        self
    }

    /// All calls so far, in order.
    pub fn calls(&self) -> Vec<EngineCall> {
        self.lock_calls().clone()
    }

    /// Calls of one operation, in order.
    pub fn calls_of(&self, op: Operation) -> Vec<EngineCall> {
        self.lock_calls()
            .iter()
            .filter(|call| call.operation() == op)
            .cloned()
            .collect()
    }

    /// Ratios passed to `apply_speed`, in order.
    pub fn applied_ratios(&self) -> Vec<f64> {
        self.lock_calls()
            .iter()
            .filter_map(|call| match call {
                EngineCall::ApplySpeed { ratio, .. } => Some(*ratio),
                _ => None,
            })
            .collect()
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<EngineCall>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, call: EngineCall) {
        self.lock_calls().push(call);
    }

    fn scripted_duration(&self, target: &Path) -> Option<f64> {
        if let Some(secs) = self.durations.get(target) {
            return Some(*secs);
        }
        let name = target.file_name()?;
        self.durations
            .iter()
            .find(|(key, _)| key.as_os_str() == name)
            .map(|(_, secs)| *secs)
    }

    fn check_failure(&self, op: Operation, target: &Path) -> EngineResult<()> {
        let hit = self.failures.iter().any(|(failing_op, key)| {
            *failing_op == op
                && key.as_ref().map_or(true, |k| {
                    k == target || target.file_name() == Some(k.as_os_str())
                })
        });
        if hit {
            Err(EngineError::other(format!(
                "scripted {op:?} failure for {}",
                target.display()
            )))
        } else {
            Ok(())
        }
    }
}

impl AudioEngine for ScriptedEngine {
    fn measure_duration(&self, file: &Path) -> EngineResult<f64> {
        self.record(EngineCall::MeasureDuration {
            file: file.to_path_buf(),
        });
        self.check_failure(Operation::MeasureDuration, file)?;
        self.scripted_duration(file)
            .or(self.default_duration)
            .ok_or_else(|| {
                EngineError::other(format!("no scripted duration for {}", file.display()))
            })
    }

    fn apply_speed(&self, input: &Path, output: &Path, ratio: f64) -> EngineResult<()> {
        self.record(EngineCall::ApplySpeed {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            ratio,
        });
        check_speed(ratio, self.speed_range())?;
        self.check_failure(Operation::ApplySpeed, input)?;
        if self.write_outputs {
            std::fs::copy(input, output)?;
        }
        Ok(())
    }

    fn synthesize_silence(&self, secs: f64, output: &Path) -> EngineResult<()> {
        self.record(EngineCall::SynthesizeSilence {
            secs,
            output: output.to_path_buf(),
        });
        if !(secs > 0.0) {
            return Err(EngineError::InvalidSilence { secs });
        }
        self.check_failure(Operation::SynthesizeSilence, output)?;
        if self.write_outputs {
            std::fs::write(output, format!("silence:{secs:.3}\n"))?;
        }
        Ok(())
    }

    fn concatenate(&self, inputs: &[PathBuf], output: &Path) -> EngineResult<()> {
        self.record(EngineCall::Concatenate {
            inputs: inputs.to_vec(),
            output: output.to_path_buf(),
        });
        if inputs.is_empty() {
            return Err(EngineError::EmptyInput);
        }
        self.check_failure(Operation::Concatenate, output)?;
        if self.write_outputs {
            let mut joined = Vec::new();
            for input in inputs {
                joined.extend(std::fs::read(input)?);
            }
            std::fs::write(output, joined)?;
        }
        Ok(())
    }

    fn speed_range(&self) -> (f64, f64) {
        self.speed_range.unwrap_or(SUPPORTED_SPEED_RANGE)
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
