//! clipsync Audio Engine
//!
//! The four whole-file operations the timing core needs, behind one trait:
//!
//! ```text
//! measure_duration(file)            -> seconds
//! apply_speed(in, out, ratio)       -> time-stretched copy
//! synthesize_silence(secs, out)     -> silent clip
//! concatenate([a, b, ...], out)     -> one track
//! ```
//!
//! [`FfmpegEngine`] drives the `ffmpeg`/`ffprobe` binaries. [`ScriptedEngine`]
//! returns scripted durations and failures and records every call, so the
//! timing logic can be exercised without any audio toolchain.

pub mod engine;
pub mod ffmpeg;
pub mod scripted;

pub use engine::*;
pub use ffmpeg::FfmpegEngine;
pub use scripted::{EngineCall, Operation, ScriptedEngine};
