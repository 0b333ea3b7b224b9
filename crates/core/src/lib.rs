//! clipsync Core - Timeline Timing
//!
//! Drives an [`AudioEngine`](clipsync_engine::AudioEngine) to fit audio clips
//! to their manifest slots:
//! - **Speed Sync:** Stretch or compress each clip to its slot length, with
//!   the speed factor clamped to a safe range. Failing entries are skipped.
//! - **Assembly:** Fold all entries left to right into one track, inserting
//!   silence for gaps and re-measuring the track after every step.
//!
//! The core never touches audio bytes; it only moves file paths between the
//! manifest and the engine.

pub mod assembler;
pub mod report;
pub mod speed_sync;

pub use assembler::{AssemblyStep, AssemblySummary, TimelineAssembler};
pub use report::{EntryFailure, SyncReport, SyncedEntry};
pub use speed_sync::{SpeedPlan, SpeedSync};
