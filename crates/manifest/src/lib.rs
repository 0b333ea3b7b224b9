//! clipsync Manifest Model
//!
//! Defines the data contract shared by the speed-sync and assembly passes:
//! - **Entry:** One scheduled audio segment (`[start, end)`, speaker, file)
//! - **Codec:** Line-oriented text format, read and written as a whole
//! - **Paths:** The `<name>_synced<ext>` derived-path convention
//! - **Lint:** Timeline checks for non-positive, overlapping, or out-of-order entries
//!
//! Times are plain `f64` seconds on the master timeline.

pub mod codec;
pub mod entry;
pub mod lint;
pub mod paths;

pub use codec::*;
pub use entry::*;
pub use lint::*;
pub use paths::*;
