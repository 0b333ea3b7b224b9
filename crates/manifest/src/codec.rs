//! Line-oriented manifest text format.
//!
//! One entry per line, blank lines skipped:
//!
//! ```text
//! [0.0s–4.2s] (SPEAKER_00) clips/intro.wav
//! [5s-7.25s] (SPEAKER_01) clips/reply 1.wav
//! ```
//!
//! Start and end may be separated by an ASCII hyphen or an en-dash. The file
//! path is the remainder of the line, spaces included. Output always uses the
//! en-dash and one decimal place.

use std::path::{Path, PathBuf};

use crate::entry::{Manifest, TimelineEntry};

const EN_DASH: char = '–';

/// Errors that can occur when reading or writing a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("line {line}: {reason}: {content:?}")]
    Parse {
        line: usize,
        content: String,
        reason: &'static str,
    },
}

/// Parse manifest text. Any malformed line fails the whole manifest.
pub fn parse_manifest(content: &str) -> Result<Manifest, ManifestError> {
    let mut entries = Vec::new();
    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let entry = parse_line(line).map_err(|reason| ManifestError::Parse {
            line: i + 1,
            content: line.to_string(),
            reason,
        })?;
        entries.push(entry);
    }
    Ok(Manifest::new(entries))
}

/// Serialize a manifest to text, one line per entry.
pub fn format_manifest(manifest: &Manifest) -> String {
    let mut output = String::new();
    for entry in manifest {
        output.push_str(&format_line(entry));
        output.push('\n');
    }
    output
}

/// Format a single entry: `[<start>s–<end>s] (<speaker>) <path>`.
pub fn format_line(entry: &TimelineEntry) -> String {
    format!(
        "[{:.1}s{EN_DASH}{:.1}s] ({}) {}",
        entry.start_secs,
        entry.end_secs,
        entry.speaker,
        entry.file_path.display()
    )
}

fn parse_line(line: &str) -> Result<TimelineEntry, &'static str> {
    let rest = line.strip_prefix('[').ok_or("expected '['")?;
    let (times, rest) = rest.split_once(']').ok_or("expected ']'")?;

    let (start, end) = times
        .split_once(|c| c == '-' || c == EN_DASH)
        .ok_or("expected '-' or '–' between start and end")?;
    let start_secs = parse_seconds(start).ok_or("malformed start time")?;
    let end_secs = parse_seconds(end).ok_or("malformed end time")?;

    let rest = strip_required_whitespace(rest).ok_or("expected whitespace after ']'")?;
    let rest = rest.strip_prefix('(').ok_or("expected '(' before speaker")?;
    let (speaker, rest) = rest.split_once(')').ok_or("expected ')' after speaker")?;
    if speaker.is_empty() {
        return Err("empty speaker");
    }

    let file_path = strip_required_whitespace(rest).ok_or("expected whitespace after ')'")?;
    if file_path.is_empty() {
        return Err("missing file path");
    }

    Ok(TimelineEntry::new(start_secs, end_secs, speaker, file_path))
}

/// Parse `<digits>[.<digits>]s`. Signs and exponents are not accepted, and
/// values too large to be finite are rejected.
fn parse_seconds(field: &str) -> Option<f64> {
    let number = field.strip_suffix('s')?;
    let (int_part, frac_part) = match number.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (number, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || frac_part.is_some_and(|f| !all_digits(f)) {
        return None;
    }
    number.parse().ok().filter(|v: &f64| v.is_finite())
}

fn strip_required_whitespace(s: &str) -> Option<&str> {
    let trimmed = s.trim_start();
    (trimmed.len() < s.len()).then_some(trimmed)
}

impl Manifest {
    /// Read and parse a manifest file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|e| ManifestError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        parse_manifest(&content)
    }

    /// Write the manifest to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<(), ManifestError> {
        std::fs::write(path, format_manifest(self)).map_err(|e| ManifestError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
