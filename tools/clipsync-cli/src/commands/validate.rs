//! Validate a manifest.

use std::collections::BTreeSet;
use std::path::PathBuf;

use clipsync_manifest::{lint_timeline, Manifest, TimelineIssue};

pub fn run(path: PathBuf, json: bool) -> anyhow::Result<()> {
    let manifest =
        Manifest::load(&path).map_err(|e| anyhow::anyhow!("Failed to load manifest: {e}"))?;

    let issues = lint_timeline(&manifest);
    let flagged: BTreeSet<usize> = issues.iter().map(TimelineIssue::index).collect();
    let missing = manifest.missing_files();

    if json {
        let report = serde_json::json!({
            "manifest": path,
            "entries": manifest.len(),
            "speakers": manifest.speakers(),
            "timeline_end_secs": manifest.timeline_end_secs(),
            "missing_files": missing,
            "flagged_entries": flagged,
            "issues": issues,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Validating manifest at: {}", path.display());
    println!("  Entries: {}", manifest.len());
    println!("  Speakers: {}", manifest.speakers().join(", "));
    println!("  Timeline end: {:.1}s", manifest.timeline_end_secs());

    if missing.is_empty() {
        println!("  Sources: All present");
    } else {
        println!("  Missing sources:");
        for file in &missing {
            println!("    - {}", file.display());
        }
    }

    if issues.is_empty() && missing.is_empty() {
        println!("\nManifest is valid.");
    } else {
        if !issues.is_empty() {
            println!("\nTimeline issues ({} of {} entries):", flagged.len(), manifest.len());
            for issue in &issues {
                println!("  - {issue}");
            }
        }
        println!(
            "\n{} issue(s) found. Speed sync skips invalid entries; build rejects them.",
            issues.len() + missing.len()
        );
    }

    Ok(())
}
