//! Speed-correct every clip of a manifest.

use std::path::PathBuf;

use clipsync_common::config::AppConfig;
use clipsync_core::SpeedSync;
use clipsync_engine::{AudioEngine, FfmpegEngine};

pub async fn run(
    config: &AppConfig,
    manifest: PathBuf,
    report_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let engine = FfmpegEngine::new(&config.engine);
    if !engine.is_available() {
        anyhow::bail!(
            "Audio engine unavailable (expected {} and {} in PATH)",
            engine.ffmpeg_program(),
            engine.ffprobe_program()
        );
    }

    println!("Adjusting speed for manifest: {}", manifest.display());
    println!(
        "  Speed range: {:.2} - {:.2}",
        config.sync.min_speed, config.sync.max_speed
    );

    let sync = SpeedSync::new(engine, config.sync.clone());
    let report = tokio::task::spawn_blocking(move || sync.run(&manifest)).await??;

    println!();
    println!(
        "  Synced: {}/{} ({} clamped)",
        report.synced.len(),
        report.total_entries(),
        report.clamped_count()
    );
    for synced in &report.synced {
        println!(
            "    [{}] {} -> {} (x{:.3}{})",
            synced.index,
            synced.input.display(),
            synced.entry.file_path.display(),
            synced.plan.applied_factor,
            if synced.plan.clamped { ", clamped" } else { "" }
        );
    }
    if !report.is_complete() {
        println!("  Skipped:");
        for failure in &report.failures {
            println!(
                "    [{}] {}: {}",
                failure.index,
                failure.input.display(),
                failure.error
            );
        }
    }

    match &report.synced_manifest {
        Some(path) => println!("\nSuccessfully created synced manifest: {}", path.display()),
        None => println!("\nNo audio files were successfully processed; synced manifest not created."),
    }

    if let Some(path) = report_path {
        report.write_json(&path)?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}
