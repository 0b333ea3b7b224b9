//! Assemble a manifest into one audio file.

use std::path::PathBuf;

use clipsync_common::config::AppConfig;
use clipsync_core::TimelineAssembler;
use clipsync_engine::{AudioEngine, FfmpegEngine};

pub async fn run(
    config: &AppConfig,
    manifest: PathBuf,
    output: PathBuf,
    json: bool,
) -> anyhow::Result<()> {
    let engine = FfmpegEngine::new(&config.engine);
    if !engine.is_available() {
        anyhow::bail!(
            "Audio engine unavailable (expected {} and {} in PATH)",
            engine.ffmpeg_program(),
            engine.ffprobe_program()
        );
    }

    if !json {
        println!("Building from manifest: {}", manifest.display());
        println!("  Output: {}", output.display());
    }

    let assembler = TimelineAssembler::new(engine, config.assembly.clone());
    let summary =
        tokio::task::spawn_blocking(move || assembler.build(&manifest, &output)).await??;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("  Steps: {}", summary.steps.len());
    println!("  Silence inserted: {:.2}s", summary.total_silence_secs());
    if summary.overlap_count() > 0 {
        println!("  Overlapping entries: {}", summary.overlap_count());
    }
    println!("  Duration: {:.2}s", summary.duration_secs);
    println!("\nBuild completed: {}", summary.output.display());

    Ok(())
}
