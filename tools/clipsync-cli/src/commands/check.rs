//! Check audio tool availability.

use clipsync_common::config::AppConfig;
use clipsync_engine::{AudioEngine, FfmpegEngine};

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("clipsync System Check");
    println!("{}", "=".repeat(50));

    let engine = FfmpegEngine::new(&config.engine);
    for program in [engine.ffmpeg_program(), engine.ffprobe_program()] {
        match FfmpegEngine::tool_version(program) {
            Some(version) => println!("[OK] {program}: {version}"),
            None => println!("[MISSING] {program}: not found or not runnable"),
        }
    }

    let (min, max) = engine.speed_range();
    println!();
    println!(
        "Speed range: configured {:.2} - {:.2}, engine supports {min:.2} - {max:.2}",
        config.sync.min_speed, config.sync.max_speed
    );
    println!("Gap tolerance: {:.3}s", config.assembly.gap_epsilon_secs);

    println!();
    if engine.is_available() {
        println!("All required tools are available. clipsync is ready.");
    } else {
        println!("Some required tools are missing. Install ffmpeg (which ships ffprobe).");
    }

    Ok(())
}
