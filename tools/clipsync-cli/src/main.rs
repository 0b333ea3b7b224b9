//! clipsync CLI - Fit timestamped audio clips to a manifest timeline.
//!
//! Usage:
//!   clipsync adjust-speed -m <MANIFEST>          Speed-correct each clip to its slot
//!   clipsync build -m <MANIFEST> -o <OUTPUT>     Assemble one track from a manifest
//!   clipsync validate <MANIFEST>                 Parse and lint a manifest
//!   clipsync check                               Check ffmpeg/ffprobe availability

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use clipsync_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "clipsync",
    about = "Synchronize audio clips to the timestamps of a manifest",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/clipsync/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Adjust the speed of each clip so it fills its manifest slot
    AdjustSpeed {
        /// Path to the manifest file
        #[arg(short, long)]
        manifest: PathBuf,

        /// Also write a JSON report of every entry to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Build a single audio file from a manifest, inserting silence for gaps
    Build {
        /// Path to the manifest file
        #[arg(short, long)]
        manifest: PathBuf,

        /// Path for the final output audio file
        #[arg(short, long)]
        output: PathBuf,

        /// Print the assembly summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse a manifest and report timeline problems
    Validate {
        /// Path to the manifest file
        path: PathBuf,

        /// Print findings as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that the audio tools are installed
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut config, fallback) = match &cli.config {
        Some(path) => (
            AppConfig::load_from(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None,
        ),
        None => match AppConfig::load() {
            Ok(config) => (config, None),
            Err(err) => (AppConfig::default(), Some(err)),
        },
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    clipsync_common::logging::init_logging(&config.logging);
    if let Some(err) = fallback {
        tracing::warn!(error = %err, "Failed to load config; using defaults");
    }
    tracing::debug!(?config, "Configuration loaded");

    match cli.command {
        Commands::AdjustSpeed { manifest, report } => {
            commands::adjust_speed::run(&config, manifest, report).await
        }
        Commands::Build {
            manifest,
            output,
            json,
        } => commands::build::run(&config, manifest, output, json).await,
        Commands::Validate { path, json } => commands::validate::run(path, json),
        Commands::Check => commands::check::run(&config),
    }
}
