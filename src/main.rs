use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::{info, Level};

use panovid::{
    composition::ScrollEngine,
    config::Config,
    scroll::ModeSelection,
};

#[derive(Parser)]
#[command(
    name = "panovid",
    version,
    about = "Turn a panorama photo into a scrolling video",
    long_about = "Panovid slides a fixed-width window across a panorama and writes every position as one video frame, producing a portrait (9:16) and/or landscape (16:9) MP4 named <file>_<mode>.mp4."
)]
struct Cli {
    /// Filename of panorama photo
    filename: PathBuf,

    /// Frames per second of video [default: 60]
    #[arg(long)]
    fps: Option<u32>,

    /// Pixels to move between frames [default: 4]
    #[arg(long)]
    framejump: Option<u32>,

    /// Save a video in landscape mode
    #[arg(long)]
    landscape: bool,

    /// Save a video in portrait mode (default when --landscape is not given)
    #[arg(long)]
    portrait: bool,

    /// Directory for the output videos (defaults to the image's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .init();

    info!("Starting panovid v{}", env!("CARGO_PKG_VERSION"));
    info!("Panorama: {:?}", cli.filename);

    // Load configuration
    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path).map_err(|e| anyhow!(e.user_message()))?
        }
        None => Config::default(),
    };

    // Command line flags win over the file
    if let Some(fps) = cli.fps {
        config.scroll.fps = fps;
    }
    if let Some(framejump) = cli.framejump {
        config.scroll.framejump = framejump;
    }

    let selection = ModeSelection::from_flags(cli.portrait, cli.landscape);
    info!("Modes: {:?}, {} fps, {} px per frame", selection, config.scroll.fps, config.scroll.framejump);

    let engine = ScrollEngine::new(config).map_err(|e| anyhow!(e.user_message()))?;
    let reports = engine
        .run(&cli.filename, cli.output_dir.as_deref(), selection)
        .await
        .map_err(|e| anyhow!(e.user_message()))?;

    for report in &reports {
        match &report.output {
            Some(video) => info!("{}: {} frames -> {}", report.mode, report.frame_count, video.path),
            None => info!("{}: no frames, nothing written", report.mode),
        }
    }

    Ok(())
}
