/// Sonata - terminal music player
mod catalog;
mod config;
mod control;

use crate::catalog::Playlist;
use crate::config::CliConfig;
use crate::control::ControlCommand;
use anyhow::Context;
use clap::{Parser, Subcommand};
use sonata_playback::{PlaybackEngine, PlaybackEvent, RepeatMode};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sonata")]
#[command(about = "Sonata terminal music player", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "SONATA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a playlist and read control commands from stdin
    Play {
        /// Playlist file (JSON)
        playlist: PathBuf,

        /// Track id to start with
        #[arg(short, long)]
        start: Option<String>,

        /// Start with shuffle enabled
        #[arg(long)]
        shuffle: bool,

        /// Initial repeat mode (off, all, one)
        #[arg(short, long)]
        repeat: Option<RepeatMode>,

        /// Simulated decoder warm-up in milliseconds
        #[arg(long, default_value_t = 150)]
        prepare_delay_ms: u64,
    },
    /// Print the tracks of a playlist
    List {
        /// Playlist file (JSON)
        playlist: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Play {
            playlist,
            start,
            shuffle,
            repeat,
            prepare_delay_ms,
        } => {
            let mut config = config;
            if shuffle {
                config.engine.shuffle = true;
            }
            if let Some(repeat) = repeat {
                config.engine.repeat_mode = repeat;
            }
            play(
                &playlist,
                start.as_deref(),
                config,
                Duration::from_millis(prepare_delay_ms),
            )
            .await?;
        }
        Commands::List { playlist } => {
            list(&playlist).await?;
        }
    }

    Ok(())
}

async fn play(
    path: &Path,
    start: Option<&str>,
    config: CliConfig,
    prepare_delay: Duration,
) -> anyhow::Result<()> {
    let playlist = Playlist::load(path).await?;
    let track = playlist.start_track(start)?.clone();

    let engine = PlaybackEngine::spawn(playlist.backend(prepare_delay), config.engine)
        .context("Failed to start playback engine")?;
    tracing::info!("Loaded {} tracks from {}", playlist.tracks.len(), path.display());

    let printer = tokio::spawn(print_events(engine.subscribe()));

    engine.play(track, playlist.tracks.clone(), playlist.album.clone())?;
    println!("{}", control::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            _ = tokio::signal::ctrl_c() => None,
        };

        // EOF or Ctrl-C
        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<ControlCommand>() {
            Ok(command) => {
                if !command.apply(&engine)? {
                    break;
                }
            }
            Err(e) => eprintln!("{}", e),
        }
    }

    engine.shutdown().await?;
    printer.abort();
    tracing::info!("Goodbye");
    Ok(())
}

/// Print every engine event as a JSON line
async fn print_events(mut events: broadcast::Receiver<PlaybackEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(line) => println!("{}", line),
                Err(e) => tracing::warn!("Failed to encode {} event: {}", event.name(), e),
            },
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("Event printer lagged, skipped {} events", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn list(path: &Path) -> anyhow::Result<()> {
    let playlist = Playlist::load(path).await?;

    if let Some(album) = &playlist.album {
        println!("{} ({})", album.name, album.id);
    }
    for (index, track) in playlist.tracks.iter().enumerate() {
        println!(
            "{:>3}. {} - {} [{}:{:02}] {}",
            index + 1,
            track.artist_name,
            track.name,
            track.duration_secs / 60,
            track.duration_secs % 60,
            track.audio_locator.as_deref().unwrap_or("(no audio)")
        );
    }

    Ok(())
}
