//! # Rover Console
//!
//! Drive a rover from two on-screen joysticks over a JSON message channel.
//!
//! Host input (pointer events, resizes, operator controls) is read from stdin
//! as one JSON object per line; stick values are sampled at a fixed cadence
//! and sent to the vehicle.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use rover_console::channel::link::connect;
use rover_console::config::{Config, LoggingConfig};
use rover_console::console::Console;
use rover_console::host::{spawn_stdin_reader, HOST_QUEUE_DEPTH};

/// Configuration file used when no path argument is given
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// File name prefix of the daily rolling log files
const LOG_FILE_PREFIX: &str = "rover-console.log";

/// How long to wait for queued frames to be written at shutdown
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Main entry point for Rover Console
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (defaults if the file is missing)
///    - Set up logging (console, plus rolling files when `logging.dir` is set)
///    - Connect to the vehicle channel
///    - Build the joysticks and start reading host input
///
/// 2. **Main Loop**
///    - Apply host input and inbound channel events as they arrive
///    - Sample tracking joysticks every `sample.period_ms`
///
/// 3. **Graceful Shutdown**
///    - Stop on Ctrl+C or end of host input
///    - Flush queued frames and log totals
///
/// # Errors
///
/// Returns error if:
/// - The configuration file exists but is invalid
/// - The vehicle channel cannot be reached
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/default.toml
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let (config, from_file) = load_config(&config_path)?;

    let _log_guard = init_logging(&config.logging);

    info!("Rover Console v{} starting...", env!("CARGO_PKG_VERSION"));
    if from_file {
        info!("Loaded configuration from {}", config_path.display());
    } else {
        warn!("Config file {} not found, using defaults", config_path.display());
    }

    let connection = connect(&config.channel)
        .await
        .with_context(|| format!("Failed to connect to vehicle at {}", config.channel.address))?;

    let mut console = Console::from_config(&config, Arc::new(connection.link.clone()))?;

    let (input_tx, input_rx) = mpsc::channel(HOST_QUEUE_DEPTH);
    spawn_stdin_reader(input_tx);

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C, shutting down...");
                    shutdown.cancel();
                }
                Err(e) => warn!("Failed to listen for Ctrl+C: {}", e),
            }
        });
    }

    info!("Press Ctrl+C to exit");

    let stats = console.run(input_rx, connection.inbound, shutdown).await;
    info!(
        "Total: {} ticks, {} joystick samples, {} host events, {} inbound events",
        stats.ticks, stats.samples, stats.host_events, stats.inbound_events
    );

    // Close every link handle so the writer drains and exits
    drop(console);
    drop(connection.link);
    match tokio::time::timeout(WRITER_DRAIN_TIMEOUT, connection.writer).await {
        Ok(Ok(frames)) => info!("Total frames sent: {}", frames),
        Ok(Err(e)) => warn!("Channel writer failed: {}", e),
        Err(_) => warn!("Channel writer did not finish within {:?}", WRITER_DRAIN_TIMEOUT),
    }
    connection.reader.abort();

    Ok(())
}

/// Load configuration, falling back to defaults when the file does not exist
///
/// # Returns
///
/// * `(Config, bool)` - Configuration and whether it was read from `path`
fn load_config(path: &Path) -> Result<(Config, bool)> {
    if !path.exists() {
        return Ok((Config::default(), false));
    }

    let config = Config::load(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    Ok((config, true))
}

/// Install the tracing subscriber
///
/// `RUST_LOG` overrides the configured level. The returned guard must be held
/// until exit so buffered file output is flushed.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.dir.is_empty() {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return None;
    }

    let appender = tracing_appender::rolling::daily(&config.dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .init();

    Some(guard)
}
