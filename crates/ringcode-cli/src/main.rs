//! `ringcode` command-line driver
//!
//! Feeds call events from stdin into the notification engine. Tones are
//! logged rather than played, so no audio hardware is required.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ringcode_core::morse::render;
use ringcode_core::number::normalize;
use ringcode_core::{
    CallStateReactor, ConfigStore, LoggingToneDevice, MemoryRegistry, NotifierConfig,
    PlayOutcome, RingerMode, RingerModeSource, SharedConfig, SharedRingerMode, TimingProfile,
    encode, same_target,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal::ctrl_c;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

mod input;
mod logging;

use input::{InputLine, parse_line};
use logging::{LoggingConfig, parse_log_level, setup_logging};

/// Announce incoming callers with Morse code patterns
#[derive(Parser, Debug)]
#[command(name = "ringcode", author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info", env = "RINGCODE_LOG_LEVEL")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Include source file and line in log records
    #[arg(long, global = true)]
    log_location: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read call events from stdin and drive notifications
    Run {
        /// Notifier settings (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Caller code assignments (JSON)
        #[arg(short, long)]
        assignments: PathBuf,

        /// Initial ringer mode
        #[arg(short, long, default_value = "silent")]
        ringer: RingerMode,
    },

    /// Play the alert symbol once with the configured volume and speed
    Preview {
        /// Notifier settings (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the dot/dash rendering of a text
    Encode {
        text: String,
    },

    /// Check whether two caller identifiers designate the same target
    Match {
        a: String,
        b: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::new(parse_log_level(&cli.log_level)?);
    if cli.json_logs {
        logging = logging.with_json();
    }
    if cli.log_location {
        logging = logging.with_file_info();
    }
    setup_logging(logging)?;

    match cli.command {
        Command::Run {
            config,
            assignments,
            ringer,
        } => run(config, assignments, ringer).await,
        Command::Preview { config } => preview(config).await,
        Command::Encode { text } => {
            encode_text(&text);
            Ok(())
        }
        Command::Match { a, b } => {
            match_identifiers(&a, &b);
            Ok(())
        }
    }
}

fn load_config(path: Option<PathBuf>) -> Result<NotifierConfig> {
    match path {
        Some(path) => NotifierConfig::from_file(&path)
            .with_context(|| format!("loading settings from {}", path.display())),
        None => Ok(NotifierConfig::default()),
    }
}

async fn run(config: Option<PathBuf>, assignments: PathBuf, ringer: RingerMode) -> Result<()> {
    let config = SharedConfig::new(load_config(config)?);
    let registry = MemoryRegistry::from_file(&assignments)
        .with_context(|| format!("loading assignments from {}", assignments.display()))?;
    let ringer = SharedRingerMode::new(ringer);

    info!(
        assignments = registry.len(),
        ringer = %ringer.ringer_mode(),
        "starting ringcode"
    );
    if !config.snapshot().enabled {
        warn!("notifications are disabled in the settings, events will be ignored");
    }

    let reactor = Arc::new(
        CallStateReactor::builder()
            .with_registry(Arc::new(registry))
            .with_config(Arc::new(config))
            .with_ringer(Arc::new(ringer.clone()))
            .with_device(Arc::new(LoggingToneDevice))
            .build()?,
    );

    let (tx, rx) = mpsc::channel(64);
    let runner = {
        let reactor = reactor.clone();
        tokio::spawn(async move { reactor.run(rx).await })
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("reading stdin")?,
            _ = ctrl_c() => {
                info!("interrupted");
                break;
            }
        };
        let Some(line) = line else {
            debug!("end of input");
            break;
        };

        match parse_line(&line) {
            Ok(InputLine::Event(event)) => {
                if tx.send(event).await.is_err() {
                    break;
                }
            }
            Ok(InputLine::Ringer(mode)) => {
                info!(%mode, "ringer mode changed");
                ringer.set(mode);
            }
            Ok(InputLine::Skip) => {}
            Err(e) => warn!(line = %line, "ignoring input: {e:#}"),
        }
    }

    // closing the channel makes the reactor stop any notification and exit
    drop(tx);
    runner.await.context("reactor task failed")?;
    Ok(())
}

async fn preview(config: Option<PathBuf>) -> Result<()> {
    let config = load_config(config)?;
    let profile = config.timing_profile();
    info!(
        unit_ms = profile.unit().as_millis() as u64,
        level = profile.level(),
        "previewing alert symbol"
    );

    let reactor = CallStateReactor::builder()
        .with_registry(Arc::new(MemoryRegistry::new()))
        .with_config(Arc::new(config))
        .with_device(Arc::new(LoggingToneDevice))
        .build()?;

    match reactor.preview_alert().await {
        PlayOutcome::Completed => println!("preview finished"),
        PlayOutcome::Cancelled => println!("preview cancelled"),
    }
    Ok(())
}

fn encode_text(text: &str) {
    let rendered = render(text);
    if rendered.is_empty() {
        println!("(nothing to play)");
        return;
    }
    let duration = TimingProfile::default().playback_duration(&encode(text));
    println!("{rendered}");
    println!("{} ms at the default speed", duration.as_millis());
}

fn match_identifiers(a: &str, b: &str) {
    let (na, nb) = (normalize(a), normalize(b));
    println!("{a} -> {na}");
    println!("{b} -> {nb}");
    println!(
        "{}",
        if same_target(&na, &nb) {
            "same target"
        } else {
            "different targets"
        }
    );
}
