//! PillDispenser Controller: Main Entry Point
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                       │
//! │                                                                  │
//! │  SnapshotFrameSource  TesseractRecognizer  CommandDetector       │
//! │  (FrameSource)        (TextRecognizer)     (Detector)            │
//! │  TcpCommandChannel    LogEventSink         JsonConfigStore       │
//! │  (CommandChannel)     (EventSink)          (ConfigPort)          │
//! │                                                                  │
//! │  ─────────────────── Port Trait Boundary ─────────────────────   │
//! │                                                                  │
//! │  ┌────────────────────────────────────────────────────────────┐  │
//! │  │            DispenseService (pure logic)                    │  │
//! │  │  Actuation table · Cooldown · Idle/Dispatching             │  │
//! │  └────────────────────────────────────────────────────────────┘  │
//! │                                                                  │
//! │  SensingLoop (sampling cadence, stop flag)  MonotonicClock       │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{info, warn};
use tracing_subscriber::EnvFilter;

use pilldispenser::adapters::config_file::JsonConfigStore;
use pilldispenser::adapters::detector::CommandDetector;
use pilldispenser::adapters::frame_source::{self, SnapshotFrameSource};
use pilldispenser::adapters::log_sink::LogEventSink;
use pilldispenser::adapters::tcp_channel::{DryRunChannel, TcpCommandChannel};
use pilldispenser::adapters::tesseract::TesseractRecognizer;
use pilldispenser::adapters::time::MonotonicClock;
use pilldispenser::app::ports::{Classifier, CommandChannel, ConfigError, ConfigPort};
use pilldispenser::classify::detection::DetectionClassifier;
use pilldispenser::classify::text::TextMatchClassifier;
use pilldispenser::config::{DispenserConfig, Strategy};
use pilldispenser::sensing::SensingLoop;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    Text,
    Detection,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Text => Strategy::Text,
            StrategyArg::Detection => Strategy::Detection,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "pilldispenser",
    about = "Camera-driven pill dispenser controller",
    version
)]
struct Cli {
    /// JSON configuration file (missing file means built-in defaults)
    #[arg(long, short = 'c', env = "PILL_CONFIG")]
    config: Option<PathBuf>,

    /// Classification strategy; overrides the config file
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    /// Motor controller host; overrides the config file
    #[arg(long, env = "PILL_ACTUATOR_HOST")]
    actuator_host: Option<String>,

    /// Motor controller TCP port; overrides the config file
    #[arg(long)]
    actuator_port: Option<u16>,

    /// Log commands instead of sending them
    #[arg(long)]
    dry_run: bool,

    /// Write the effective configuration to --config and exit
    #[arg(long, requires = "config")]
    write_default_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("╔══════════════════════════════════════╗");
    info!("║  PillDispenser v{}                ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 1. Configuration ──────────────────────────────────────
    let config = load_config(&cli).context("configuration rejected")?;

    if cli.write_default_config {
        if let Some(path) = &cli.config {
            JsonConfigStore::new(path)
                .save(&config)
                .with_context(|| format!("writing {}", path.display()))?;
            info!("Configuration written to {}", path.display());
        }
        return Ok(());
    }

    info!(
        "Strategy {:?}: sample every {} ms, cooldown {} s, actuator {}:{}{}",
        config.strategy,
        config.sample_interval_ms,
        config.cooldown_secs,
        config.actuator.host,
        config.actuator.port,
        if cli.dry_run { " (dry run)" } else { "" }
    );

    // ── 2. Frame source ───────────────────────────────────────
    let frames =
        frame_source::probe(&config.frame_candidates).context("No working frame source found")?;

    // ── 3. Stop request ('q' on stdin) ────────────────────────
    let stop = Arc::new(AtomicBool::new(false));
    spawn_stop_listener(Arc::clone(&stop));
    info!("Press 'q' then Enter to stop");

    // ── 4. Classifier + channel, then run ─────────────────────
    match config.strategy {
        Strategy::Text => {
            let classifier = TextMatchClassifier::new(
                TesseractRecognizer::from_config(&config.text),
                config.label_matcher(),
            );
            run_with_channel(&config, frames, classifier, cli.dry_run, &stop);
        }
        Strategy::Detection => {
            let detector = CommandDetector::from_config(&config.detection)
                .context("detection.detector_command is empty")?;
            let classifier = DetectionClassifier::new(detector, config.detection_policy());
            run_with_channel(&config, frames, classifier, cli.dry_run, &stop);
        }
    }

    info!("Shutdown complete");
    Ok(())
}

/// Config file (or preset) plus command-line overrides, validated.
fn load_config(cli: &Cli) -> pilldispenser::error::Result<DispenserConfig> {
    let strategy = cli.strategy.map(Strategy::from);
    let mut config = match &cli.config {
        Some(path) => match JsonConfigStore::new(path).load() {
            Ok(cfg) => cfg,
            Err(ConfigError::NotFound) => {
                warn!("{} not found, using defaults", path.display());
                DispenserConfig::preset(strategy.unwrap_or(Strategy::Text))
            }
            Err(e) => return Err(e.into()),
        },
        None => DispenserConfig::preset(strategy.unwrap_or(Strategy::Text)),
    };

    if let Some(strategy) = strategy {
        config.strategy = strategy;
    }
    if let Some(host) = &cli.actuator_host {
        config.actuator.host.clone_from(host);
    }
    if let Some(port) = cli.actuator_port {
        config.actuator.port = port;
    }
    config.validate()?;
    Ok(config)
}

fn spawn_stop_listener(stop: Arc<AtomicBool>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) if line.trim().eq_ignore_ascii_case("q") => {
                    info!("Stop requested");
                    stop.store(true, Ordering::Release);
                    break;
                }
                Ok(_) => {}
                Err(_) => break,
            }
        }
    });
}

fn run_with_channel(
    config: &DispenserConfig,
    frames: SnapshotFrameSource,
    classifier: impl Classifier,
    dry_run: bool,
    stop: &AtomicBool,
) {
    if dry_run {
        run(config, frames, classifier, DryRunChannel::new(), stop);
    } else {
        run(
            config,
            frames,
            classifier,
            TcpCommandChannel::from_config(&config.actuator),
            stop,
        );
    }
}

fn run(
    config: &DispenserConfig,
    mut frames: SnapshotFrameSource,
    mut classifier: impl Classifier,
    mut channel: impl CommandChannel,
    stop: &AtomicBool,
) {
    let mut clock = MonotonicClock::new();
    let mut sink = LogEventSink::new();
    let mut sensing = SensingLoop::from_config(config);

    sensing.start(&mut sink);
    sensing.run(
        &mut frames,
        &mut classifier,
        &mut channel,
        &mut clock,
        &mut sink,
        stop,
    );
    info!("Uptime {} s", clock.uptime_secs());
}
