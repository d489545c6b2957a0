//! Motion Sentry CLI
//!
//! Watches a video stream and prints newline-delimited `ALARM` /
//! `CLEAR` tokens on stdout as the motion state changes. Prints
//! `ERROR` and exits nonzero if the stream cannot be opened.

use clap::Parser;
use motion_sentry::{
    alarm::AlarmMachine,
    detection::MotionDetector,
    source::{FrameSource, MockStream},
    watch::{FileConfig, StdoutSink, Watcher},
};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "motion-sentry", version, about)]
struct Cli {
    /// Stream address to watch (e.g. mock://intruder).
    address: String,

    /// Optional TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("Motion Sentry v{}", motion_sentry::VERSION);

    let config = match &cli.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };

    let mut stream = MockStream::new();
    if let Err(e) = stream.open(&cli.address) {
        // Fixed startup failure token on stdout, then nonzero exit.
        tracing::error!(error = %e, "Failed to open stream");
        println!("ERROR");
        let _ = std::io::stdout().flush();
        std::process::exit(1);
    }

    let detector = MotionDetector::new(config.detection.clone());
    let machine = AlarmMachine::new(config.alarm.cooldown());

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        if let Err(e) = ctrlc::set_handler(move || {
            cancel.store(true, Ordering::Relaxed);
        }) {
            eprintln!("Failed to install signal handler: {}", e);
            std::process::exit(1);
        }
    }

    let watcher = Watcher::new(stream, detector, machine, StdoutSink::new(), config.watch.clone());

    #[cfg(feature = "metrics")]
    let watcher = {
        use motion_sentry::metrics::{MetricsRegistry, MetricsServer, MetricsServerConfig};

        let mut watcher = watcher;
        if config.watch.metrics_port != 0 {
            match MetricsRegistry::new() {
                Ok(registry) => {
                    let registry = Arc::new(registry);
                    let server = MetricsServer::new(
                        MetricsServerConfig::with_port(config.watch.metrics_port),
                        Arc::clone(&registry),
                    );

                    // The watch loop stays synchronous; the exporter
                    // gets its own thread and runtime.
                    std::thread::spawn(move || {
                        let runtime = match tokio::runtime::Runtime::new() {
                            Ok(rt) => rt,
                            Err(e) => {
                                tracing::error!(error = %e, "Failed to start metrics runtime");
                                return;
                            }
                        };
                        if let Err(e) = runtime.block_on(server.run()) {
                            tracing::error!(error = %e, "Metrics server failed");
                        }
                    });

                    watcher = watcher.with_metrics(registry);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create metrics registry");
                }
            }
        }
        watcher
    };

    let mut watcher = watcher;
    info!(address = %cli.address, "Watching stream");

    if let Err(e) = watcher.run(&cancel) {
        tracing::error!(error = %e, "Event output failed");
        std::process::exit(1);
    }

    info!(
        frames = watcher.stats().frames,
        alarms = watcher.stats().alarms,
        clears = watcher.stats().clears,
        "Stopped"
    );
}
