//! Topology discovery daemon entry point.
//!
//! Reads speaker events as newline-delimited JSON on stdin and writes
//! link-layer requests as newline-delimited JSON on stdout.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use topo_discovery::{DiscoveryService, SnapshotRepository, TopologyRepository};
use topo_discoveryd::{
    DiscoveryWorker, DiscoverydConfig, EventRouter, MonotonicTick, OutboundEvent, SpeakerEvent,
    SwitchPreloader, DEFAULT_CONFIG_PATH,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Topology discovery daemon
#[derive(Parser, Debug)]
#[command(name = "discoveryd")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file
    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); RUST_LOG applies when unset
    #[arg(short = 'l', long)]
    log_level: Option<String>,

    /// Durable topology snapshot, overrides store.snapshot_path
    #[arg(short = 's', long)]
    snapshot: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(args.log_level.as_deref()) {
        eprintln!("discoveryd: {:#}", e);
        return ExitCode::FAILURE;
    }

    info!("discoveryd: Starting topology discovery daemon");

    match run(args).await {
        Ok(()) => {
            info!("discoveryd: Daemon exiting normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = ?e, "discoveryd: Daemon exiting with error");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: Option<&str>) -> anyhow::Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).context("Invalid log level")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    // stdout carries outbound events
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set logger: {}", e))
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut config = DiscoverydConfig::load_or_default(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;
    if let Some(snapshot) = args.snapshot {
        config.store.snapshot_path = snapshot;
    }
    config.validate()?;

    info!(
        workers = config.runtime.workers,
        tick_interval_ms = config.runtime.tick_interval_ms,
        discovery_interval_ms = config.discovery.interval_ms,
        snapshot = %config.store.snapshot_path.display(),
        "discoveryd: Configuration loaded"
    );

    let repository: Arc<dyn TopologyRepository> = Arc::new(
        SnapshotRepository::load_or_empty(&config.store.snapshot_path)
            .context("Failed to load topology snapshot")?,
    );

    let (outbound_tx, outbound_rx) = mpsc::channel(config.runtime.queue_depth);
    let writer = tokio::spawn(write_outbound(outbound_rx));

    let mut senders = Vec::with_capacity(config.runtime.workers);
    let mut workers: Vec<JoinHandle<topo_discoveryd::Result<()>>> = Vec::new();
    for id in 0..config.runtime.workers {
        let (tx, rx) = mpsc::channel(config.runtime.queue_depth);
        let service = DiscoveryService::new(Arc::clone(&repository), config.discovery_options());
        let worker = DiscoveryWorker::new(id, service);
        workers.push(tokio::spawn(worker.run(rx, outbound_tx.clone())));
        senders.push(tx);
    }
    drop(outbound_tx);

    let router = EventRouter::new(senders)?;
    let mut preloader = SwitchPreloader::new(Arc::clone(&repository));
    let mut tick = MonotonicTick::new(config.tick_interval());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    info!("discoveryd: Listening for speaker events");
    loop {
        tokio::select! {
            now = tick.next() => {
                if !preloader.is_done() {
                    match preloader.on_tick() {
                        Ok(snapshots) => {
                            for init in snapshots {
                                router.prepopulate(init).await?;
                            }
                        }
                        Err(e) => error!(error = %e, "discoveryd: Durable topology preload failed"),
                    }
                }
                router.tick(now).await?;
            }
            line = lines.next_line() => {
                match line.context("Failed to read stdin")? {
                    Some(line) if line.trim().is_empty() => {}
                    Some(line) => match SpeakerEvent::decode(&line) {
                        Ok(event) => router.route(event).await?,
                        Err(e) => warn!(error = %e, "discoveryd: Drop undecodable speaker event"),
                    },
                    None => {
                        info!("discoveryd: Speaker stream closed");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                warn!("discoveryd: Received SIGINT, shutting down");
                break;
            }
        }
    }

    drop(router);
    for handle in workers {
        handle.await.context("Worker task panicked")??;
    }
    writer.await.context("Writer task panicked")??;
    Ok(())
}

async fn write_outbound(mut events: mpsc::Receiver<OutboundEvent>) -> anyhow::Result<()> {
    let mut stdout = tokio::io::stdout();
    while let Some(event) = events.recv().await {
        let mut line = serde_json::to_vec(&event)?;
        line.push(b'\n');
        stdout.write_all(&line).await?;
        stdout.flush().await?;
    }
    Ok(())
}
