//! `swarmie-localization` – rover localization node.
//!
//! Wires the localization core into a running process:
//!
//! 1. Resolves the platform name (first argument, or the host name) used to
//!    name every topic.
//! 2. Loads `~/.swarmie/localization.toml` (or `--config`) with `SWARMIE_*`
//!    environment overrides.
//! 3. Starts the [`LocalizationNode`], the optional WebSocket
//!    [`SnapshotBridge`], and newline-delimited JSON ingest from stdin.
//! 4. Prints every origin and location event to stdout as one JSON line,
//!    written by the node itself so none can be skipped.
//! 5. Stops on Ctrl-C, or once stdin reaches end of input.

mod config;
mod ingest;
mod telemetry;

use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use swarmie_localization::Localizer;
use swarmie_middleware::{
    BusSink, EventBus, JsonLinesSink, LocalizationNode, SnapshotBridge, sample_channel,
};
use swarmie_types::SwarmieError;
use tokio::sync::watch;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "swarmie-localization", version, about = "Rover localization node")]
struct Args {
    /// Platform name used for topic names. Defaults to the host name.
    name: Option<String>,

    /// Config file path. Defaults to ~/.swarmie/localization.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// WebSocket bridge port; 0 disables the bridge.
    #[arg(long)]
    bridge_port: Option<u16>,

    /// Do not read samples from stdin.
    #[arg(long)]
    no_stdin: bool,

    /// Write the effective configuration to the config path and exit.
    #[arg(long)]
    init_config: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let _guard = telemetry::init_tracing("swarmie-localization");

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to start tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "localization node failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), SwarmieError> {
    let config_path = args.config.unwrap_or_else(config::config_path);
    let mut cfg = config::load(&config_path)?;
    if let Some(port) = args.bridge_port {
        cfg.bridge_port = port;
    }

    if args.init_config {
        config::save_to(&cfg, &config_path)?;
        eprintln!("  {} Config written to {}", "✓".green().bold(), config_path.display());
        return Ok(());
    }

    let name = match args.name {
        Some(name) => {
            eprintln!(
                "{}",
                format!("Welcome to the world of tomorrow {name}!  Localization module started.")
                    .bold()
                    .cyan()
            );
            name
        }
        None => {
            let name = config::default_platform_name();
            eprintln!("{} {}", "No Name Selected. Default is:".yellow(), name.bold());
            name
        }
    };
    info!(
        platform = %name,
        config = %config_path.display(),
        heading_wrap = %cfg.localization.heading_wrap,
        "starting localization node"
    );

    let bus = EventBus::new(name, cfg.bus_capacity);
    let (samples, inputs) = sample_channel(cfg.bus_capacity);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let sink = (
        BusSink::new(bus.clone()),
        JsonLinesSink::new(bus.platform(), io::stdout()),
    );
    let node = LocalizationNode::new(Localizer::new(cfg.localization), sink);
    let node_task = tokio::spawn(node.run(inputs, shutdown_rx));

    let bridge = SnapshotBridge::new(bus.clone(), samples);
    if cfg.bridge_port != 0 {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, cfg.bridge_port));
        let server = bridge.clone();
        tokio::spawn(async move {
            if let Err(e) = server.run_ws_server(addr).await {
                error!(%addr, error = %e, "snapshot bridge stopped");
            }
        });
    }

    if args.no_stdin {
        wait_for_ctrl_c().await?;
        info!("Ctrl-C received");
    } else {
        let reader = tokio::io::BufReader::new(tokio::io::stdin());
        tokio::select! {
            result = wait_for_ctrl_c() => {
                result?;
                info!("Ctrl-C received");
            }
            stats = ingest::forward_lines(reader, &bridge) => {
                let stats = stats?;
                info!(accepted = stats.accepted, ignored = stats.ignored, "stdin closed");
            }
        }
    }

    // The node drains every queued sample before it returns.
    let _ = shutdown_tx.send(true);
    let node = node_task
        .await
        .map_err(|e| SwarmieError::Channel(format!("localization task: {e}")))??;

    let origin = node.localizer().origin();
    info!(locked = origin.locked, lon = origin.x, lat = origin.y, "shutdown complete");
    Ok(())
}

async fn wait_for_ctrl_c() -> Result<(), SwarmieError> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
