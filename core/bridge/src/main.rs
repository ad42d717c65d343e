//! geo-presence entrypoint.
//!
//! A local, single-session bridge: the browser extension posts the active
//! game URL, the bridge classifies it and mirrors it into Discord Rich
//! Presence.

use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};

mod classifier;
mod config;
mod discord;
mod error;
mod logging;
mod orchestrator;
mod presence;
mod retry;
mod server;
mod session;

use classifier::ModeClassifier;
use config::BridgeConfig;
use discord::DiscordPresence;
use orchestrator::Orchestrator;
use retry::RetryPolicy;

#[derive(Parser)]
#[command(name = "geo-presence")]
#[command(about = "Mirror GeoGuessr activity into Discord Rich Presence")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Port to listen on (overrides the config file)
    #[arg(long)]
    port: Option<u16>,

    /// Path to the config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    let _logging_guard = logging::init(cli.debug);
    info!(version = env!("CARGO_PKG_VERSION"), "Starting geo-presence");

    let mut config = match config::load_config(cli.config) {
        Ok(config) => config,
        Err(err) => {
            warn!(error = %err, "Failed to load config; using defaults");
            BridgeConfig::default()
        }
    };
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let classifier = match ModeClassifier::for_host(&config.classifier.game_host) {
        Ok(classifier) => classifier,
        Err(err) => {
            error!(error = %err, host = %config.classifier.game_host, "Invalid game host");
            std::process::exit(1);
        }
    };

    let addr = config.server.bind_addr();
    let server = match server::bind(&addr) {
        Ok(server) => server,
        Err(err) => {
            error!(error = %err, "Failed to start server");
            std::process::exit(1);
        }
    };
    info!(addr = %addr, game_host = %config.classifier.game_host, "Listening for notifications");

    let discord = match DiscordPresence::new() {
        Ok(discord) => discord,
        Err(err) => {
            error!(error = %err, "Failed to start Discord client");
            std::process::exit(1);
        }
    };

    let orchestrator = Orchestrator::new(
        discord,
        classifier,
        config.presence.clone(),
        RetryPolicy::from(&config.retry),
    );
    let (queue, _worker) = server::spawn_worker(orchestrator);

    server::serve(server, queue);
}
