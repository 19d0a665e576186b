//! Versioned API server.
//!
//! Serves the endpoints declared in a TOML config. Each request's version is
//! read from its headers and resolved against the endpoint's handlers:
//!
//! ```text
//!   request ──▶ endpoint (path) ──▶ version (headers) ──▶ exact tier ──▶ range tier ──▶ response
//!                                                              │               │
//!                                                              └── 404 ◀───────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use versioned_api::config::{load_config, watcher::ConfigWatcher, ServiceConfig};
use versioned_api::http::HttpServer;
use versioned_api::lifecycle::{signals, Shutdown};
use versioned_api::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "versioned-api")]
#[command(about = "Serve version-aware API endpoints", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reload handler tables when the config file changes.
    #[arg(short, long, requires = "config")]
    watch: bool,

    /// Override the configured bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability.log_level)?;
    tracing::info!("versioned-api v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        endpoints = config.endpoints.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Keep the watcher handle alive for the lifetime of the server.
    let (_watcher, config_updates) = match (&args.config, args.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        _ => (None, mpsc::unbounded_channel().1),
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    tokio::spawn(async move {
        signals::terminate().await;
        shutdown.trigger();
    });

    server.run(listener, config_updates, signal).await?;
    Ok(())
}
