//! Route engine (v1)
//!
//! Discovers route modules from manifests on disk and serves them over HTTP.
//!
//! # Architecture Overview
//!
//! ```text
//!     routes/**/*.toml
//!           │
//!           ▼
//!     ┌──────────┐    ┌──────────┐    ┌────────────┐    ┌──────────────┐
//!     │  loader  │───▶│ registry │───▶│ dispatcher │───▶│ http server  │◀── Client
//!     │ catalog  │    │endpoints │    │ bind order │    │ base layers  │
//!     └──────────┘    └──────────┘    └────────────┘    └──────────────┘
//!           │                               │
//!           ▼                               ▼
//!     ┌──────────┐                   ┌────────────┐
//!     │ route    │                   │  adapter   │── 500 {"error": ...}
//!     │ init(ctx)│                   │ middleware │
//!     └──────────┘                   │  → exec    │
//!                                    └────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use route_engine::config::{load_config, EngineConfig};
use route_engine::lifecycle::signals::{install_panic_hook, spawn_signal_handler};
use route_engine::observability::logging::{events, init_tracing, topics};
use route_engine::observability::metrics::init_metrics;
use route_engine::persistence::{MemoryStore, Persistence};
use route_engine::{api, bootstrap, Shutdown};

#[derive(Parser)]
#[command(name = "route-engine")]
#[command(about = "Discover route modules and serve them over HTTP", long_about = None)]
struct Args {
    /// Engine configuration file (TOML). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `routes.root`.
    #[arg(short, long)]
    routes: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    if let Some(root) = args.routes {
        config.routes.root = root;
    }

    init_tracing(&config.observability.log_level)?;
    install_panic_hook();

    tracing::info!("route-engine v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes_root = %config.routes.root.display(),
        base_path = %config.routes.base_path,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let store = Arc::new(MemoryStore::new(config.persistence.snapshot_path.clone()));
    let engine = match bootstrap(&config, &api::catalog()?, store.clone()).await {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!(topic = topics::PROCESS, event = events::ERROR, error = %e, "Startup failed");
            return Err(e.into());
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    spawn_signal_handler(shutdown);

    engine.serve(listener, receiver).await?;

    if let Err(e) = store.flush().await {
        tracing::error!(topic = topics::PERSISTENCE, event = events::ERROR, error = %e, "Snapshot flush failed");
    }

    tracing::info!(topic = topics::PROCESS, event = events::SHUTDOWN, "Shutdown complete");
    Ok(())
}
