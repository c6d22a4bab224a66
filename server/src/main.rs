// server/src/main.rs

// This is the main entry point for the EHR API server. It loads the
// configuration, wires the storage engine into the service bundle, and
// serves the REST routes until a shutdown signal arrives.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;
use tokio::signal::unix::{signal, SignalKind};

use ehr_server::rest::{routes, ApiContext};
use ehr_services::config::{load_bootstrap_users, load_server_config};
use ehr_services::{EhrStore, InMemoryStore};

async fn handle_signals() {
    let mut sigterm = signal(SignalKind::terminate()).expect("Failed to set up SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("Failed to set up SIGINT handler");

    tokio::select! {
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config_path = env::var("EHR_CONFIG").ok().map(PathBuf::from);
    let config = load_server_config(config_path.as_deref())?;

    let store: Arc<dyn EhrStore> = Arc::new(InMemoryStore::new());
    if let Some(path) = &config.bootstrap_path {
        let loaded = load_bootstrap_users(store.as_ref(), path).await?;
        info!("loaded {} bootstrap users from {}", loaded, path.display());
    }

    let api = Arc::new(ApiContext::new(store));
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;

    let (bound, serving) =
        warp::serve(routes(api)).bind_with_graceful_shutdown(addr, handle_signals());
    info!("EHR API listening on {}", bound);
    serving.await;
    Ok(())
}
