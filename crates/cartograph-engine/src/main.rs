//! Cartograph engine binary.
//!
//! Wires the exploration scheduler, the waypoint graph, persistence, and
//! the query API together and runs the background frontier explorer until
//! `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `cartograph-config.yaml` (or
//!    `$CARTOGRAPH_CONFIG`), defaults if absent
//! 2. Initialize structured logging (tracing)
//! 3. Build the atlas over the seeded terrain
//! 4. Connect to Dragonfly, falling back to an in-memory store
//! 5. Restore saved state
//! 6. Start the query API, the explorer, and periodic snapshots
//! 7. On `Ctrl-C`: stop the background tasks and save once more

mod error;
mod explorer;
mod snapshots;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use cartograph_core::config::LoggingConfig;
use cartograph_core::{Atlas, CartographConfig, StateStore};
use cartograph_observer::{AppState, ServerConfig};
use cartograph_store::{AnyStore, DragonflyStore, MemoryStore};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::explorer::Explorer;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "cartograph-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, logging, or the query API cannot be
/// set up. Store and scan failures are logged, never fatal.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let config_path = config_path();
    let config = CartographConfig::from_file_or_default(&config_path)?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;
    info!(
        path = %config_path.display(),
        found = config_path.exists(),
        seed = config.world.seed,
        "cartograph-engine starting"
    );

    // 3. Build the atlas.
    let atlas = Arc::new(Atlas::from_config(&config, config.world.terrain()));

    // 4. Connect the store.
    let states = StateStore::new(connect_store(&config.infrastructure.dragonfly_url).await);
    info!(backend = states.store().backend_name(), "State store ready");

    // 5. Restore saved state.
    let restored = atlas.restore(states.load().await);
    info!(cells = restored, status = ?atlas.status(), "Saved state restored");

    // 6. Start background tasks.
    let observer = cartograph_observer::spawn_observer(
        ServerConfig::from(&config.infrastructure),
        Arc::new(AppState::new(Arc::clone(&atlas))),
    )?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let explorer_task = if config.explorer.enabled {
        let explorer = Explorer::new(Arc::clone(&atlas), config.explorer.clone());
        Some(tokio::spawn(explorer.run(shutdown_rx.clone())))
    } else {
        info!("Explorer disabled");
        None
    };

    let snapshot_task = tokio::spawn(snapshots::run_snapshots(
        Arc::clone(&atlas),
        states.clone(),
        Duration::from_secs(config.explorer.snapshot_interval_secs),
        shutdown_rx,
    ));

    // 7. Wait for Ctrl-C, then shut down.
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C, shutting down");
    }
    info!("Shutdown requested");

    if shutdown_tx.send(true).is_err() {
        warn!("Background tasks already stopped");
    }
    if let Some(handle) = explorer_task
        && let Err(e) = handle.await
    {
        warn!(error = %e, "Explorer task ended abnormally");
    }
    if let Err(e) = snapshot_task.await {
        warn!(error = %e, "Snapshot task ended abnormally");
    }
    observer.abort();

    let saved = snapshots::save_now(&atlas, &states).await;
    if let AnyStore::Dragonfly(store) = states.store()
        && let Err(e) = store.disconnect().await
    {
        warn!(error = %e, "Dragonfly disconnect failed");
    }

    info!(saved, status = ?atlas.status(), "cartograph-engine shutdown complete");
    Ok(())
}

/// `$CARTOGRAPH_CONFIG` if set, otherwise [`DEFAULT_CONFIG_PATH`].
fn config_path() -> PathBuf {
    std::env::var_os("CARTOGRAPH_CONFIG").map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Install the global subscriber. `RUST_LOG` overrides the configured
/// level.
fn init_logging(logging: &LoggingConfig) -> Result<(), EngineError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let installed = if logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| EngineError::Logging {
        message: e.to_string(),
    })
}

/// Dragonfly if reachable, otherwise a process-local store.
async fn connect_store(url: &str) -> AnyStore {
    match DragonflyStore::connect(url).await {
        Ok(store) => AnyStore::Dragonfly(store),
        Err(e) => {
            warn!(url, error = %e, "Dragonfly unavailable, state will not outlive this process");
            AnyStore::Memory(MemoryStore::new())
        }
    }
}
