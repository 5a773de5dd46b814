//! ProjectHub Server: collaborative workspace engine
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt};

use projecthub_api::AppState;
use projecthub_cache::CacheManager;
use projecthub_core::config::AppConfig;
use projecthub_core::error::AppError;
use projecthub_database::{AccessControl, DatabasePool, MemoryRecordStore, RecordStore};
use projecthub_realtime::spawn_sweeper;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "projecthub-server", version, about = "ProjectHub workspace server")]
struct Args {
    /// Base configuration file.
    #[arg(long, short, default_value = "config/default.toml")]
    config: String,

    /// Environment overlay, loaded from `config/<env>.toml`.
    #[arg(long, short, default_value = "development")]
    env: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match AppConfig::load(&args.config, &args.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(config = %args.config, env = %args.env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting ProjectHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Record store ─────────────────────────────────────
    let (store, access, db_pool) = open_store(&config).await?;

    // ── Step 2: Cache ────────────────────────────────────────────
    tracing::info!(provider = %config.cache.provider, "Initializing cache");
    let cache = Arc::new(CacheManager::new(&config.cache).await?);

    // ── Step 3: Services and presence hub ────────────────────────
    let sweep_interval = config.realtime.sweep_interval();
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let addr = config.server.bind_address();

    let state = AppState::build(config, store, access, cache);
    let presence = Arc::clone(&state.presence);

    // ── Step 4: Presence sweeper ─────────────────────────────────
    let shutdown = CancellationToken::new();
    let sweeper = spawn_sweeper(Arc::clone(&presence), sweep_interval, shutdown.clone());

    // ── Step 5: HTTP server ──────────────────────────────────────
    let app = projecthub_api::build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("ProjectHub server listening on {}", addr);

    let server_shutdown = shutdown.clone();
    let hub = Arc::clone(&presence);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
            server_shutdown.cancel();
            hub.close_all();
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 6: Wait for background tasks ───────────────────────
    shutdown.cancel();
    if tokio::time::timeout(grace, sweeper).await.is_err() {
        tracing::warn!("Presence sweeper did not stop within the grace period");
    }
    if let Some(pool) = db_pool {
        pool.close().await;
    }

    tracing::info!("ProjectHub server shut down gracefully");
    Ok(())
}

type Store = (
    Arc<dyn RecordStore>,
    Arc<dyn AccessControl>,
    Option<DatabasePool>,
);

/// Open the configured record store. `postgres` connects and migrates;
/// `memory` starts empty.
async fn open_store(config: &AppConfig) -> Result<Store, AppError> {
    match config.store.provider.as_str() {
        "postgres" => {
            let db = DatabasePool::open(&config.database).await?;
            let store: Arc<dyn RecordStore> = Arc::new(db.record_store());
            let access: Arc<dyn AccessControl> = Arc::new(db.access_control());
            Ok((store, access, Some(db)))
        }
        "memory" => {
            tracing::warn!("Using the in-memory record store; data is lost on restart");
            let memory = Arc::new(MemoryRecordStore::new());
            let store: Arc<dyn RecordStore> = memory.clone();
            let access: Arc<dyn AccessControl> = memory;
            Ok((store, access, None))
        }
        other => Err(AppError::configuration(format!(
            "Unknown store provider: {other}"
        ))),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
