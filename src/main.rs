//! Items Cache - CRUD service over a relational store with a read-through cache

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use items_cache::api::create_router;
use items_cache::cache::{FastCache, MemoryCache, RedisCache};
use items_cache::config::CacheBackend;
use items_cache::store::SqliteItemStore;
use items_cache::{spawn_cleanup_task, AppState, CacheAside, Config};
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the items service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect the store pool and create the items table if missing
/// 4. Build the configured cache backend (and its sweeper for the memory backend)
/// 5. Create Axum router with all endpoints
/// 6. Serve until SIGINT/SIGTERM, then close the pool
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "items_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting items service");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, cache_backend={:?}, collection_ttl={}s, item_ttl={}s, list_limit={}, environment={}",
        config.server_port,
        config.cache_backend,
        config.collection_ttl,
        config.item_ttl,
        config.list_limit,
        config.environment
    );

    let store = SqliteItemStore::connect(&config.database_url, config.db_max_connections)
        .await
        .context("failed to connect to database")?;
    store
        .ensure_schema()
        .await
        .context("failed to initialize database schema")?;
    info!("Database ready at {}", config.database_url);

    let (cache, cleanup_handle): (Arc<dyn FastCache>, Option<JoinHandle<()>>) =
        match config.cache_backend {
            CacheBackend::Redis => {
                let redis = RedisCache::new(&config.redis_url).context("invalid REDIS_URL")?;
                info!("Using Redis cache at {}", config.redis_url);
                (Arc::new(redis) as Arc<dyn FastCache>, None)
            }
            CacheBackend::Memory => {
                let memory = Arc::new(MemoryCache::new(config.memory_cache_max_entries));
                let handle = spawn_cleanup_task(memory.clone(), config.cleanup_interval);
                info!("Using in-process cache");
                (memory as Arc<dyn FastCache>, Some(handle))
            }
            CacheBackend::None => {
                warn!("Cache disabled, every read goes to the database");
                (Arc::new(MemoryCache::disabled()) as Arc<dyn FastCache>, None)
            }
        };

    let accessor = CacheAside::new(Arc::new(store.clone()), cache, config.cache_policy());
    let state = AppState::from_config(accessor, &config);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    store.close().await;
    info!("Database connections closed");
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the cleanup task if one is running.
async fn shutdown_signal(cleanup_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Cleanup task aborted");
    }
}
