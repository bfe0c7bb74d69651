//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, store selection, filter warm-up, worker
//! spawning, and the Axum server lifecycle.

use crate::config::Config;
use crate::domain::click_worker::run_click_worker;
use crate::domain::repositories::{ClickRepository, UrlRepository};
use crate::infrastructure::cache::{KeyValueStore, MemoryStore, RedisStore};
use crate::infrastructure::existence_filter::ExistenceFilter;
use crate::infrastructure::metrics::install_recorder;
use crate::infrastructure::persistence::{PgClickRepository, PgUrlRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// How long pending click writes may take after the listener closes.
const WORKER_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Histogram buckets are drained into the exporter at this interval.
const METRICS_UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Prometheus recorder
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Redis store (or the in-process fallback)
/// - Existence filter, optionally rehydrated from the store
/// - Background click worker
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - A metrics recorder is already installed
/// - Database connection or migration fails
/// - The existence filter cannot be allocated
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let metrics = install_recorder().context("Failed to install metrics recorder")?;
    spawn_metrics_upkeep(metrics.clone());

    let pool = connect_database(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let store = connect_store(config.redis_url.as_deref()).await;

    let pool = Arc::new(pool);
    let url_repository: Arc<dyn UrlRepository> = Arc::new(PgUrlRepository::new(pool.clone()));
    let click_repository: Arc<dyn ClickRepository> =
        Arc::new(PgClickRepository::new(pool.clone()));

    let filter = Arc::new(
        ExistenceFilter::new(config.bloom_n, config.bloom_p)
            .context("Failed to create existence filter")?,
    );
    if config.filter_rehydrate {
        rehydrate_filter(&filter, url_repository.as_ref()).await?;
    } else {
        tracing::info!("Existence filter starts empty; codes issued before this start will resolve as not found");
    }

    let (click_tx, click_rx) = mpsc::channel(config.click_queue_capacity);
    let worker = tokio::spawn(run_click_worker(
        click_rx,
        click_repository.clone(),
        config.click_worker_concurrency,
    ));
    tracing::info!("Click worker started");

    let state = AppState::new(
        &config,
        url_repository,
        click_repository,
        store,
        filter,
        click_tx,
    )
    .with_metrics(metrics);
    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router (and every click sender in it) is gone; let the worker drain.
    match tokio::time::timeout(WORKER_DRAIN_TIMEOUT, worker).await {
        Ok(Ok(())) => tracing::info!("Click queue drained"),
        Ok(Err(e)) => tracing::error!("Click worker panicked: {}", e),
        Err(_) => tracing::warn!("Click worker did not drain within {:?}", WORKER_DRAIN_TIMEOUT),
    }

    pool.close().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

fn spawn_metrics_upkeep(handle: PrometheusHandle) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(METRICS_UPKEEP_INTERVAL);
        loop {
            interval.tick().await;
            handle.run_upkeep();
        }
    });
}

async fn connect_database(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")
}

/// Selects the key-value store backing the URL cache and rate limiter.
///
/// Falls back to the in-process store when Redis is not configured or not
/// reachable. The fallback is per instance: multiple replicas then keep
/// separate caches and separate rate windows.
async fn connect_store(redis_url: Option<&str>) -> Arc<dyn KeyValueStore> {
    let Some(redis_url) = redis_url else {
        tracing::info!("Redis not configured, using in-process store");
        return Arc::new(MemoryStore::new());
    };

    match RedisStore::connect(redis_url).await {
        Ok(redis) => {
            tracing::info!("Cache enabled (Redis)");
            Arc::new(redis)
        }
        Err(e) => {
            tracing::warn!(
                "Failed to connect to Redis: {}. Using in-process store.",
                e
            );
            Arc::new(MemoryStore::new())
        }
    }
}

/// Loads every issued code into the filter.
pub async fn rehydrate_filter(
    filter: &ExistenceFilter,
    repository: &dyn UrlRepository,
) -> Result<()> {
    let codes = repository
        .list_codes()
        .await
        .context("Failed to load codes for existence filter")?;

    if codes.len() > filter.capacity() {
        tracing::warn!(
            "{} issued codes exceed BLOOM_N={}; consider raising it",
            codes.len(),
            filter.capacity()
        );
    }

    let count = codes.len();
    filter.add_all(codes);
    tracing::info!("Existence filter rehydrated with {} codes", count);

    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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

    tracing::info!("Shutdown signal received, draining connections");
}
