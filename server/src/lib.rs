//! # Todos Server
//!
//! Wires configuration, logging, metrics and storage into the HTTP router and
//! runs it until a shutdown signal arrives.

pub mod config;

use anyhow::Context;
use config::{Config, StorageBackend};
use metrics_exporter_prometheus::PrometheusBuilder;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use todos_core::{repository::describe_metrics, Datastore, SystemClock, TodoRepository};
use todos_postgres::PostgresDatastore;
use todos_testing::InMemoryDatastore;
use todos_web::{router, AppState};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global `tracing` subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber is already set.
pub fn init_tracing(filter: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(filter)
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .context("failed to install tracing subscriber")
}

/// Register metric descriptions and start the Prometheus scrape endpoint.
///
/// # Errors
///
/// Returns an error if the address is invalid or the exporter fails to bind.
pub fn install_metrics(config: &Config) -> anyhow::Result<()> {
    let addr: SocketAddr = config
        .server
        .metrics_addr()
        .parse()
        .context("invalid METRICS_HOST/METRICS_PORT")?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("failed to install Prometheus exporter")?;
    describe_metrics();

    info!(%addr, "Prometheus metrics exporter listening");
    Ok(())
}

/// Build the datastore selected by `STORAGE_BACKEND`.
///
/// # Errors
///
/// Returns an error if the database is unreachable or migrations fail.
pub async fn build_datastore(config: &Config) -> anyhow::Result<Arc<dyn Datastore>> {
    match config.storage {
        StorageBackend::Memory => {
            warn!("Using in-memory datastore; todos are lost on restart");
            Ok(Arc::new(InMemoryDatastore::new()))
        }
        StorageBackend::Postgres => {
            let pg = &config.postgres;
            let pool = PgPoolOptions::new()
                .max_connections(pg.max_connections)
                .min_connections(pg.min_connections)
                .acquire_timeout(Duration::from_secs(pg.connect_timeout))
                .idle_timeout(Duration::from_secs(pg.idle_timeout))
                .connect(&pg.url)
                .await
                .context("failed to connect to PostgreSQL")?;
            info!(
                max_connections = pg.max_connections,
                min_connections = pg.min_connections,
                "Connected to PostgreSQL"
            );

            let store = PostgresDatastore::from_pool(pool);
            if pg.run_migrations {
                store.migrate().await.context("failed to run migrations")?;
                info!("Database migrations applied");
            }
            Ok(Arc::new(store))
        }
    }
}

/// Serve the todos API until Ctrl+C or SIGTERM.
///
/// After the signal, in-flight requests get `SHUTDOWN_TIMEOUT` seconds to
/// complete.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn run(config: Config, store: Arc<dyn Datastore>) -> anyhow::Result<()> {
    let repository = TodoRepository::new(store, Arc::new(SystemClock));
    let app = router(AppState::new(repository));

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "HTTP server listening");

    let (shutdown_tx, mut shutdown_rx) = watch::channel(());
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.changed().await;
            })
            .await
    });

    tokio::select! {
        result = &mut server => {
            return result.context("server task panicked")?.context("server error");
        }
        () = shutdown_signal() => {}
    }

    info!("Shutdown signal received, draining connections");
    let _ = shutdown_tx.send(());

    match tokio::time::timeout(config.server.shutdown_timeout(), server).await {
        Ok(result) => result.context("server task panicked")?.context("server error")?,
        Err(_) => warn!(
            timeout_secs = config.server.shutdown_timeout,
            "Graceful shutdown timed out, dropping remaining connections"
        ),
    }

    info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Unable to listen for Ctrl+C");
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
                warn!(error = %e, "Unable to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
