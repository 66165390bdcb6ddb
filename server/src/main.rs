//! Todos server
//!
//! Run with: cargo run --bin todos-server
//! API: http://localhost:8080/todos
//! Health: http://localhost:8080/health
//! Metrics: http://localhost:9090/metrics

use todos_server::{build_datastore, config::Config, init_tracing, install_metrics, run};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if present)
    let _ = dotenvy::dotenv();

    let config = Config::from_env();
    init_tracing(&config.server.log_level)?;

    info!(storage = ?config.storage, "Starting todos server");

    install_metrics(&config)?;
    let store = build_datastore(&config).await?;

    run(config, store).await
}
