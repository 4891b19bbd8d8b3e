use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use quotarium::config::{Cli, Config};
use quotarium::db;
use quotarium::quotes::HttpQuoteFetcher;
use quotarium::routes;
use quotarium::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let data_dir = Config::data_dir(&cli)?;
    std::fs::create_dir_all(&data_dir)?;
    tracing::info!("Data directory: {}", data_dir.display());

    let config = Config::load(&cli)?;

    // Initialize database
    let db_path = config.db_path().context("database path not resolved")?;
    let pool = db::create_pool(db_path)?;
    db::run_migrations(&pool)?;

    let fetcher = HttpQuoteFetcher::new(&config.quotes)?;
    tracing::info!(
        default_locale = %config.quotes.default_locale,
        timeout_ms = config.quotes.timeout_ms,
        "Quote fetcher ready"
    );

    let state = AppState {
        db: pool,
        config: config.clone(),
        quotes: Arc::new(fetcher),
    };

    let app = routes::app(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
