pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod scheduling;

use tracing_subscriber::EnvFilter;

use crate::api::{api_router, ApiContext};

/// Initialize tracing from `RUST_LOG`, falling back to the built-in filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER)),
        )
        .init();
}

/// Open the on-disk database and start serving the API.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let data_dir = config::app_data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let conn = db::open_database(&config::db_path())?;

    let app = api_router(ApiContext::new(conn));

    let addr = config::bind_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
