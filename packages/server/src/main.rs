use anyhow::Context;
use common::UploadStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

use server::config::AppConfig;
use server::database::{ensure_indexes, init_db};
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    info!(environment = ?config.server.environment, "Configuration loaded");

    let db = init_db(&config.database)
        .await
        .context("Failed to connect to the database")?;
    ensure_indexes(&db).await?;

    let uploads = UploadStore::new(config.upload.dir.clone(), config.upload.max_file_size)
        .await
        .with_context(|| format!("Failed to prepare upload dir {:?}", config.upload.dir))?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = server::build_router(AppState {
        db,
        config,
        uploads,
    });

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running at http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
