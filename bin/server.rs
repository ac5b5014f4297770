// Goods Catalog - Web Server
// Landing page, greeting and admin JSON API with Axum

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use goods_catalog::config::ServerArgs;
use goods_catalog::web::{router, AppState};
use goods_catalog::CatalogStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "goods_catalog=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerArgs::parse().into_config();

    let store = CatalogStore::open(&config.database_path)
        .with_context(|| format!("Failed to open database {:?}", config.database_path))?
        .with_actor(config.actor.clone());
    info!(database = ?config.database_path, actor = %config.actor, "database opened");

    let app = router(AppState::new(store));

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_address))?;

    info!(address = %config.bind_address, "goods catalog server listening");
    info!("  UI:    http://{}/", config.bind_address);
    info!("  Admin: http://{}/admin", config.bind_address);

    axum::serve(listener, app)
        .await
        .context("Server stopped unexpectedly")?;

    Ok(())
}
