mod logging;

use anyhow::Context;
use api::{router, AppState};
use bookshelf_core::{connect, run_migrations, AppConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (config, overrides) = AppConfig::load_with_env().context("failed to load configuration")?;
    logging::init_logging(&config.logging);

    if !overrides.is_empty() {
        tracing::info!(keys = ?overrides, "configuration overridden from environment");
    }

    let db = connect(&config.database)
        .await
        .context("failed to open database")?;
    let applied = run_migrations(&db).await.context("failed to run migrations")?;
    tracing::info!(applied, "schema up to date");

    let state = Arc::new(AppState::from_config(db, &config));
    let app = router::router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .context("server error")?;

    Ok(())
}
