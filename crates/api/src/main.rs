use anyhow::Context;

use bayu_api::app::{AppServices, build_app};
use bayu_infra::{AppConfig, db};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bayu_observability::init();

    let config = AppConfig::from_env();
    config.validate().context("invalid configuration")?;

    let pool = db::connect(&config.database_url)
        .await
        .context("failed to connect to Postgres")?;
    db::ensure_schema(&pool)
        .await
        .context("failed to create database schema")?;

    let services = AppServices::postgres(pool, &config);
    services.seed(&config).await.context("failed to seed defaults")?;

    let app = build_app(services, &config);

    let addr = config.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
